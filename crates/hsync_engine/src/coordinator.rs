//! The replica sync loop.
//!
//! Each tick runs a pull phase then a push phase:
//!
//! 1. **Pull.** For every server document whose fingerprint differs from our
//!    base, fetch it. A missing or clean local copy is overwritten; a dirty
//!    one is left alone.
//! 2. **Push.** Every local document that differs from its base is sent for
//!    reconciliation, and the merged result replaces the local copy.
//!
//! Failures are per document: they are logged, counted in the
//! [`TickReport`], and the document is retried on the next tick.

use crate::error::{SyncError, SyncResult};
use crate::files::LocalFiles;
use crate::ledger::BaseLedger;
use crate::transport::SyncTransport;
use hsync_protocol::{fingerprint, is_valid_document_name, ReconcileRequest, DEFAULT_SUFFIX};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The current state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No tick has run yet.
    Idle,
    /// Pulling changes from the server.
    Pulling,
    /// Pushing local changes to the server.
    Pushing,
    /// The last tick finished without errors.
    Synced,
    /// The last tick finished with at least one error.
    Error,
}

impl SyncState {
    /// Returns true while a tick is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Pulling | SyncState::Pushing)
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Documents downloaded during pull.
    pub fetched: u64,
    /// Documents written locally for the first time.
    pub created: u64,
    /// Clean local documents overwritten with newer server content.
    pub fast_forwarded: u64,
    /// Local documents found identical to the server and adopted as clean.
    pub adopted: u64,
    /// Dirty local documents left for the push phase.
    pub skipped_dirty: u64,
    /// Documents sent for reconciliation.
    pub pushed: u64,
    /// Pushed documents whose merged result differed from local content.
    pub merged: u64,
    /// Documents abandoned because of an error.
    pub errors: u64,
    /// Message of the last error.
    pub last_error: Option<String>,
    /// Wall time of the tick.
    pub duration: Duration,
}

impl TickReport {
    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }

    fn record_error(&mut self, error: &SyncError) {
        self.errors += 1;
        self.last_error = Some(error.to_string());
    }
}

/// Cumulative statistics across ticks.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Ticks completed, including pull-only ones.
    pub cycles_completed: u64,
    /// Total documents downloaded.
    pub documents_pulled: u64,
    /// Total documents reconciled.
    pub documents_pushed: u64,
    /// Total documents merged with divergent server content.
    pub documents_merged: u64,
    /// Total errors.
    pub errors: u64,
    /// Time the last tick finished.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Drives one replica against the server.
///
/// The coordinator owns its ledger; nothing else reads or writes it.
pub struct SyncCoordinator<T: SyncTransport, L: BaseLedger, F: LocalFiles> {
    transport: T,
    ledger: L,
    files: F,
    suffix: String,
    state: SyncState,
    stats: SyncStats,
}

impl<T: SyncTransport, L: BaseLedger, F: LocalFiles> SyncCoordinator<T, L, F> {
    /// Creates a coordinator tracking `.txt` documents.
    pub fn new(transport: T, ledger: L, files: F) -> Self {
        Self {
            transport,
            ledger,
            files,
            suffix: DEFAULT_SUFFIX.to_string(),
            state: SyncState::Idle,
            stats: SyncStats::default(),
        }
    }

    /// Sets the tracked document suffix.
    pub fn with_document_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Gets the cumulative stats.
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Returns the base ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns the local documents.
    pub fn files(&self) -> &F {
        &self.files
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a full tick: pull, then push.
    pub fn tick(&mut self) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();

        self.state = SyncState::Pulling;
        self.pull(&mut report);

        self.state = SyncState::Pushing;
        self.push(&mut report);

        self.finish(report, start)
    }

    /// Runs the pull phase only.
    ///
    /// Used once at startup so that a fresh replica first takes in the
    /// server's documents before pushing anything.
    pub fn pull_only(&mut self) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();

        self.state = SyncState::Pulling;
        self.pull(&mut report);

        self.finish(report, start)
    }

    /// Runs until `stop` receives a message or is disconnected.
    ///
    /// Starts with a pull-only tick, then runs a full tick every `interval`.
    /// A stop request is observed between ticks; a tick in progress always
    /// completes.
    pub fn run(&mut self, interval: Duration, stop: &Receiver<()>) -> SyncStats {
        info!(interval = ?interval, "starting sync loop");
        self.pull_only();

        loop {
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    self.tick();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!(cycles = self.stats.cycles_completed, "sync loop stopped");
        self.stats.clone()
    }

    fn finish(&mut self, mut report: TickReport, start: Instant) -> TickReport {
        report.duration = start.elapsed();
        self.state = if report.is_clean() {
            SyncState::Synced
        } else {
            SyncState::Error
        };

        let stats = &mut self.stats;
        stats.cycles_completed += 1;
        stats.documents_pulled += report.fetched;
        stats.documents_pushed += report.pushed;
        stats.documents_merged += report.merged;
        stats.errors += report.errors;
        stats.last_sync_time = Some(Instant::now());
        if report.last_error.is_some() {
            stats.last_error.clone_from(&report.last_error);
        }

        debug!(?report, "tick finished");
        report
    }

    /// Pull phase: bring clean local copies up to date with the server.
    fn pull(&mut self, report: &mut TickReport) {
        let remote = match self.transport.list_fingerprints() {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "failed to list server documents");
                report.record_error(&e);
                return;
            }
        };

        for (name, remote_fingerprint) in &remote {
            if !is_valid_document_name(name, &self.suffix) {
                warn!(document = %name, "ignoring server document with invalid name");
                continue;
            }

            let base = self.ledger.get(name);
            if base.as_deref().map(fingerprint).as_ref() == Some(remote_fingerprint) {
                continue;
            }

            if let Err(e) = self.pull_document(name, base, report) {
                warn!(document = %name, error = %e, "failed to pull document");
                report.record_error(&e);
            }
        }
    }

    fn pull_document(
        &mut self,
        name: &str,
        base: Option<String>,
        report: &mut TickReport,
    ) -> SyncResult<()> {
        let Some(fetched) = self.transport.fetch_document(name)? else {
            debug!(document = %name, "document disappeared before fetch");
            return Ok(());
        };
        report.fetched += 1;

        match self.files.read(name)? {
            None => {
                self.files.write(name, &fetched)?;
                report.created += 1;
                info!(document = %name, "downloaded new file");
            }
            Some(local) if local == fetched => {
                // Already identical, e.g. after a restart wiped the ledger.
                report.adopted += 1;
                debug!(document = %name, "local copy matches server");
            }
            Some(local) if base.as_ref() == Some(&local) => {
                self.files.write(name, &fetched)?;
                report.fast_forwarded += 1;
                info!(document = %name, "updated file from server");
            }
            Some(_) => {
                report.skipped_dirty += 1;
                info!(document = %name, "local changes detected, deferring to push");
                return Ok(());
            }
        }

        self.ledger.set(name, fetched);
        Ok(())
    }

    /// Push phase: reconcile every locally changed document.
    fn push(&mut self, report: &mut TickReport) {
        let names = match self.files.list() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "failed to list local documents");
                report.record_error(&e);
                return;
            }
        };

        for name in names {
            if let Err(e) = self.push_document(&name, report) {
                warn!(document = %name, error = %e, "failed to push document");
                report.record_error(&e);
            }
        }
    }

    fn push_document(&mut self, name: &str, report: &mut TickReport) -> SyncResult<()> {
        let Some(local) = self.files.read(name)? else {
            return Ok(());
        };
        let base = self.ledger.get(name).unwrap_or_default();
        if local == base {
            return Ok(());
        }

        info!(document = %name, "file changed, uploading");
        let request = ReconcileRequest::new(name, base, local);
        let response = self.transport.reconcile(&request)?;
        report.pushed += 1;

        if response.synced != request.latest {
            // The base stays put until the merged text is on disk.
            self.files.write(name, &response.synced)?;
            report.merged += 1;
            info!(document = %name, "file updated with merged content");
        } else {
            debug!(document = %name, "upload complete, no merge needed");
        }

        self.ledger.set(name, response.synced);
        Ok(())
    }
}

impl<T: SyncTransport, L: BaseLedger, F: LocalFiles> std::fmt::Debug for SyncCoordinator<T, L, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("suffix", &self.suffix)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
