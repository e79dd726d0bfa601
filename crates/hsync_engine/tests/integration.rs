//! Integration tests for sync engine and server.

use hsync_engine::{
    BaseLedger, DirectoryFiles, LocalFiles, MemoryFiles, MemoryLedger, SyncCoordinator, SyncError,
    SyncResult, SyncTransport,
};
use hsync_protocol::{FingerprintMap, ReconcileRequest, ReconcileResponse};
use hsync_server::{
    ExclusiveStore, InMemoryBackend, RequestHandler, SerializedStore, ServerConfig, ServerError,
};
use std::sync::Arc;
use tempfile::tempdir;

const KEY: &str = "integration-key";

/// A transport that calls the server's request handler directly.
struct InMemoryTransport {
    handler: Arc<RequestHandler>,
    key: String,
}

impl InMemoryTransport {
    fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            key: KEY.to_string(),
        }
    }

    fn with_key(handler: Arc<RequestHandler>, key: &str) -> Self {
        Self {
            handler,
            key: key.to_string(),
        }
    }
}

fn server_error(e: ServerError) -> SyncError {
    match e {
        ServerError::AuthenticationFailed(_) => SyncError::Unauthorized,
        other => SyncError::ServerError {
            status: if other.is_client_error() { 400 } else { 500 },
            message: other.to_string(),
        },
    }
}

impl SyncTransport for InMemoryTransport {
    fn list_fingerprints(&self) -> SyncResult<FingerprintMap> {
        self.handler.handle_list(Some(&self.key)).map_err(server_error)
    }

    fn fetch_document(&self, name: &str) -> SyncResult<Option<String>> {
        match self.handler.handle_fetch(Some(&self.key), name) {
            Ok(content) => Ok(Some(content)),
            Err(ServerError::NotFound(_)) => Ok(None),
            Err(e) => Err(server_error(e)),
        }
    }

    fn reconcile(&self, request: &ReconcileRequest) -> SyncResult<ReconcileResponse> {
        self.handler
            .handle_reconcile(Some(&self.key), request.clone())
            .map_err(server_error)
    }
}

fn server(documents: &[(&str, &str)]) -> Arc<RequestHandler> {
    let config = ServerConfig::default().with_auth_key(KEY);
    let backend = InMemoryBackend::with_documents(documents.iter().copied());
    Arc::new(RequestHandler::new(
        config,
        Arc::new(SerializedStore::new(backend)),
    ))
}

fn replica(
    handler: &Arc<RequestHandler>,
) -> (
    SyncCoordinator<InMemoryTransport, MemoryLedger, MemoryFiles>,
    MemoryFiles,
) {
    let files = MemoryFiles::new();
    let coordinator = SyncCoordinator::new(
        InMemoryTransport::new(Arc::clone(handler)),
        MemoryLedger::new(),
        files.clone(),
    );
    (coordinator, files)
}

fn server_content(handler: &RequestHandler, name: &str) -> Option<String> {
    handler.store().read(name).unwrap()
}

#[test]
fn fresh_replica_pulls_everything() {
    let handler = server(&[("note1.txt", "hello")]);
    let (mut client, files) = replica(&handler);

    let report = client.pull_only();

    assert_eq!(report.created, 1);
    assert_eq!(files.read("note1.txt").unwrap().as_deref(), Some("hello"));
    assert_eq!(client.ledger().get("note1.txt").as_deref(), Some("hello"));
}

#[test]
fn local_edit_is_pushed() {
    let handler = server(&[("note1.txt", "hello")]);
    let (mut client, files) = replica(&handler);
    client.pull_only();

    files.write("note1.txt", "hello world").unwrap();
    let report = client.tick();

    assert_eq!(report.pushed, 1);
    assert_eq!(report.merged, 0);
    assert_eq!(
        server_content(&handler, "note1.txt").as_deref(),
        Some("hello world")
    );
    assert_eq!(
        client.ledger().get("note1.txt").as_deref(),
        Some("hello world")
    );
}

#[test]
fn divergent_edits_are_merged() {
    let handler = server(&[("note2.txt", "X")]);
    let (mut a, a_files) = replica(&handler);
    let (mut b, b_files) = replica(&handler);
    a.pull_only();
    b.pull_only();

    a_files.write("note2.txt", "X changed by A").unwrap();
    a.tick();
    assert_eq!(
        server_content(&handler, "note2.txt").as_deref(),
        Some("X changed by A")
    );

    // B has not pulled A's change and still holds base "X".
    b_files.write("note2.txt", "X changed by B").unwrap();
    let report = b.tick();

    assert_eq!(report.skipped_dirty, 1);
    assert_eq!(report.pushed, 1);
    assert_eq!(report.merged, 1);

    let merged = server_content(&handler, "note2.txt").unwrap();
    assert!(merged.contains("changed by A"));
    assert!(merged.contains("changed by B"));
    assert_eq!(b_files.read("note2.txt").unwrap(), Some(merged.clone()));
    assert_eq!(b.ledger().get("note2.txt"), Some(merged.clone()));

    // A picks the merge up by fast-forward.
    let report = a.tick();
    assert_eq!(report.fast_forwarded, 1);
    assert_eq!(a_files.read("note2.txt").unwrap(), Some(merged));
}

#[test]
fn disjoint_line_edits_converge() {
    let handler = server(&[("list.txt", "one\ntwo\nthree\nfour\nfive\nsix\n")]);
    let (mut a, a_files) = replica(&handler);
    let (mut b, b_files) = replica(&handler);
    a.pull_only();
    b.pull_only();

    a_files
        .write("list.txt", "ONE\ntwo\nthree\nfour\nfive\nsix\n")
        .unwrap();
    b_files
        .write("list.txt", "one\ntwo\nthree\nfour\nfive\nSIX\n")
        .unwrap();

    a.tick();
    b.tick();
    a.tick();

    let expected = "ONE\ntwo\nthree\nfour\nfive\nSIX\n";
    assert_eq!(server_content(&handler, "list.txt").as_deref(), Some(expected));
    assert_eq!(a_files.read("list.txt").unwrap().as_deref(), Some(expected));
    assert_eq!(b_files.read("list.txt").unwrap().as_deref(), Some(expected));
}

#[test]
fn new_local_document_reaches_other_replica() {
    let handler = server(&[]);
    let (mut a, a_files) = replica(&handler);
    let (mut b, b_files) = replica(&handler);

    a_files.write("todo.txt", "- buy milk\n").unwrap();
    a.tick();
    b.tick();

    assert_eq!(
        b_files.read("todo.txt").unwrap().as_deref(),
        Some("- buy milk\n")
    );
}

#[test]
fn restarted_replica_adopts_unchanged_files() {
    let handler = server(&[("note1.txt", "hello")]);
    let files = MemoryFiles::new();

    let mut first = SyncCoordinator::new(
        InMemoryTransport::new(Arc::clone(&handler)),
        MemoryLedger::new(),
        files.clone(),
    );
    first.pull_only();
    drop(first);

    // Same files, empty ledger.
    let mut restarted = SyncCoordinator::new(
        InMemoryTransport::new(Arc::clone(&handler)),
        MemoryLedger::new(),
        files.clone(),
    );
    let report = restarted.tick();

    assert_eq!(report.adopted, 1);
    assert_eq!(report.pushed, 0);
    assert_eq!(server_content(&handler, "note1.txt").as_deref(), Some("hello"));
    assert_eq!(files.read("note1.txt").unwrap().as_deref(), Some("hello"));
}

#[test]
fn restarted_replica_pushes_offline_edits() {
    let handler = server(&[("note1.txt", "hello")]);
    let files = MemoryFiles::new();
    files.write("note1.txt", "hello, edited offline").unwrap();

    let mut client = SyncCoordinator::new(
        InMemoryTransport::new(Arc::clone(&handler)),
        MemoryLedger::new(),
        files.clone(),
    );
    let report = client.tick();

    // No base: the file is dirty and pushed against an empty base.
    assert_eq!(report.skipped_dirty, 1);
    assert_eq!(report.pushed, 1);
    let merged = server_content(&handler, "note1.txt").unwrap();
    assert!(merged.contains("edited offline"));
    assert_eq!(files.read("note1.txt").unwrap(), Some(merged));
}

#[test]
fn initial_pull_does_not_push() {
    let handler = server(&[]);
    let (mut client, files) = replica(&handler);
    files.write("draft.txt", "not yet").unwrap();

    let report = client.pull_only();

    assert_eq!(report.pushed, 0);
    assert!(handler.handle_list(Some(KEY)).unwrap().is_empty());
}

#[test]
fn wrong_key_touches_nothing() {
    let handler = server(&[("note1.txt", "hello")]);
    let files = MemoryFiles::new();
    files.write("note1.txt", "overwrite attempt").unwrap();

    let mut client = SyncCoordinator::new(
        InMemoryTransport::with_key(Arc::clone(&handler), "wrong"),
        MemoryLedger::new(),
        files.clone(),
    );
    let report = client.tick();

    assert_eq!(report.errors, 2);
    assert!(report.last_error.unwrap().contains("unauthorized"));
    assert_eq!(server_content(&handler, "note1.txt").as_deref(), Some("hello"));
    assert!(client.ledger().is_empty());
}

#[test]
fn directory_replica_end_to_end() {
    let handler = server(&[("note1.txt", "hello")]);
    let dir = tempdir().unwrap();
    let files = DirectoryFiles::open(dir.path()).unwrap();
    let mut client = SyncCoordinator::new(
        InMemoryTransport::new(Arc::clone(&handler)),
        MemoryLedger::new(),
        files,
    );

    client.pull_only();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("note1.txt")).unwrap(),
        "hello"
    );

    std::fs::write(dir.path().join("note1.txt"), "hello world").unwrap();
    std::fs::write(dir.path().join("ignored.md"), "not tracked").unwrap();
    let report = client.tick();

    assert_eq!(report.pushed, 1);
    assert_eq!(
        server_content(&handler, "note1.txt").as_deref(),
        Some("hello world")
    );
    assert!(server_content(&handler, "ignored.md").is_none());
}
