//! Client command implementation.

use hsync_engine::{
    default_config_path, DirectoryFiles, HttpTransport, MemoryLedger, SyncConfig, SyncCoordinator,
};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tracing::info;

/// Runs the client until Ctrl-C or SIGTERM.
///
/// The sync loop runs on its own thread with blocking I/O; the main thread
/// only waits for a shutdown signal and then asks the loop to stop after its
/// current tick.
pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path
        .or_else(default_config_path)
        .ok_or("could not determine home directory; pass --config")?;
    let config = SyncConfig::load(&path)?;

    let files = DirectoryFiles::with_suffix(&config.dir, &config.document_suffix)?;
    let transport = HttpTransport::new(&config)?;
    info!(
        server = %config.server_url,
        dir = %config.dir.display(),
        "starting client"
    );

    let mut coordinator = SyncCoordinator::new(transport, MemoryLedger::new(), files)
        .with_document_suffix(config.document_suffix.clone());

    let (stop_tx, stop_rx) = mpsc::channel();
    let interval = config.interval;
    let worker = thread::Builder::new()
        .name("hsync-sync".into())
        .spawn(move || coordinator.run(interval, &stop_rx))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(super::shutdown_signal());

    // The loop may already have exited; a closed channel is fine.
    let _ = stop_tx.send(());
    let stats = worker.join().map_err(|_| "sync thread panicked")?;
    info!(
        cycles = stats.cycles_completed,
        pulled = stats.documents_pulled,
        pushed = stats.documents_pushed,
        errors = stats.errors,
        "client stopped"
    );
    Ok(())
}
