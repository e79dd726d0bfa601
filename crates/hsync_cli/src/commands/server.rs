//! Server command implementation.

use hsync_protocol::DEFAULT_KEY;
use hsync_server::{ServerConfig, SyncServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Parses a listen address; a bare `:port` binds every interface.
pub fn parse_addr(text: &str) -> Result<SocketAddr, String> {
    let full = match text.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => text.to_string(),
    };
    full.parse()
        .map_err(|e| format!("invalid address {text:?}: {e}"))
}

/// Runs the server until Ctrl-C or SIGTERM.
pub fn run(
    addr: SocketAddr,
    key: String,
    dir: PathBuf,
    max_document_bytes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if key == DEFAULT_KEY {
        warn!("using the default shared key; pass --key to set your own");
    }

    let config = ServerConfig::new(addr, dir)
        .with_auth_key(key)
        .with_max_document_bytes(max_document_bytes);
    info!(
        addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        "starting sync server"
    );
    let server = SyncServer::new(config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve(super::shutdown_signal()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_go_style_addresses() {
        assert_eq!(parse_addr(":8080").unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            parse_addr("127.0.0.1:9000").unwrap(),
            "127.0.0.1:9000".parse().unwrap()
        );
        assert!(parse_addr("localhost").is_err());
        assert!(parse_addr(":http").is_err());
    }
}
