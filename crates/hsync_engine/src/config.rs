//! Configuration for the sync engine.
//!
//! The client reads a TOML file:
//!
//! ```toml
//! server = "https://notes.example.com"
//! key = "shared-secret"
//! dir = "/home/me/.config/Heynote/notes"
//! interval = "5s"
//! insecureSkipVerify = false
//! ```
//!
//! Every key is optional. Missing or empty values fall back to the defaults
//! on [`SyncConfig::default`].

use crate::error::{SyncError, SyncResult};
use hsync_protocol::{DEFAULT_KEY, DEFAULT_SUFFIX};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server URL used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Interval between ticks when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a replica.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the sync server.
    pub server_url: String,
    /// Shared secret sent with every request.
    pub key: String,
    /// Local directory holding the documents.
    pub dir: PathBuf,
    /// Time between ticks.
    pub interval: Duration,
    /// Skip TLS certificate verification.
    pub insecure_skip_verify: bool,
    /// Suffix of tracked documents.
    pub document_suffix: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Creates a configuration for the given server and directory.
    pub fn new(server_url: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            server_url: server_url.into(),
            key: DEFAULT_KEY.to_string(),
            dir: dir.into(),
            interval: DEFAULT_INTERVAL,
            insecure_skip_verify: false,
            document_suffix: DEFAULT_SUFFIX.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the file is missing or malformed, or
    /// if the interval cannot be parsed.
    pub fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Err(SyncError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parses the configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] on malformed TOML or a bad interval.
    pub fn from_toml_str(text: &str) -> SyncResult<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| SyncError::Config(format!("invalid config: {e}")))?;

        let mut config = Self::default();
        if let Some(server) = non_empty(file.server) {
            config.server_url = server;
        }
        if let Some(key) = non_empty(file.key) {
            config.key = key;
        }
        if let Some(dir) = file.dir.filter(|d| !d.as_os_str().is_empty()) {
            config.dir = dir;
        }
        if let Some(interval) = non_empty(file.interval) {
            config.interval = parse_interval(&interval)?;
        }
        config.insecure_skip_verify = file.insecure_skip_verify.unwrap_or(false);

        Ok(config)
    }

    /// Sets the shared secret.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the tracked document suffix.
    pub fn with_document_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.document_suffix = suffix.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL, default_notes_dir())
    }
}

/// On-disk shape of the client configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: Option<String>,
    key: Option<String>,
    dir: Option<PathBuf>,
    interval: Option<String>,
    #[serde(rename = "insecureSkipVerify")]
    insecure_skip_verify: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Default location of the client configuration: `~/.config/hsync.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("hsync.toml"))
}

/// Heynote's notes directory for the current platform, `.` if unknown.
pub fn default_notes_dir() -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(".");
    };

    if cfg!(target_os = "macos") {
        home.join("Library")
            .join("Application Support")
            .join("Heynote")
            .join("notes")
    } else if cfg!(target_os = "linux") {
        home.join(".config").join("Heynote").join("notes")
    } else {
        PathBuf::from(".")
    }
}

/// Parses an interval such as `"5s"`, `"1m30s"`, `"1.5h"` or `"250ms"`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. The result must be
/// positive.
///
/// # Errors
///
/// Returns [`SyncError::Config`] if the string is malformed or not positive.
pub fn parse_interval(text: &str) -> SyncResult<Duration> {
    let invalid = || SyncError::Config(format!("invalid interval: {text:?}"));

    let mut rest = text.trim();
    rest = rest.strip_prefix('+').unwrap_or(rest);
    if rest.starts_with('-') {
        return Err(SyncError::Config(format!("interval must be positive: {text:?}")));
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let nanos_per_unit: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(invalid()),
        };

        total_nanos = scaled(number, nanos_per_unit)
            .and_then(|nanos| total_nanos.checked_add(nanos))
            .ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).map_err(|_| invalid())?;
    let interval = Duration::new(secs, (total_nanos % 1_000_000_000) as u32);
    if interval.is_zero() {
        return Err(SyncError::Config(format!("interval must be positive: {text:?}")));
    }
    Ok(interval)
}

/// `number * unit`, where `number` is a decimal like `"1"`, `"1.5"` or `".5"`.
fn scaled(number: &str, unit: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit)?;

    let mut place = unit;
    for digit in fraction.chars() {
        place /= 10;
        nanos += u128::from(digit.to_digit(10)?) * place;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_go_style_intervals() {
        assert_eq!(parse_interval("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_interval("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval("2h45m").unwrap(), Duration::from_secs(9900));
        assert_eq!(parse_interval("+10s").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn reject_bad_intervals() {
        for bad in ["", "5", "s", "5x", "1m30", "-5s", "0s", "..s", "5 s"] {
            assert!(
                matches!(parse_interval(bad), Err(SyncError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn full_config_file() {
        let config = SyncConfig::from_toml_str(
            r#"
            server = "https://notes.example.com"
            key = "s3cret"
            dir = "/tmp/notes"
            interval = "1m"
            insecureSkipVerify = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server_url, "https://notes.example.com");
        assert_eq!(config.key, "s3cret");
        assert_eq!(config.dir, PathBuf::from("/tmp/notes"));
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = SyncConfig::from_toml_str("key = \"\"\n").unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.key, "default-secret");
        assert_eq!(config.dir, default_notes_dir());
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert!(!config.insecure_skip_verify);
        assert_eq!(config.document_suffix, ".txt");
    }

    #[test]
    fn malformed_config_rejected() {
        assert!(matches!(
            SyncConfig::from_toml_str("server = ["),
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            SyncConfig::from_toml_str("interval = \"soon\""),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hsync.toml");
        std::fs::write(&path, "server = \"http://10.0.0.2:8080\"\n").unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempdir().unwrap();
        let err = SyncConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn builder_overrides() {
        let config = SyncConfig::new("http://localhost:9000", "/notes")
            .with_key("k")
            .with_interval(Duration::from_millis(100))
            .with_document_suffix(".md")
            .with_timeout(Duration::from_secs(1))
            .with_insecure_skip_verify(true);

        assert_eq!(config.key, "k");
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.document_suffix, ".md");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(config.insecure_skip_verify);
    }
}
