//! CLI argument definitions for the Waypoint server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Waypoint - a conversational assistant that answers with places on a map.
#[derive(Parser, Debug)]
#[command(name = "waypoint", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > WAYPOINT_CONFIG env var > ~/.waypoint/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("WAYPOINT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Whether the config file was named by the user. A named file that
    /// fails to load is fatal; the default location may simply be absent.
    pub fn config_is_explicit(&self) -> bool {
        self.config.is_some() || std::env::var_os("WAYPOINT_CONFIG").is_some()
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > WAYPOINT_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("WAYPOINT_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the bind address.
    ///
    /// Priority: --host flag > WAYPOINT_HOST env var > config file value.
    pub fn resolve_host(&self, config_host: &str) -> String {
        if let Some(ref h) = self.host {
            return h.clone();
        }
        match std::env::var("WAYPOINT_HOST") {
            Ok(h) if !h.trim().is_empty() => h,
            _ => config_host.to_string(),
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".waypoint").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".waypoint").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let args = CliArgs::parse_from([
            "waypoint",
            "--config",
            "/etc/waypoint.toml",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "-l",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/waypoint.toml")));
        assert!(args.config_is_explicit());
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/waypoint.toml"));
        assert_eq!(args.resolve_port(5000), 8080);
        assert_eq!(args.resolve_host("127.0.0.1"), "0.0.0.0");
        assert_eq!(args.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let args = CliArgs::parse_from(["waypoint"]);
        assert_eq!(args.resolve_log_level("warn"), "warn");
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(CliArgs::try_parse_from(["waypoint", "--port", "99999"]).is_err());
    }
}
