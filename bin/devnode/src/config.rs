use crate::constants::{DEFAULT_CHUNK_BYTES, DEFAULT_HOST, DEFAULT_RPC_PORT, DEFAULT_WALLET_PORT};
use clap::{Arg, Command};
use std::str::FromStr;

/// Development node configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host for both listeners
    pub host: String,
    /// JSON-RPC port
    pub rpc_port: u16,
    /// Wallet service port
    pub wallet_port: u16,
    /// Download progress per session poll
    pub chunk_bytes: u64,
}

fn invalid(what: &str, value: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("Invalid {}: {}", what, value),
    )
}

/// Priority: command-line argument > environment variable > default
fn setting<T: FromStr>(
    matches: &clap::ArgMatches,
    arg: &str,
    env: &str,
    default: &str,
) -> Result<T, std::io::Error> {
    let from_env = std::env::var(env).ok();
    let raw = matches
        .get_one::<String>(arg)
        .map(|s| s.as_str())
        .or(from_env.as_deref())
        .unwrap_or(default);
    raw.parse().map_err(|_| invalid(arg, raw))
}

impl ServerConfig {
    pub fn load() -> Result<Self, std::io::Error> {
        let matches = Command::new("devnode")
            .about("In-memory SeaWolf node and wallet for development")
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Bind host (default: 127.0.0.1, or DEVNODE_HOST env var)"),
            )
            .arg(
                Arg::new("rpc-port")
                    .long("rpc-port")
                    .value_name("PORT")
                    .help("JSON-RPC port (default: 8081, or DEVNODE_RPC_PORT env var)"),
            )
            .arg(
                Arg::new("wallet-port")
                    .long("wallet-port")
                    .value_name("PORT")
                    .help("Wallet port (default: 8080, or DEVNODE_WALLET_PORT env var)"),
            )
            .arg(
                Arg::new("chunk-bytes")
                    .long("chunk-bytes")
                    .value_name("BYTES")
                    .help("Download progress per session poll (or DEVNODE_CHUNK_BYTES env var)"),
            )
            .get_matches();

        let config = ServerConfig {
            host: setting(&matches, "host", "DEVNODE_HOST", DEFAULT_HOST)?,
            rpc_port: setting(&matches, "rpc-port", "DEVNODE_RPC_PORT", DEFAULT_RPC_PORT)?,
            wallet_port: setting(
                &matches,
                "wallet-port",
                "DEVNODE_WALLET_PORT",
                DEFAULT_WALLET_PORT,
            )?,
            chunk_bytes: setting(
                &matches,
                "chunk-bytes",
                "DEVNODE_CHUNK_BYTES",
                DEFAULT_CHUNK_BYTES,
            )?,
        };
        if config.chunk_bytes == 0 {
            return Err(invalid("chunk-bytes", "0"));
        }
        Ok(config)
    }

    pub fn rpc_address(&self) -> String {
        format!("{}:{}", self.host, self.rpc_port)
    }

    pub fn wallet_address(&self) -> String {
        format!("{}:{}", self.host, self.wallet_port)
    }
}
