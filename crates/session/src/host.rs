//! Capabilities the host operating system exposes to the client

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait HostShell: Send + Sync {
    /// Platform name in the node's vocabulary: "win32", "darwin", "linux", ...
    async fn platform(&self) -> SessionResult<String>;

    /// Default directory downloads are written to, as the host spells it
    async fn download_dir(&self) -> SessionResult<String>;
}

/// Answers from the machine the client runs on
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeShell;

pub fn platform_name(os: &str) -> &str {
    match os {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    }
}

#[async_trait]
impl HostShell for NativeShell {
    async fn platform(&self) -> SessionResult<String> {
        Ok(platform_name(std::env::consts::OS).to_string())
    }

    async fn download_dir(&self) -> SessionResult<String> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| SessionError::Validation("No home directory found".to_string()))?;
        let dir = PathBuf::from(home).join("Downloads");
        Ok(dir.to_string_lossy().into_owned())
    }
}
