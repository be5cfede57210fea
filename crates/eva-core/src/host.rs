//! Environment facts reported at session start.

use std::env::consts::{ARCH, OS};
use std::fs;

/// Accessors for the host's device, OS and application metadata.
pub trait HostInfo: Send + Sync {
    /// Device make and model (e.g. "Quest 3").
    fn device_model(&self) -> String;
    /// Operating system name and version.
    fn os_version(&self) -> String;
    /// The host application's build version.
    fn app_version(&self) -> String;
}

const DMI_PRODUCT_NAME: &str = "/sys/devices/virtual/dmi/id/product_name";
const KERNEL_RELEASE: &str = "/proc/sys/kernel/osrelease";

/// Reads device and OS facts from the running system.
///
/// The application version cannot be discovered and is supplied by the host.
#[derive(Debug, Clone)]
pub struct SystemHost {
    app_version: String,
}

impl SystemHost {
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            app_version: app_version.into(),
        }
    }
}

impl HostInfo for SystemHost {
    fn device_model(&self) -> String {
        read_trimmed(DMI_PRODUCT_NAME).unwrap_or_else(|| ARCH.to_string())
    }

    fn os_version(&self) -> String {
        match read_trimmed(KERNEL_RELEASE) {
            Some(release) => format!("{OS} {release}"),
            None => OS.to_string(),
        }
    }

    fn app_version(&self) -> String {
        self.app_version.clone()
    }
}

fn read_trimmed(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(err) => {
            tracing::trace!(path, error = %err, "host fact unavailable");
            None
        }
    }
}
