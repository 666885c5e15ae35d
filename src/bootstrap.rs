//! Startup checks
//!
//! hidraw nodes, `hcitool` and the pairing utility all need root, so the
//! process refuses to start without it. The Bluetooth radio is unblocked on
//! a best-effort basis.

use crate::game::config::BootstrapSettings;
use log::{info, warn};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("You need to run Oust as root so it has Bluetooth access")]
    NotRoot,

    #[error("Could not determine the effective user: {0}")]
    UnknownUser(#[from] std::io::Error),

    #[error("Radio unblock failed: {0}")]
    RadioUnblock(String),
}

/// Effective uid of this process
#[cfg(unix)]
fn effective_uid() -> Result<u32, BootstrapError> {
    use std::os::unix::fs::MetadataExt;
    // procfs hands /proc/self to the process's effective user
    Ok(std::fs::metadata("/proc/self")?.uid())
}

#[cfg(not(unix))]
fn effective_uid() -> Result<u32, BootstrapError> {
    Err(BootstrapError::NotRoot)
}

/// Fail unless running as root (skipped when the config says so)
pub fn ensure_privileged(settings: &BootstrapSettings) -> Result<(), BootstrapError> {
    if !settings.require_root {
        warn!("Root check disabled; device access may fail");
        return Ok(());
    }

    match effective_uid()? {
        0 => Ok(()),
        _ => Err(BootstrapError::NotRoot),
    }
}

/// Run the rfkill command; failures are reported, never fatal to the caller
pub fn unblock_radio(settings: &BootstrapSettings) -> Result<(), BootstrapError> {
    if !settings.unblock_radio {
        return Ok(());
    }

    let output = Command::new(&settings.rfkill_command)
        .args(&settings.rfkill_args)
        .output()
        .map_err(|e| BootstrapError::RadioUnblock(format!("{}: {}", settings.rfkill_command, e)))?;

    if !output.status.success() {
        return Err(BootstrapError::RadioUnblock(format!(
            "{} exited with {}",
            settings.rfkill_command, output.status
        )));
    }

    info!("✓ Bluetooth radio unblocked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_check_can_be_disabled() {
        let settings = BootstrapSettings {
            require_root: false,
            ..BootstrapSettings::default()
        };
        assert!(ensure_privileged(&settings).is_ok());
    }

    #[test]
    fn test_unblock_disabled_is_noop() {
        let settings = BootstrapSettings {
            unblock_radio: false,
            rfkill_command: "/nonexistent/rfkill".to_string(),
            ..BootstrapSettings::default()
        };
        assert!(unblock_radio(&settings).is_ok());
    }

    #[test]
    fn test_unblock_missing_command_fails() {
        let settings = BootstrapSettings {
            rfkill_command: "/nonexistent/rfkill".to_string(),
            ..BootstrapSettings::default()
        };
        assert!(matches!(unblock_radio(&settings), Err(BootstrapError::RadioUnblock(_))));
    }
}
