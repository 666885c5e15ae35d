//! Automatic Bluetooth pairing
//!
//! Whenever a controller is plugged in over USB, the external pairing
//! utility is run so the controller can later connect wirelessly.
//! Runs happen on a dedicated worker thread with its own tokio runtime; the
//! game loop only queues requests and never waits for the utility.

use crate::controller::ControllerId;
use crate::game::config::PairingSettings;
use crossbeam_channel::{unbounded, Sender};
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Runtime;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Pairing utility not found: {0}")]
    NotFound(String),

    #[error("Failed to run pairing utility: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pairing utility timed out after {0:?}")]
    Timeout(Duration),

    #[error("Pairing utility did not report success ({0})")]
    NotPaired(String),

    #[error("Pairing worker has stopped")]
    WorkerStopped,
}

/// Whether the utility's output contains the success marker (case-insensitive)
pub fn pairing_succeeded(stdout: &str, stderr: &str, marker: &str) -> bool {
    let marker = marker.to_lowercase();
    stdout.to_lowercase().contains(&marker) || stderr.to_lowercase().contains(&marker)
}

/// Run the pairing utility once and wait for it, up to the configured timeout
pub async fn run_pairing(settings: &PairingSettings) -> Result<(), PairingError> {
    info!("Running pairing utility: {} {}", settings.command, settings.args.join(" "));

    let mut command = Command::new(&settings.command);
    command.args(&settings.args).kill_on_drop(true);

    let output = match tokio::time::timeout(settings.timeout(), command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
            return Err(PairingError::NotFound(settings.command.clone()));
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(PairingError::Timeout(settings.timeout())),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        info!("  {}", line);
    }

    // The utility's exit status isn't reliable; only its output is
    if pairing_succeeded(&stdout, &stderr, &settings.success_marker) {
        Ok(())
    } else {
        Err(PairingError::NotPaired(output.status.to_string()))
    }
}

/// Background thread that runs the pairing utility on request
pub struct PairingWorker {
    sender: Sender<ControllerId>,
    /// Runs queued so far
    requested: AtomicUsize,
}

impl PairingWorker {
    /// Start the worker thread
    pub fn spawn(settings: PairingSettings) -> Result<Self, PairingError> {
        let (sender, receiver) = unbounded::<ControllerId>();

        thread::Builder::new()
            .name("pairing".to_string())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        warn!("Pairing disabled, failed to create tokio runtime: {}", e);
                        return;
                    }
                };

                info!("Pairing worker started");

                // Ends once the worker handle is dropped
                while let Ok(id) = receiver.recv() {
                    info!("{} connected over USB, attempting to pair...", id);
                    match rt.block_on(run_pairing(&settings)) {
                        Ok(()) => info!(
                            "✓ Pairing succeeded! Unplug USB and press PS to connect"
                        ),
                        Err(e) => warn!("Pairing {} failed: {}", id, e),
                    }
                }

                debug!("Pairing worker exited");
            })?;

        Ok(Self {
            sender,
            requested: AtomicUsize::new(0),
        })
    }

    /// Queue a pairing run for a newly plugged-in controller
    pub fn request(&self, id: ControllerId) -> Result<(), PairingError> {
        self.sender.send(id).map_err(|_| PairingError::WorkerStopped)?;
        self.requested.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Number of pairing runs queued since the worker started
    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }
}
