//! Linux hidraw device driver
//!
//! A scanner thread walks `/sys/class/hidraw` looking for PS Move
//! controllers. Each controller found gets its own reader thread that keeps
//! the latest decoded input report; the game thread only ever reads that
//! snapshot, so polling never blocks on the device.
//!
//! Bluetooth controllers are identified by their address (`HID_UNIQ`), which
//! is also what `hcitool dc` expects. USB controllers usually report no
//! address and are identified by their hidraw node instead.

use super::{DeviceDriver, DriverError};
use crate::controller::constants::*;
use crate::controller::report::{build_led_report, parse_input_report};
use crate::controller::{ControllerId, ControllerReading, DeviceEvent, Feedback, Transport};
use crate::game::config::DeviceSettings;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Identity of a hidraw node, parsed from its sysfs uevent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidDeviceInfo {
    pub bus: u32,
    pub vendor: u32,
    pub product: u32,
    /// Bluetooth address, when the device reports one
    pub uniq: Option<String>,
}

impl HidDeviceInfo {
    // TODO: the CECH-ZCM2 (product 0x0C5E) uses a different input report
    // layout and needs its own parser before it can be listed here.
    pub fn is_psmove(&self) -> bool {
        self.vendor == SONY_VENDOR_ID && self.product == PSMOVE_ZCM1_PRODUCT_ID
    }

    pub fn transport(&self) -> Option<Transport> {
        match self.bus {
            BUS_USB => Some(Transport::Wired),
            BUS_BLUETOOTH => Some(Transport::Wireless),
            _ => None,
        }
    }
}

/// Parse the `HID_ID` and `HID_UNIQ` lines of a hidraw parent's uevent
pub fn parse_uevent(content: &str) -> Option<HidDeviceInfo> {
    let mut ids = None;
    let mut uniq = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("HID_ID=") {
            // bus:vendor:product, all hex
            let mut parts = value.trim().split(':').map(|p| u32::from_str_radix(p, 16));
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(bus)), Some(Ok(vendor)), Some(Ok(product))) => {
                    ids = Some((bus, vendor, product));
                }
                _ => return None,
            }
        } else if let Some(value) = line.strip_prefix("HID_UNIQ=") {
            let value = value.trim();
            if !value.is_empty() {
                uniq = Some(value.to_lowercase());
            }
        }
    }

    ids.map(|(bus, vendor, product)| HidDeviceInfo { bus, vendor, product, uniq })
}

/// An open controller
struct DeviceHandle {
    /// hidraw node name, e.g. `hidraw3`
    node: String,
    transport: Transport,
    file: Arc<File>,
    latest: Arc<Mutex<Option<ControllerReading>>>,
    last_sent: Option<(Feedback, Instant)>,
}

type DeviceMap = Arc<Mutex<HashMap<ControllerId, DeviceHandle>>>;

/// Driver for PS Move controllers exposed through hidraw
pub struct HidrawDriver {
    settings: DeviceSettings,
    running: Arc<AtomicBool>,
    event_receiver: Receiver<DeviceEvent>,
    devices: DeviceMap,
}

impl HidrawDriver {
    /// Start scanning for controllers
    pub fn start(settings: DeviceSettings) -> Result<Self, DriverError> {
        let (event_sender, event_receiver) = unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let devices: DeviceMap = Arc::new(Mutex::new(HashMap::new()));

        {
            let running = Arc::clone(&running);
            let devices = Arc::clone(&devices);
            let interval = Duration::from_millis(settings.scan_interval_ms);

            thread::Builder::new()
                .name("hidraw-scanner".to_string())
                .spawn(move || {
                    info!("Scanner thread started");

                    while running.load(Ordering::SeqCst) {
                        let sysfs = Path::new(HIDRAW_SYSFS_DIR);
                        if let Err(e) = scan(sysfs, &devices, &event_sender, &running) {
                            warn!("Scan error: {}", e);
                        }
                        thread::sleep(interval);
                    }

                    info!("Scanner thread exited");
                })?;
        }

        info!("✓ hidraw driver started, scanning for controllers...");

        Ok(Self {
            settings,
            running,
            event_receiver,
            devices,
        })
    }

    fn devices(&self) -> Result<MutexGuard<'_, HashMap<ControllerId, DeviceHandle>>, DriverError> {
        self.devices.lock().map_err(|_| DriverError::LockPoisoned)
    }
}

/// One pass over the hidraw nodes, opening any new PS Move
fn scan(
    sysfs: &Path,
    devices: &DeviceMap,
    sender: &Sender<DeviceEvent>,
    running: &Arc<AtomicBool>,
) -> Result<(), DriverError> {
    for entry in fs::read_dir(sysfs)? {
        let entry = entry?;
        let node = entry.file_name().to_string_lossy().into_owned();

        {
            let devices = devices.lock().map_err(|_| DriverError::LockPoisoned)?;
            if devices.values().any(|d| d.node == node) {
                continue;
            }
        }

        let uevent = match fs::read_to_string(entry.path().join("device").join("uevent")) {
            Ok(content) => content,
            Err(e) => {
                trace!("Skipping {}: {}", node, e);
                continue;
            }
        };

        let Some(info) = parse_uevent(&uevent) else {
            continue;
        };
        if !info.is_psmove() {
            continue;
        }
        let Some(transport) = info.transport() else {
            continue;
        };

        let id = match &info.uniq {
            Some(address) => ControllerId::new(address.clone()),
            None => ControllerId::new(format!("usb-{}", node)),
        };

        let path = Path::new(HIDRAW_DEV_DIR).join(&node);
        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => Arc::new(file),
            Err(e) => {
                warn!("Found controller {} but could not open {}: {}", id, path.display(), e);
                continue;
            }
        };

        info!("✓ Found controller {} on {} ({:?})", id, node, transport);

        let latest = Arc::new(Mutex::new(None));
        devices.lock().map_err(|_| DriverError::LockPoisoned)?.insert(
            id.clone(),
            DeviceHandle {
                node: node.clone(),
                transport,
                file: Arc::clone(&file),
                latest: Arc::clone(&latest),
                last_sent: None,
            },
        );

        if let Err(e) = spawn_reader(
            id.clone(),
            node,
            file,
            latest,
            Arc::clone(devices),
            sender.clone(),
            Arc::clone(running),
        ) {
            if let Ok(mut devices) = devices.lock() {
                devices.remove(&id);
            }
            return Err(e);
        }

        let _ = sender.send(DeviceEvent::Connected { id, transport });
    }

    Ok(())
}

/// Keep the latest input report of one controller until it goes away
fn spawn_reader(
    id: ControllerId,
    node: String,
    file: Arc<File>,
    latest: Arc<Mutex<Option<ControllerReading>>>,
    devices: DeviceMap,
    sender: Sender<DeviceEvent>,
    running: Arc<AtomicBool>,
) -> Result<(), DriverError> {
    thread::Builder::new()
        .name(format!("reader-{}", node))
        .spawn(move || {
            debug!("Reader for {} started", id);
            let mut buf = [0u8; REPORT_SIZE];

            while running.load(Ordering::SeqCst) {
                match (&*file).read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Some(reading) = parse_input_report(&buf[..n]) {
                            if let Ok(mut slot) = latest.lock() {
                                *slot = Some(reading);
                            }
                        }
                    }
                    Err(e) => {
                        debug!("Read from {} failed: {}", node, e);
                        break;
                    }
                }
            }

            // The same id may already belong to a newer node
            let removed = match devices.lock() {
                Ok(mut devices) => {
                    let current = devices.get(&id).map_or(false, |h| h.node == node);
                    current && devices.remove(&id).is_some()
                }
                Err(_) => false,
            };

            if removed && running.load(Ordering::SeqCst) {
                info!("Controller {} went away", id);
                let _ = sender.send(DeviceEvent::Disconnected { id: id.clone() });
            }

            debug!("Reader for {} exited", id);
        })?;

    Ok(())
}

impl DeviceDriver for HidrawDriver {
    fn poll_events(&self) -> Vec<DeviceEvent> {
        self.event_receiver.try_iter().collect()
    }

    fn read(&self, id: &ControllerId) -> Result<ControllerReading, DriverError> {
        let devices = self.devices()?;
        let handle = devices
            .get(id)
            .ok_or_else(|| DriverError::UnknownDevice(id.clone()))?;

        let latest = *handle.latest.lock().map_err(|_| DriverError::LockPoisoned)?;
        latest.ok_or_else(|| DriverError::NoData(id.clone()))
    }

    fn write(&self, id: &ControllerId, feedback: Feedback) -> Result<(), DriverError> {
        let keepalive = Duration::from_millis(self.settings.led_keepalive_ms);
        let mut devices = self.devices()?;
        let handle = devices
            .get_mut(id)
            .ok_or_else(|| DriverError::UnknownDevice(id.clone()))?;

        // The LED stays lit for a few seconds per report; only resend
        // unchanged feedback often enough to keep it on
        if let Some((sent, at)) = handle.last_sent {
            if sent == feedback && at.elapsed() < keepalive {
                return Ok(());
            }
        }

        let report = build_led_report(feedback);
        (&*handle.file).write_all(&report)?;
        trace!("Wrote {:02x?} to {}", &report[..7], id);

        handle.last_sent = Some((feedback, Instant::now()));
        Ok(())
    }

    fn disconnect_device(&self, id: &ControllerId) -> Result<(), DriverError> {
        let transport = {
            let devices = self.devices()?;
            devices
                .get(id)
                .map(|handle| handle.transport)
                .ok_or_else(|| DriverError::UnknownDevice(id.clone()))?
        };

        if transport == Transport::Wired {
            debug!("{} is on USB, nothing to disconnect", id);
            return Ok(());
        }

        info!("Disconnecting {}", id);
        let output = Command::new(&self.settings.disconnect_command)
            .args(&self.settings.disconnect_args)
            .arg(id.as_str())
            .output()
            .map_err(|e| {
                DriverError::Command(format!("{}: {}", self.settings.disconnect_command, e))
            })?;

        if !output.status.success() {
            return Err(DriverError::Command(format!(
                "{} exited with {}: {}",
                self.settings.disconnect_command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

impl Drop for HidrawDriver {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Shutting down hidraw driver...");
            // Reader threads exit on their next report; closing our handles
            // here releases the devices once they do
            if let Ok(mut devices) = self.devices.lock() {
                devices.clear();
            }
            info!("✓ hidraw driver shutdown complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUETOOTH_UEVENT: &str = "\
DRIVER=sony
HID_ID=0005:0000054C:000003D5
HID_NAME=Motion Controller
HID_PHYS=00:1a:7d:da:71:13
HID_UNIQ=00:06:F7:C9:A1:FB
MODALIAS=hid:b0005g0000v0000054Cp000003D5
";

    const USB_UEVENT: &str = "\
DRIVER=sony
HID_ID=0003:0000054C:000003D5
HID_NAME=Sony Computer Entertainment Motion Controller
HID_PHYS=usb-0000:00:14.0-2/input0
HID_UNIQ=
";

    #[test]
    fn test_parse_bluetooth_uevent() {
        let info = parse_uevent(BLUETOOTH_UEVENT).unwrap();
        assert!(info.is_psmove());
        assert_eq!(info.transport(), Some(Transport::Wireless));
        assert_eq!(info.uniq.as_deref(), Some("00:06:f7:c9:a1:fb"));
    }

    #[test]
    fn test_parse_usb_uevent() {
        let info = parse_uevent(USB_UEVENT).unwrap();
        assert!(info.is_psmove());
        assert_eq!(info.transport(), Some(Transport::Wired));
        assert_eq!(info.uniq, None);
    }

    #[test]
    fn test_parse_foreign_or_broken_uevent() {
        let keyboard = parse_uevent("HID_ID=0003:0000046D:0000C31C\n").unwrap();
        assert!(!keyboard.is_psmove());

        assert!(parse_uevent("HID_ID=garbage\n").is_none());
        assert!(parse_uevent("DRIVER=sony\n").is_none());
    }

    #[test]
    fn test_scan_missing_sysfs_dir() {
        let devices: DeviceMap = Arc::new(Mutex::new(HashMap::new()));
        let (sender, _receiver) = unbounded();
        let running = Arc::new(AtomicBool::new(true));

        let result = scan(Path::new("/nonexistent/hidraw"), &devices, &sender, &running);
        assert!(matches!(result, Err(DriverError::Io(_))));
    }
}
