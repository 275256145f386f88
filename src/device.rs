//! Output device discovery and selection.

use crate::error::{CueSonicError, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// Identifier of the pseudo-device that follows the system default output.
pub const DEFAULT_DEVICE_ID: &str = "default";

/// One selectable audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDevice {
    /// Stable identifier, suitable for storing in configuration.
    pub id: String,
    /// Human-readable name for display.
    pub name: String,
}

impl OutputDevice {
    fn default_device() -> Self {
        Self {
            id: DEFAULT_DEVICE_ID.to_string(),
            name: "System default".to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_DEVICE_ID
    }
}

/// Result of reconciling a configured output id against what is plugged in.
#[derive(Debug, Clone)]
pub struct DeviceSelection {
    /// Everything currently selectable, default pseudo-device first.
    pub devices: Vec<OutputDevice>,
    /// The device the configured id resolved to.
    pub resolved: OutputDevice,
    /// Whether the configured id no longer exists and the default was used.
    pub fell_back: bool,
}

/// Lists the outputs currently available. The default pseudo-device is
/// always present and always first; hosts that fail to enumerate still
/// yield it.
pub fn enumerate_output_devices() -> Vec<OutputDevice> {
    let mut devices = vec![OutputDevice::default_device()];
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(outputs) => {
            for device in outputs {
                match device.name() {
                    Ok(name) => devices.push(OutputDevice {
                        id: name.clone(),
                        name,
                    }),
                    Err(e) => log::warn!("Skipping an output device with an unreadable name: {e}"),
                }
            }
        }
        Err(e) => log::warn!("Failed to enumerate output devices: {e}"),
    }
    devices
}

/// Re-checks the device list and resolves `configured_id` against it,
/// falling back to the default output when the id has disappeared.
pub fn consolidate_output_devices(configured_id: &str) -> DeviceSelection {
    let devices = enumerate_output_devices();
    let (resolved, fell_back) = resolve_selection(&devices, configured_id);
    if fell_back {
        log::warn!(
            "Configured output {:?} is no longer present, using the system default",
            configured_id
        );
    }
    DeviceSelection {
        devices,
        resolved,
        fell_back,
    }
}

fn resolve_selection(devices: &[OutputDevice], configured_id: &str) -> (OutputDevice, bool) {
    match devices.iter().find(|device| device.id == configured_id) {
        Some(device) => (device.clone(), false),
        // The pseudo-device is always listed, so a miss means a real
        // device went away.
        None => (OutputDevice::default_device(), true),
    }
}

/// Opens the cpal device behind a resolved id.
pub(crate) fn open_output_device(id: &str) -> Result<cpal::Device> {
    let host = cpal::default_host();
    if id == DEFAULT_DEVICE_ID {
        return host.default_output_device().ok_or_else(|| {
            CueSonicError::Device("No default output device is available".to_string())
        });
    }
    let mut outputs = host
        .output_devices()
        .map_err(|e| CueSonicError::Device(e.to_string()))?;
    outputs
        .find(|device| device.name().map(|name| name == id).unwrap_or(false))
        .ok_or_else(|| CueSonicError::Device(format!("Output device {:?} was not found", id)))
}
