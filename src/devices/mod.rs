//! Output device enumeration and name resolution
//!
//! Builds a name -> descriptor catalog from a single pass over the host's
//! output devices. The catalog itself is a pure value so resolution can be
//! tested without audio hardware; the live `cpal::Device` handles from the
//! same pass ride along in [`Enumeration`].

use std::collections::BTreeMap;

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Host;
use log::debug;

use crate::error::{ToneError, ToneResult};

/// One output-capable device as seen during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Position in the enumeration pass, valid for the process lifetime
    pub index: usize,
    /// Human-readable device name, unique key within one enumeration
    pub name: String,
    /// Largest output channel count across the device's supported configs
    pub max_output_channels: u16,
}

/// Name -> descriptor mapping built once at startup, read-only after
#[derive(Debug, Default)]
pub struct DeviceCatalog {
    devices: BTreeMap<String, DeviceDescriptor>,
}

impl DeviceCatalog {
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = DeviceDescriptor>,
    {
        let mut devices = BTreeMap::new();
        for descriptor in descriptors {
            // first entry wins, keys stay unique within the pass
            devices
                .entry(descriptor.name.clone())
                .or_insert(descriptor);
        }
        DeviceCatalog { devices }
    }

    /// Exact, case-sensitive lookup by device name
    pub fn resolve(&self, name: &str) -> ToneResult<&DeviceDescriptor> {
        self.devices
            .get(name)
            .ok_or_else(|| ToneError::DeviceNotFound(name.to_string()))
    }

    /// All descriptors in name order
    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Result of one enumeration pass: the catalog plus the live handles,
/// linked by `DeviceDescriptor::index`.
pub struct Enumeration {
    catalog: DeviceCatalog,
    handles: Vec<cpal::Device>,
}

impl Enumeration {
    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// Hand over the live handle for a descriptor produced by this
    /// enumeration. Consumes the pass; one device is opened per run.
    pub fn into_handle(self, descriptor: &DeviceDescriptor) -> Option<cpal::Device> {
        self.handles.into_iter().nth(descriptor.index)
    }
}

/// Query the host for its output devices, exactly once per process.
///
/// Devices whose name or supported configurations cannot be read are
/// skipped rather than failing the whole pass.
pub fn enumerate(host: &Host) -> ToneResult<Enumeration> {
    let devices = host
        .output_devices()
        .map_err(|e| ToneError::HostInit(e.to_string()))?;

    let mut descriptors = Vec::new();
    let mut handles = Vec::new();
    for device in devices {
        let name = match device.name() {
            Ok(name) => name,
            Err(e) => {
                debug!("Skipping device with unreadable name: {}", e);
                continue;
            }
        };
        let max_output_channels = match device.supported_output_configs() {
            Ok(configs) => configs.map(|c| c.channels()).max().unwrap_or(0),
            Err(e) => {
                debug!("Skipping {}: no readable output configs: {}", name, e);
                continue;
            }
        };
        if max_output_channels == 0 {
            debug!("Skipping {}: no output channels", name);
            continue;
        }
        descriptors.push(DeviceDescriptor {
            index: handles.len(),
            name,
            max_output_channels,
        });
        handles.push(device);
    }
    debug!("Enumerated {} output devices", handles.len());

    Ok(Enumeration {
        catalog: DeviceCatalog::from_descriptors(descriptors),
        handles,
    })
}
