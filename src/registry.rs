//! Sub-device registry: the attach/detach lifecycle boundary.
//!
//! A device is Registered exactly while it lives inside a registry; attach
//! failures publish nothing. This replaces the asynchronous sub-device
//! registration of the original platform with plain ownership.

use crate::config::PropertySource;
use crate::device::DummyCamera;
use crate::traits::{CameraModuleError, Result};
use log::info;

/// Registry of attached sub-devices, keyed by published name.
#[derive(Debug, Default)]
pub struct SubdevRegistry {
    devices: Vec<DummyCamera>,
}

impl SubdevRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Attach a device from a property source and publish it. Returns the
    /// published device name.
    ///
    /// On any attach failure the registry is left untouched.
    pub fn attach(&mut self, source: &dyn PropertySource, bus_name: &str) -> Result<String> {
        let device = DummyCamera::attach(source, bus_name)?;
        let name = device.name().to_owned();
        self.register(device)?;
        Ok(name)
    }

    /// Publish an already attached device.
    ///
    /// Names are the lookup key for [`SubdevRegistry::get`] and
    /// [`SubdevRegistry::detach`], so a name that is already registered is
    /// rejected; the rejected device is dropped by the caller.
    pub fn register(&mut self, device: DummyCamera) -> Result<()> {
        if self.get(device.name()).is_some() {
            return Err(CameraModuleError::AlreadyRegistered(
                device.name().to_owned(),
            ));
        }
        info!("registered {}", device.name());
        self.devices.push(device);
        Ok(())
    }

    /// Remove a device from the registry, returning it to the caller. The
    /// device and its controls are torn down together when the returned
    /// value is dropped.
    pub fn detach(&mut self, name: &str) -> Option<DummyCamera> {
        let position = self.devices.iter().position(|d| d.name() == name)?;
        info!("unregistered {name}");
        Some(self.devices.remove(position))
    }

    /// Look up a registered device by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DummyCamera> {
        self.devices.iter().find(|d| d.name() == name)
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over the registered devices.
    pub fn iter(&self) -> std::slice::Iter<'_, DummyCamera> {
        self.devices.iter()
    }
}
