//! Dummy-cam: a simulated camera sensor sub-device.
//!
//! This library models a Rockchip-style camera sensor that has no hardware
//! behind it: all format, frame-interval, and control metadata is read once
//! from a declarative property source at attach time and served read-only
//! forever after. It is useful for exercising camera pipelines without a
//! physical sensor.

pub mod config;
pub mod controls;
pub mod device;
pub mod registry;
pub mod traits;

pub use config::{DeviceConfig, Facing, JsonSource, PropertySource};
pub use controls::{Control, ControlId, ControlKind, ControlSet, ControlSink, NullControlSink};
pub use device::{DummyCamera, SENSOR_NAME};
pub use registry::SubdevRegistry;
pub use traits::{
    CameraModuleError, Field, Fraction, FrameFormat, FrameInterval, IoctlData, MbusCode,
    ModuleInfo, ModuleInfoRecord, PadDirection, Result, Subdevice, Which, GET_MODULE_INFO,
};
