//! The simulated camera sensor sub-device.

use crate::config::{DeviceConfig, PropertySource};
use crate::controls::{ControlSet, ControlSink, NullControlSink};
use crate::traits::{
    CameraModuleError, Fraction, FrameFormat, FrameInterval, IoctlData, MbusCode, ModuleInfo,
    PadDirection, Result, Subdevice, Which, GET_MODULE_INFO,
};
use log::info;

/// Sensor name reported through the vendor module-info request and embedded
/// in the published device name.
pub const SENSOR_NAME: &str = "dummy_cam";

/// A simulated camera sensor answering every query from configuration
/// frozen at attach time.
///
/// The device exposes a single source pad and exactly one format and frame
/// rate. Nothing is mutable after attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyCamera {
    config: DeviceConfig,
    controls: ControlSet,
    name: String,
    pad: PadDirection,
}

impl DummyCamera {
    /// Attach a device instance: load the configuration, build and set up
    /// the controls, and derive the published name.
    ///
    /// Any failure aborts the attach and releases everything built so far;
    /// no partially initialized device is ever returned.
    pub fn attach(source: &dyn PropertySource, bus_name: &str) -> Result<Self> {
        Self::attach_with_sink(source, bus_name, &mut NullControlSink)
    }

    /// Attach with a caller-supplied hardware-facing control sink.
    pub fn attach_with_sink(
        source: &dyn PropertySource,
        bus_name: &str,
        sink: &mut dyn ControlSink,
    ) -> Result<Self> {
        info!(
            "{SENSOR_NAME} sensor simulator v{}",
            env!("CARGO_PKG_VERSION")
        );

        let config = DeviceConfig::read(source)?;
        let controls = ControlSet::new(&config);
        controls.setup(sink)?;

        let name = format!(
            "m{:02}_{}_{SENSOR_NAME} {bus_name}",
            config.module_index,
            config.facing.tag(),
        );
        info!("attached as {name}");

        Ok(Self {
            config,
            controls,
            name,
            pad: PadDirection::Source,
        })
    }

    /// Published device name, `m<index>_<f|b>_dummy_cam <bus-device-name>`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frozen device configuration.
    #[must_use]
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The published control set.
    #[must_use]
    pub const fn controls(&self) -> &ControlSet {
        &self.controls
    }

    /// Direction of the single media pad (always a source).
    #[must_use]
    pub const fn pad(&self) -> PadDirection {
        self.pad
    }

    /// Identity strings for the vendor module-info request.
    #[must_use]
    pub fn module_info(&self) -> ModuleInfo {
        ModuleInfo {
            sensor: SENSOR_NAME.to_owned(),
            module: self.config.module_name.clone(),
            lens: self.config.lens_name.clone(),
        }
    }

    fn active_format(&self) -> FrameFormat {
        FrameFormat {
            width: self.config.width,
            height: self.config.height,
            code: self.config.pixel_format,
            field: crate::traits::Field::None,
        }
    }
}

impl Subdevice for DummyCamera {
    fn enum_mbus_code(&self, index: usize) -> Result<MbusCode> {
        if index != 0 {
            return Err(CameraModuleError::UnsupportedOperation(format!(
                "media-bus code index {index}"
            )));
        }
        Ok(self.config.pixel_format)
    }

    fn enum_frame_interval(&self, index: usize, code: MbusCode) -> Result<FrameInterval> {
        // One mode only.
        if index != 0 {
            return Err(CameraModuleError::UnsupportedOperation(format!(
                "frame interval index {index}"
            )));
        }
        if code != self.config.pixel_format {
            return Err(CameraModuleError::UnsupportedOperation(format!(
                "frame interval for code {code}"
            )));
        }
        Ok(FrameInterval {
            width: self.config.width,
            height: self.config.height,
            interval: self.config.max_fps,
        })
    }

    fn get_fmt(&self, which: Which, fmt: &mut FrameFormat) -> Result<()> {
        // Try-mode negotiation is unimplemented; succeed without touching
        // the caller's format.
        if which == Which::Try {
            return Ok(());
        }
        *fmt = self.active_format();
        Ok(())
    }

    fn set_fmt(&self, _which: Which, fmt: &mut FrameFormat) -> Result<()> {
        // Read-only device: echo the active format back to the caller.
        *fmt = self.active_format();
        Ok(())
    }

    fn s_stream(&self, _enable: bool) -> Result<()> {
        Ok(())
    }

    fn frame_interval(&self) -> Result<Fraction> {
        Ok(self.config.max_fps)
    }

    fn ioctl(&self, cmd: u32) -> Result<IoctlData> {
        match cmd {
            GET_MODULE_INFO => Ok(IoctlData::ModuleInfo(self.module_info())),
            other => Err(CameraModuleError::UnsupportedOperation(format!(
                "ioctl {other:#010x}"
            ))),
        }
    }
}
