//! Core types and the sub-device capability trait.

/// Media-bus pixel format code (e.g. `0x2001` for Y8_1X8).
///
/// The code is treated as an opaque tag: the simulated sensor publishes
/// whatever code its configuration declares and never interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MbusCode(pub u32);

impl std::fmt::Display for MbusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// A frame rate expressed as a rational number of frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    /// Numerator (frames).
    pub numerator: u32,
    /// Denominator (seconds).
    pub denominator: u32,
}

impl Fraction {
    /// Create a new fraction.
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Field order of the produced frames. The simulated sensor is progressive
/// only, so the single variant is `None` (no interlacing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    /// Progressive scan, no interlacing.
    #[default]
    None,
}

/// Frame format as negotiated on a pad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFormat {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Media-bus format code.
    pub code: MbusCode,
    /// Field order.
    pub field: Field,
}

/// Selects whether a format query targets the speculative (try) or the
/// active device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    /// Speculative negotiation query; must never touch device state.
    Try,
    /// Query against the active configuration.
    Active,
}

/// One entry of a frame-interval enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Maximum frame rate at this size.
    pub interval: Fraction,
}

/// Direction of a media pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDirection {
    /// The pad produces data (sensor output).
    Source,
    /// The pad consumes data.
    Sink,
}

/// Identity strings reported through the vendor module-info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Sensor name (fixed per driver).
    pub sensor: String,
    /// Camera module name from the configuration.
    pub module: String,
    /// Lens name from the configuration.
    pub lens: String,
}

/// Byte length of each name field in [`ModuleInfoRecord`].
pub const INFO_FIELD_LEN: usize = 32;

/// Total byte length of a serialized [`ModuleInfoRecord`].
pub const MODULE_INFO_RECORD_LEN: usize = INFO_FIELD_LEN * 3;

/// Fixed-size wire form of [`ModuleInfo`], used by the 32-bit compatibility
/// marshalling path. Each field is NUL-padded and truncated to leave a
/// terminating NUL, matching `strlcpy` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfoRecord {
    /// Sensor name bytes.
    pub sensor: [u8; INFO_FIELD_LEN],
    /// Module name bytes.
    pub module: [u8; INFO_FIELD_LEN],
    /// Lens name bytes.
    pub lens: [u8; INFO_FIELD_LEN],
}

impl ModuleInfoRecord {
    /// Serialize the record into its flat byte representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; MODULE_INFO_RECORD_LEN] {
        let mut out = [0u8; MODULE_INFO_RECORD_LEN];
        for (dst, src) in out.iter_mut().zip(
            self.sensor
                .iter()
                .chain(self.module.iter())
                .chain(self.lens.iter()),
        ) {
            *dst = *src;
        }
        out
    }
}

impl From<&ModuleInfo> for ModuleInfoRecord {
    fn from(info: &ModuleInfo) -> Self {
        Self {
            sensor: pack_name(&info.sensor),
            module: pack_name(&info.module),
            lens: pack_name(&info.lens),
        }
    }
}

/// Copy a name into a fixed NUL-padded field, truncating to keep a
/// terminating NUL.
fn pack_name(name: &str) -> [u8; INFO_FIELD_LEN] {
    let mut field = [0u8; INFO_FIELD_LEN];
    for (dst, src) in field
        .iter_mut()
        .zip(name.bytes().take(INFO_FIELD_LEN - 1))
    {
        *dst = src;
    }
    field
}

const IOC_READ: u32 = 2;
const VIDIOC_PRIVATE_BASE: u8 = 192;

#[allow(clippy::cast_possible_truncation)]
const fn ior(ty: u8, nr: u8, size: usize) -> u32 {
    (IOC_READ << 30) | ((size as u32) << 16) | ((ty as u32) << 8) | nr as u32
}

/// Vendor request code returning the module identity record.
pub const GET_MODULE_INFO: u32 = ior(b'V', VIDIOC_PRIVATE_BASE, MODULE_INFO_RECORD_LEN);

/// Payload returned by a successful vendor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoctlData {
    /// Identity record for [`GET_MODULE_INFO`].
    ModuleInfo(ModuleInfo),
}

/// Error type for sub-device operations.
#[derive(Debug)]
pub enum CameraModuleError {
    /// One or more required configuration properties were missing.
    ConfigurationIncomplete(Vec<String>),
    /// Applying control defaults to the hardware-facing state failed.
    ControlInitFailure(String),
    /// Unknown request code or out-of-range enumeration index.
    UnsupportedOperation(String),
    /// The caller-supplied payload buffer cannot hold the marshalled record.
    PayloadTooSmall(usize),
    /// A device with the same published name is already registered.
    AlreadyRegistered(String),
}

impl std::fmt::Display for CameraModuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigurationIncomplete(keys) => {
                write!(f, "incomplete configuration, missing: {}", keys.join(", "))
            }
            Self::ControlInitFailure(msg) => write!(f, "control setup failed: {msg}"),
            Self::UnsupportedOperation(what) => write!(f, "unsupported operation: {what}"),
            Self::PayloadTooSmall(needed) => {
                write!(f, "payload buffer too small, need {needed} bytes")
            }
            Self::AlreadyRegistered(name) => {
                write!(f, "sub-device {name} is already registered")
            }
        }
    }
}

impl std::error::Error for CameraModuleError {}

/// Result type for sub-device operations.
pub type Result<T> = std::result::Result<T, CameraModuleError>;

/// Capability table of a camera sensor sub-device.
///
/// Every operation is a pure read of configuration frozen at attach time;
/// implementations hold no mutable state and may be called in any order.
pub trait Subdevice {
    /// Enumerate supported media-bus codes. The simulated sensor supports
    /// exactly one, at index 0.
    fn enum_mbus_code(&self, index: usize) -> Result<MbusCode>;

    /// Enumerate supported frame intervals for a given media-bus code.
    fn enum_frame_interval(&self, index: usize, code: MbusCode) -> Result<FrameInterval>;

    /// Read the pad format into `fmt`.
    ///
    /// A [`Which::Try`] query succeeds without touching `fmt`: try-mode
    /// negotiation is unimplemented and must not mutate anything.
    fn get_fmt(&self, which: Which, fmt: &mut FrameFormat) -> Result<()>;

    /// Set the pad format. The device is read-only, so the active format is
    /// echoed back into `fmt` and nothing changes.
    fn set_fmt(&self, which: Which, fmt: &mut FrameFormat) -> Result<()>;

    /// Start or stop streaming. There is no data path, so this always
    /// succeeds without side effects.
    fn s_stream(&self, enable: bool) -> Result<()>;

    /// Get the current frame interval (the configured maximum frame rate).
    fn frame_interval(&self) -> Result<Fraction>;

    /// Dispatch a vendor request. Only [`GET_MODULE_INFO`] is supported.
    fn ioctl(&self, cmd: u32) -> Result<IoctlData>;

    /// 32-bit compatibility shim for [`Subdevice::ioctl`]: marshals the
    /// reply through an owned temporary record into the caller's flat
    /// buffer. Returns the number of bytes written.
    fn compat_ioctl(&self, cmd: u32, out: &mut [u8]) -> Result<usize> {
        match self.ioctl(cmd)? {
            IoctlData::ModuleInfo(info) => {
                let record = ModuleInfoRecord::from(&info);
                let bytes = record.to_bytes();
                let dst = out
                    .get_mut(..bytes.len())
                    .ok_or(CameraModuleError::PayloadTooSmall(bytes.len()))?;
                dst.copy_from_slice(&bytes);
                Ok(bytes.len())
            }
        }
    }
}
