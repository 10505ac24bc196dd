//! Device configuration loading from a declarative property source.
//!
//! The simulated sensor has no hardware to probe; everything it reports is
//! read once at attach time from a string-keyed property source standing in
//! for the device-tree node of the original platform. Property keys keep
//! their device-tree names.

use crate::traits::{CameraModuleError, Fraction, MbusCode, Result};
use log::{error, info};

/// Camera module index property.
pub const KEY_MODULE_INDEX: &str = "rockchip,camera-module-index";
/// Camera module facing property (`"front"` or `"back"`).
pub const KEY_MODULE_FACING: &str = "rockchip,camera-module-facing";
/// Camera module name property.
pub const KEY_MODULE_NAME: &str = "rockchip,camera-module-name";
/// Lens name property.
pub const KEY_LENS_NAME: &str = "rockchip,camera-module-lens-name";
/// Frame width in pixels.
pub const KEY_WIDTH: &str = "dummy_cam,width_px";
/// Frame height in pixels.
pub const KEY_HEIGHT: &str = "dummy_cam,height_px";
/// Media-bus pixel format code.
pub const KEY_PIXEL_FORMAT: &str = "dummy_cam,pixel_format";
/// Maximum frame rate numerator.
pub const KEY_FPS_NUMERATOR: &str = "dummy_cam,max_fps_numerator";
/// Maximum frame rate denominator.
pub const KEY_FPS_DENOMINATOR: &str = "dummy_cam,max_fps_denominator";
/// Horizontal blanking in pixels.
pub const KEY_H_BLANK: &str = "dummy_cam,h_blank_px";
/// Vertical blanking in lines.
pub const KEY_V_BLANK: &str = "dummy_cam,v_blank_lines";
/// Link frequency in Hz.
pub const KEY_LINK_FREQ: &str = "dummy_cam,link_freq_hz";
/// Pixel rate in Hz.
pub const KEY_PIXEL_RATE: &str = "dummy_cam,pixel_rate_hz";

/// String-keyed property lookup, the stand-in for `of_property_read_*`.
///
/// A lookup returns `None` both for an absent key and for a value of the
/// wrong type; the loader treats either as a missing property.
pub trait PropertySource {
    /// Read an unsigned integer property.
    fn prop_u32(&self, key: &str) -> Option<u32>;

    /// Read a signed integer property.
    fn prop_i32(&self, key: &str) -> Option<i32>;

    /// Read a string property.
    fn prop_str(&self, key: &str) -> Option<&str>;
}

/// Property source backed by a JSON object.
#[derive(Debug, Clone)]
pub struct JsonSource {
    root: serde_json::Value,
}

impl JsonSource {
    /// Wrap an already parsed JSON value.
    #[must_use]
    pub const fn new(root: serde_json::Value) -> Self {
        Self { root }
    }

    /// Parse a JSON document into a property source.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }
}

impl PropertySource for JsonSource {
    fn prop_u32(&self, key: &str) -> Option<u32> {
        self.root
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    fn prop_i32(&self, key: &str) -> Option<i32> {
        self.root
            .get(key)
            .and_then(serde_json::Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }

    fn prop_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Which way the camera module faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front-facing module.
    Front,
    /// Back-facing module.
    Back,
}

impl Facing {
    /// Parse the facing property. Only `"back"` selects [`Facing::Back`];
    /// any other value is treated as front-facing.
    #[must_use]
    pub fn from_property(value: &str) -> Self {
        if value == "back" {
            Self::Back
        } else {
            Self::Front
        }
    }

    /// Single-character tag used in the published device name.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Front => 'f',
            Self::Back => 'b',
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Static sensor configuration, populated once at attach and immutable
/// thereafter. There is exactly one supported image shape and frame rate
/// per instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Module index used in the published device name.
    pub module_index: u32,
    /// Which way the module faces.
    pub facing: Facing,
    /// Camera module name, reported through the vendor request.
    pub module_name: String,
    /// Lens name, reported through the vendor request.
    pub lens_name: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Media-bus pixel format code.
    pub pixel_format: MbusCode,
    /// Maximum frame rate.
    pub max_fps: Fraction,
    /// Horizontal blanking in pixels.
    pub h_blank: i32,
    /// Vertical blanking in lines.
    pub v_blank: i32,
    /// Link frequency in Hz.
    pub link_freq: i32,
    /// Pixel rate in Hz.
    pub pixel_rate: i32,
}

impl DeviceConfig {
    /// Read the full configuration from a property source.
    ///
    /// Every key is read independently and all missing keys are collected,
    /// so a single failure reports the complete list instead of the first
    /// absent property. Presence is the only validation performed here; a
    /// zero width or denominator is accepted.
    pub fn read(source: &dyn PropertySource) -> Result<Self> {
        let mut missing = Vec::new();

        let module_index = read_u32(source, KEY_MODULE_INDEX, &mut missing);
        let facing = read_str(source, KEY_MODULE_FACING, &mut missing);
        let module_name = read_str(source, KEY_MODULE_NAME, &mut missing);
        let lens_name = read_str(source, KEY_LENS_NAME, &mut missing);
        let width = read_u32(source, KEY_WIDTH, &mut missing);
        let height = read_u32(source, KEY_HEIGHT, &mut missing);
        let pixel_format = read_u32(source, KEY_PIXEL_FORMAT, &mut missing);
        let fps_numerator = read_u32(source, KEY_FPS_NUMERATOR, &mut missing);
        let fps_denominator = read_u32(source, KEY_FPS_DENOMINATOR, &mut missing);
        let h_blank = read_i32(source, KEY_H_BLANK, &mut missing);
        let v_blank = read_i32(source, KEY_V_BLANK, &mut missing);
        let link_freq = read_i32(source, KEY_LINK_FREQ, &mut missing);
        let pixel_rate = read_i32(source, KEY_PIXEL_RATE, &mut missing);

        if !missing.is_empty() {
            error!("could not get module information, missing: {missing:?}");
            return Err(CameraModuleError::ConfigurationIncomplete(missing));
        }

        Ok(Self {
            module_index: module_index.unwrap_or_default(),
            facing: Facing::from_property(&facing.unwrap_or_default()),
            module_name: module_name.unwrap_or_default(),
            lens_name: lens_name.unwrap_or_default(),
            width: width.unwrap_or_default(),
            height: height.unwrap_or_default(),
            pixel_format: MbusCode(pixel_format.unwrap_or_default()),
            max_fps: Fraction::new(
                fps_numerator.unwrap_or_default(),
                fps_denominator.unwrap_or_default(),
            ),
            h_blank: h_blank.unwrap_or_default(),
            v_blank: v_blank.unwrap_or_default(),
            link_freq: link_freq.unwrap_or_default(),
            pixel_rate: pixel_rate.unwrap_or_default(),
        })
    }
}

fn read_u32(source: &dyn PropertySource, key: &str, missing: &mut Vec<String>) -> Option<u32> {
    let value = source.prop_u32(key);
    match value {
        Some(v) => info!("{key}: {v}"),
        None => missing.push(key.to_owned()),
    }
    value
}

fn read_i32(source: &dyn PropertySource, key: &str, missing: &mut Vec<String>) -> Option<i32> {
    let value = source.prop_i32(key);
    match value {
        Some(v) => info!("{key}: {v}"),
        None => missing.push(key.to_owned()),
    }
    value
}

fn read_str(source: &dyn PropertySource, key: &str, missing: &mut Vec<String>) -> Option<String> {
    let value = source.prop_str(key);
    match value {
        Some(v) => info!("{key}: {v}"),
        None => missing.push(key.to_owned()),
    }
    value.map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_properties() -> serde_json::Value {
        json!({
            KEY_MODULE_INDEX: 1,
            KEY_MODULE_FACING: "back",
            KEY_MODULE_NAME: "M1",
            KEY_LENS_NAME: "L1",
            KEY_WIDTH: 1920,
            KEY_HEIGHT: 1080,
            KEY_PIXEL_FORMAT: 0x2001,
            KEY_FPS_NUMERATOR: 30,
            KEY_FPS_DENOMINATOR: 1,
            KEY_H_BLANK: 100,
            KEY_V_BLANK: 50,
            KEY_LINK_FREQ: 297_000_000,
            KEY_PIXEL_RATE: 74_250_000,
        })
    }

    #[test]
    fn test_read_full_configuration() {
        let source = JsonSource::new(full_properties());
        let config = DeviceConfig::read(&source).expect("read should succeed");

        assert_eq!(config.module_index, 1);
        assert_eq!(config.facing, Facing::Back);
        assert_eq!(config.module_name, "M1");
        assert_eq!(config.lens_name, "L1");
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert_eq!(config.pixel_format, MbusCode(0x2001));
        assert_eq!(config.max_fps, Fraction::new(30, 1));
        assert_eq!(config.h_blank, 100);
        assert_eq!(config.v_blank, 50);
        assert_eq!(config.link_freq, 297_000_000);
        assert_eq!(config.pixel_rate, 74_250_000);
    }

    #[test]
    fn test_missing_key_fails() {
        let mut properties = full_properties();
        properties
            .as_object_mut()
            .expect("object")
            .remove(KEY_WIDTH);
        let source = JsonSource::new(properties);

        let err = DeviceConfig::read(&source).expect_err("read should fail");
        match err {
            CameraModuleError::ConfigurationIncomplete(missing) => {
                assert_eq!(missing, vec![KEY_WIDTH.to_owned()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_keys_accumulated() {
        let mut properties = full_properties();
        let object = properties.as_object_mut().expect("object");
        object.remove(KEY_WIDTH);
        object.remove(KEY_LENS_NAME);
        object.remove(KEY_PIXEL_RATE);
        let source = JsonSource::new(properties);

        let err = DeviceConfig::read(&source).expect_err("read should fail");
        match err {
            CameraModuleError::ConfigurationIncomplete(missing) => {
                assert_eq!(missing.len(), 3);
                assert!(missing.contains(&KEY_WIDTH.to_owned()));
                assert!(missing.contains(&KEY_LENS_NAME.to_owned()));
                assert!(missing.contains(&KEY_PIXEL_RATE.to_owned()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_counts_as_missing() {
        let mut properties = full_properties();
        properties
            .as_object_mut()
            .expect("object")
            .insert(KEY_WIDTH.to_owned(), json!("1920"));
        let source = JsonSource::new(properties);

        let err = DeviceConfig::read(&source).expect_err("read should fail");
        match err {
            CameraModuleError::ConfigurationIncomplete(missing) => {
                assert_eq!(missing, vec![KEY_WIDTH.to_owned()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!(Facing::from_property("back"), Facing::Back);
        assert_eq!(Facing::from_property("front"), Facing::Front);
        // Anything that is not "back" faces front.
        assert_eq!(Facing::from_property("sideways"), Facing::Front);
        assert_eq!(Facing::Back.tag(), 'b');
        assert_eq!(Facing::Front.tag(), 'f');
    }

    #[test]
    fn test_zero_values_accepted() {
        let mut properties = full_properties();
        let object = properties.as_object_mut().expect("object");
        object.insert(KEY_WIDTH.to_owned(), json!(0));
        object.insert(KEY_FPS_DENOMINATOR.to_owned(), json!(0));
        let source = JsonSource::new(properties);

        let config = DeviceConfig::read(&source).expect("presence is the only validation");
        assert_eq!(config.width, 0);
        assert_eq!(config.max_fps.denominator, 0);
    }
}
