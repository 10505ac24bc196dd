//! Read-only control registry derived from the device configuration.
//!
//! Each attach builds one [`ControlSet`] whose values mirror the configured
//! timing parameters. Blanking and pixel rate are degenerate ranges whose
//! default equals the upper bound; the link frequency is a one-item integer
//! menu because the consuming framework distinguishes menus from ranges.
//! The menu items are owned by the set, so independent device instances
//! never share mutable state.

use crate::config::DeviceConfig;
use crate::traits::{CameraModuleError, Result};
use log::debug;

/// Identifier of a published control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    /// Horizontal blanking in pixels.
    HBlank,
    /// Vertical blanking in lines.
    VBlank,
    /// Link frequency menu.
    LinkFreq,
    /// Pixel rate in Hz.
    PixelRate,
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HBlank => write!(f, "HBLANK"),
            Self::VBlank => write!(f, "VBLANK"),
            Self::LinkFreq => write!(f, "LINK_FREQ"),
            Self::PixelRate => write!(f, "PIXEL_RATE"),
        }
    }
}

/// Shape of a control's value space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// Closed integer range `[min, max]` with a step and default.
    Range {
        /// Lower bound, always 0 here.
        min: i64,
        /// Upper bound, always equal to the default here.
        max: i64,
        /// Step between valid values.
        step: u32,
        /// Default value, applied at setup.
        default: i64,
        /// Current value.
        value: i64,
    },
    /// Enumerated integer menu; this device only ever has one item.
    IntMenu {
        /// Menu items, owned by the control.
        items: [i64; 1],
        /// Index of the selected item.
        index: u32,
    },
}

/// A single read-only control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Which control this is.
    pub id: ControlId,
    /// Value space and current value.
    pub kind: ControlKind,
}

impl Control {
    /// Degenerate range control `[0, value]` with step 1 and default
    /// `value`.
    #[must_use]
    pub const fn range(id: ControlId, value: i64) -> Self {
        Self {
            id,
            kind: ControlKind::Range {
                min: 0,
                max: value,
                step: 1,
                default: value,
                value,
            },
        }
    }

    /// One-item integer menu control selecting its only item.
    #[must_use]
    pub const fn int_menu(id: ControlId, items: [i64; 1]) -> Self {
        Self {
            id,
            kind: ControlKind::IntMenu { items, index: 0 },
        }
    }

    /// Current value of the control.
    #[must_use]
    pub fn value(&self) -> i64 {
        match &self.kind {
            ControlKind::Range { value, .. } => *value,
            ControlKind::IntMenu { items, index } => items
                .get(*index as usize)
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Default value of the control, applied once at setup.
    #[must_use]
    pub fn default_value(&self) -> i64 {
        match &self.kind {
            ControlKind::Range { default, .. } => *default,
            ControlKind::IntMenu { items, .. } => items.first().copied().unwrap_or_default(),
        }
    }
}

/// Hardware-facing state that receives control defaults at setup.
///
/// The simulated sensor has no hardware, so the stock implementation is
/// [`NullControlSink`]; tests substitute failing sinks to exercise the
/// initialization error path.
pub trait ControlSink {
    /// Apply one control value. An `Err` aborts the whole setup.
    fn apply(&mut self, id: ControlId, value: i64) -> std::result::Result<(), String>;
}

/// Control sink that accepts every value.
#[derive(Debug, Default)]
pub struct NullControlSink;

impl ControlSink for NullControlSink {
    fn apply(&mut self, _id: ControlId, _value: i64) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// The full set of controls for one device instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSet {
    controls: Vec<Control>,
}

impl ControlSet {
    /// Build the control set from a frozen configuration.
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        let controls = vec![
            Control::range(ControlId::HBlank, i64::from(config.h_blank)),
            Control::range(ControlId::VBlank, i64::from(config.v_blank)),
            Control::int_menu(ControlId::LinkFreq, [i64::from(config.link_freq)]),
            Control::range(ControlId::PixelRate, i64::from(config.pixel_rate)),
        ];
        Self { controls }
    }

    /// Apply every control's default to the hardware-facing state, exactly
    /// once. The first sink failure fails the whole setup; the caller drops
    /// the set, so no partially initialized controls are ever exposed.
    pub fn setup(&self, sink: &mut dyn ControlSink) -> Result<()> {
        for control in &self.controls {
            let value = control.default_value();
            sink.apply(control.id, value)
                .map_err(CameraModuleError::ControlInitFailure)?;
            debug!("applied default {}={value}", control.id);
        }
        Ok(())
    }

    /// Look up a control by identifier.
    #[must_use]
    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    /// Number of published controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the set is empty (it never is after construction).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Iterate over the controls in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Control> {
        self.controls.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Facing;
    use crate::traits::{Fraction, MbusCode};

    fn sample_config() -> DeviceConfig {
        DeviceConfig {
            module_index: 1,
            facing: Facing::Back,
            module_name: "M1".to_owned(),
            lens_name: "L1".to_owned(),
            width: 1920,
            height: 1080,
            pixel_format: MbusCode(0x2001),
            max_fps: Fraction::new(30, 1),
            h_blank: 100,
            v_blank: 50,
            link_freq: 297_000_000,
            pixel_rate: 74_250_000,
        }
    }

    #[test]
    fn test_range_controls_invariant() {
        let set = ControlSet::new(&sample_config());

        for control in set.iter() {
            if let ControlKind::Range {
                min,
                max,
                step,
                default,
                value,
            } = &control.kind
            {
                assert_eq!(*min, 0, "{} lower bound", control.id);
                assert_eq!(*step, 1, "{} step", control.id);
                assert_eq!(max, default, "{} default != upper bound", control.id);
                assert_eq!(value, default, "{} value != default", control.id);
            }
        }
    }

    #[test]
    fn test_control_values_match_configuration() {
        let config = sample_config();
        let set = ControlSet::new(&config);

        assert_eq!(set.len(), 4);
        let hblank = set.get(ControlId::HBlank).expect("HBLANK registered");
        assert_eq!(hblank.value(), 100);
        let vblank = set.get(ControlId::VBlank).expect("VBLANK registered");
        assert_eq!(vblank.value(), 50);
        let pixel_rate = set.get(ControlId::PixelRate).expect("PIXEL_RATE registered");
        assert_eq!(pixel_rate.value(), 74_250_000);
    }

    #[test]
    fn test_link_freq_is_single_item_menu() {
        let set = ControlSet::new(&sample_config());
        let link_freq = set.get(ControlId::LinkFreq).expect("LINK_FREQ registered");

        match &link_freq.kind {
            ControlKind::IntMenu { items, index } => {
                assert_eq!(items, &[297_000_000]);
                assert_eq!(*index, 0);
            }
            other => panic!("LINK_FREQ must be a menu, got {other:?}"),
        }
        assert_eq!(link_freq.value(), 297_000_000);
    }

    /// Sink that records applied values and fails after a set number of
    /// applications.
    struct CountingSink {
        applied: Vec<(ControlId, i64)>,
        fail_after: Option<usize>,
    }

    impl ControlSink for CountingSink {
        fn apply(&mut self, id: ControlId, value: i64) -> std::result::Result<(), String> {
            if self.fail_after == Some(self.applied.len()) {
                return Err(format!("no room for {id}"));
            }
            self.applied.push((id, value));
            Ok(())
        }
    }

    #[test]
    fn test_setup_applies_every_default_once() {
        let set = ControlSet::new(&sample_config());
        let mut sink = CountingSink {
            applied: Vec::new(),
            fail_after: None,
        };

        set.setup(&mut sink).expect("setup should succeed");

        assert_eq!(sink.applied.len(), 4);
        assert_eq!(
            sink.applied,
            vec![
                (ControlId::HBlank, 100),
                (ControlId::VBlank, 50),
                (ControlId::LinkFreq, 297_000_000),
                (ControlId::PixelRate, 74_250_000),
            ]
        );
    }

    #[test]
    fn test_setup_failure_propagates() {
        let set = ControlSet::new(&sample_config());
        let mut sink = CountingSink {
            applied: Vec::new(),
            fail_after: Some(2),
        };

        let err = set.setup(&mut sink).expect_err("setup should fail");
        match err {
            CameraModuleError::ControlInitFailure(msg) => {
                assert!(msg.contains("LINK_FREQ"), "unexpected message: {msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Nothing after the failing control was applied.
        assert_eq!(sink.applied.len(), 2);
    }
}
