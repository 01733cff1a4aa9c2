//! Bridge commands and the per-family factories that build them.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::errors::Error;
use crate::types::{BulbFamily, Zone};

type Result<T> = std::result::Result<T, Error>;

/// A discrete operation understood by a MiLight bridge.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    On,
    Off,
    NightMode,
    Brightness,
    BrightUp,
    BrightDown,
    MaxBright,
    Hue,
    Saturation,
    WhiteMode,
    WhiteTemperature,
    Cooler,
    Warmer,
}

impl Operation {
    /// Operations the reconciliation rules may issue for a family.
    pub fn required_for(family: BulbFamily) -> &'static [Operation] {
        use Operation::*;
        match family {
            BulbFamily::RGBW | BulbFamily::Bridge => {
                &[On, Off, NightMode, Brightness, Hue, WhiteMode]
            }
            BulbFamily::RGB => &[On, Off, BrightUp, BrightDown, Hue],
            BulbFamily::White => &[
                On, Off, NightMode, BrightUp, BrightDown, MaxBright, Cooler, Warmer,
            ],
            BulbFamily::FullColor | BulbFamily::FullColor8Zone => &[
                On,
                Off,
                NightMode,
                Brightness,
                Hue,
                Saturation,
                WhiteTemperature,
            ],
        }
    }
}

/// An opaque command addressed to one zone of a bridge.
///
/// The engine only decides which operations to send and in which order;
/// encoding them onto the wire belongs to the transport behind the
/// [`BridgeCommandSink`](crate::BridgeCommandSink).
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCommand {
    pub family: BulbFamily,
    pub zone: Zone,
    pub operation: Operation,
    pub value: Option<u8>,
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.family, self.zone, self.operation)?;
        if let Some(value) = self.value {
            write!(f, "({value})")?;
        }
        Ok(())
    }
}

/// Builds bridge commands for one bulb family.
///
/// Only `family`, `supports` and `hsv_to_device_color` must be provided; the
/// typed constructors delegate to [`CommandFactory::build`].
pub trait CommandFactory: Send + Sync {
    fn family(&self) -> BulbFamily;

    fn supports(&self, operation: Operation) -> bool;

    /// Map a hue/saturation/value triple onto the bridge's color wheel byte.
    fn hsv_to_device_color(&self, hue: u16, saturation: u8, value: u8) -> u8;

    fn build(&self, operation: Operation, zone: Zone, value: Option<u8>) -> BridgeCommand {
        BridgeCommand {
            family: self.family(),
            zone,
            operation,
            value,
        }
    }

    fn on(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::On, zone, None)
    }

    fn off(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::Off, zone, None)
    }

    fn night_mode(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::NightMode, zone, None)
    }

    fn brightness(&self, zone: Zone, percent: u8) -> BridgeCommand {
        self.build(Operation::Brightness, zone, Some(percent))
    }

    fn bright_up(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::BrightUp, zone, None)
    }

    fn bright_down(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::BrightDown, zone, None)
    }

    fn max_bright(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::MaxBright, zone, None)
    }

    fn hue(&self, zone: Zone, device_color: u8) -> BridgeCommand {
        self.build(Operation::Hue, zone, Some(device_color))
    }

    fn saturation(&self, zone: Zone, percent: u8) -> BridgeCommand {
        self.build(Operation::Saturation, zone, Some(percent))
    }

    fn white_mode(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::WhiteMode, zone, None)
    }

    fn white_temperature(&self, zone: Zone, temperature: u8) -> BridgeCommand {
        self.build(Operation::WhiteTemperature, zone, Some(temperature))
    }

    fn cooler(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::Cooler, zone, None)
    }

    fn warmer(&self, zone: Zone) -> BridgeCommand {
        self.build(Operation::Warmer, zone, None)
    }
}

/// Check at setup time that `factory` can drive `family` bulbs.
pub fn validate_factory(factory: &dyn CommandFactory, family: BulbFamily) -> Result<()> {
    if factory.family() != family {
        return Err(Error::FamilyMismatch {
            expected: family,
            actual: factory.family(),
        });
    }
    match Operation::required_for(family)
        .iter()
        .find(|op| !factory.supports(**op))
    {
        Some(operation) => Err(Error::MissingOperation {
            family,
            operation: *operation,
        }),
        None => Ok(()),
    }
}

/// Command factory for the stock MiLight / LimitlessLED command sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilightCommands {
    family: BulbFamily,
}

impl MilightCommands {
    /// Color wheel offset of the legacy (v3-v5) bridges.
    const LEGACY_HUE_OFFSET: i32 = 176;
    /// Color wheel offset of the v6 full color bulbs.
    const FULL_COLOR_HUE_OFFSET: i32 = 26;

    pub fn new(family: BulbFamily) -> Self {
        MilightCommands { family }
    }
}

impl CommandFactory for MilightCommands {
    fn family(&self) -> BulbFamily {
        self.family
    }

    fn supports(&self, operation: Operation) -> bool {
        // Full color bulbs also understand the plain white mode switch.
        Operation::required_for(self.family).contains(&operation)
            || (self.family.is_full_color() && operation == Operation::WhiteMode)
    }

    /// Only the hue component selects a color; saturation and value are
    /// accepted for signature compatibility and ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::{BulbFamily, CommandFactory, MilightCommands};
    ///
    /// let rgbw = MilightCommands::new(BulbFamily::RGBW);
    /// assert_eq!(rgbw.hsv_to_device_color(0, 0, 0), 176);
    ///
    /// let full = MilightCommands::new(BulbFamily::FullColor);
    /// assert_eq!(full.hsv_to_device_color(0, 0, 0), 26);
    /// ```
    fn hsv_to_device_color(&self, hue: u16, _saturation: u8, _value: u8) -> u8 {
        let offset = if self.family.is_full_color() {
            Self::FULL_COLOR_HUE_OFFSET
        } else {
            Self::LEGACY_HUE_OFFSET
        };
        let wheel = (f64::from(hue % 360) / 360.0 * 255.0).floor() as i32;
        (256 + offset - wheel).rem_euclid(256) as u8
    }
}
