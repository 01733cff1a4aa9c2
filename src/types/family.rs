//! Bulb families and their capabilities.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::Attribute;

/// Capability class of a MiLight bulb.
///
/// The family decides which attributes an accessory exposes, whether
/// brightness and color temperature are set absolutely or by relative steps,
/// and how many zones a bridge can address.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use milight_accessory_rs::BulbFamily;
///
/// let family = BulbFamily::from_str("fullColor").unwrap();
/// assert_eq!(family, BulbFamily::FullColor);
/// assert_eq!(family.max_zones(), 4);
/// assert!(family.has_absolute_brightness());
/// assert!(BulbFamily::from_str("rgbww").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BulbFamily {
    #[default]
    #[serde(rename = "rgbw", alias = "RGBW")]
    #[strum(serialize = "rgbw")]
    RGBW,
    #[serde(rename = "rgb", alias = "RGB")]
    #[strum(serialize = "rgb")]
    RGB,
    #[serde(rename = "white", alias = "White")]
    #[strum(serialize = "white")]
    White,
    #[serde(rename = "fullColor", alias = "fullcolor", alias = "FullColor")]
    #[strum(serialize = "fullColor")]
    FullColor,
    #[serde(rename = "fullColor8Zone", alias = "fullcolor8zone", alias = "FullColor8Zone")]
    #[strum(serialize = "fullColor8Zone")]
    FullColor8Zone,
    #[serde(rename = "bridge", alias = "Bridge")]
    #[strum(serialize = "bridge")]
    Bridge,
}

impl BulbFamily {
    /// Brightness values at or below this enter night mode.
    pub const NIGHT_MODE_THRESHOLD: u8 = 5;

    /// Highest zone number a bridge can address for this family.
    pub fn max_zones(&self) -> u8 {
        match self {
            BulbFamily::RGB | BulbFamily::Bridge => 1,
            BulbFamily::FullColor8Zone => 8,
            BulbFamily::RGBW | BulbFamily::White | BulbFamily::FullColor => 4,
        }
    }

    /// Whether the bridge accepts an absolute brightness value.
    pub fn has_absolute_brightness(&self) -> bool {
        !matches!(self, BulbFamily::RGB | BulbFamily::White)
    }

    /// Whether the family accepts an absolute saturation value.
    pub fn has_absolute_saturation(&self) -> bool {
        self.is_full_color()
    }

    /// Whether low brightness values map to night mode.
    pub fn has_night_mode(&self) -> bool {
        !matches!(self, BulbFamily::RGB)
    }

    /// Whether the bulbs can show colors (hue is a real color, not a proxy).
    pub fn has_color(&self) -> bool {
        !matches!(self, BulbFamily::White)
    }

    /// Whether the bulbs switch between a color mode and a white mode.
    pub fn has_white_mode(&self) -> bool {
        matches!(
            self,
            BulbFamily::RGBW | BulbFamily::Bridge | BulbFamily::FullColor | BulbFamily::FullColor8Zone
        )
    }

    pub fn is_full_color(&self) -> bool {
        matches!(self, BulbFamily::FullColor | BulbFamily::FullColor8Zone)
    }

    /// Attributes an accessory of this family exposes.
    pub fn attributes(&self) -> &'static [Attribute] {
        match self {
            BulbFamily::RGB => &[Attribute::On, Attribute::Brightness, Attribute::Hue],
            BulbFamily::White => &[
                Attribute::On,
                Attribute::Brightness,
                Attribute::Hue,
                Attribute::ColorTemperature,
            ],
            BulbFamily::RGBW | BulbFamily::Bridge => &[
                Attribute::On,
                Attribute::Brightness,
                Attribute::Hue,
                Attribute::Saturation,
            ],
            BulbFamily::FullColor | BulbFamily::FullColor8Zone => &Attribute::ORDER,
        }
    }

    pub fn exposes(&self, attribute: Attribute) -> bool {
        self.attributes().contains(&attribute)
    }
}
