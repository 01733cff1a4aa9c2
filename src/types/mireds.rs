//! Color temperature range in mireds.

use serde::{Deserialize, Serialize};

/// Device-specific bounds for the color temperature attribute, in mireds.
///
/// Higher mireds are warmer light. The default covers the range most
/// home-automation controllers offer (140-500 mireds, ~7100K-2000K).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiredRange {
    pub min: u16,
    pub max: u16,
}

impl Default for MiredRange {
    fn default() -> Self {
        MiredRange {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl MiredRange {
    pub const DEFAULT_MIN: u16 = 140;
    pub const DEFAULT_MAX: u16 = 500;

    /// Number of relative steps that span the full range on step-only bulbs.
    pub const STEPS: u16 = 10;

    /// Returns None unless `min < max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::MiredRange;
    ///
    /// assert!(MiredRange::create(153, 370).is_some());
    /// assert!(MiredRange::create(370, 370).is_none());
    /// ```
    pub fn create(min: u16, max: u16) -> Option<Self> {
        (min < max).then_some(MiredRange { min, max })
    }

    /// Whether `min < max`. Ranges built with [`create`](MiredRange::create)
    /// always are; deserialized or hand-built ones may not be.
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Clamp into the range. An invalid range never panics; the result is then
    /// at least `min`.
    pub fn clamp(&self, mireds: i32) -> u16 {
        mireds.min(i32::from(self.max)).max(i32::from(self.min)) as u16
    }

    pub fn span(&self) -> u16 {
        self.max.saturating_sub(self.min)
    }

    /// Map a mired value linearly onto the 0-100 white temperature scale,
    /// 0 being the warmest end of the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::MiredRange;
    ///
    /// let range = MiredRange::create(100, 300).unwrap();
    /// assert_eq!(range.to_white_temperature(300), 0);
    /// assert_eq!(range.to_white_temperature(200), 50);
    /// assert_eq!(range.to_white_temperature(100), 100);
    /// ```
    pub fn to_white_temperature(&self, mireds: u16) -> u8 {
        if !self.is_valid() {
            return 0;
        }
        let mireds = mireds.clamp(self.min, self.max);
        let scaled = f64::from(self.max - mireds) * 100.0 / f64::from(self.span());
        scaled.round() as u8
    }

    /// Mireds covered by one relative cooler/warmer step.
    pub fn step_size(&self) -> f64 {
        f64::from(self.span()) / f64::from(Self::STEPS)
    }
}
