//! Bridge zone numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An addressable group of bulbs on a bridge, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(u8);

impl Zone {
    /// Returns None for zone 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::Zone;
    ///
    /// assert!(Zone::new(0).is_none());
    /// assert_eq!(Zone::new(3).unwrap().number(), 3);
    /// ```
    pub fn new(number: u8) -> Option<Self> {
        (number > 0).then_some(Zone(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {}", self.0)
    }
}
