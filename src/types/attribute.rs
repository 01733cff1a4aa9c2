//! Accessory attributes and the pending values requested for them.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// A lighting attribute exposed by an accessory.
///
/// The declaration order is the canonical reconciliation order: power first,
/// then magnitude, then color attributes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
pub enum Attribute {
    On,
    Brightness,
    Hue,
    Saturation,
    ColorTemperature,
}

impl Attribute {
    /// Canonical order in which a reconciliation pass visits attributes.
    pub const ORDER: [Attribute; 5] = [
        Attribute::On,
        Attribute::Brightness,
        Attribute::Hue,
        Attribute::Saturation,
        Attribute::ColorTemperature,
    ];
}

/// A single requested attribute change.
///
/// Numeric values are taken as-is from the caller and clamped to the
/// attribute's range when they are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeChange {
    On(bool),
    /// Percentage, 0-100.
    Brightness(i32),
    /// Degrees, 0-360.
    Hue(i32),
    /// Percentage, 0-100.
    Saturation(i32),
    /// Mireds.
    ColorTemperature(i32),
}

impl AttributeChange {
    pub fn attribute(&self) -> Attribute {
        match self {
            AttributeChange::On(_) => Attribute::On,
            AttributeChange::Brightness(_) => Attribute::Brightness,
            AttributeChange::Hue(_) => Attribute::Hue,
            AttributeChange::Saturation(_) => Attribute::Saturation,
            AttributeChange::ColorTemperature(_) => Attribute::ColorTemperature,
        }
    }
}

/// The set of desired values accumulated for one reconciliation pass.
///
/// Only the last requested value per attribute is kept.
///
/// # Examples
///
/// ```
/// use milight_accessory_rs::{Attribute, AttributeChange, DesiredState};
///
/// let mut desired = DesiredState::new();
/// desired.set(AttributeChange::Hue(200));
/// desired.set(AttributeChange::Brightness(40));
/// desired.set(AttributeChange::Brightness(45));
///
/// let changes: Vec<_> = desired.changes().collect();
/// assert_eq!(
///     changes,
///     vec![AttributeChange::Brightness(45), AttributeChange::Hue(200)]
/// );
/// assert!(desired.contains(Attribute::Hue));
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    pub on: Option<bool>,
    pub brightness: Option<i32>,
    pub hue: Option<i32>,
    pub saturation: Option<i32>,
    pub color_temperature: Option<i32>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, overwriting any earlier value for the same attribute.
    pub fn set(&mut self, change: AttributeChange) {
        match change {
            AttributeChange::On(v) => self.on = Some(v),
            AttributeChange::Brightness(v) => self.brightness = Some(v),
            AttributeChange::Hue(v) => self.hue = Some(v),
            AttributeChange::Saturation(v) => self.saturation = Some(v),
            AttributeChange::ColorTemperature(v) => self.color_temperature = Some(v),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<AttributeChange> {
        match attribute {
            Attribute::On => self.on.map(AttributeChange::On),
            Attribute::Brightness => self.brightness.map(AttributeChange::Brightness),
            Attribute::Hue => self.hue.map(AttributeChange::Hue),
            Attribute::Saturation => self.saturation.map(AttributeChange::Saturation),
            Attribute::ColorTemperature => {
                self.color_temperature.map(AttributeChange::ColorTemperature)
            }
        }
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_some()
    }

    pub fn is_empty(&self) -> bool {
        Attribute::ORDER.iter().all(|a| !self.contains(*a))
    }

    pub fn len(&self) -> usize {
        Attribute::ORDER.iter().filter(|a| self.contains(**a)).count()
    }

    /// Pending changes in canonical attribute order.
    pub fn changes(&self) -> impl Iterator<Item = AttributeChange> + '_ {
        Attribute::ORDER.iter().filter_map(|a| self.get(*a))
    }

    /// Move the accumulated values out, leaving this state empty.
    pub fn take(&mut self) -> DesiredState {
        std::mem::take(self)
    }
}
