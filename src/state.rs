//! Cached last-known state of one accessory.

use serde::{Deserialize, Serialize};

use crate::types::MiredRange;

/// What the engine believes the bulb is currently showing.
///
/// The bulb remembers a separate brightness for color mode and white mode;
/// [`brightness`](AccessoryState::brightness) always reads the one that
/// belongs to the current mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryState {
    pub(crate) on: bool,
    pub(crate) hue: u16,
    pub(crate) saturation: u8,
    pub(crate) color_temperature: u16,
    pub(crate) color_mode: bool,
    color_brightness: u8,
    white_brightness: u8,
    // Dimming level the bulb keeps while switched off by brightness 0.
    resume_brightness: Option<u8>,
}

impl AccessoryState {
    /// A bulb that is off, in white mode, at full brightness.
    pub fn new(range: &MiredRange) -> Self {
        AccessoryState {
            on: false,
            hue: 0,
            saturation: 0,
            color_temperature: range.min,
            color_mode: false,
            color_brightness: 100,
            white_brightness: 100,
            resume_brightness: None,
        }
    }

    pub fn on(&self) -> bool {
        self.on
    }

    pub fn brightness(&self) -> u8 {
        if self.color_mode {
            self.color_brightness
        } else {
            self.white_brightness
        }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn color_temperature(&self) -> u16 {
        self.color_temperature
    }

    pub fn color_mode(&self) -> bool {
        self.color_mode
    }

    pub fn color_brightness(&self) -> u8 {
        self.color_brightness
    }

    pub fn white_brightness(&self) -> u8 {
        self.white_brightness
    }

    /// Level relative steps start from. After brightness 0 this is the level
    /// the bulb was dimmed to before it was switched off.
    pub fn step_origin(&self) -> u8 {
        match self.brightness() {
            0 => self.resume_brightness.unwrap_or(0),
            level => level,
        }
    }

    pub(crate) fn set_brightness(&mut self, brightness: u8) {
        if brightness > 0 {
            self.resume_brightness = None;
        }
        if self.color_mode {
            self.color_brightness = brightness;
        } else {
            self.white_brightness = brightness;
        }
    }

    /// Cache brightness 0, remembering the level the bulb still holds.
    pub(crate) fn dim_to_zero(&mut self) {
        let level = self.brightness();
        if level > 0 {
            self.resume_brightness = Some(level);
        }
        self.set_brightness(0);
    }

    /// Switch between color and white mode; the other mode's brightness
    /// becomes live.
    pub(crate) fn set_color_mode(&mut self, color_mode: bool) {
        self.color_mode = color_mode;
    }
}
