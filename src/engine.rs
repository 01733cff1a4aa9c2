//! Reconciliation of desired attribute values into bridge commands.
//!
//! A pass visits attributes in [`Attribute::ORDER`] through an explicit rule
//! table. Each rule compares the desired value against the cached state,
//! decides which commands (if any) the bridge needs, and records the value
//! as applied. Later rules can see what earlier rules did in the same pass:
//! once a pass switches the bulb off or into night mode, the remaining
//! attributes are only cached.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::command::{BridgeCommand, CommandFactory, validate_factory};
use crate::config::AccessoryConfig;
use crate::connection::{Address, BridgeConnection};
use crate::errors::Error;
use crate::sink::BridgeCommandSink;
use crate::state::AccessoryState;
use crate::types::{Attribute, AttributeChange, BulbFamily, DesiredState, MiredRange, Zone};

type Result<T> = std::result::Result<T, Error>;

/// One planned action on the bridge connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Send(BridgeCommand),
    Pause(Duration),
}

type Rule = fn(&mut Engine, &mut Pass<'_>, AttributeChange);

/// Attribute handlers in reconciliation order.
const RULES: [(Attribute, Rule); 5] = [
    (Attribute::On, Engine::apply_on),
    (Attribute::Brightness, Engine::apply_brightness),
    (Attribute::Hue, Engine::apply_hue),
    (Attribute::Saturation, Engine::apply_saturation),
    (Attribute::ColorTemperature, Engine::apply_color_temperature),
];

struct Pass<'a> {
    desired: &'a DesiredState,
    last_addressed: &'a mut Option<Address>,
    steps: Vec<Step>,
    // An on command already went out in this pass.
    addressed: bool,
    // The bulb was switched off or into night mode in this pass.
    dark: bool,
    hue_sent: bool,
}

impl Pass<'_> {
    fn send(&mut self, command: BridgeCommand) {
        self.steps.push(Step::Send(command));
    }

    fn pause(&mut self, duration: Duration) {
        self.steps.push(Step::Pause(duration));
    }
}

/// Per-accessory state engine.
pub struct Engine {
    name: String,
    family: BulbFamily,
    zone: Zone,
    range: MiredRange,
    factory: Arc<dyn CommandFactory>,
    state: AccessoryState,
}

impl Engine {
    /// Delay the bridge needs between "off" and "night mode".
    pub const NIGHT_MODE_PAUSE: Duration = Duration::from_millis(100);

    const BRIGHTNESS_STEP: f64 = 10.0;
    const HUE_STEP: f64 = 36.0;

    pub fn new(config: &AccessoryConfig, factory: Arc<dyn CommandFactory>) -> Result<Self> {
        if config.zone.number() > config.family.max_zones() {
            return Err(Error::invalid_zone(config.family, config.zone.number()));
        }
        let range = config.color_temperature;
        if !range.is_valid() {
            return Err(Error::InvalidMiredRange {
                min: range.min,
                max: range.max,
            });
        }
        validate_factory(factory.as_ref(), config.family)?;

        Ok(Engine {
            name: config.name.clone(),
            family: config.family,
            zone: config.zone,
            range: config.color_temperature,
            factory,
            state: AccessoryState::new(&config.color_temperature),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> BulbFamily {
        self.family
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn state(&self) -> &AccessoryState {
        &self.state
    }

    pub fn address(&self) -> Address {
        Address::new(self.family, self.zone)
    }

    /// Run a reconciliation pass and send the result on `connection`.
    pub async fn reconcile<S: BridgeCommandSink>(
        &mut self,
        desired: &DesiredState,
        connection: &BridgeConnection<S>,
    ) -> Vec<Step> {
        connection.run(|last| self.plan(desired, last)).await
    }

    /// Decide the steps for `desired`, updating the cached state and the
    /// connection's addressing marker.
    pub fn plan(&mut self, desired: &DesiredState, last_addressed: &mut Option<Address>) -> Vec<Step> {
        let mut pass = Pass {
            desired,
            last_addressed,
            steps: Vec::new(),
            addressed: false,
            dark: false,
            hue_sent: false,
        };

        for (attribute, rule) in RULES {
            if let Some(change) = desired.get(attribute) {
                rule(self, &mut pass, change);
            }
        }

        if pass.steps.is_empty() {
            debug!("[{}] no commands needed for {:?}", self.name, desired);
        }
        pass.steps
    }

    /// Send "on" unless the bridge is already addressed to this zone. With
    /// `force`, only an "on" from earlier in the same pass counts.
    fn ensure_addressed(&self, pass: &mut Pass<'_>, force: bool) {
        let me = self.address();
        if pass.addressed || (!force && *pass.last_addressed == Some(me)) {
            return;
        }
        pass.send(self.factory.on(self.zone));
        *pass.last_addressed = Some(me);
        pass.addressed = true;
    }

    fn switch_off(&mut self, pass: &mut Pass<'_>) {
        pass.send(self.factory.off(self.zone));
        *pass.last_addressed = None;
        pass.dark = true;
        self.state.on = false;
    }

    fn apply_on(&mut self, pass: &mut Pass<'_>, change: AttributeChange) {
        let AttributeChange::On(on) = change else {
            return;
        };

        if !on {
            info!("[{}] Setting power state to off", self.name);
            self.switch_off(pass);
            return;
        }

        if *pass.last_addressed == Some(self.address()) {
            debug!("[{}] already addressed, not repeating on", self.name);
        } else {
            info!("[{}] Setting power state to on", self.name);
            self.ensure_addressed(pass, true);
        }
        self.state.on = true;
    }

    fn apply_brightness(&mut self, pass: &mut Pass<'_>, change: AttributeChange) {
        let AttributeChange::Brightness(value) = change else {
            return;
        };
        let level = value.clamp(0, 100) as u8;
        let current = self.state.brightness();

        // A switched-off bulb needs commands even at its cached level.
        if level == current && level != 0 && self.state.on {
            return;
        }
        if pass.dark {
            debug!("[{}] bulb is dark, not applying brightness {}", self.name, level);
            self.state.dim_to_zero();
            return;
        }

        if level == 0 {
            info!("[{}] Setting brightness to 0 (off)", self.name);
            self.switch_off(pass);
            self.state.dim_to_zero();
            return;
        }

        if self.family.has_night_mode() && level <= BulbFamily::NIGHT_MODE_THRESHOLD {
            info!("[{}] Setting night mode", self.name);
            pass.send(self.factory.off(self.zone));
            pass.pause(Self::NIGHT_MODE_PAUSE);
            pass.send(self.factory.night_mode(self.zone));
            *pass.last_addressed = None;
            pass.dark = true;
        } else if self.family.has_absolute_brightness() {
            info!("[{}] Setting brightness to {}", self.name, level);
            self.ensure_addressed(pass, true);
            pass.send(self.factory.brightness(self.zone, level));
        } else if self.family == BulbFamily::White && level == 100 {
            info!("[{}] Setting maximum brightness", self.name);
            self.ensure_addressed(pass, true);
            pass.send(self.factory.max_bright(self.zone));
        } else {
            let origin = self.state.step_origin();
            let steps = step_count(origin.into(), level.into(), Self::BRIGHTNESS_STEP);
            if steps == 0 && self.state.on {
                debug!(
                    "[{}] brightness {} is within one step of {}",
                    self.name, level, origin
                );
                self.state.set_brightness(level);
                return;
            }

            info!(
                "[{}] Stepping brightness from {} to {} ({} steps)",
                self.name, origin, level, steps
            );
            self.ensure_addressed(pass, true);
            let command = if level > origin {
                self.factory.bright_up(self.zone)
            } else {
                self.factory.bright_down(self.zone)
            };
            (0..steps).for_each(|_| pass.send(command));
        }

        self.state.on = true;
        self.state.set_brightness(level);
    }

    fn apply_hue(&mut self, pass: &mut Pass<'_>, change: AttributeChange) {
        let AttributeChange::Hue(value) = change else {
            return;
        };
        let hue = (value.clamp(0, 360) % 360) as u16;
        let current = self.state.hue;

        if hue == current {
            return;
        }
        if pass.dark {
            debug!("[{}] bulb is dark, caching hue {}", self.name, hue);
            self.state.hue = hue;
            return;
        }

        if !self.family.has_color() {
            // White bulbs step their color temperature instead.
            let steps = step_count(current.into(), hue.into(), Self::HUE_STEP);
            if steps == 0 {
                debug!("[{}] hue {} is within one step of {}", self.name, hue, current);
            } else {
                self.ensure_addressed(pass, false);
                let command = if hue > current {
                    self.factory.cooler(self.zone)
                } else {
                    self.factory.warmer(self.zone)
                };
                (0..steps).for_each(|_| pass.send(command));
            }
            self.state.hue = hue;
            return;
        }

        if self.family.has_white_mode() {
            let saturation = pass
                .desired
                .saturation
                .map(clamp_percent)
                .unwrap_or(self.state.saturation);
            if saturation == 0 {
                debug!(
                    "[{}] saturation is 0, caching hue {} without sending",
                    self.name, hue
                );
                self.state.hue = hue;
                return;
            }
        }

        info!("[{}] Setting hue to {}", self.name, hue);
        self.send_hue(pass, hue);
        self.state.hue = hue;
    }

    fn send_hue(&mut self, pass: &mut Pass<'_>, hue: u16) {
        self.ensure_addressed(pass, false);
        let color = self.factory.hsv_to_device_color(hue, 0, 0);
        pass.send(self.factory.hue(self.zone, color));
        self.state.set_color_mode(true);
        pass.hue_sent = true;
    }

    fn apply_saturation(&mut self, pass: &mut Pass<'_>, change: AttributeChange) {
        let AttributeChange::Saturation(value) = change else {
            return;
        };
        let saturation = clamp_percent(value);

        if saturation == self.state.saturation {
            return;
        }
        if !self.family.has_white_mode() {
            debug!(
                "[{}] {} bulbs have no saturation control, caching {}",
                self.name, self.family, saturation
            );
            self.state.saturation = saturation;
            return;
        }
        if pass.dark {
            debug!("[{}] bulb is dark, caching saturation {}", self.name, saturation);
            self.state.saturation = saturation;
            return;
        }

        if saturation == 0 {
            info!("[{}] Switching to white mode", self.name);
            self.state.set_color_mode(false);
            if self.family.is_full_color() {
                let mireds = pass
                    .desired
                    .color_temperature
                    .map(|ct| self.range.clamp(ct))
                    .unwrap_or(self.state.color_temperature);
                self.send_white_temperature(pass, mireds);
                // The color temperature rule then sees nothing left to do.
                self.state.color_temperature = mireds;
            } else {
                self.ensure_addressed(pass, false);
                pass.send(self.factory.white_mode(self.zone));
            }
        } else if self.family.has_absolute_saturation() {
            info!("[{}] Setting saturation to {}", self.name, saturation);
            self.ensure_addressed(pass, false);
            pass.send(self.factory.saturation(self.zone, saturation));
            self.state.set_color_mode(true);
        } else if !pass.hue_sent {
            // Without an absolute saturation command, re-sending the hue puts
            // the bridge back in color mode.
            info!("[{}] Re-asserting hue {}", self.name, self.state.hue);
            let hue = self.state.hue;
            self.send_hue(pass, hue);
        }

        self.state.saturation = saturation;
    }

    fn apply_color_temperature(&mut self, pass: &mut Pass<'_>, change: AttributeChange) {
        let AttributeChange::ColorTemperature(value) = change else {
            return;
        };
        let mireds = self.range.clamp(value);
        let current = self.state.color_temperature;

        if mireds == current {
            return;
        }
        if pass.dark {
            debug!("[{}] bulb is dark, caching color temperature {}", self.name, mireds);
            self.state.color_temperature = mireds;
            return;
        }

        match self.family {
            BulbFamily::FullColor | BulbFamily::FullColor8Zone => {
                info!("[{}] Setting color temperature to {} mireds", self.name, mireds);
                self.send_white_temperature(pass, mireds);
                self.state.set_color_mode(false);
            }
            BulbFamily::White => {
                let steps = step_count(current.into(), mireds.into(), self.range.step_size());
                if steps == 0 {
                    debug!(
                        "[{}] color temperature {} is within one step of {}",
                        self.name, mireds, current
                    );
                } else {
                    self.ensure_addressed(pass, false);
                    let command = if mireds > current {
                        self.factory.warmer(self.zone)
                    } else {
                        self.factory.cooler(self.zone)
                    };
                    (0..steps).for_each(|_| pass.send(command));
                }
            }
            _ => debug!(
                "[{}] {} bulbs have no color temperature control, caching {}",
                self.name, self.family, mireds
            ),
        }

        self.state.color_temperature = mireds;
    }

    fn send_white_temperature(&self, pass: &mut Pass<'_>, mireds: u16) {
        self.ensure_addressed(pass, false);
        let temperature = self.range.to_white_temperature(mireds);
        pass.send(self.factory.white_temperature(self.zone, temperature));
    }
}

fn clamp_percent(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

/// Number of relative steps needed to move from `from` to `to`.
fn step_count(from: f64, to: f64, step: f64) -> usize {
    ((to - from).abs() / step).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MilightCommands;
    use crate::sink::{ChannelSink, Outbound};
    use strum::IntoEnumIterator;

    fn zone() -> Zone {
        Zone::new(1).unwrap()
    }

    fn engine(family: BulbFamily) -> Engine {
        let config = AccessoryConfig::new("lamp", family, zone());
        Engine::new(&config, Arc::new(MilightCommands::new(family))).unwrap()
    }

    fn commands(family: BulbFamily) -> MilightCommands {
        MilightCommands::new(family)
    }

    fn desired(changes: &[AttributeChange]) -> DesiredState {
        let mut desired = DesiredState::new();
        changes.iter().for_each(|c| desired.set(*c));
        desired
    }

    fn sends(commands: &[BridgeCommand]) -> Vec<Step> {
        commands.iter().map(|c| Step::Send(*c)).collect()
    }

    fn night_mode(family: BulbFamily) -> Vec<Step> {
        let factory = commands(family);
        vec![
            Step::Send(factory.off(zone())),
            Step::Pause(Duration::from_millis(100)),
            Step::Send(factory.night_mode(zone())),
        ]
    }

    #[test]
    fn test_repeated_on_is_suppressed() {
        let mut engine = engine(BulbFamily::RGBW);
        let mut last = None;
        let on = desired(&[AttributeChange::On(true)]);

        assert_eq!(
            engine.plan(&on, &mut last),
            sends(&[commands(BulbFamily::RGBW).on(zone())])
        );
        assert!(engine.plan(&on, &mut last).is_empty());
        assert!(engine.plan(&on, &mut last).is_empty());
        assert_eq!(last, Some(engine.address()));
    }

    #[test]
    fn test_on_after_off_is_sent_again() {
        let mut engine = engine(BulbFamily::White);
        let mut last = None;
        let factory = commands(BulbFamily::White);

        engine.plan(&desired(&[AttributeChange::On(true)]), &mut last);
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::On(false)]), &mut last),
            sends(&[factory.off(zone())])
        );
        assert_eq!(last, None);
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::On(true)]), &mut last),
            sends(&[factory.on(zone())])
        );
    }

    #[test]
    fn test_on_for_another_zone_is_not_suppressed() {
        let mut engine = engine(BulbFamily::RGBW);
        let other = Address::new(BulbFamily::RGBW, Zone::new(2).unwrap());
        let mut last = Some(other);

        let steps = engine.plan(&desired(&[AttributeChange::On(true)]), &mut last);
        assert_eq!(steps, sends(&[commands(BulbFamily::RGBW).on(zone())]));
        assert_eq!(last, Some(engine.address()));
    }

    #[test]
    fn test_night_mode_threshold() {
        for family in BulbFamily::iter().filter(|f| *f != BulbFamily::RGB) {
            for level in 1..=5 {
                let mut engine = engine(family);
                let mut last = Some(engine.address());
                let steps = engine.plan(&desired(&[AttributeChange::Brightness(level)]), &mut last);
                assert_eq!(steps, night_mode(family), "{family} at {level}");
                assert_eq!(last, None);
            }
        }
    }

    #[test]
    fn test_zero_brightness_turns_off() {
        for family in BulbFamily::iter() {
            let mut engine = engine(family);
            let mut last = Some(engine.address());
            let steps = engine.plan(&desired(&[AttributeChange::Brightness(0)]), &mut last);
            assert_eq!(steps, sends(&[commands(family).off(zone())]), "{family}");
            assert!(!engine.state().on());
            assert_eq!(last, None);
        }
    }

    #[test]
    fn test_absolute_brightness() {
        let mut engine = engine(BulbFamily::Bridge);
        let mut last = None;
        let factory = commands(BulbFamily::Bridge);

        let steps = engine.plan(&desired(&[AttributeChange::Brightness(60)]), &mut last);
        assert_eq!(steps, sends(&[factory.on(zone()), factory.brightness(zone(), 60)]));
        assert_eq!(engine.state().brightness(), 60);
    }

    #[test]
    fn test_on_and_brightness_share_one_on() {
        let mut engine = engine(BulbFamily::FullColor);
        let mut last = None;
        let factory = commands(BulbFamily::FullColor);

        let batch = desired(&[AttributeChange::Brightness(80), AttributeChange::On(true)]);
        assert_eq!(
            engine.plan(&batch, &mut last),
            sends(&[factory.on(zone()), factory.brightness(zone(), 80)])
        );
    }

    #[test]
    fn test_white_brightness_steps_up() {
        let mut engine = engine(BulbFamily::White);
        engine.state.set_brightness(20);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::White);

        let steps = engine.plan(&desired(&[AttributeChange::Brightness(45)]), &mut last);
        let up = factory.bright_up(zone());
        assert_eq!(steps, sends(&[factory.on(zone()), up, up, up]));
        assert_eq!(engine.state().brightness(), 45);
    }

    #[test]
    fn test_coalesced_brightness_steps_from_cached_value() {
        let mut engine = engine(BulbFamily::White);
        engine.state.set_brightness(20);
        let mut last = None;
        let factory = commands(BulbFamily::White);

        // 60 was overwritten by 45 before the pass ran.
        let steps = engine.plan(
            &desired(&[AttributeChange::Brightness(60), AttributeChange::Brightness(45)]),
            &mut last,
        );
        let up = factory.bright_up(zone());
        assert_eq!(steps, sends(&[factory.on(zone()), up, up, up]));
    }

    #[test]
    fn test_white_full_brightness_uses_max_bright() {
        let mut engine = engine(BulbFamily::White);
        engine.state.set_brightness(30);
        let mut last = None;
        let factory = commands(BulbFamily::White);

        let steps = engine.plan(&desired(&[AttributeChange::Brightness(100)]), &mut last);
        assert_eq!(steps, sends(&[factory.on(zone()), factory.max_bright(zone())]));
    }

    #[test]
    fn test_rgb_low_brightness_steps_instead_of_night_mode() {
        let mut engine = engine(BulbFamily::RGB);
        let mut last = None;
        let factory = commands(BulbFamily::RGB);

        let steps = engine.plan(&desired(&[AttributeChange::Brightness(3)]), &mut last);
        let mut expected = vec![factory.on(zone())];
        expected.extend(std::iter::repeat_n(factory.bright_down(zone()), 10));
        assert_eq!(steps, sends(&expected));
    }

    #[test]
    fn test_zero_steps_sends_nothing_but_caches() {
        let mut engine = engine(BulbFamily::White);
        engine.state.set_brightness(20);
        engine.state.on = true;
        let mut last = None;

        assert!(engine
            .plan(&desired(&[AttributeChange::Brightness(24)]), &mut last)
            .is_empty());
        assert_eq!(engine.state().brightness(), 24);
        assert_eq!(last, None);
    }

    #[test]
    fn test_zero_steps_on_a_dark_bulb_only_switches_it_on() {
        let mut engine = engine(BulbFamily::RGB);
        engine.state.set_brightness(20);
        let mut last = None;

        let steps = engine.plan(&desired(&[AttributeChange::Brightness(24)]), &mut last);
        assert_eq!(steps, sends(&[commands(BulbFamily::RGB).on(zone())]));
        assert!(engine.state().on());
        assert_eq!(engine.state().brightness(), 24);
    }

    #[test]
    fn test_brightness_after_zero_is_sent_again() {
        let mut engine = engine(BulbFamily::RGBW);
        let mut last = None;
        let factory = commands(BulbFamily::RGBW);
        let sixty = desired(&[AttributeChange::Brightness(60)]);

        engine.plan(&sixty, &mut last);
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::Brightness(0)]), &mut last),
            sends(&[factory.off(zone())])
        );
        assert_eq!(engine.state().brightness(), 0);

        assert_eq!(
            engine.plan(&sixty, &mut last),
            sends(&[factory.on(zone()), factory.brightness(zone(), 60)])
        );
        assert!(engine.state().on());
    }

    #[test]
    fn test_step_bulb_resumes_its_level_after_zero() {
        let mut engine = engine(BulbFamily::White);
        engine.state.set_brightness(60);
        engine.state.on = true;
        let mut last = None;
        let factory = commands(BulbFamily::White);

        engine.plan(&desired(&[AttributeChange::Brightness(0)]), &mut last);

        // The bulb kept its dimming level, so only "on" is needed.
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::Brightness(60)]), &mut last),
            sends(&[factory.on(zone())])
        );

        let down = factory.bright_down(zone());
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::Brightness(40)]), &mut last),
            sends(&[factory.on(zone()), down, down])
        );
    }

    #[test]
    fn test_brightness_after_power_off_is_not_skipped() {
        let mut engine = engine(BulbFamily::FullColor);
        engine.state.on = true;
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::FullColor);

        let steps = engine.plan(
            &desired(&[AttributeChange::On(false), AttributeChange::Brightness(60)]),
            &mut last,
        );
        assert_eq!(steps, sends(&[factory.off(zone())]));

        assert_eq!(
            engine.plan(&desired(&[AttributeChange::Brightness(60)]), &mut last),
            sends(&[factory.on(zone()), factory.brightness(zone(), 60)])
        );
    }

    #[test]
    fn test_hue_suppressed_in_white_mode() {
        let mut engine = engine(BulbFamily::RGBW);
        let mut last = Some(engine.address());

        assert!(engine
            .plan(&desired(&[AttributeChange::Hue(120)]), &mut last)
            .is_empty());
        assert_eq!(engine.state().hue(), 120);
        assert!(!engine.state().color_mode());
    }

    #[test]
    fn test_hue_sent_with_saturation_in_same_batch() {
        let mut engine = engine(BulbFamily::RGBW);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGBW);

        let steps = engine.plan(
            &desired(&[AttributeChange::Hue(200), AttributeChange::Saturation(80)]),
            &mut last,
        );
        // One hue command; the saturation rule does not repeat it.
        assert_eq!(steps, sends(&[factory.hue(zone(), 35)]));
        assert!(engine.state().color_mode());
        assert_eq!(engine.state().saturation(), 80);
    }

    #[test]
    fn test_night_mode_short_circuits_hue() {
        let mut engine = engine(BulbFamily::FullColor);
        engine.state.saturation = 100;
        let mut last = Some(engine.address());

        let steps = engine.plan(
            &desired(&[AttributeChange::Brightness(3), AttributeChange::Hue(200)]),
            &mut last,
        );
        assert_eq!(steps, night_mode(BulbFamily::FullColor));
        assert_eq!(engine.state().hue(), 200);
    }

    #[test]
    fn test_off_short_circuits_later_attributes() {
        let mut engine = engine(BulbFamily::RGB);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGB);

        let steps = engine.plan(
            &desired(&[AttributeChange::On(false), AttributeChange::Hue(100)]),
            &mut last,
        );
        assert_eq!(steps, sends(&[factory.off(zone())]));
        assert_eq!(engine.state().hue(), 100);
    }

    #[test]
    fn test_rgbw_saturation_reasserts_cached_hue() {
        let mut engine = engine(BulbFamily::RGBW);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGBW);

        let steps = engine.plan(&desired(&[AttributeChange::Saturation(50)]), &mut last);
        assert_eq!(steps, sends(&[factory.hue(zone(), 176)]));
        assert!(engine.state().color_mode());
    }

    #[test]
    fn test_rgbw_zero_saturation_sends_white_mode() {
        let mut engine = engine(BulbFamily::RGBW);
        engine.state.saturation = 70;
        engine.state.set_color_mode(true);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGBW);

        let steps = engine.plan(&desired(&[AttributeChange::Saturation(0)]), &mut last);
        assert_eq!(steps, sends(&[factory.white_mode(zone())]));
        assert!(!engine.state().color_mode());
    }

    #[test]
    fn test_full_color_zero_saturation_restores_white_temperature() {
        let mut engine = engine(BulbFamily::FullColor);
        engine.state.saturation = 50;
        engine.state.set_color_mode(true);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::FullColor);

        // Cached temperature is the coolest end of the default range.
        let steps = engine.plan(&desired(&[AttributeChange::Saturation(0)]), &mut last);
        assert_eq!(steps, sends(&[factory.white_temperature(zone(), 100)]));
        assert!(!engine.state().color_mode());
    }

    #[test]
    fn test_full_color_white_mode_uses_pending_temperature() {
        let mut engine = engine(BulbFamily::FullColor);
        engine.state.saturation = 50;
        engine.state.set_color_mode(true);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::FullColor);

        let steps = engine.plan(
            &desired(&[
                AttributeChange::Saturation(0),
                AttributeChange::ColorTemperature(320),
            ]),
            &mut last,
        );
        assert_eq!(steps, sends(&[factory.white_temperature(zone(), 50)]));
        assert_eq!(engine.state().color_temperature(), 320);
    }

    #[test]
    fn test_full_color_absolute_saturation() {
        let mut engine = engine(BulbFamily::FullColor8Zone);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::FullColor8Zone);

        let steps = engine.plan(&desired(&[AttributeChange::Saturation(40)]), &mut last);
        assert_eq!(steps, sends(&[factory.saturation(zone(), 40)]));
    }

    #[test]
    fn test_full_color_white_temperature() {
        let mut engine = engine(BulbFamily::FullColor);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::FullColor);

        let steps = engine.plan(&desired(&[AttributeChange::ColorTemperature(320)]), &mut last);
        assert_eq!(steps, sends(&[factory.white_temperature(zone(), 50)]));
        assert_eq!(engine.state().color_temperature(), 320);
    }

    #[test]
    fn test_white_color_temperature_steps() {
        let mut engine = engine(BulbFamily::White);
        let mut last = Some(engine.address());
        let warmer = commands(BulbFamily::White).warmer(zone());

        // 140 -> 320 mireds over a 36 mired step.
        let steps = engine.plan(&desired(&[AttributeChange::ColorTemperature(320)]), &mut last);
        assert_eq!(steps, sends(&[warmer; 5]));
    }

    #[test]
    fn test_white_hue_is_a_temperature_proxy() {
        let mut engine = engine(BulbFamily::White);
        let mut last = Some(engine.address());
        let cooler = commands(BulbFamily::White).cooler(zone());

        let steps = engine.plan(&desired(&[AttributeChange::Hue(180)]), &mut last);
        assert_eq!(steps, sends(&[cooler; 5]));
    }

    #[test]
    fn test_rgb_hue_ignores_saturation() {
        let mut engine = engine(BulbFamily::RGB);
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGB);

        let steps = engine.plan(&desired(&[AttributeChange::Hue(120)]), &mut last);
        assert_eq!(steps, sends(&[factory.hue(zone(), 91)]));
    }

    #[test]
    fn test_brightness_is_remembered_per_mode() {
        let mut engine = engine(BulbFamily::RGBW);
        engine.state.saturation = 100;
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGBW);

        let steps = engine.plan(
            &desired(&[AttributeChange::Brightness(40), AttributeChange::Hue(120)]),
            &mut last,
        );
        assert_eq!(
            steps,
            sends(&[
                factory.on(zone()),
                factory.brightness(zone(), 40),
                factory.hue(zone(), 91),
            ])
        );
        assert!(engine.state().color_mode());
        assert_eq!(engine.state().white_brightness(), 40);
        assert_eq!(engine.state().brightness(), 100);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut engine = engine(BulbFamily::RGBW);
        engine.state.on = true;
        let mut last = Some(engine.address());
        let factory = commands(BulbFamily::RGBW);

        // Clamped to 100, which is already cached.
        assert!(engine
            .plan(&desired(&[AttributeChange::Brightness(150)]), &mut last)
            .is_empty());
        assert_eq!(
            engine.plan(&desired(&[AttributeChange::Brightness(-5)]), &mut last),
            sends(&[factory.off(zone())])
        );

        engine.state.hue = 90;
        engine.plan(&desired(&[AttributeChange::Hue(400)]), &mut last);
        assert_eq!(engine.state().hue(), 0);
    }

    #[test]
    fn test_zone_beyond_family_limit_is_rejected() {
        let config = AccessoryConfig::new("lamp", BulbFamily::RGB, Zone::new(2).unwrap());
        let result = Engine::new(&config, Arc::new(MilightCommands::new(BulbFamily::RGB)));
        assert_eq!(result.err(), Some(Error::invalid_zone(BulbFamily::RGB, 2)));
    }

    #[test]
    fn test_inverted_mired_range_is_rejected() {
        let config = AccessoryConfig::new("lamp", BulbFamily::White, zone())
            .with_color_temperature(MiredRange { min: 400, max: 200 });
        let result = Engine::new(&config, Arc::new(MilightCommands::new(BulbFamily::White)));
        assert_eq!(
            result.err(),
            Some(Error::InvalidMiredRange { min: 400, max: 200 })
        );
    }

    #[tokio::test]
    async fn test_reconcile_sends_on_connection() {
        let (sink, mut rx) = ChannelSink::new("bridge");
        let connection = BridgeConnection::new("bridge", sink);
        let mut engine = engine(BulbFamily::RGBW);
        let factory = commands(BulbFamily::RGBW);

        engine
            .reconcile(&desired(&[AttributeChange::Brightness(2)]), &connection)
            .await;

        assert_eq!(rx.try_next().unwrap(), Some(Outbound::Command(factory.off(zone()))));
        assert_eq!(
            rx.try_next().unwrap(),
            Some(Outbound::Pause(Engine::NIGHT_MODE_PAUSE))
        );
        assert_eq!(
            rx.try_next().unwrap(),
            Some(Outbound::Command(factory.night_mode(zone())))
        );
        assert_eq!(connection.last_addressed().await, None);
    }
}
