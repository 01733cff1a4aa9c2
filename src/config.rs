//! Plugin configuration and per-zone accessory setup.

use std::str::FromStr;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;
use crate::types::{BulbFamily, MiredRange, Zone};

type Result<T> = std::result::Result<T, Error>;

/// Default quiet period before pending changes are reconciled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Static configuration of one accessory (one zone of one bridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryConfig {
    pub name: String,
    pub family: BulbFamily,
    pub zone: Zone,
    pub debounce: Duration,
    pub color_temperature: MiredRange,
}

impl AccessoryConfig {
    /// Configuration with the default debounce and color temperature range.
    pub fn new(name: &str, family: BulbFamily, zone: Zone) -> Self {
        AccessoryConfig {
            name: name.to_string(),
            family,
            zone,
            debounce: DEFAULT_DEBOUNCE,
            color_temperature: MiredRange::default(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_color_temperature(mut self, range: MiredRange) -> Self {
        self.color_temperature = range;
        self
    }
}

/// Configuration of one bridge as written in the plugin config.
///
/// `ip_address`, `port`, `delay` and `repeat` are passed through untouched to
/// whatever builds the transport.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    #[serde(rename = "type")]
    pub bulb_type: Option<String>,
    /// Milliseconds between commands on the wire.
    pub delay: Option<u64>,
    /// Times each command is repeated on the wire.
    pub repeat: Option<u32>,
    /// Debounce interval in milliseconds.
    pub debounce: Option<u64>,
    pub min_mireds: Option<u16>,
    pub max_mireds: Option<u16>,
    /// Zone names by position; zone `n` is entry `n - 1`. Empty entries leave
    /// the zone unconfigured.
    pub zones: Option<Vec<Option<String>>>,
}

impl BridgeConfig {
    /// Name used for the bridge in logs and errors.
    pub fn identity(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.ip_address.clone())
            .unwrap_or_else(|| "bridge".to_string())
    }

    /// Bulb family, defaulting to RGBW when no type is given.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::{BridgeConfig, BulbFamily};
    ///
    /// let mut config = BridgeConfig::default();
    /// assert_eq!(config.family().unwrap(), BulbFamily::RGBW);
    ///
    /// config.bulb_type = Some("white".to_string());
    /// assert_eq!(config.family().unwrap(), BulbFamily::White);
    ///
    /// config.bulb_type = Some("lava lamp".to_string());
    /// assert!(config.family().is_err());
    /// ```
    pub fn family(&self) -> Result<BulbFamily> {
        match &self.bulb_type {
            None => {
                info!(
                    "[{}] Type not specified, defaulting to {}",
                    self.identity(),
                    BulbFamily::default()
                );
                Ok(BulbFamily::default())
            }
            Some(name) => {
                BulbFamily::from_str(name).map_err(|_| Error::UnknownFamily(name.clone()))
            }
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn color_temperature(&self) -> Result<MiredRange> {
        let min = self.min_mireds.unwrap_or(MiredRange::DEFAULT_MIN);
        let max = self.max_mireds.unwrap_or(MiredRange::DEFAULT_MAX);
        MiredRange::create(min, max).ok_or(Error::InvalidMiredRange { min, max })
    }

    /// One accessory configuration per usable zone.
    ///
    /// Zones beyond what the family can address are dropped with a warning.
    /// It is an error for no zone at all to remain.
    pub fn accessory_configs(&self) -> Result<Vec<AccessoryConfig>> {
        let identity = self.identity();
        let Some(zones) = &self.zones else {
            return Err(Error::configuration(&format!(
                "could not read zones for bridge {identity}"
            )));
        };

        let family = self.family()?;
        let range = self.color_temperature()?;
        let debounce = self.debounce();

        let limit = usize::from(family.max_zones());
        if zones.len() > limit {
            if limit == 1 {
                warn!(
                    "[{identity}] {family} lamps only have a single zone. Only the first defined zone will be used."
                );
            } else {
                warn!(
                    "[{identity}] Only a maximum of {limit} zones are supported for {family} lamps. Only recognizing the first {limit} zones."
                );
            }
        }

        let configs: Vec<AccessoryConfig> = zones
            .iter()
            .take(limit)
            .enumerate()
            .filter_map(|(index, name)| {
                let name = name.as_deref().map(str::trim).filter(|n| !n.is_empty());
                let zone = Zone::new(index as u8 + 1)?;
                match name {
                    Some(name) => Some(
                        AccessoryConfig::new(name, family, zone)
                            .with_debounce(debounce)
                            .with_color_temperature(range),
                    ),
                    None => {
                        debug!("[{identity}] {zone} has no name, skipping");
                        None
                    }
                }
            })
            .collect();

        if configs.is_empty() {
            return Err(Error::NoZones(identity));
        }
        Ok(configs)
    }
}

/// Plugin configuration: one or more bridges.
///
/// Both a `bridges` list and the single-bridge layout (bridge fields at the
/// top level) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub bridges: Vec<BridgeConfig>,
}

/// A bridge that passed validation, with its accessories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBridge {
    pub bridge: BridgeConfig,
    pub accessories: Vec<AccessoryConfig>,
}

impl PlatformConfig {
    /// Parse the plugin configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use milight_accessory_rs::PlatformConfig;
    ///
    /// let config = PlatformConfig::from_json(
    ///     r#"{"ip_address": "10.0.0.2", "type": "rgbw", "zones": ["Kitchen", "Hall"]}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.bridges.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(Error::JsonLoad)?;
        if value.get("bridges").is_some() {
            serde_json::from_value(value).map_err(Error::JsonLoad)
        } else {
            let bridge: BridgeConfig = serde_json::from_value(value).map_err(Error::JsonLoad)?;
            Ok(PlatformConfig {
                bridges: vec![bridge],
            })
        }
    }

    /// Validate every bridge. Bridges that fail are logged and left out; the
    /// rest proceed.
    pub fn validate(&self) -> (Vec<ValidatedBridge>, Vec<Error>) {
        let mut valid = Vec::new();
        let mut errors = Vec::new();

        for bridge in &self.bridges {
            match bridge.accessory_configs() {
                Ok(accessories) => valid.push(ValidatedBridge {
                    bridge: bridge.clone(),
                    accessories,
                }),
                Err(e) => {
                    error!("[{}] {}", bridge.identity(), e);
                    errors.push(e);
                }
            }
        }

        (valid, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(bulb_type: &str, zones: &[Option<&str>]) -> BridgeConfig {
        BridgeConfig {
            name: Some("test".to_string()),
            bulb_type: Some(bulb_type.to_string()),
            zones: Some(zones.iter().map(|z| z.map(String::from)).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rgb_keeps_only_first_zone() {
        let configs = bridge("rgb", &[Some("A"), Some("B")])
            .accessory_configs()
            .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "A");
    }

    #[test]
    fn test_zone_limits_per_family() {
        let names: Vec<Option<&str>> = ["1", "2", "3", "4", "5", "6", "7", "8", "9"]
            .iter()
            .map(|n| Some(*n))
            .collect();

        assert_eq!(bridge("rgbw", &names).accessory_configs().unwrap().len(), 4);
        assert_eq!(
            bridge("fullColor8Zone", &names)
                .accessory_configs()
                .unwrap()
                .len(),
            8
        );
    }

    #[test]
    fn test_unnamed_zones_are_skipped() {
        let configs = bridge("white", &[None, Some("Hall"), Some("  ")])
            .accessory_configs()
            .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].zone.number(), 2);
        assert_eq!(configs[0].family, BulbFamily::White);
    }

    #[test]
    fn test_no_zones() {
        assert_eq!(
            bridge("rgbw", &[None]).accessory_configs().unwrap_err(),
            Error::NoZones("test".to_string())
        );

        let missing = BridgeConfig::default();
        assert!(matches!(
            missing.accessory_configs(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_debounce_and_mireds_are_carried() {
        let mut config = bridge("fullColor", &[Some("Desk")]);
        config.debounce = Some(300);
        config.min_mireds = Some(153);
        config.max_mireds = Some(370);

        let accessory = &config.accessory_configs().unwrap()[0];
        assert_eq!(accessory.debounce, Duration::from_millis(300));
        assert_eq!(accessory.color_temperature, MiredRange::create(153, 370).unwrap());
    }

    #[test]
    fn test_inverted_mireds_are_rejected() {
        let mut config = bridge("white", &[Some("Desk")]);
        config.min_mireds = Some(400);
        config.max_mireds = Some(200);
        assert_eq!(
            config.accessory_configs().unwrap_err(),
            Error::InvalidMiredRange { min: 400, max: 200 }
        );
    }

    #[test]
    fn test_bad_bridge_does_not_block_others() {
        let config = PlatformConfig::from_json(
            r#"{
                "bridges": [
                    {"name": "broken", "type": "neon", "zones": ["A"]},
                    {"name": "ok", "type": "bridge", "zones": ["Lamp"]}
                ]
            }"#,
        )
        .unwrap();

        let (valid, errors) = config.validate();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].accessories[0].family, BulbFamily::Bridge);
        assert_eq!(errors, vec![Error::UnknownFamily("neon".to_string())]);
    }

    #[test]
    fn test_single_bridge_layout() {
        let config = PlatformConfig::from_json(
            r#"{"ip_address": "192.168.1.20", "port": 8899, "delay": 30, "repeat": 3, "zones": ["Living Room"]}"#,
        )
        .unwrap();

        let bridge = &config.bridges[0];
        assert_eq!(bridge.identity(), "192.168.1.20");
        assert_eq!(bridge.port, Some(8899));
        assert_eq!(bridge.family().unwrap(), BulbFamily::RGBW);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PlatformConfig::from_json("{not json"),
            Err(Error::JsonLoad(_))
        ));
    }
}
