use crate::command::Operation;
use crate::types::BulbFamily;

/// All error types that can occur while configuring or driving accessories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to deserialize the plugin configuration.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A configuration value is missing or unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The bridge configuration did not yield a single usable zone.
    #[error("no zones found in configuration for bridge {0}")]
    NoZones(String),

    /// The zone number is outside of what the family can address.
    #[error("zone {zone} is invalid for {family} bulbs (supported: 1-{max})")]
    InvalidZone {
        family: BulbFamily,
        zone: u8,
        max: u8,
    },

    /// The command factory cannot build an operation the family needs.
    #[error("command factory for {family} bulbs does not support {operation}")]
    MissingOperation {
        family: BulbFamily,
        operation: Operation,
    },

    /// The command factory was built for a different family.
    #[error("command factory for {actual} bulbs cannot drive {expected} bulbs")]
    FamilyMismatch {
        expected: BulbFamily,
        actual: BulbFamily,
    },

    /// The color temperature bounds are empty or inverted.
    #[error("invalid color temperature range {min}-{max} mireds")]
    InvalidMiredRange { min: u16, max: u16 },

    /// The bulb type string did not name a known family.
    #[error("unknown bulb type: {0}")]
    UnknownFamily(String),

    /// The command sink rejected a command.
    #[error("transport failure on {connection}: {reason}")]
    Transport { connection: String, reason: String },
}

impl Error {
    /// Create a new configuration error
    pub fn configuration(reason: &str) -> Self {
        Error::Configuration(reason.to_string())
    }

    /// Create a new invalid zone error
    pub fn invalid_zone(family: BulbFamily, zone: u8) -> Self {
        Error::InvalidZone {
            family,
            zone,
            max: family.max_zones(),
        }
    }

    /// Create a new transport error
    pub fn transport(connection: &str, reason: &str) -> Self {
        Error::Transport {
            connection: connection.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
