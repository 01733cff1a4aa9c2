//! Accessory facade: attribute change entry point and capability descriptor.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{CommandFactory, MilightCommands};
use crate::config::AccessoryConfig;
use crate::connection::BridgeConnection;
use crate::engine::Engine;
use crate::errors::Error;
use crate::runtime::Mutex;
use crate::scheduler::Debouncer;
use crate::sink::BridgeCommandSink;
use crate::state::AccessoryState;
use crate::types::{Attribute, AttributeChange, BulbFamily, MiredRange, Zone};

type Result<T> = std::result::Result<T, Error>;

/// Attribute values as reported to the home-automation controller.
///
/// These follow the last requested value immediately, whether or not the
/// bulb has been sent anything yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub on: bool,
    pub brightness: u8,
    pub hue: u16,
    pub saturation: u8,
    pub color_temperature: u16,
}

impl Characteristics {
    fn from_state(state: &AccessoryState) -> Self {
        Characteristics {
            on: state.on(),
            brightness: state.brightness(),
            hue: state.hue(),
            saturation: state.saturation(),
            color_temperature: state.color_temperature(),
        }
    }

    fn apply(&mut self, change: AttributeChange, range: &MiredRange) {
        match change {
            AttributeChange::On(on) => self.on = on,
            AttributeChange::Brightness(v) => self.brightness = v.clamp(0, 100) as u8,
            AttributeChange::Hue(v) => self.hue = (v.clamp(0, 360) % 360) as u16,
            AttributeChange::Saturation(v) => self.saturation = v.clamp(0, 100) as u8,
            AttributeChange::ColorTemperature(v) => self.color_temperature = range.clamp(v),
        }
    }

    fn get(&self, attribute: Attribute) -> AttributeChange {
        match attribute {
            Attribute::On => AttributeChange::On(self.on),
            Attribute::Brightness => AttributeChange::Brightness(self.brightness.into()),
            Attribute::Hue => AttributeChange::Hue(self.hue.into()),
            Attribute::Saturation => AttributeChange::Saturation(self.saturation.into()),
            Attribute::ColorTemperature => {
                AttributeChange::ColorTemperature(self.color_temperature.into())
            }
        }
    }
}

/// Accessory information service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

/// Lightbulb service with the characteristics the family supports.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightbulbService {
    pub name: String,
    pub characteristics: Vec<Attribute>,
    pub color_temperature: Option<MiredRange>,
}

/// Everything a controller needs to present the accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Services {
    pub information: AccessoryInformation,
    pub lightbulb: LightbulbService,
}

/// One MiLight zone exposed as a lightbulb accessory.
///
/// Changes go through a debouncer; when the burst settles the engine
/// reconciles them and sends the resulting commands on the shared bridge
/// connection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use milight_accessory_rs::{
///     Accessory, AccessoryConfig, AttributeChange, BridgeConnection, BulbFamily, ChannelSink, Zone,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), milight_accessory_rs::Error> {
/// let (sink, _commands) = ChannelSink::new("living-room");
/// let connection = Arc::new(BridgeConnection::new("living-room", sink));
///
/// let config = AccessoryConfig::new("Couch", BulbFamily::RGBW, Zone::new(1).unwrap());
/// let lamp = Accessory::new(config, connection)?;
///
/// lamp.request_change(AttributeChange::Brightness(40)).await;
/// assert_eq!(lamp.characteristics().await.brightness, 40);
/// lamp.flush().await;
/// # Ok(())
/// # }
/// ```
pub struct Accessory<S: BridgeCommandSink> {
    id: Uuid,
    config: AccessoryConfig,
    engine: Arc<Mutex<Engine>>,
    connection: Arc<BridgeConnection<S>>,
    debouncer: Debouncer,
    exposed: Mutex<Characteristics>,
}

impl<S: BridgeCommandSink> Accessory<S> {
    /// Create an accessory driven by the stock command set for its family.
    pub fn new(config: AccessoryConfig, connection: Arc<BridgeConnection<S>>) -> Result<Self> {
        let factory = Arc::new(MilightCommands::new(config.family));
        Self::with_factory(config, connection, factory)
    }

    /// Create an accessory with a custom command factory.
    ///
    /// Fails if the zone is out of range for the family, the color
    /// temperature range is inverted, or the factory lacks an operation the
    /// family needs.
    pub fn with_factory(
        config: AccessoryConfig,
        connection: Arc<BridgeConnection<S>>,
        factory: Arc<dyn CommandFactory>,
    ) -> Result<Self> {
        let engine = Engine::new(&config, factory)?;
        let exposed = Characteristics::from_state(engine.state());
        let engine = Arc::new(Mutex::new(engine));

        let debouncer = {
            let engine = Arc::clone(&engine);
            let connection = Arc::clone(&connection);
            Debouncer::new(config.debounce, move |batch| {
                let engine = Arc::clone(&engine);
                let connection = Arc::clone(&connection);
                Box::pin(async move {
                    engine.lock().await.reconcile(&batch, &connection).await;
                })
            })
        };

        info!(
            "[{}] {} {} on {}",
            config.name,
            config.family,
            config.zone,
            connection.name()
        );

        Ok(Accessory {
            id: Uuid::new_v4(),
            config,
            engine,
            connection,
            debouncer,
            exposed: Mutex::new(exposed),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn family(&self) -> BulbFamily {
        self.config.family
    }

    pub fn zone(&self) -> Zone {
        self.config.zone
    }

    pub fn config(&self) -> &AccessoryConfig {
        &self.config
    }

    pub fn connection(&self) -> &Arc<BridgeConnection<S>> {
        &self.connection
    }

    /// Request an attribute change.
    ///
    /// The exposed value updates right away; commands follow once the
    /// debounce interval passes without further requests.
    pub async fn request_change(&self, change: AttributeChange) {
        if !self.config.family.exposes(change.attribute()) {
            debug!(
                "[{}] {} is not exposed by {} bulbs",
                self.config.name,
                change.attribute(),
                self.config.family
            );
        }

        self.exposed
            .lock()
            .await
            .apply(change, &self.config.color_temperature);
        self.debouncer.request_change(change).await;
    }

    /// Reconcile pending changes without waiting for the debounce interval.
    pub async fn flush(&self) {
        self.debouncer.flush().await;
    }

    /// The exposed value of one attribute.
    pub async fn value(&self, attribute: Attribute) -> AttributeChange {
        self.exposed.lock().await.get(attribute)
    }

    pub async fn characteristics(&self) -> Characteristics {
        self.exposed.lock().await.clone()
    }

    /// What the engine last applied to the bulb.
    pub async fn state(&self) -> AccessoryState {
        self.engine.lock().await.state().clone()
    }

    pub fn identify(&self) {
        info!("[{}] Identify requested!", self.config.name);
    }

    pub fn services(&self) -> Services {
        let family = self.config.family;
        let serial = self.id.simple().to_string();
        Services {
            information: AccessoryInformation {
                name: self.config.name.clone(),
                manufacturer: "MiLight".to_string(),
                model: family.to_string(),
                serial_number: format!("MILIGHT-{}", &serial[..12]),
            },
            lightbulb: LightbulbService {
                name: self.config.name.clone(),
                characteristics: family.attributes().to_vec(),
                color_temperature: family
                    .exposes(Attribute::ColorTemperature)
                    .then_some(self.config.color_temperature),
            },
        }
    }
}
