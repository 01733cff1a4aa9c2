//! # milight_accessory_rs
//!
//! An async Rust library that turns home-automation attribute changes into
//! MiLight bridge command sequences.
//!
//! MiLight bulbs have no addressable state: the bridge only understands
//! one-way commands such as "on", "brightness up" or "night mode" sent to a
//! family and zone. This crate keeps a cached model of every accessory,
//! coalesces bursts of changes with a debounce timer, and plans the commands
//! each bulb family needs to reach the requested state.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use milight_accessory_rs::{
//!     Accessory, AttributeChange, BridgeConnection, ChannelSink, PlatformConfig,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), milight_accessory_rs::Error> {
//! let config = PlatformConfig::from_json(
//!     r#"{"ip_address": "192.168.1.20", "type": "fullColor", "zones": ["Desk"]}"#,
//! )?;
//! let (bridges, _errors) = config.validate();
//!
//! for bridge in bridges {
//!     // Commands come out of `_commands` in the order they must be sent.
//!     let (sink, _commands) = ChannelSink::new(&bridge.bridge.identity());
//!     let connection = Arc::new(BridgeConnection::new(&bridge.bridge.identity(), sink));
//!
//!     for accessory in bridge.accessories {
//!         let lamp = Accessory::new(accessory, Arc::clone(&connection))?;
//!         lamp.request_change(AttributeChange::Hue(200)).await;
//!         lamp.flush().await;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Bulb Families**: RGBW, RGB, White, Full Color and the bridge lamp, see [`BulbFamily`]
//! - **Debouncing**: Bursts of changes become one reconcile pass, see [`Debouncer`]
//! - **Night Mode**: Very low brightness switches supporting bulbs into night mode
//! - **Relative Control**: Step-based brightness and color temperature for bulbs without absolute levels
//! - **Shared Bridges**: Zones on one bridge share addressing through a [`BridgeConnection`]
//! - **Pluggable Transport**: Implement [`BridgeCommandSink`] or use the bundled [`ChannelSink`]
//! - **Command History**: Every command, pause and transport failure is recorded in a [`CommandHistory`]
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! milight-accessory-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! milight-accessory-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! milight-accessory-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod accessory;
mod command;
mod config;
mod connection;
mod engine;
mod errors;
mod history;
pub mod runtime;
mod scheduler;
mod sink;
mod state;
mod types;

// Re-export public API
pub use accessory::{
    Accessory, AccessoryInformation, Characteristics, LightbulbService, Services,
};
pub use command::{BridgeCommand, CommandFactory, MilightCommands, Operation, validate_factory};
pub use config::{AccessoryConfig, BridgeConfig, DEFAULT_DEBOUNCE, PlatformConfig, ValidatedBridge};
pub use connection::{Address, BridgeConnection};
pub use engine::{Engine, Step};
pub use errors::Error;
pub use history::{CommandHistory, HistoryEntry, HistoryEvent, HistorySummary};
pub use scheduler::Debouncer;
pub use sink::{BridgeCommandSink, ChannelSink, Outbound};
pub use state::AccessoryState;
pub use types::{Attribute, AttributeChange, BulbFamily, DesiredState, MiredRange, Zone};
