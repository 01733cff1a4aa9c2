//! The seam between the engine and the bridge transport.

use std::future::Future;
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::command::BridgeCommand;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Delivers commands to a bridge.
///
/// Implementations own framing, repeats and retries. The engine never
/// retries: an `Err` is logged and recorded against the connection, and the
/// attribute change is considered sent.
pub trait BridgeCommandSink: Send + Sync + 'static {
    /// Queue a command for the bridge.
    fn send_command(&self, command: &BridgeCommand) -> impl Future<Output = Result<()>> + Send;

    /// Delay the next command sent on this sink.
    fn pause(&self, duration: Duration) -> impl Future<Output = Result<()>> + Send;
}

/// An item forwarded by a [`ChannelSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound {
    Command(BridgeCommand),
    Pause(Duration),
}

/// A sink that forwards commands and pauses to a transport task over an
/// unbounded channel, preserving their order.
///
/// # Example
///
/// ```
/// use futures::StreamExt;
/// use milight_accessory_rs::{BulbFamily, ChannelSink, CommandFactory, MilightCommands, Zone};
/// use milight_accessory_rs::{BridgeCommandSink, Outbound};
///
/// # futures::executor::block_on(async {
/// let (sink, mut rx) = ChannelSink::new("bridge-1");
/// let on = MilightCommands::new(BulbFamily::RGBW).on(Zone::new(1).unwrap());
/// sink.send_command(&on).await.unwrap();
/// assert_eq!(rx.next().await, Some(Outbound::Command(on)));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    name: String,
    tx: UnboundedSender<Outbound>,
}

impl ChannelSink {
    pub fn new(name: &str) -> (Self, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded();
        (
            ChannelSink {
                name: name.to_string(),
                tx,
            },
            rx,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, item: Outbound) -> Result<()> {
        self.tx
            .unbounded_send(item)
            .map_err(|_| Error::transport(&self.name, "transport channel closed"))
    }
}

impl BridgeCommandSink for ChannelSink {
    async fn send_command(&self, command: &BridgeCommand) -> Result<()> {
        self.forward(Outbound::Command(*command))
    }

    async fn pause(&self, duration: Duration) -> Result<()> {
        self.forward(Outbound::Pause(duration))
    }
}
