//! Shared bridge connection context.

use std::fmt;

use log::{debug, error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::Step;
use crate::history::CommandHistory;
use crate::runtime::Mutex;
use crate::sink::BridgeCommandSink;
use crate::types::{BulbFamily, Zone};

/// The family and zone a bridge is currently addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub family: BulbFamily,
    pub zone: Zone,
}

impl Address {
    pub fn new(family: BulbFamily, zone: Zone) -> Self {
        Address { family, zone }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.zone)
    }
}

struct ConnectionState {
    last_addressed: Option<Address>,
    history: CommandHistory,
}

/// One bridge connection, shared by every accessory bound to it.
///
/// The connection owns the `last_addressed` marker. Reconciliation passes run
/// one at a time per connection: a pass holds the connection for the whole
/// plan-and-send sequence, so the marker always describes what the bridge was
/// last sent.
pub struct BridgeConnection<S> {
    id: Uuid,
    name: String,
    sink: S,
    state: Mutex<ConnectionState>,
}

impl<S: fmt::Debug> fmt::Debug for BridgeConnection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConnection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("sink", &self.sink)
            .finish()
    }
}

impl<S: BridgeCommandSink> BridgeConnection<S> {
    pub fn new(name: &str, sink: S) -> Self {
        BridgeConnection {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sink,
            state: Mutex::new(ConnectionState {
                last_addressed: None,
                history: CommandHistory::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn last_addressed(&self) -> Option<Address> {
        self.state.lock().await.last_addressed
    }

    pub async fn history(&self) -> CommandHistory {
        self.state.lock().await.history.clone()
    }

    pub async fn clear_history(&self) {
        self.state.lock().await.history.clear();
    }

    /// Most recent transport failure reported by the sink.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.history.last_error().map(String::from)
    }

    /// Plan a pass against the addressing marker and send the result, holding
    /// the connection for both.
    pub(crate) async fn run<F>(&self, plan: F) -> Vec<Step>
    where
        F: FnOnce(&mut Option<Address>) -> Vec<Step>,
    {
        let mut state = self.state.lock().await;
        let steps = plan(&mut state.last_addressed);

        for step in &steps {
            let result = match step {
                Step::Send(command) => {
                    debug!("[{}] sending {}", self.name, command);
                    state.history.record_command(command);
                    self.sink.send_command(command).await
                }
                Step::Pause(duration) => {
                    state.history.record_pause(duration.as_millis() as u64);
                    self.sink.pause(*duration).await
                }
            };

            if let Err(e) = result {
                error!("[{}] transport failure: {}", self.name, e);
                state.history.record_error(&e.to_string());
            }
        }

        steps
    }
}
