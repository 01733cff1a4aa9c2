//! Command history tracking for debugging and diagnostics.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::command::BridgeCommand;

/// What happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryEvent {
    Command { command: BridgeCommand },
    Pause { millis: u64 },
    Error { message: String },
}

/// A recorded event in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event: HistoryEvent,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Tracks what a bridge connection sent, for debugging.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
    command_count: usize,
    pause_count: usize,
    error_count: usize,
    last_error: Option<String>,
    start_time: Instant,
    max_entries: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            command_count: 0,
            pause_count: 0,
            error_count: 0,
            last_error: None,
            start_time: Instant::now(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    pub fn record_command(&mut self, command: &BridgeCommand) {
        self.command_count += 1;
        self.push(HistoryEvent::Command { command: *command });
    }

    pub fn record_pause(&mut self, millis: u64) {
        self.pause_count += 1;
        self.push(HistoryEvent::Pause { millis });
    }

    pub fn record_error(&mut self, error: &str) {
        self.error_count += 1;
        self.last_error = Some(error.to_string());
        self.push(HistoryEvent::Error {
            message: error.to_string(),
        });
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Commands still held in the history, oldest first.
    pub fn commands(&self) -> Vec<BridgeCommand> {
        self.entries
            .iter()
            .filter_map(|e| match &e.event {
                HistoryEvent::Command { command } => Some(*command),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.command_count = 0;
        self.pause_count = 0;
        self.error_count = 0;
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            command_count: self.command_count,
            pause_count: self.pause_count,
            error_count: self.error_count,
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }

    fn push(&mut self, event: HistoryEvent) {
        self.entries.push_back(HistoryEntry {
            event,
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

/// Summary of command history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub command_count: usize,
    pub pause_count: usize,
    pub error_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}
