use crate::limits::{self, MAX_PROCESSES, MIN_PROCESSES};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wordfreq_chunker::ChunkerConfig;

/// Frames buffered per inbox; an assignment is five frames
const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Configuration of one distributed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Total processes, dispatcher included
    pub processes: usize,

    pub chunker: ChunkerConfig,

    /// How long a posted receive may stay unanswered
    pub reply_timeout: Duration,

    pub channel_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            processes: MIN_PROCESSES,
            chunker: ChunkerConfig::default(),
            reply_timeout: Duration::from_millis(limits::DEFAULT_REPLY_TIMEOUT_MS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl DispatchConfig {
    /// Defaults overridden by `WORDFREQ_PROCESSES` and `WORDFREQ_REPLY_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self {
            processes: limits::processes_from_env(),
            reply_timeout: limits::reply_timeout_from_env(),
            ..Default::default()
        }
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunker.chunk_size = chunk_size;
        self
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Worker slots
    pub fn workers(&self) -> usize {
        self.processes.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.processes < MIN_PROCESSES {
            return Err(format!(
                "at least {MIN_PROCESSES} processes are required, got {}",
                self.processes
            ));
        }
        if self.processes > MAX_PROCESSES {
            return Err(format!(
                "processes ({}) cannot exceed {MAX_PROCESSES}",
                self.processes
            ));
        }
        if self.reply_timeout.is_zero() {
            return Err("reply_timeout must be > 0".to_string());
        }
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be > 0".to_string());
        }
        self.chunker.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = DispatchConfig::default();
        assert_eq!(config.workers(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let base = DispatchConfig::default();
        assert!(base.with_processes(1).validate().is_err());
        assert!(base.with_processes(MAX_PROCESSES + 1).validate().is_err());
        assert!(base.with_chunk_size(0).validate().is_err());
        assert!(base.with_reply_timeout(Duration::ZERO).validate().is_err());
        assert!(base.with_processes(4).with_chunk_size(16).validate().is_ok());
    }
}
