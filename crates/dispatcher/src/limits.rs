use std::time::Duration;

pub const PROCESSES_ENV: &str = "WORDFREQ_PROCESSES";
pub const REPLY_TIMEOUT_ENV: &str = "WORDFREQ_REPLY_TIMEOUT_MS";

/// Dispatcher plus at least one worker
pub const MIN_PROCESSES: usize = 2;
pub const MAX_PROCESSES: usize = 65;

pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 30_000;
const MAX_REPLY_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

fn default_processes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(MIN_PROCESSES, MAX_PROCESSES)
}

fn parse_processes(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(MIN_PROCESSES, MAX_PROCESSES)
}

fn parse_reply_timeout_ms(raw: Option<&str>) -> u64 {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_REPLY_TIMEOUT_MS)
        .clamp(1, MAX_REPLY_TIMEOUT_MS)
}

/// Total process count (dispatcher included) from the environment
pub fn processes_from_env() -> usize {
    let raw = std::env::var(PROCESSES_ENV).ok();
    parse_processes(raw.as_deref(), default_processes())
}

/// Liveness deadline for one outstanding request, from the environment
pub fn reply_timeout_from_env() -> Duration {
    let raw = std::env::var(REPLY_TIMEOUT_ENV).ok();
    Duration::from_millis(parse_reply_timeout_ms(raw.as_deref()))
}
