/// Configures HTTP timeouts and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Linear backoff step in milliseconds; `0` disables the delay.
    pub retry_delay_increase_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 2_000,
            max_retries: crate::retry::MAX_RETRIES,
            retry_delay_increase_ms: crate::retry::DELAY_INCREASE_MS,
        }
    }
}
