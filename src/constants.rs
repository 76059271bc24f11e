//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Chat completions endpoint for the OpenAI API.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model identifier for generation requests.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for generation requests.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Response token cap per generation request.
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Total API attempts per call (1 initial + 3 retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Initial backoff delay in seconds before the first retry.
/// Doubles on each subsequent retry (1, 2, 4).
pub const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 1;

/// Upper bound on a single backoff sleep.
pub const MAX_BACKOFF_SECS: u64 = 30;

/// HTTP request timeout in seconds for API calls.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Domain used when deriving a placeholder recipient address.
pub const DEFAULT_RECIPIENT_DOMAIN: &str = "example.com";

// === UI Constants ===

/// Input poll timeout in milliseconds for the event loop.
pub const POLL_TIMEOUT_MS: u64 = 150;

/// Fixed width of the customer table pane in columns.
pub const TABLE_PANE_WIDTH: u16 = 44;

/// Minimum terminal width to show split view (table + detail).
/// Below this width, only the customer table is shown.
pub const MIN_SPLIT_VIEW_WIDTH: u16 = 80;
