//! # Runtime Configuration
//!
//! Environment-driven settings for the `may` coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `PET_LOOKUP_STACK_SIZE`
//!
//! Stack size for handler coroutines. Accepts decimal (`65536`) or
//! hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! The SQLite lookup runs on the handler coroutine, so the stack has to hold
//! the statement preparation and row decoding frames. 64 KB leaves headroom;
//! going below `0x8000` is not recommended.
//!
//! ```bash
//! export PET_LOOKUP_STACK_SIZE=0x20000
//! pet-lookup serve
//! ```

use std::env;

/// Environment variable holding the coroutine stack size.
pub const STACK_SIZE_ENV: &str = "PET_LOOKUP_STACK_SIZE";

/// Default handler coroutine stack size (64 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var(STACK_SIZE_ENV)
            .ok()
            .and_then(|val| parse_stack_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply the settings to the global `may` runtime.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse a stack size given in decimal or `0x`-prefixed hexadecimal.
#[must_use]
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!(parse_stack_size("0x8000"), Some(0x8000));
        assert_eq!(parse_stack_size("32768"), Some(32768));
        assert_eq!(parse_stack_size(" 0X10 "), Some(16));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_stack_size("big"), None);
        assert_eq!(parse_stack_size("0xzz"), None);
    }

    #[test]
    fn test_default_stack_size() {
        assert_eq!(RuntimeConfig::default().stack_size, 0x10000);
    }
}
