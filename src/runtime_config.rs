//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatcher's runtime
//! behavior.
//!
//! ## Environment Variables
//!
//! ### `TRELLIS_STACK_SIZE`
//!
//! Stack size for handler coroutines, in decimal (`16384`) or hexadecimal
//! (`0x4000`). Default: `0x4000` (16 KB). Total memory in coroutine mode
//! is `stack_size × concurrent_requests`; tune to handler complexity.
//!
//! ### `TRELLIS_DISPATCH_MODE`
//!
//! `blocking` runs each compiled handler inline on the calling thread;
//! `coroutine` spawns it on a `may` coroutine and completes through the
//! reply channel. Default: `blocking`.
//!
//! ## Usage
//!
//! ```rust
//! use trellis::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

/// How the dispatcher executes compiled handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Run the handler inline; `dispatch` returns once it has responded.
    #[default]
    Blocking,
    /// Spawn the handler on a coroutine; the response arrives through the
    /// reply channel.
    Coroutine,
}

/// Runtime configuration loaded from environment variables.
///
/// Load at startup with [`RuntimeConfig::from_env()`], or construct
/// directly for embedded use.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 16 KB).
    pub stack_size: usize,
    pub dispatch_mode: DispatchMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: 0x4000,
            dispatch_mode: DispatchMode::Blocking,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("TRELLIS_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(0x4000)
                } else {
                    val.parse().unwrap_or(0x4000)
                }
            }
            Err(_) => 0x4000,
        };
        let dispatch_mode = match env::var("TRELLIS_DISPATCH_MODE").as_deref() {
            Ok("coroutine") => DispatchMode::Coroutine,
            _ => DispatchMode::Blocking,
        };
        RuntimeConfig {
            stack_size,
            dispatch_mode,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }
}
