//! # Engine configuration.
//!
//! [`Config`] centralizes the few runtime knobs the engine exposes.
//! Per-task behavior (exclusion group, stop timeout) lives on
//! [`TaskOptions`](crate::TaskOptions) at registration instead.

use std::time::Duration;

/// Grace period granted to a cooperative stop before the task is forcibly
/// terminated, unless overridden at registration.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Configuration for an [`Engine`](crate::Engine).
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Subscribers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration: `bus_capacity = 1024`.
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}
