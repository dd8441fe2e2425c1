//! Observer hook for lifecycle events.
//!
//! An [`Observer`] receives every [`Event`] the engine publishes, in
//! publish order, from a dedicated listener task (see
//! [`Engine::observe`](crate::Engine::observe)). For ad-hoc consumption
//! prefer [`Engine::subscribe`](crate::Engine::subscribe) and drive the
//! receiver yourself.

use async_trait::async_trait;

use crate::events::Event;

/// Hook into task lifecycle events (logging, metrics, UI marshalling).
#[async_trait]
pub trait Observer: Send + Sync {
    /// Called for every published event, in publish order.
    async fn on_event(&self, event: &Event);
}

/// Base observer that forwards events to the `log` facade.
///
/// Enabled via the `logging` feature. Useful for demos and debugging.
#[cfg(feature = "logging")]
pub struct LogObserver;

#[cfg(feature = "logging")]
#[async_trait]
impl Observer for LogObserver {
    async fn on_event(&self, e: &Event) {
        use crate::events::EventKind;

        match e.kind {
            EventKind::TaskStarted => {
                log::info!("[started] id={} type={} args={:?}", e.id, e.ttype, e.args);
            }
            EventKind::TaskFinished => {
                log::info!("[finished] id={} type={} result={:?}", e.id, e.ttype, e.result);
            }
            EventKind::TaskTerminated => {
                log::warn!("[terminated] id={} type={}", e.id, e.ttype);
            }
        }
    }
}
