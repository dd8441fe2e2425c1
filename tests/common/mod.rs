//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::timeout;

use tasklane::{current_stop_flag, Event};

/// Receives the next event, failing the test after a generous window.
pub async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed")
}

/// A cooperative callable: polls its stop flag every 10 ms and returns
/// `result` once the flag is raised.
pub fn poll_until_stopped(result: i64) -> impl Fn() -> i64 + Send + Sync + 'static {
    move || {
        let stop = current_stop_flag();
        loop {
            if stop.as_ref().is_some_and(|flag| flag.is_set()) {
                return result;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// An uncooperative callable: ignores its stop flag and just burns time.
pub fn ignore_stop_for(total: Duration) -> impl Fn() + Send + Sync + 'static {
    move || {
        let deadline = Instant::now() + total;
        while Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// A callable that sleeps once and returns.
pub fn sleeper(duration: Duration) -> impl Fn() + Send + Sync + 'static {
    move || thread::sleep(duration)
}
