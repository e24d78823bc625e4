//! Refresh signals telling other request workers to re-fetch a list.
//!
//! # Responsibility
//! - Define the outbound `RefreshPublisher` seam used by workflows.
//! - Provide a bounded, non-blocking broadcast implementation.
//!
//! # Invariants
//! - Publishing never blocks and never fails the calling workflow.
//! - No delivery or ordering guarantee relative to the originating write.

use crate::config::RefreshConfig;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// List scope a refresh signal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshModule {
    Reply,
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshAction {
    List,
}

/// Fire-and-forget "re-fetch `module`/`action`" broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefreshSignal {
    pub module: RefreshModule,
    pub action: RefreshAction,
}

impl RefreshSignal {
    pub const REPLY_LIST: Self = Self {
        module: RefreshModule::Reply,
        action: RefreshAction::List,
    };
    pub const NOTICE_LIST: Self = Self {
        module: RefreshModule::Notice,
        action: RefreshAction::List,
    };
}

/// Outbound refresh interface consumed by workflows.
pub trait RefreshPublisher {
    /// Publishes `signal`; returns how many listeners it reached.
    fn notify_refresh(&self, signal: RefreshSignal) -> usize;
}

/// Largest per-subscriber buffer a bus will allocate.
pub const MAX_REFRESH_CAPACITY: usize = 65_536;

/// Bounded broadcast channel fanning refresh signals out to subscribers.
///
/// Slow subscribers lag and lose the oldest signals instead of blocking
/// publishers.
#[derive(Debug, Clone)]
pub struct RefreshBus {
    sender: broadcast::Sender<RefreshSignal>,
}

impl RefreshBus {
    /// Creates a bus buffering up to `capacity` signals per subscriber.
    ///
    /// `capacity` is clamped into `1..=MAX_REFRESH_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let clamped = capacity.clamp(1, MAX_REFRESH_CAPACITY);
        if clamped != capacity {
            warn!(
                "event=refresh_bus module=refresh status=clamped requested={capacity} capacity={clamped}"
            );
        }
        let (sender, _) = broadcast::channel(clamped);
        Self { sender }
    }

    /// Builds a bus sized by the `[refresh]` config section.
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.capacity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.sender.subscribe()
    }
}

impl RefreshPublisher for RefreshBus {
    fn notify_refresh(&self, signal: RefreshSignal) -> usize {
        match self.sender.send(signal) {
            Ok(reached) => {
                debug!(
                    "event=refresh_publish module=refresh status=ok target={:?} reached={reached}",
                    signal.module
                );
                reached
            }
            Err(_) => {
                debug!(
                    "event=refresh_publish module=refresh status=skip target={:?} reason=no_subscribers",
                    signal.module
                );
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RefreshBus, RefreshPublisher, RefreshSignal};
    use crate::config::RefreshConfig;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = RefreshBus::new(4);
        assert_eq!(bus.notify_refresh(RefreshSignal::REPLY_LIST), 0);
    }

    #[test]
    fn subscribers_receive_signals_in_publish_order() {
        let bus = RefreshBus::new(4);
        let mut rx = bus.subscribe();

        assert_eq!(bus.notify_refresh(RefreshSignal::REPLY_LIST), 1);
        assert_eq!(bus.notify_refresh(RefreshSignal::NOTICE_LIST), 1);

        assert_eq!(rx.try_recv().unwrap(), RefreshSignal::REPLY_LIST);
        assert_eq!(rx.try_recv().unwrap(), RefreshSignal::NOTICE_LIST);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn full_buffer_drops_oldest_instead_of_blocking() {
        let bus = RefreshBus::new(1);
        let mut rx = bus.subscribe();

        bus.notify_refresh(RefreshSignal::REPLY_LIST);
        bus.notify_refresh(RefreshSignal::NOTICE_LIST);

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
        assert_eq!(rx.try_recv().unwrap(), RefreshSignal::NOTICE_LIST);
    }

    #[test]
    fn oversized_capacity_is_clamped_instead_of_panicking() {
        let bus = RefreshBus::new(usize::MAX / 2 + 2);
        let mut rx = bus.subscribe();

        assert_eq!(bus.notify_refresh(RefreshSignal::REPLY_LIST), 1);
        assert_eq!(rx.try_recv().unwrap(), RefreshSignal::REPLY_LIST);
        assert_eq!(RefreshBus::new(0).notify_refresh(RefreshSignal::NOTICE_LIST), 0);
    }

    #[test]
    fn bus_from_config_uses_configured_capacity() {
        let bus = RefreshBus::from_config(&RefreshConfig { capacity: 2 });
        let mut rx = bus.subscribe();

        for _ in 0..3 {
            bus.notify_refresh(RefreshSignal::REPLY_LIST);
        }

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
    }
}
