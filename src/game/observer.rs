//! Log Observer
//!
//! A listener standing in for the presentation layer: it renders the four
//! machine signals as log lines. In the original game this was the UI
//! component printing "Match Found!"; here it is the reference example of
//! wiring a listener to the bus with an explicit lifecycle.

use tracing::{debug, info};

use crate::game::events::{EventBus, Signal, SubscriptionId};

/// Logs every machine signal via `tracing`.
pub struct LogObserver {
    bus: EventBus,
    subscriptions: Vec<SubscriptionId>,
}

impl LogObserver {
    /// Create an observer for the given bus. Inert until initialized.
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            subscriptions: Vec::new(),
        }
    }

    /// Subscribe to all four signals. Idempotent.
    ///
    /// Per-reel `SpinEnd` chatter logs at debug; the cycle-level signals at
    /// info.
    pub fn initialize(&mut self) {
        if !self.subscriptions.is_empty() {
            return;
        }
        self.subscriptions.push(self.bus.subscribe(Signal::SpinStart, || {
            info!("spinning started");
            Ok(())
        }));
        self.subscriptions.push(self.bus.subscribe(Signal::SpinEnd, || {
            debug!("reel stopped");
            Ok(())
        }));
        self.subscriptions.push(self.bus.subscribe(Signal::MatchFound, || {
            info!("match found!");
            Ok(())
        }));
        self.subscriptions.push(self.bus.subscribe(Signal::BonusApplied, || {
            info!("bonus applied!");
            Ok(())
        }));
    }

    /// Unsubscribe from everything. Idempotent.
    pub fn shutdown(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
    }

    /// Whether the observer is currently subscribed.
    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let bus = EventBus::new();
        let mut observer = LogObserver::new(bus.clone());
        assert!(!observer.is_active());

        observer.initialize();
        assert!(observer.is_active());
        assert_eq!(bus.subscriber_count(Signal::SpinStart), 1);

        // Idempotent
        observer.initialize();
        assert_eq!(bus.subscriber_count(Signal::SpinStart), 1);

        observer.shutdown();
        assert!(!observer.is_active());
        assert_eq!(bus.subscriber_count(Signal::SpinStart), 0);
        assert_eq!(bus.subscriber_count(Signal::MatchFound), 0);
    }

    #[test]
    fn test_signals_flow_without_panicking() {
        let bus = EventBus::new();
        let mut observer = LogObserver::new(bus.clone());
        observer.initialize();

        for signal in Signal::ALL {
            bus.publish(signal);
        }
    }
}
