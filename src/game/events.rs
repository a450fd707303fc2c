//! Machine Signals and Event Bus
//!
//! An explicitly constructed publish/subscribe channel carrying the four
//! payload-free machine signals. Nothing here is global: every machine (and
//! every test) builds its own bus, and listeners receive a handle rather
//! than reaching into process-wide state.
//!
//! ## Delivery semantics
//!
//! - `publish` invokes current subscribers synchronously, in subscription
//!   order.
//! - Subscribing during a publish defers the insertion: the new subscriber
//!   is not notified within the in-progress publish.
//! - Unsubscribing takes effect immediately, even mid-publish: once
//!   `unsubscribe` returns, the handler receives no further signals.
//! - Publishing from inside a handler is allowed; a handler is never
//!   re-entered recursively (a nested publish of the same signal skips the
//!   handler currently running).
//! - A handler returning an error is reported via `tracing` and never
//!   prevents later subscribers from being notified.
//!
//! The bus is single-threaded by design: the whole machine runs on one
//! cooperative execution context (see the crate docs), so handles are
//! `Rc`-backed and handlers need no synchronization.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The four machine signals.
///
/// Signals carry no payload; consumers re-query machine state for details
/// such as which symbols landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// A spin cycle started.
    SpinStart,
    /// One reel finished its spin.
    SpinEnd,
    /// All regular reels landed on the same symbol.
    MatchFound,
    /// The bonus reel matched as well.
    BonusApplied,
}

impl Signal {
    /// All signals, in a fixed order.
    pub const ALL: [Signal; 4] = [
        Signal::SpinStart,
        Signal::SpinEnd,
        Signal::MatchFound,
        Signal::BonusApplied,
    ];

    #[inline]
    fn channel(self) -> usize {
        match self {
            Signal::SpinStart => 0,
            Signal::SpinEnd => 1,
            Signal::MatchFound => 2,
            Signal::BonusApplied => 3,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::SpinStart => "SpinStart",
            Signal::SpinEnd => "SpinEnd",
            Signal::MatchFound => "MatchFound",
            Signal::BonusApplied => "BonusApplied",
        };
        f.write_str(name)
    }
}

/// Handle identifying one subscription, for later [`EventBus::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Boxed subscriber callback.
pub type Handler = Box<dyn FnMut() -> anyhow::Result<()>>;

struct Entry {
    id: u64,
    /// Taken out while the handler runs, so a nested publish skips it.
    handler: Option<Handler>,
    /// Tombstone set by mid-publish unsubscription; compacted afterwards.
    dead: bool,
}

#[derive(Default)]
struct BusInner {
    channels: [Vec<Entry>; 4],
    next_id: u64,
    publish_depth: u32,
    /// Subscriptions made during a publish, appended once it unwinds.
    pending: Vec<(usize, Entry)>,
}

/// Cheaply clonable handle to a signal bus.
///
/// Clones share the same subscriber lists, so a machine and its listeners
/// each hold a handle to one underlying bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    /// Create a fresh bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `signal`.
    ///
    /// Handlers subscribed while a publish of any signal is in progress are
    /// queued and start receiving signals once that publish completes.
    pub fn subscribe<F>(&self, signal: Signal, handler: F) -> SubscriptionId
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let entry = Entry {
            id,
            handler: Some(Box::new(handler)),
            dead: false,
        };
        let channel = signal.channel();
        if inner.publish_depth > 0 {
            inner.pending.push((channel, entry));
        } else {
            inner.channels[channel].push(entry);
        }
        SubscriptionId(id)
    }

    /// Remove a subscription.
    ///
    /// Returns whether the id was still live. After this returns, the
    /// handler is guaranteed to receive no further signals - including the
    /// remainder of a publish currently in progress.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();

        if let Some(pos) = inner.pending.iter().position(|(_, e)| e.id == id.0) {
            inner.pending.remove(pos);
            return true;
        }

        let depth = inner.publish_depth;
        for channel in inner.channels.iter_mut() {
            if let Some(pos) = channel.iter().position(|e| e.id == id.0 && !e.dead) {
                if depth > 0 {
                    // Mid-publish: tombstone in place so indices held by the
                    // publish loop stay valid; compacted when it unwinds.
                    channel[pos].dead = true;
                    channel[pos].handler = None;
                } else {
                    channel.remove(pos);
                }
                return true;
            }
        }
        false
    }

    /// Number of live subscribers for a signal.
    pub fn subscriber_count(&self, signal: Signal) -> usize {
        let inner = self.inner.borrow();
        let channel = signal.channel();
        inner.channels[channel].iter().filter(|e| !e.dead).count()
            + inner.pending.iter().filter(|(c, _)| *c == channel).count()
    }

    /// Publish a signal to all current subscribers, in subscription order.
    ///
    /// Subscriber failures are reported via `tracing::warn!` and do not
    /// stop delivery to later subscribers.
    pub fn publish(&self, signal: Signal) {
        let channel = signal.channel();
        self.inner.borrow_mut().publish_depth += 1;

        let mut index = 0;
        loop {
            // Take the handler out of the bus so the borrow is released
            // while it runs; handlers may freely use this same bus.
            let taken = {
                let mut inner = self.inner.borrow_mut();
                let entries = &mut inner.channels[channel];
                if index >= entries.len() {
                    break;
                }
                let entry = &mut entries[index];
                if entry.dead {
                    None
                } else {
                    entry.handler.take().map(|handler| (entry.id, handler))
                }
            };

            if let Some((id, mut handler)) = taken {
                if let Err(error) = handler() {
                    warn!(signal = %signal, subscriber = id, %error, "event subscriber failed");
                }

                // Entries are only appended or tombstoned during a publish,
                // so the index still refers to the same entry.
                let mut inner = self.inner.borrow_mut();
                if let Some(entry) = inner.channels[channel].get_mut(index) {
                    if entry.id == id && !entry.dead {
                        entry.handler = Some(handler);
                    }
                }
            }
            index += 1;
        }

        let mut inner = self.inner.borrow_mut();
        inner.publish_depth -= 1;
        if inner.publish_depth == 0 {
            for entries in inner.channels.iter_mut() {
                entries.retain(|e| !e.dead);
            }
            let pending = std::mem::take(&mut inner.pending);
            for (chan, entry) in pending {
                inner.channels[chan].push(entry);
            }
        }
    }
}
