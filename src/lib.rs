//! # Slotsim
//!
//! Deterministic slot machine simulation core: spin a row of regular reels
//! plus one bonus reel, detect a full match across the regular reels, and
//! flag a bonus condition when the bonus reel lands on the same symbol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SLOTSIM                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  config.rs       - Machine configuration + validation        │
//! │                                                              │
//! │  game/           - Machine logic                             │
//! │  ├── symbol.rs   - Interned reel symbols                     │
//! │  ├── reel.rs     - Single reel: palette, spin, landing       │
//! │  ├── events.rs   - Explicit publish/subscribe event bus      │
//! │  ├── machine.rs  - Spin orchestration and match evaluation   │
//! │  └── observer.rs - Logging listener for the four signals     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution model
//!
//! There is no internal scheduler and no threading. Reel spins resolve after
//! a configured number of ticks; whoever owns the machine drives
//! [`SlotMachine::tick`] from its own loop (a frame loop, a timer, or a test
//! harness calling it directly). All completion signals and match
//! evaluation happen synchronously inside `tick`, so given the same seed and
//! the same tick sequence the outcome is identical on every platform.
//!
//! ## Signals
//!
//! Four payload-free signals flow over an explicitly constructed
//! [`EventBus`]: `SpinStart`, `SpinEnd` (one per reel), `MatchFound`, and
//! `BonusApplied`. Subscribers re-query machine state for details.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, EvalPolicy, MachineConfig};
pub use core::rng::DeterministicRng;
pub use game::events::{EventBus, Signal, SubscriptionId};
pub use game::machine::{MachineError, MachinePhase, SlotMachine, SpinOutcome};
pub use game::observer::LogObserver;
pub use game::reel::{Reel, ReelError};
pub use game::symbol::{Symbol, SymbolTable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal tick rate the default durations are calibrated against (Hz)
pub const TICK_RATE: u32 = 60;

/// Default spin duration in ticks (two seconds at [`TICK_RATE`])
pub const DEFAULT_SPIN_TICKS: u32 = 120;
