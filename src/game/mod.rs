//! Machine Logic Module
//!
//! Everything a slot machine is made of, leaves first.
//!
//! ## Module Structure
//!
//! - `symbol`: interned reel symbols and the name table behind them
//! - `reel`: a single reel holding a palette and its landed symbol
//! - `events`: explicit publish/subscribe bus for the four machine signals
//! - `machine`: spin orchestration, completion tracking, match evaluation
//! - `observer`: logging listener standing in for a presentation layer

pub mod events;
pub mod machine;
pub mod observer;
pub mod reel;
pub mod symbol;

// Re-export key types
pub use events::{EventBus, Signal, SubscriptionId};
pub use machine::{MachineError, MachinePhase, SlotMachine, SpinOutcome};
pub use observer::LogObserver;
pub use reel::{Reel, ReelError};
pub use symbol::{Symbol, SymbolTable};
