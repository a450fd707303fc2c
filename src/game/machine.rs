//! Machine Controller
//!
//! Owns the regular reels, the bonus reel and the RNG; orchestrates spin
//! cycles and evaluates the match rule. The controller learns about reel
//! completions the same way any other listener does - through a `SpinEnd`
//! subscription on the bus - so its wiring mirrors the presentation layer's.
//!
//! ## Spin cycle
//!
//! `start_spin` publishes `SpinStart` and arms every reel. The owner then
//! drives [`SlotMachine::tick`]; each reel completion publishes one
//! `SpinEnd`, which triggers match evaluation per the configured
//! [`EvalPolicy`]. A full match publishes `MatchFound`, and `BonusApplied`
//! on top when the bonus reel agrees. Once every reel of the generation has
//! landed the machine returns to `Idle` and accepts the next spin.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, EvalPolicy, MachineConfig};
use crate::core::rng::{derive_seed, DeterministicRng};
use crate::game::events::{EventBus, Signal, SubscriptionId};
use crate::game::reel::{Reel, ReelError};
use crate::game::symbol::{Symbol, SymbolTable};

/// Machine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// `start_spin` called while a spin cycle is still running.
    #[error("spin already in progress")]
    SpinInProgress,

    /// Regular reel index out of range.
    #[error("no reel at index {0}")]
    NoSuchReel(usize),

    /// Reel-level failure (rigging a foreign symbol).
    #[error(transparent)]
    Reel(#[from] ReelError),
}

/// Controller state, per spin cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachinePhase {
    /// Ready to accept `start_spin`.
    Idle,
    /// Reels are in flight.
    Spinning,
    /// The match check has run for the current generation.
    Evaluated,
}

/// Result of one match evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Spin generation this outcome belongs to.
    pub generation: u64,
    /// Common symbol across all regular reels, if they matched.
    pub matched: Option<Symbol>,
    /// Whether the bonus reel matched too.
    pub bonus: bool,
}

struct MachineCore {
    symbols: SymbolTable,
    reels: Vec<Reel>,
    bonus: Reel,
    rng: DeterministicRng,
    phase: MachinePhase,
    /// Bumped on every `start_spin`.
    generation: u64,
    /// Reel completions observed this generation (regular + bonus).
    completed: usize,
    /// Generation the gated policy has already evaluated.
    evaluated_generation: Option<u64>,
    last_outcome: Option<SpinOutcome>,
    spin_ticks: u32,
    stagger_ticks: u32,
    policy: EvalPolicy,
}

impl MachineCore {
    fn total_reels(&self) -> usize {
        self.reels.len() + 1
    }

    /// Advance every reel one tick; returns the number of completions.
    fn advance_reels(&mut self) -> usize {
        let mut completions = 0;
        let MachineCore {
            reels, bonus, rng, ..
        } = self;
        for reel in reels.iter_mut() {
            if reel.tick(rng) {
                completions += 1;
            }
        }
        if bonus.tick(rng) {
            completions += 1;
        }
        self.completed += completions;
        completions
    }

    /// Run the match check for one `SpinEnd`, honoring the gating policy.
    ///
    /// Returns `None` when the gate keeps the check from running at all.
    /// A reel that has not completed yet contributes an undefined symbol,
    /// which reports "no match" rather than faulting.
    fn evaluate(&mut self) -> Option<SpinOutcome> {
        match self.policy {
            EvalPolicy::AfterAllReels => {
                if self.completed < self.total_reels()
                    || self.evaluated_generation == Some(self.generation)
                {
                    return None;
                }
            }
            EvalPolicy::EveryCompletion => {}
        }
        self.evaluated_generation = Some(self.generation);

        let symbols: Vec<Option<Symbol>> = self.reels.iter().map(Reel::current_symbol).collect();
        let matched = match symbols.split_first() {
            Some((Some(first), rest)) if rest.iter().all(|s| *s == Some(*first)) => Some(*first),
            _ => None,
        };
        let bonus = matched.is_some() && self.bonus.current_symbol() == matched;

        self.phase = MachinePhase::Evaluated;
        let outcome = SpinOutcome {
            generation: self.generation,
            matched,
            bonus,
        };
        self.last_outcome = Some(outcome);
        Some(outcome)
    }
}

/// The machine controller.
///
/// Lifecycle is explicit: [`initialize`](SlotMachine::initialize) wires the
/// match evaluator to the bus and [`shutdown`](SlotMachine::shutdown)
/// unwires it, called deterministically by the owning process rather than
/// implicitly by a host runtime. A machine that was never initialized still
/// spins; it just never evaluates matches.
pub struct SlotMachine {
    core: Rc<RefCell<MachineCore>>,
    bus: EventBus,
    eval_sub: Option<SubscriptionId>,
}

impl SlotMachine {
    /// Build a machine from validated configuration.
    ///
    /// Interns every configured symbol name, constructs the reels, and
    /// seeds the RNG (explicit seed, or derived from the machine label).
    pub fn from_config(config: &MachineConfig, bus: EventBus) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut symbols = SymbolTable::new();
        let mut reels = Vec::with_capacity(config.reels.len());
        for palette in &config.reels {
            let palette: Vec<Symbol> = palette.iter().map(|name| symbols.intern(name)).collect();
            reels.push(Reel::new(palette)?);
        }
        let bonus_palette: Vec<Symbol> = config
            .bonus_reel
            .iter()
            .map(|name| symbols.intern(name))
            .collect();
        let bonus = Reel::new(bonus_palette)?;

        let seed = config.rng_seed.unwrap_or_else(|| derive_seed(&config.label));

        let core = MachineCore {
            symbols,
            reels,
            bonus,
            rng: DeterministicRng::new(seed),
            phase: MachinePhase::Idle,
            generation: 0,
            completed: 0,
            evaluated_generation: None,
            last_outcome: None,
            spin_ticks: config.spin_duration_ticks,
            stagger_ticks: config.stop_stagger_ticks,
            policy: config.evaluation,
        };

        Ok(Self {
            core: Rc::new(RefCell::new(core)),
            bus,
            eval_sub: None,
        })
    }

    /// Subscribe the match evaluator to `SpinEnd`. Idempotent.
    pub fn initialize(&mut self) {
        if self.eval_sub.is_some() {
            return;
        }
        let core = Rc::clone(&self.core);
        let bus = self.bus.clone();
        self.eval_sub = Some(self.bus.subscribe(Signal::SpinEnd, move || {
            // Borrow ends before any publish below; MatchFound handlers may
            // query the machine freely.
            let outcome = core.borrow_mut().evaluate();
            if let Some(outcome) = outcome {
                if outcome.matched.is_some() {
                    bus.publish(Signal::MatchFound);
                    if outcome.bonus {
                        bus.publish(Signal::BonusApplied);
                    }
                }
            }
            Ok(())
        }));
    }

    /// Unsubscribe the match evaluator. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(id) = self.eval_sub.take() {
            self.bus.unsubscribe(id);
        }
    }

    /// Start a spin cycle.
    ///
    /// Publishes `SpinStart` exactly once, then arms every regular reel and
    /// the bonus reel. Rejected unless the machine is idle.
    pub fn start_spin(&mut self) -> Result<(), MachineError> {
        {
            let core = self.core.borrow();
            if core.phase != MachinePhase::Idle {
                return Err(MachineError::SpinInProgress);
            }
        }

        self.bus.publish(Signal::SpinStart);

        let mut core = self.core.borrow_mut();
        core.generation += 1;
        core.completed = 0;
        core.phase = MachinePhase::Spinning;

        let base = core.spin_ticks;
        let stagger = core.stagger_ticks;
        for (i, reel) in core.reels.iter_mut().enumerate() {
            reel.begin_spin(base + stagger * i as u32);
        }
        let bonus_slot = core.reels.len() as u32;
        core.bonus.begin_spin(base + stagger * bonus_slot);

        debug!(generation = core.generation, "spin cycle started");
        Ok(())
    }

    /// Advance every reel one tick, publishing `SpinEnd` per completion.
    ///
    /// No ordering is guaranteed between individual reel completions; with
    /// a stop stagger of zero they all land on the same tick.
    pub fn tick(&mut self) {
        let completions = {
            let mut core = self.core.borrow_mut();
            core.advance_reels()
        };

        for _ in 0..completions {
            self.bus.publish(Signal::SpinEnd);
        }

        let mut core = self.core.borrow_mut();
        if core.phase != MachinePhase::Idle && core.completed == core.total_reels() {
            core.phase = MachinePhase::Idle;
        }
    }

    /// Current controller phase.
    pub fn phase(&self) -> MachinePhase {
        self.core.borrow().phase
    }

    /// Current spin generation (0 before the first spin).
    pub fn generation(&self) -> u64 {
        self.core.borrow().generation
    }

    /// Number of regular reels.
    pub fn reel_count(&self) -> usize {
        self.core.borrow().reels.len()
    }

    /// Landed symbols of the regular reels, in reel order.
    pub fn current_symbols(&self) -> Vec<Option<Symbol>> {
        self.core
            .borrow()
            .reels
            .iter()
            .map(Reel::current_symbol)
            .collect()
    }

    /// Landed symbol of the bonus reel.
    pub fn bonus_symbol(&self) -> Option<Symbol> {
        self.core.borrow().bonus.current_symbol()
    }

    /// Outcome of the most recent match evaluation.
    pub fn last_outcome(&self) -> Option<SpinOutcome> {
        self.core.borrow().last_outcome
    }

    /// Resolve a configured symbol name.
    pub fn symbol_named(&self, name: &str) -> Option<Symbol> {
        self.core.borrow().symbols.lookup(name)
    }

    /// Name of a symbol on this machine.
    pub fn symbol_name(&self, symbol: Symbol) -> Option<String> {
        self.core.borrow().symbols.name(symbol).map(str::to_owned)
    }

    /// Handle to the machine's bus, for additional listeners.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Test seam: force regular reel `index` to land on `symbol` next.
    pub fn rig_reel(&mut self, index: usize, symbol: Symbol) -> Result<(), MachineError> {
        let mut core = self.core.borrow_mut();
        let reel = core
            .reels
            .get_mut(index)
            .ok_or(MachineError::NoSuchReel(index))?;
        reel.rig_next(symbol)?;
        Ok(())
    }

    /// Test seam: force the bonus reel to land on `symbol` next.
    pub fn rig_bonus(&mut self, symbol: Symbol) -> Result<(), MachineError> {
        self.core.borrow_mut().bonus.rig_next(symbol)?;
        Ok(())
    }
}

impl Drop for SlotMachine {
    /// Releases the evaluator subscription; the bus would otherwise keep
    /// the machine core alive through the closure.
    fn drop(&mut self) {
        self.shutdown();
    }
}
