//! Single Reel
//!
//! A reel holds a fixed palette of symbols. A spin arms a tick countdown;
//! on the completing tick the reel lands on a uniformly random palette entry
//! (or a rigged one) and reports completion exactly once. The reel never
//! knows how ticks are produced - a frame loop, a timer, or a test harness
//! all look the same from here.

use thiserror::Error;

use crate::core::rng::DeterministicRng;
use crate::game::symbol::Symbol;

/// Reel errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReelError {
    /// Reel constructed with an empty palette.
    #[error("reel palette must not be empty")]
    EmptyPalette,

    /// Rigged symbol is not a member of the reel's palette.
    #[error("symbol is not in this reel's palette")]
    SymbolNotInPalette,
}

/// A single spinning reel.
///
/// Invariant: after any completed spin, the current symbol is a member of
/// the palette.
#[derive(Clone, Debug)]
pub struct Reel {
    /// Fixed, non-empty symbol palette.
    palette: Vec<Symbol>,

    /// Most recently landed symbol; `None` until the first spin completes.
    current: Option<Symbol>,

    /// Ticks left on the running spin.
    ticks_remaining: u32,

    /// Whether a spin is in flight.
    spinning: bool,

    /// Test seam: forced landing symbol for the next completion.
    rigged: Option<Symbol>,
}

impl Reel {
    /// Create a reel from a palette.
    ///
    /// An empty palette is rejected here, at construction time, rather than
    /// faulting on the first spin.
    pub fn new(palette: Vec<Symbol>) -> Result<Self, ReelError> {
        if palette.is_empty() {
            return Err(ReelError::EmptyPalette);
        }
        Ok(Self {
            palette,
            current: None,
            ticks_remaining: 0,
            spinning: false,
            rigged: None,
        })
    }

    /// The reel's symbol palette.
    pub fn palette(&self) -> &[Symbol] {
        &self.palette
    }

    /// The most recently landed symbol, if any spin has completed yet.
    pub fn current_symbol(&self) -> Option<Symbol> {
        self.current
    }

    /// Whether a spin is currently in flight.
    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Arm a spin lasting `duration_ticks` ticks (at least one).
    ///
    /// Re-arming while a spin is in flight restarts the countdown; the
    /// superseded spin never completes.
    pub fn begin_spin(&mut self, duration_ticks: u32) {
        self.spinning = true;
        self.ticks_remaining = duration_ticks.max(1);
    }

    /// Force the next completion to land on `symbol`.
    ///
    /// One-shot: consumed by the next completing spin. The symbol must be a
    /// palette member so the membership invariant holds even for rigged
    /// spins.
    pub fn rig_next(&mut self, symbol: Symbol) -> Result<(), ReelError> {
        if !self.palette.contains(&symbol) {
            return Err(ReelError::SymbolNotInPalette);
        }
        self.rigged = Some(symbol);
        Ok(())
    }

    /// Advance the spin by one tick.
    ///
    /// Returns `true` exactly once per armed spin, on the tick the reel
    /// lands. The current symbol is updated before this returns, so a
    /// completion observer always sees the fresh value.
    pub fn tick(&mut self, rng: &mut DeterministicRng) -> bool {
        if !self.spinning {
            return false;
        }
        self.ticks_remaining -= 1;
        if self.ticks_remaining > 0 {
            return false;
        }

        let symbol = match self.rigged.take() {
            Some(symbol) => symbol,
            None => {
                let index = rng.next_int(self.palette.len() as u32) as usize;
                self.palette[index]
            }
        };
        self.current = Some(symbol);
        self.spinning = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::symbol::SymbolTable;
    use proptest::prelude::*;

    fn palette(names: &[&str]) -> (SymbolTable, Vec<Symbol>) {
        let mut table = SymbolTable::new();
        let symbols = names.iter().map(|n| table.intern(n)).collect();
        (table, symbols)
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Reel::new(Vec::new()), Err(ReelError::EmptyPalette)));
    }

    #[test]
    fn test_spin_completes_exactly_once() {
        let (_, symbols) = palette(&["Cherry", "Lemon", "Bell"]);
        let mut reel = Reel::new(symbols).unwrap();
        let mut rng = DeterministicRng::new(7);

        assert!(reel.current_symbol().is_none());

        reel.begin_spin(3);
        assert!(reel.is_spinning());
        assert!(!reel.tick(&mut rng));
        assert!(!reel.tick(&mut rng));
        assert!(reel.tick(&mut rng));

        assert!(!reel.is_spinning());
        assert!(reel.current_symbol().is_some());

        // No further completions without a new spin
        assert!(!reel.tick(&mut rng));
    }

    #[test]
    fn test_zero_duration_clamped() {
        let (_, symbols) = palette(&["Cherry"]);
        let mut reel = Reel::new(symbols).unwrap();
        let mut rng = DeterministicRng::new(1);

        reel.begin_spin(0);
        assert!(reel.tick(&mut rng));
    }

    #[test]
    fn test_rig_next_forces_landing() {
        let (mut table, symbols) = palette(&["Cherry", "Lemon", "Bell"]);
        let bell = table.lookup("Bell").unwrap();
        let mut reel = Reel::new(symbols).unwrap();
        let mut rng = DeterministicRng::new(99);

        reel.rig_next(bell).unwrap();
        reel.begin_spin(1);
        assert!(reel.tick(&mut rng));
        assert_eq!(reel.current_symbol(), Some(bell));
    }

    #[test]
    fn test_rig_is_one_shot() {
        let (mut table, symbols) = palette(&["Cherry", "Bell"]);
        let bell = table.lookup("Bell").unwrap();
        let mut reel = Reel::new(symbols.clone()).unwrap();

        reel.rig_next(bell).unwrap();

        // The rig applies to the next completion only; afterwards the reel
        // falls back to random selection.
        let mut rng = DeterministicRng::new(3);
        reel.begin_spin(1);
        reel.tick(&mut rng);
        assert_eq!(reel.current_symbol(), Some(bell));

        reel.begin_spin(1);
        reel.tick(&mut rng);
        assert!(symbols.contains(&reel.current_symbol().unwrap()));
    }

    #[test]
    fn test_rig_rejects_foreign_symbol() {
        let (mut table, symbols) = palette(&["Cherry", "Lemon"]);
        let seven = table.intern("Seven");
        let mut reel = Reel::new(symbols).unwrap();

        assert_eq!(reel.rig_next(seven), Err(ReelError::SymbolNotInPalette));
    }

    #[test]
    fn test_single_symbol_palette() {
        let (mut table, symbols) = palette(&["Cherry"]);
        let cherry = table.lookup("Cherry").unwrap();
        let mut reel = Reel::new(symbols).unwrap();
        let mut rng = DeterministicRng::new(0);

        reel.begin_spin(1);
        assert!(reel.tick(&mut rng));
        assert_eq!(reel.current_symbol(), Some(cherry));
    }

    proptest! {
        /// Membership invariant: for any palette, seed and duration, the
        /// landed symbol is a palette member.
        #[test]
        fn prop_landed_symbol_is_palette_member(
            len in 1usize..8,
            seed in any::<u64>(),
            duration in 1u32..16,
        ) {
            let mut table = SymbolTable::new();
            let symbols: Vec<Symbol> =
                (0..len).map(|i| table.intern(&format!("sym{i}"))).collect();
            let mut reel = Reel::new(symbols.clone()).unwrap();
            let mut rng = DeterministicRng::new(seed);

            reel.begin_spin(duration);
            let mut completed = false;
            for _ in 0..duration {
                if reel.tick(&mut rng) {
                    completed = true;
                    break;
                }
            }

            prop_assert!(completed);
            prop_assert!(symbols.contains(&reel.current_symbol().unwrap()));
        }
    }
}
