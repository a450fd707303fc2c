//! Slotsim Demo
//!
//! Drives a full machine from a plain loop: spins a few rounds, rigs one of
//! them to showcase the match and bonus signals, and logs what lands.

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use slotsim::{
    EventBus, LogObserver, MachineConfig, MachinePhase, SlotMachine, Symbol, TICK_RATE, VERSION,
};

fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Slotsim v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_session();
}

/// Demo function to exercise a full machine.
fn demo_session() {
    info!("=== Starting Demo Session ===");

    let config = MachineConfig {
        spin_duration_ticks: 120,
        stop_stagger_ticks: 30,
        rng_seed: Some(12345),
        ..MachineConfig::default()
    };

    let bus = EventBus::new();
    let mut machine =
        SlotMachine::from_config(&config, bus.clone()).expect("default demo config is valid");
    let mut observer = LogObserver::new(bus);

    machine.initialize();
    observer.initialize();

    for round in 1u32..=5 {
        if round == 3 {
            // Rig one round so the demo reliably shows a bonus hit.
            let bell = machine.symbol_named("Bell").expect("Bell is configured");
            for index in 0..machine.reel_count() {
                machine
                    .rig_reel(index, bell)
                    .expect("Bell is in every palette");
            }
            machine.rig_bonus(bell).expect("Bell is in the bonus palette");
            info!("Round {}: rigged every reel to Bell", round);
        }

        machine.start_spin().expect("machine is idle between rounds");
        let mut ticks = 0u32;
        while machine.phase() != MachinePhase::Idle {
            machine.tick();
            ticks += 1;
        }

        let reels: Vec<String> = machine
            .current_symbols()
            .iter()
            .map(|symbol| symbol_label(&machine, *symbol))
            .collect();
        let bonus = symbol_label(&machine, machine.bonus_symbol());

        info!(
            "Round {}: reels [{}] bonus [{}] after {} ticks",
            round,
            reels.join(", "),
            bonus,
            ticks
        );

        if let Some(outcome) = machine.last_outcome() {
            if outcome.generation == machine.generation() && outcome.matched.is_some() {
                info!(
                    "Round {}: match on {}{}",
                    round,
                    symbol_label(&machine, outcome.matched),
                    if outcome.bonus { " with bonus" } else { "" }
                );
            }
        }
    }

    machine.shutdown();
    observer.shutdown();
    info!("=== Demo Session Complete ===");
}

fn symbol_label(machine: &SlotMachine, symbol: Option<Symbol>) -> String {
    symbol
        .and_then(|s| machine.symbol_name(s))
        .unwrap_or_else(|| "-".to_string())
}
