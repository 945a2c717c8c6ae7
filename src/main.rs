//! Croak & Roll entry point
//!
//! Runs a headless session with the autopilot playing the player's side and
//! prints a JSON summary when it ends.
//!
//! Usage: `croak-and-roll [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use croak_and_roll::consts::{MAX_SUBSTEPS, SIM_DT};
    use croak_and_roll::sim::{GamePhase, Table, TableEvent, TickInput, tick};
    use croak_and_roll::tuning::Tuning;
    use serde::Serialize;

    /// Simulated wall-clock frame
    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_ROUNDS: u32 = 200;
    const MAX_FRAMES: u64 = 60 * 60 * 60;

    #[derive(Serialize)]
    struct SessionSummary {
        seed: u64,
        rounds: u32,
        phase: GamePhase,
        player_balance: u32,
        house_balance: u32,
        player_busts: u32,
        house_busts: u32,
        house_wins: u32,
        simulated_seconds: f32,
    }

    env_logger::init();
    log::info!("Croak & Roll (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Invalid seed ({}), using 0", e);
            0
        }
        None => 0,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::warn!("Failed to load tuning from {}: {}, using defaults", path, e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let mut table = Table::new(tuning, seed);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut summary = SessionSummary {
        seed,
        rounds: 1,
        phase: table.phase(),
        player_balance: table.player_balance(),
        house_balance: table.house_balance(),
        player_busts: 0,
        house_busts: 0,
        house_wins: 0,
        simulated_seconds: 0.0,
    };

    let mut accumulator = 0.0;
    for _ in 0..MAX_FRAMES {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut table, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in table.drain_events() {
            match event {
                TableEvent::PlayerBust { .. } => summary.player_busts += 1,
                TableEvent::HouseBust { .. } => summary.house_busts += 1,
                TableEvent::HouseWon { .. } => summary.house_wins += 1,
                _ => {}
            }
        }

        if table.phase() == GamePhase::GameOver || table.round() > MAX_ROUNDS {
            break;
        }
    }

    summary.rounds = table.round();
    summary.phase = table.phase();
    summary.player_balance = table.player_balance();
    summary.house_balance = table.house_balance();
    summary.simulated_seconds = table.time_ticks() as f32 * SIM_DT;

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds embed the library directly
}
