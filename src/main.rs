//! Platform Replay headless runner
//!
//! Plays one level with a simple autopilot, then watches the recording back
//! at double speed. `RUST_LOG=debug` shows every gameplay event.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use platform_replay::consts::SIM_HZ;
    use platform_replay::sim::{GameEvent, GamePhase, InputAction, Simulation, TickInput};
    use platform_replay::{Settings, SimError, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "platform-replay")]
    #[command(about = "Play a level with a scripted autopilot, then watch the recording back at 2x")]
    struct Args {
        /// Seed for the enemy direction-flip RNG
        #[arg(long, default_value_t = 0x5EED)]
        seed: u64,
        /// Level to play (1-based)
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Tick limit for the attempt
        #[arg(long, default_value_t = 60 * SIM_HZ as u64)]
        ticks: u64,
        /// Settings JSON; missing or unreadable falls back to defaults
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Tuning JSON
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, SimError> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path).map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Tuning::from_json(&json)
    }

    /// Run right, hop every second, jump at walls and at enemies ahead
    fn autopilot(sim: &Simulation) -> TickInput {
        let player = sim.player();
        let rect = player.rect();
        let enemy_ahead = sim.enemies().iter().any(|e| {
            let gap = e.rect().left() - rect.right();
            (0.0..60.0).contains(&gap) && (e.rect().top() - rect.top()).abs() < 40.0
        });
        let stalled = player.body.vel.x == 0.0 && sim.time_ticks() % 20 == 0;
        let hop = sim.time_ticks() % u64::from(SIM_HZ) == 0;
        let jump = enemy_ahead || stalled || hop;
        TickInput {
            right: true,
            jump_pressed: jump,
            jump_held: jump,
            ..Default::default()
        }
    }

    pub fn run() -> Result<(), SimError> {
        let args = Args::parse();
        let settings = args.settings.as_ref().map(Settings::load).unwrap_or_default();
        let tuning = load_tuning(args.tuning.as_ref())?;
        log::info!("Platform Replay starting with seed {}", args.seed);

        let mut sim = Simulation::new(args.seed, settings, tuning);
        sim.start_level(args.level)?;

        let mut played = 0;
        while sim.phase() == GamePhase::Playing && played < args.ticks {
            let input = autopilot(&sim);
            for event in sim.tick(&input) {
                match event {
                    GameEvent::PlayerKilled { cause } => log::info!("Player died: {cause:?}"),
                    GameEvent::LevelComplete { level } => log::info!("Level {level} cleared"),
                    other => log::debug!("{other:?}"),
                }
            }
            played += 1;
        }
        if sim.phase() == GamePhase::Playing {
            log::info!("Tick limit reached, leaving the level");
            sim.handle_input_edge(InputAction::Back)?;
        }

        let player = sim.player();
        log::info!(
            "Attempt over after {played} ticks ({:.1}s): {}, score {}, {} collected",
            played as f32 / SIM_HZ as f32,
            sim.phase().as_str(),
            player.score,
            player.collected_count
        );

        match sim.start_replay() {
            Err(SimError::NoRecording) => {
                log::warn!("Nothing was recorded, skipping replay");
                return Ok(());
            }
            other => other?,
        }
        sim.set_replay_rate(2.0)?;
        let mut replay_ticks = 0u64;
        while sim.phase() == GamePhase::Replay {
            sim.tick(&TickInput::default());
            replay_ticks += 1;
        }
        log::info!("Replay watched in {replay_ticks} ticks");
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no standalone runner
}
