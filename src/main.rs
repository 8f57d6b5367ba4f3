//! Fogbound entry point
//!
//! Headless native runner: plays a scripted series of launches through the
//! fixed-step loop and reports how much of the map was charted.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;

    use glam::Vec2;

    use fogbound::consts::*;
    use fogbound::frame::build_frame;
    use fogbound::persistence::{self, SaveEnvelope};
    use fogbound::sim::{GameEvent, GameState, PointerState, TickInput, tick};
    use fogbound::Settings;

    /// Command line options
    #[derive(Debug, Default)]
    pub struct Options {
        pub settings: Option<PathBuf>,
        pub seed: u64,
        pub save: Option<PathBuf>,
        pub launches: u32,
    }

    impl Options {
        pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut options = Options {
                seed: 0x5eed,
                launches: 6,
                ..Default::default()
            };
            while let Some(arg) = args.next() {
                let mut value = |name: &str| args.next().ok_or(format!("{name} needs a value"));
                match arg.as_str() {
                    "--settings" => options.settings = Some(value("--settings")?.into()),
                    "--save" => options.save = Some(value("--save")?.into()),
                    "--seed" => {
                        options.seed = value("--seed")?
                            .parse()
                            .map_err(|e| format!("bad seed: {e}"))?
                    }
                    "--launches" => {
                        options.launches = value("--launches")?
                            .parse()
                            .map_err(|e| format!("bad launch count: {e}"))?
                    }
                    other => return Err(format!("unknown argument: {other}")),
                }
            }
            Ok(options)
        }
    }

    /// Session plus the fixed-step accumulator
    struct Game {
        state: GameState,
        settings: Settings,
        accumulator: f32,
        input: TickInput,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Result<Self, fogbound::ConfigError> {
            Ok(Self {
                state: GameState::new(seed, &settings)?,
                settings,
                accumulator: 0.0,
                input: TickInput::default(),
            })
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pointer.just_pressed = false;
                self.input.cancel_drag = false;
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::ShipLaunched { id, velocity } => {
                        log::info!("Ship {id} away at {:.0} u/s", velocity.length())
                    }
                    GameEvent::ShipCrashed { id, planet } => {
                        log::info!("Ship {id} crashed into planet {planet}")
                    }
                    GameEvent::ShipLost { id } => log::info!("Ship {id} left the map"),
                    GameEvent::ShipExpired { id } => log::info!("Ship {id} went silent"),
                    GameEvent::LaunchCancelled => log::debug!("Launch cancelled"),
                }
            }
        }

        /// Feed one frame of a scripted drag
        fn drive(&mut self, pointer: PointerState, frame_dt: f32) {
            self.input.pointer = pointer;
            self.update(frame_dt);
            let viewport = Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT);
            let frame = build_frame(&mut self.state, &self.settings, viewport);
            log::trace!(
                "frame: {} sprites, {} gizmos, mask v{}",
                frame.sprites.len(),
                frame.gizmos.len(),
                frame.fog_mask.version()
            );
        }

        /// Press on the home planet, pull away from `heading`, release, then
        /// let the ship fly for `flight` seconds
        fn launch(&mut self, heading_deg: f32, power: f32, flight: f32) {
            const FRAME_DT: f32 = 1.0 / 60.0;
            let home = self.state.home.center();
            let pull = -Vec2::from_angle(heading_deg.to_radians())
                * power.clamp(0.0, 1.0)
                * self.state.launch.max_pull;

            self.drive(PointerState::press(home), FRAME_DT);
            for step in 1..=20 {
                let t = step as f32 / 20.0;
                self.drive(PointerState::hold(home + pull * t), FRAME_DT);
            }
            self.drive(PointerState::release(home + pull), FRAME_DT);

            let frames = (flight / FRAME_DT) as u32;
            for _ in 0..frames {
                self.drive(PointerState::default(), FRAME_DT);
            }
        }
    }

    pub fn run(options: Options) -> Result<(), Box<dyn Error>> {
        let settings = match &options.settings {
            Some(path) => Settings::load_from(path)?,
            None => Settings::default(),
        };
        let mut game = Game::new(options.seed, settings)?;

        if let Some(path) = &options.save {
            match persistence::load_into(path, &mut game.state.fog) {
                Ok(envelope) if envelope.seed != options.seed => log::warn!(
                    "Save was charted with seed {}, current seed is {}",
                    envelope.seed,
                    options.seed
                ),
                Ok(_) => {}
                Err(e) => log::info!("Starting with fresh fog ({e})"),
            }
        }

        log::info!(
            "Charted {:.1}% of the map at start",
            game.state.fog.revealed_fraction() * 100.0
        );
        for i in 0..options.launches {
            let heading = 360.0 * i as f32 / options.launches.max(1) as f32 + 15.0;
            let power = 0.6 + 0.4 * ((i % 3) as f32 / 2.0);
            game.launch(heading, power, 6.0);
            log::info!(
                "After launch {}: {:.1}% charted, {} ships in flight",
                i + 1,
                game.state.fog.revealed_fraction() * 100.0,
                game.state.ships.len()
            );
        }

        if let Some(path) = &options.save {
            persistence::save_to(path, &SaveEnvelope::new(options.seed, &game.state.fog))?;
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Fogbound (native) starting...");

    let options = match native::Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: fogbound [--settings PATH] [--seed N] [--save PATH] [--launches N]");
            return std::process::ExitCode::from(2);
        }
    };
    match native::run(options) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the simulation through the library
}
