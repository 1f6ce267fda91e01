//! Flappy Bird

use std::process::ExitCode;

use arcade_suite::platform;
use arcade_suite::settings::Settings;
use arcade_suite::sim::flappy::Flappy;
use arcade_suite::sim::state::clock_seed;

fn main() -> ExitCode {
    platform::init_logging();
    let settings = Settings::load();
    let game = Flappy::new(clock_seed());
    platform::exit_code(platform::play(game, &settings))
}
