//! Arkanoid in the terminal

use std::process::ExitCode;

use arcade_suite::platform;
use arcade_suite::settings::Settings;
use arcade_suite::sim::arkanoid::Arkanoid;
use arcade_suite::sim::state::clock_seed;

fn main() -> ExitCode {
    platform::init_logging();
    let settings = Settings::load();
    let game = Arkanoid::new(clock_seed(), settings.mouse_paddle);
    platform::exit_code(platform::play(game, &settings))
}
