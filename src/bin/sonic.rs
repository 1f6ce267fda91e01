//! Side-scrolling ring collector

use std::process::ExitCode;

use arcade_suite::platform;
use arcade_suite::settings::Settings;
use arcade_suite::sim::sonic::Sonic;
use arcade_suite::sim::state::clock_seed;

fn main() -> ExitCode {
    platform::init_logging();
    let settings = Settings::load();
    let game = Sonic::new(clock_seed());
    platform::exit_code(platform::play(game, &settings))
}
