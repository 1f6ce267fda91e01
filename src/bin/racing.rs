//! Top-down racing against AI rivals

use std::process::ExitCode;

use arcade_suite::platform;
use arcade_suite::settings::Settings;
use arcade_suite::sim::racing::Racing;
use arcade_suite::sim::state::clock_seed;

fn main() -> ExitCode {
    platform::init_logging();
    let settings = Settings::load();
    let game = Racing::new(clock_seed(), settings.effective_opponents());
    platform::exit_code(platform::play(game, &settings))
}
