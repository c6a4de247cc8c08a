use std::path::PathBuf;
use std::process::ExitCode;

use dissipate::{DissipationConfig, Simulation};

const USAGE: &str = "usage: dissipate <image> [config.json]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let Some(image) = args.next().map(PathBuf::from) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let config = match args.next() {
        Some(path) => match DissipationConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("could not load config {}: {}", PathBuf::from(path).display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => DissipationConfig::default(),
    };

    match Simulation::new(image).with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
