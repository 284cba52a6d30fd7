//! `plugin-deploy` binary.
use clap::Parser;
use std::process::ExitCode;

use plugin_deploy::cli::Cli;
use plugin_deploy::commands;
use plugin_deploy::fs::RealFs;
use plugin_deploy::logging::{Log as _, Logger, init_subscriber, log_file};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let log_file = log_file();
    init_subscriber(args.verbose, log_file.as_deref());
    let log = Logger::new(log_file);

    let result = args
        .invocation()
        .and_then(|invocation| commands::deploy::run(&invocation, &RealFs, &log));
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log.error(&format!("{err:#}"));
            if let Some(path) = log.log_path() {
                log.info(&format!("log: {}", path.display()));
            }
            ExitCode::FAILURE
        }
    }
}
