mod cli;
mod collectors;
mod commands;
mod config;
mod output;
mod platform;
mod probe;
mod render;

use clap::Parser;
use cli::Cli;
use config::Config;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // permission-gated sources (DMI serials, SMART) degrade to sentinels
    #[cfg(unix)]
    {
        if unsafe { libc::geteuid() } != 0 {
            output::print_warning(
                "not running as root; firmware and SMART fields may be unavailable",
            );
        }
    }

    let config = Config::load();
    if let Err(e) = commands::run(&cli.command, &config) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
