use crate::cli::Commands;
use crate::collectors::{
    collect_extra, collect_firmware, collect_network, collect_report, collect_specs,
    collect_system, merge_flat,
};
use crate::config::Config;
use crate::output::output_data;
use crate::platform::Platform;

pub fn run(command: &Option<Commands>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let platform = Platform::current();

    match command {
        None => {
            let report = collect_report(platform);
            output_data(&merge_flat(&report), &config.resolve_format(None))
        }
        Some(Commands::Report { format }) => {
            let report = collect_report(platform);
            output_data(&merge_flat(&report), &config.resolve_format(format.as_deref()))
        }
        Some(Commands::System { format }) => {
            let info = collect_system(platform);
            output_data(&info, &config.resolve_format(format.as_deref()))
        }
        Some(Commands::Network { format }) => {
            let info = collect_network(platform);
            output_data(&info, &config.resolve_format(format.as_deref()))
        }
        Some(Commands::Extra { format }) => {
            let info = collect_extra(platform);
            output_data(&info, &config.resolve_format(format.as_deref()))
        }
        Some(Commands::Firmware { format }) => {
            let info = collect_firmware(platform);
            output_data(&info, &config.resolve_format(format.as_deref()))
        }
        Some(Commands::Specs { format }) => {
            let info = collect_specs(platform);
            output_data(&info, &config.resolve_format(format.as_deref()))
        }
    }
}
