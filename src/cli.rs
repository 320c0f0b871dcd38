use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "sysprobe")]
#[command(about = "A CLI tool for host configuration snapshots")]
pub struct Cli {
    /// Increase diagnostic logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect every domain and print the merged report
    Report {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Operating system identity, package manager, CPU, RAM, and uptime
    System {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Interfaces, addresses, DNS, link speed, VPN tunnels, and connections
    Network {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Installed packages from the native and toolchain package managers
    Extra {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// BIOS/UEFI identity, microcode, and device firmware
    Firmware {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Hardware specs: CPU, RAM, storage health, and sensors
    Specs {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long)]
        format: Option<String>,
    },
}
