// Domain collectors and the report aggregator.
pub mod aggregate;
pub mod firmware;
pub mod network;
pub mod packages;
pub mod specs;
pub mod system;
pub mod types;

// Re-export main collection functions
pub use aggregate::{collect_report, merge_flat, Report};
pub use firmware::collect_firmware;
pub use network::collect_network;
pub use packages::collect_extra;
pub use specs::collect_specs;
pub use system::collect_system;
