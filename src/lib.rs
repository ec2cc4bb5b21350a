pub mod config;
pub mod export;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::{run, ExportSummary};
