use cartograph::config::DEFAULT_CONFIG_FILE;
use cartograph::{viewer, ViewerConfig};
use cartograph_logger::{init, log, LogSeverity::*};
use std::path::{Path, PathBuf};
use std::process::exit;

fn load_config() -> cartograph_common::Result<ViewerConfig> {
    match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(Path::new(&path)),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            ViewerConfig::load(&PathBuf::from(DEFAULT_CONFIG_FILE))
        }
        None => Ok(ViewerConfig::default()),
    }
}

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log(format!("Failed to load configuration: {}", e), Fatal);
            exit(1);
        }
    };
    init(config.log_level);
    log("Cartograph init".to_string(), Info);

    match viewer::run(&config).await {
        Ok(summary) if summary.failed.is_empty() => {}
        Ok(_) => exit(2),
        Err(e) => {
            log(format!("{}", e), Fatal);
            exit(1);
        }
    }
}
