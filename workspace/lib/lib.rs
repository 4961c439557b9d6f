//! Setup shared by the workspace binaries.

use std::{
    fs::{ self, File },
    io::BufWriter,
    path::PathBuf,
};
use splitstep::{ config::ProjectConfig, TableSink };
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();
}

/// Load the configuration file named by the first command-line argument, or
/// fall back to `default`.
pub fn load_config(default: &str) -> anyhow::Result<ProjectConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("reading configuration from {}", path);
            Ok(ProjectConfig::load(path)?)
        },
        None => Ok(ProjectConfig::from_toml(default)?),
    }
}

/// Create `output/` if needed and open a table sink writing to
/// `output/<name>.dat`.
pub fn table(name: &str, interval: usize)
    -> anyhow::Result<TableSink<BufWriter<File>>>
{
    let outdir = PathBuf::from("output");
    fs::create_dir_all(&outdir)?;
    let path = outdir.join(format!("{name}.dat"));
    info!("writing {}", path.display());
    Ok(TableSink::new(BufWriter::new(File::create(path)?), interval))
}
