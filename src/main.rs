//! Particle field background layer.
//!
//! Usage: `particle-field [config.json]`

use std::env;

use particle_field::FieldConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = match env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading config");
            FieldConfig::load(&path)?
        }
        None => FieldConfig::default(),
    };

    info!(
        points = config.point_count,
        segments = config.segment_count,
        seed = ?config.seed,
        "Starting particle field"
    );
    particle_field::run(config)?;
    Ok(())
}
