mod app;
mod decode;

use std::path::PathBuf;

use anyhow::Result;
use loupe_engine::device::GpuInit;
use loupe_engine::driver::LensConfig;
use loupe_engine::logging::{init_logging, LoggingConfig};
use loupe_engine::window::{Runtime, RuntimeConfig};

use app::LensApp;

/// Environment override for the lens render scale.
const SCALE_ENV: &str = "LOUPE_SCALE";

fn scale_override() -> Option<f64> {
    let raw = std::env::var(SCALE_ENV).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            log::warn!("ignoring {SCALE_ENV}={raw:?}: expected a positive number");
            None
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        log::warn!("no images given; usage: loupe-studio <image>...");
    }

    let config = LensConfig { render_scale: scale_override(), ..LensConfig::default() };
    let app = LensApp::new(paths, config)?;

    Runtime::run(
        RuntimeConfig { title: "loupe studio".into(), ..RuntimeConfig::default() },
        GpuInit::default(),
        app,
    )
}
