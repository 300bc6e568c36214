//! Preview command - show one frame for a fixed position on the panel.
//!
//! Exercises the tile database, compositor, overlay and display without a
//! GPS receiver attached.

use std::path::PathBuf;

use clap::Args;

use super::common::{MapArgs, PositionArgs};
use crate::error::CliError;

/// Arguments for the preview command.
#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    #[command(flatten)]
    pub map: MapArgs,
}

#[cfg(target_os = "linux")]
pub fn run(config_path: Option<PathBuf>, args: PreviewArgs) -> Result<(), CliError> {
    use trailmap::hardware;
    use trailmap::render::MapRenderer;

    use super::common::open_view;
    use crate::runner::CliRunner;

    let mut runner = CliRunner::new(config_path)?;
    args.map.apply(runner.config_mut());
    runner.validate()?;
    runner.log_startup("preview");
    let config = runner.config();

    let view = open_view(config)?;
    let panel = hardware::open_panel(config)?;
    let mut renderer = MapRenderer::new(view, panel)?;

    let fix = args.position.fix();
    renderer.render_fix(&fix)?;

    println!(
        "Displayed {:.5}, {:.5} heading {} at zoom {}",
        fix.latitude, fix.longitude, fix.heading, config.tiles.zoom
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run(_config_path: Option<PathBuf>, _args: PreviewArgs) -> Result<(), CliError> {
    Err(CliError::Unsupported(
        "the preview command needs Linux spidev and GPIO character devices",
    ))
}
