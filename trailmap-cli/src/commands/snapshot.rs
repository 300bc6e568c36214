//! Snapshot command - render one frame to an image file.

use std::path::{Path, PathBuf};

use clap::Args;

use super::common::{open_view, MapArgs, PositionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the snapshot command.
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    #[command(flatten)]
    pub map: MapArgs,

    /// Output image; the format follows the extension
    #[arg(long, short)]
    pub output: PathBuf,
}

pub fn run(config_path: Option<PathBuf>, args: SnapshotArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(config_path)?;
    args.map.apply(runner.config_mut());
    runner.validate()?;
    runner.log_startup("snapshot");

    let view = open_view(runner.config())?;
    let fix = args.position.fix();
    let frame = view.render(&fix)?;
    save_frame(&frame, &args.output)?;

    println!(
        "Wrote {}×{} snapshot of {:.5}, {:.5} to {}",
        frame.width(),
        frame.height(),
        fix.latitude,
        fix.longitude,
        args.output.display()
    );
    Ok(())
}

fn save_frame(frame: &trailmap::compose::Frame, path: &Path) -> Result<(), CliError> {
    frame.save(path).map_err(CliError::Snapshot)
}
