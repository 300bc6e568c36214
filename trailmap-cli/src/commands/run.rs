//! Run command - the live moving map.

use std::path::PathBuf;
#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(target_os = "linux")]
use std::sync::Arc;

use clap::Args;

use super::common::MapArgs;
use crate::error::CliError;

/// Arguments for the run command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// GPS serial device (overrides gps.device)
    #[arg(long)]
    pub gps_device: Option<String>,

    /// GPS baud rate (overrides gps.baud_rate)
    #[arg(long)]
    pub baud: Option<u32>,
}

/// Run the render loop until Ctrl+C or too many fatal failures.
#[cfg(target_os = "linux")]
pub fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<(), CliError> {
    use trailmap::hardware;
    use trailmap::render::{MapRenderer, RenderLoop};

    use super::common::open_view;
    use crate::runner::CliRunner;

    let mut runner = CliRunner::new(config_path)?;
    let config = runner.config_mut();
    args.map.apply(config);
    if let Some(device) = args.gps_device {
        config.gps.device = device;
    }
    if let Some(baud) = args.baud {
        config.gps.baud_rate = baud;
    }
    runner.validate()?;
    runner.log_startup("run");
    let config = runner.config();

    let view = open_view(config)?;
    let panel = hardware::open_panel(config)?;
    let gps = hardware::open_gps(&config.gps)?;
    let renderer = MapRenderer::new(view, panel)?;

    println!("Trailmap v{}", trailmap::VERSION);
    println!("================");
    println!();
    println!("Tiles:   {} (zoom {})", config.tiles.path.display(), config.tiles.zoom);
    println!("GPS:     {} @ {}", config.gps.device, config.gps.baud_rate);
    println!(
        "Display: {} ({}×{})",
        config.display.spi_device.display(),
        config.screen.width,
        config.screen.height
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up signal handler for graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let mut render_loop = RenderLoop::new(
        renderer,
        gps,
        config.gps_decoder(),
        config.render_loop_config(),
    )
    .with_shutdown(shutdown);

    let summary = render_loop.run()?;

    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Frames displayed: {}", summary.frames);
    println!("  Failed cycles:    {}", summary.failures);
    let stats = render_loop.renderer().view().compositor().store().stats();
    println!(
        "  Tile cache:       {} hits, {} misses, {} placeholders",
        stats.hits, stats.misses, stats.placeholders
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run(_config_path: Option<PathBuf>, _args: RunArgs) -> Result<(), CliError> {
    Err(CliError::Unsupported(
        "the run command needs Linux spidev and GPIO character devices",
    ))
}
