// src/main.rs
use std::fs;
use std::thread;
use std::time::Duration;
use anyhow::{Context, Result};
use log::{info, warn};
use livescope::drivers::{
    render_figure_png, AcquisitionOutcome, MonitorPipeline, PlotStyle, SimulatedSource,
};
use livescope::MonitorConfig;
const DEFAULT_CONFIG_PATH: &str = "./static/config.json";
const DEFAULT_TICKS: u64 = 25;
// Usage: livescope [config.json] [ticks]
fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("tick count must be a whole number, got {raw:?}"))?,
        None => DEFAULT_TICKS,
    };
    let config = MonitorConfig::load_or_default(&config_path);
    let acquisition = &config.acquisition;
    let source = SimulatedSource::new(
        acquisition.channels.clone(),
        config.display.sample_rate,
        acquisition.samples_per_read,
    );
    let mut pipeline =
        MonitorPipeline::new(source, &config).context("invalid monitor configuration")?;
    pipeline.source_mut().start();
    let tick_interval = Duration::from_millis(acquisition.tick_interval_ms);
    let mut figure = pipeline.redraw();
    for tick in 0..ticks {
        match pipeline.acquisition_tick(tick) {
            Ok(AcquisitionOutcome::Skipped) => {}
            Ok(outcome) => info!("tick {tick}: {outcome:?}"),
            Err(err) => warn!("tick {tick}: acquisition failed, keeping previous window: {err}"),
        }
        figure = pipeline.redraw();
        thread::sleep(tick_interval);
    }
    pipeline.source_mut().stop();
    let png = render_figure_png(&figure, &PlotStyle::default()).context("rendering failed")?;
    fs::write("livescope.png", png).context("failed to write livescope.png")?;
    fs::write("livescope.json", figure.to_json()?).context("failed to write livescope.json")?;
    info!(
        "wrote {} traces, {} samples per channel",
        figure.traces.len(),
        pipeline.state().longest_len()
    );
    Ok(())
}
