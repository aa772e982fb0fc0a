use log::{debug, info, warn};
use crate::config::{DisplayConfig, MonitorConfig};
use crate::drivers::source::SignalSource;
use crate::drivers::{
    AccumulatedState, CadenceController, CadenceDecision, ChannelAccumulator, Figure,
    FigureBuilder, ScopeError,
};
/// Result of one acquisition tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// Cadence said no fetch was due; prior output stays valid.
    Skipped,
    /// The source was asked but had nothing new.
    Empty,
    /// A batch was merged.
    Merged { channels: usize, samples: usize },
}
/// Tick-driven loop owner: cadence gate, source, accumulated state and figure builder.
pub struct MonitorPipeline<S: SignalSource> {
    source: S,
    display: DisplayConfig,
    cadence: CadenceController,
    accumulator: ChannelAccumulator,
    builder: FigureBuilder,
}
impl<S: SignalSource> MonitorPipeline<S> {
    pub fn new(source: S, config: &MonitorConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        Ok(Self {
            source,
            display: config.display.clone(),
            cadence: CadenceController::new(config.acquisition.fetch_interval),
            accumulator: ChannelAccumulator::new(),
            builder: FigureBuilder::default(),
        })
    }
    pub fn with_builder(mut self, builder: FigureBuilder) -> Self {
        self.builder = builder;
        self
    }
    /// Handles one acquisition tick: fetch when the cadence allows and merge the result.
    ///
    /// Source errors are returned as-is and leave the state untouched.
    pub fn acquisition_tick(&mut self, tick: u64) -> Result<AcquisitionOutcome, ScopeError> {
        match self.cadence.decide(tick, Some(self.accumulator.state())) {
            CadenceDecision::Unchanged => return Ok(AcquisitionOutcome::Skipped),
            CadenceDecision::Fetch(_) => {}
        }
        let batch = match self.source.next_batch() {
            Ok(batch) => batch,
            Err(err) => {
                warn!("tick {tick}: acquisition failed: {err}");
                return Err(err);
            }
        };
        let Some(batch) = batch.filter(|b| !b.is_empty()) else {
            debug!("tick {tick}: source had no new samples");
            return Ok(AcquisitionOutcome::Empty);
        };
        let samples = batch.samples_per_channel().unwrap_or(0);
        self.accumulator.merge(Some(&batch), &self.display);
        Ok(AcquisitionOutcome::Merged {
            channels: batch.num_channels(),
            samples,
        })
    }
    /// Builds a figure from the current state. Independent of the acquisition cadence.
    pub fn redraw(&self) -> Figure {
        self.builder
            .build(Some(self.accumulator.state()), &self.display)
    }
    /// Swaps the display config and drops all accumulated samples.
    pub fn reconfigure(&mut self, display: DisplayConfig) -> Result<(), ScopeError> {
        display.validate()?;
        self.display = display;
        self.accumulator.reset();
        info!(
            "monitor reconfigured: {} Hz, {} s window",
            self.display.sample_rate, self.display.buffer_length
        );
        Ok(())
    }
    pub fn reset(&mut self) {
        self.accumulator.reset();
        info!("monitor state reset");
    }
    pub fn state(&self) -> &AccumulatedState {
        self.accumulator.state()
    }
    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }
    pub fn source(&self) -> &S {
        &self.source
    }
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::{ManualSource, SimulatedSource};
    use crate::drivers::{SampleBatch, Theme};
    fn monitor_config(sample_rate: f64, buffer_length: f64) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.display.sample_rate = sample_rate;
        config.display.buffer_length = buffer_length;
        config
    }
    fn chunk(value: f64, len: usize) -> SampleBatch {
        SampleBatch::new().with("ch1", vec![value; len])
    }
    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = monitor_config(0.0, 1.0);
        assert!(matches!(
            MonitorPipeline::new(ManualSource::new(Vec::new()), &config),
            Err(ScopeError::InvalidSampleRate(_))
        ));
    }
    #[test]
    fn cold_start_fetches_off_phase_then_follows_cadence() {
        let source = ManualSource::new(vec![chunk(1.0, 3), chunk(2.0, 3), chunk(3.0, 3)]);
        let mut pipeline = MonitorPipeline::new(source, &monitor_config(10.0, 10.0)).unwrap();
        assert_eq!(
            pipeline.acquisition_tick(3).unwrap(),
            AcquisitionOutcome::Merged { channels: 1, samples: 3 }
        );
        for tick in [4, 6, 7, 8, 9] {
            assert_eq!(pipeline.acquisition_tick(tick).unwrap(), AcquisitionOutcome::Skipped);
        }
        assert!(matches!(
            pipeline.acquisition_tick(5).unwrap(),
            AcquisitionOutcome::Merged { .. }
        ));
        assert_eq!(pipeline.state().get("ch1").unwrap().len(), 6);
        assert_eq!(pipeline.source().remaining(), 1);
    }
    #[test]
    fn empty_reads_are_distinct_from_skips() {
        let mut source = ManualSource::new(Vec::new());
        source.push_empty();
        source.push_batch(SampleBatch::new());
        let mut pipeline = MonitorPipeline::new(source, &monitor_config(10.0, 1.0)).unwrap();
        assert_eq!(pipeline.acquisition_tick(1).unwrap(), AcquisitionOutcome::Empty);
        assert_eq!(pipeline.acquisition_tick(2).unwrap(), AcquisitionOutcome::Empty);
        assert!(pipeline.state().is_empty());
    }
    #[test]
    fn failed_reads_propagate_and_keep_state() {
        let mut source = ManualSource::new(vec![chunk(1.0, 2)]);
        source.push_failure("timeout");
        let mut pipeline = MonitorPipeline::new(source, &monitor_config(10.0, 1.0)).unwrap();
        pipeline.acquisition_tick(0).unwrap();
        let before = pipeline.state().clone();
        assert!(matches!(
            pipeline.acquisition_tick(5),
            Err(ScopeError::Acquisition(_))
        ));
        assert_eq!(pipeline.state(), &before);
    }
    #[test]
    fn window_stays_bounded_over_many_ticks() {
        let mut config = monitor_config(100.0, 2.0);
        config.acquisition.fetch_interval = 1;
        let source = SimulatedSource::seeded(vec!["a".into(), "b".into()], 100.0, 30, 11);
        let mut pipeline = MonitorPipeline::new(source, &config).unwrap();
        pipeline.source_mut().start();
        for tick in 0..20 {
            pipeline.acquisition_tick(tick).unwrap();
            assert!(pipeline.state().longest_len() <= 200);
        }
        assert_eq!(pipeline.state().get("a").unwrap().len(), 200);
        let figure = pipeline.redraw();
        assert_eq!(figure.traces.len(), 2);
        assert_eq!(figure.traces[0].x.len(), 200);
        assert_eq!(figure.layout.x_axis.range, Some([0.0, 2.0]));
    }
    #[test]
    fn custom_theme_and_reset_apply_to_redraws() {
        let theme = Theme {
            background: "#ffffff".into(),
            line_width: 2.0,
            ..Theme::default()
        };
        let builder = FigureBuilder::new(theme);
        assert_eq!(builder.theme().background, "#ffffff");
        let source = ManualSource::new(vec![chunk(1.0, 4)]);
        let mut pipeline = MonitorPipeline::new(source, &monitor_config(10.0, 1.0))
            .unwrap()
            .with_builder(builder);
        pipeline.acquisition_tick(0).unwrap();
        let figure = pipeline.redraw();
        assert_eq!(figure.layout.plot_bgcolor, "#ffffff");
        assert_eq!(figure.traces[0].line.width, 2.0);
        pipeline.reset();
        assert_eq!(pipeline.state().num_channels(), 0);
        let figure = pipeline.redraw();
        assert!(figure.is_empty());
        assert_eq!(figure.layout.x_axis.range, Some([0.0, 1.0]));
    }
    #[test]
    fn reconfigure_resets_the_window() {
        let source = ManualSource::new(vec![chunk(1.0, 5)]);
        let mut pipeline = MonitorPipeline::new(source, &monitor_config(10.0, 1.0)).unwrap();
        pipeline.acquisition_tick(0).unwrap();
        assert!(!pipeline.redraw().is_empty());
        let mut display = pipeline.display().clone();
        display.buffer_length = 0.0;
        assert!(pipeline.reconfigure(display.clone()).is_err());
        assert!(!pipeline.state().is_empty());
        display.buffer_length = 3.0;
        pipeline.reconfigure(display).unwrap();
        assert!(pipeline.state().is_empty());
        let figure = pipeline.redraw();
        assert!(figure.is_empty());
        assert_eq!(figure.layout.x_axis.range, Some([0.0, 3.0]));
    }
}
