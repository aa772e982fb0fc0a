// src/drivers/mod.rs
pub mod buffer;
pub mod cadence;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod plot;
pub mod source;
pub use buffer::{merge_batch, AccumulatedState, ChannelAccumulator, RingBuffer};
pub use cadence::{CadenceController, CadenceDecision};
pub use error::ScopeError;
pub use figure::{Axis, Figure, FigureBuilder, Layout, Theme, Trace};
pub use pipeline::{AcquisitionOutcome, MonitorPipeline};
pub use plot::{parse_color, render_figure_png, PlotStyle};
pub use source::{ManualSource, SampleBatch, SignalSource, SimulatedSource};
