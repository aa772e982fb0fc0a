//! Rolling multi-channel sample windows and the figures drawn from them.
//!
//! A [`drivers::MonitorPipeline`] is driven by two independent clocks: acquisition
//! ticks, gated by [`drivers::CadenceController`], pull batches from a
//! [`drivers::SignalSource`] into bounded per-channel buffers; redraw ticks turn the
//! buffers into a [`drivers::Figure`] for whatever surface renders it.
pub mod config;
pub mod drivers;
pub use config::{AcquisitionConfig, DisplayConfig, MonitorConfig, YScale};
