use std::collections::VecDeque;
use std::f64::consts::PI;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::drivers::ScopeError;
/// New samples for any number of channels, in arrival order per channel.
///
/// Channel order is the order in which channels were first pushed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBatch {
    channels: Vec<(String, Vec<f64>)>,
}
impl SampleBatch {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds samples for `channel`; repeated pushes to the same channel are concatenated.
    pub fn push(&mut self, channel: impl Into<String>, samples: impl IntoIterator<Item = f64>) {
        let channel = channel.into();
        match self.channels.iter_mut().find(|(name, _)| *name == channel) {
            Some((_, existing)) => existing.extend(samples),
            None => self.channels.push((channel, samples.into_iter().collect())),
        }
    }
    pub fn with(
        mut self,
        channel: impl Into<String>,
        samples: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.push(channel, samples);
        self
    }
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
    pub fn get(&self, channel: &str) -> Option<&[f64]> {
        self.channels
            .iter()
            .find(|(name, _)| name == channel)
            .map(|(_, samples)| samples.as_slice())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.channels
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }
    /// Sample count of the first channel, used as the batch's nominal length.
    pub fn samples_per_channel(&self) -> Option<usize> {
        self.channels.first().map(|(_, samples)| samples.len())
    }
}
impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for SampleBatch {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        let mut batch = SampleBatch::new();
        for (channel, samples) in iter {
            batch.push(channel, samples);
        }
        batch
    }
}
/// Something that can yield sample batches on demand.
///
/// `Ok(None)` means "no new samples this round" and is not an error.
pub trait SignalSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, ScopeError>;
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<Result<Option<SampleBatch>, ScopeError>>,
}
impl ManualSource {
    pub fn new(batches: impl IntoIterator<Item = SampleBatch>) -> Self {
        Self {
            queue: batches.into_iter().map(|b| Ok(Some(b))).collect(),
        }
    }
    /// Queues an explicit "nothing new" read.
    pub fn push_empty(&mut self) {
        self.queue.push_back(Ok(None));
    }
    /// Queues a failing read.
    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.queue
            .push_back(Err(ScopeError::Acquisition(message.into())));
    }
    pub fn push_batch(&mut self, batch: SampleBatch) {
        self.queue.push_back(Ok(Some(batch)));
    }
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
impl SignalSource for ManualSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, ScopeError> {
        self.queue.pop_front().unwrap_or(Ok(None))
    }
}
const TONE_FREQS_HZ: [f64; 4] = [1.0, 2.0, 5.0, 10.0];
const TONE_PHASES: [f64; 4] = [0.0, PI / 4.0, PI / 2.0, 3.0 * PI / 4.0];
struct SignalGen {
    freq_hz: f64,
    phase: f64,
    amplitude: f64,
}
/// Stand-in DAQ device producing noisy sine tones.
///
/// Channels 0..4 carry 1, 2, 5 and 10 Hz tones; any further channel is pure noise.
/// Time continues across reads so consecutive batches join seamlessly.
pub struct SimulatedSource {
    channels: Vec<String>,
    gens: Vec<Option<SignalGen>>,
    sample_rate_hz: f64,
    samples_per_read: usize,
    noise: f64,
    time_offset: f64,
    running: bool,
    rng: StdRng,
}
impl SimulatedSource {
    pub fn new(channels: Vec<String>, sample_rate_hz: f64, samples_per_read: usize) -> Self {
        Self::with_rng(
            channels,
            sample_rate_hz,
            samples_per_read,
            StdRng::from_entropy(),
        )
    }
    pub fn seeded(
        channels: Vec<String>,
        sample_rate_hz: f64,
        samples_per_read: usize,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            channels,
            sample_rate_hz,
            samples_per_read,
            StdRng::seed_from_u64(seed),
        )
    }
    fn with_rng(
        channels: Vec<String>,
        sample_rate_hz: f64,
        samples_per_read: usize,
        rng: StdRng,
    ) -> Self {
        let gens = (0..channels.len())
            .map(|idx| {
                TONE_FREQS_HZ.get(idx).map(|&freq_hz| SignalGen {
                    freq_hz,
                    phase: TONE_PHASES[idx],
                    amplitude: 1.0,
                })
            })
            .collect();
        Self {
            channels,
            gens,
            sample_rate_hz,
            samples_per_read,
            noise: 0.1,
            time_offset: 0.0,
            running: false,
            rng,
        }
    }
    /// Sets the peak noise amplitude added to every sample. Non-finite values disable noise.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = if noise.is_finite() { noise.abs() } else { 0.0 };
        self
    }
    pub fn start(&mut self) {
        self.running = true;
        info!(
            "simulated source started: {} channels at {} Hz",
            self.channels.len(),
            self.sample_rate_hz
        );
    }
    pub fn stop(&mut self) {
        self.running = false;
        info!("simulated source stopped");
    }
    pub fn is_running(&self) -> bool {
        self.running
    }
    /// Seconds of signal produced so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.time_offset
    }
    fn noise_sample(&mut self) -> f64 {
        if self.noise == 0.0 {
            0.0
        } else {
            self.rng.gen_range(-self.noise..self.noise)
        }
    }
}
impl SignalSource for SimulatedSource {
    fn next_batch(&mut self) -> Result<Option<SampleBatch>, ScopeError> {
        if !self.running || self.channels.is_empty() || self.samples_per_read == 0 {
            return Ok(None);
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ScopeError::InvalidSampleRate(self.sample_rate_hz));
        }
        let dt = 1.0 / self.sample_rate_hz;
        let mut batch = SampleBatch::new();
        for idx in 0..self.channels.len() {
            let mut samples = Vec::with_capacity(self.samples_per_read);
            for i in 0..self.samples_per_read {
                let t = self.time_offset + i as f64 * dt;
                let tone = match &self.gens[idx] {
                    Some(gen) => (2.0 * PI * gen.freq_hz * t + gen.phase).sin() * gen.amplitude,
                    None => 0.0,
                };
                samples.push(tone + self.noise_sample());
            }
            batch.push(self.channels[idx].clone(), samples);
        }
        self.time_offset += self.samples_per_read as f64 * dt;
        Ok(Some(batch))
    }
}
