use std::collections::VecDeque;
use log::debug;
use crate::config::DisplayConfig;
use crate::drivers::SampleBatch;
/// Bounded ordered sequence of samples for one channel, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingBuffer {
    data: VecDeque<f64>,
}
impl RingBuffer {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn append(&mut self, samples: &[f64]) {
        self.data.extend(samples.iter().copied());
    }
    /// Drops samples from the head until at most `capacity` remain.
    /// Returns how many were dropped.
    pub fn trim(&mut self, capacity: usize) -> usize {
        let excess = self.data.len().saturating_sub(capacity);
        self.data.drain(..excess);
        excess
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &f64> + ExactSizeIterator {
        self.data.iter()
    }
    /// The newest `count` samples in arrival order.
    pub fn latest(&self, count: usize) -> Vec<f64> {
        let skip = self.data.len().saturating_sub(count);
        self.data.iter().skip(skip).copied().collect()
    }
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().copied().collect()
    }
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
/// Channel name to sample window mapping, in channel insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccumulatedState {
    channel_labels: Vec<String>,
    per_channel: Vec<RingBuffer>,
    total_appended: u64,
}
impl AccumulatedState {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn num_channels(&self) -> usize {
        self.channel_labels.len()
    }
    pub fn channel_labels(&self) -> &[String] {
        &self.channel_labels
    }
    pub fn get(&self, channel: &str) -> Option<&RingBuffer> {
        self.position(channel).map(|idx| &self.per_channel[idx])
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RingBuffer)> {
        self.channel_labels
            .iter()
            .map(String::as_str)
            .zip(self.per_channel.iter())
    }
    /// True when there are no channels or none of them holds a sample.
    pub fn is_empty(&self) -> bool {
        self.per_channel.iter().all(RingBuffer::is_empty)
    }
    pub fn longest_len(&self) -> usize {
        self.per_channel.iter().map(RingBuffer::len).max().unwrap_or(0)
    }
    /// Running count of samples merged so far, measured on each batch's first channel.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
    /// Empties every channel while keeping the channel set.
    pub fn clear(&mut self) {
        for buffer in &mut self.per_channel {
            buffer.clear();
        }
        self.total_appended = 0;
    }
    /// Owned copies of the requested channels (all when `channels` is `None`),
    /// limited to the newest `max_points` samples when given. Unknown names are skipped.
    pub fn snapshot(
        &self,
        channels: Option<&[&str]>,
        max_points: Option<usize>,
    ) -> Vec<(String, Vec<f64>)> {
        let take = max_points.unwrap_or(usize::MAX);
        match channels {
            Some(wanted) => wanted
                .iter()
                .filter_map(|name| self.get(name).map(|b| (name.to_string(), b.latest(take))))
                .collect(),
            None => self
                .iter()
                .map(|(name, b)| (name.to_owned(), b.latest(take)))
                .collect(),
        }
    }
    fn position(&self, channel: &str) -> Option<usize> {
        self.channel_labels.iter().position(|c| c == channel)
    }
    fn channel_mut(&mut self, channel: &str) -> &mut RingBuffer {
        let idx = match self.position(channel) {
            Some(idx) => idx,
            None => {
                self.channel_labels.push(channel.to_owned());
                self.per_channel.push(RingBuffer::new());
                self.per_channel.len() - 1
            }
        };
        &mut self.per_channel[idx]
    }
}
/// Folds `batch` into `state`, trimming every touched channel to `config.capacity()`.
///
/// A missing state starts empty. A missing or empty batch returns the state as-is.
/// Channels that are not in the batch are left alone.
pub fn merge_batch(
    state: Option<AccumulatedState>,
    batch: Option<&SampleBatch>,
    config: &DisplayConfig,
) -> AccumulatedState {
    let mut state = state.unwrap_or_default();
    let Some(batch) = batch.filter(|b| !b.is_empty()) else {
        return state;
    };
    let capacity = config.capacity();
    for (channel, samples) in batch.iter() {
        let buffer = state.channel_mut(channel);
        buffer.append(samples);
        let dropped = buffer.trim(capacity);
        debug!(
            "merged {} samples into {channel} (len {}, dropped {dropped})",
            samples.len(),
            buffer.len()
        );
    }
    state.total_appended += batch.samples_per_channel().unwrap_or(0) as u64;
    state
}
/// Owner of the accumulated state between ticks.
#[derive(Debug, Default)]
pub struct ChannelAccumulator {
    state: AccumulatedState,
}
impl ChannelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn merge(
        &mut self,
        batch: Option<&SampleBatch>,
        config: &DisplayConfig,
    ) -> &AccumulatedState {
        let state = std::mem::take(&mut self.state);
        self.state = merge_batch(Some(state), batch, config);
        &self.state
    }
    pub fn state(&self) -> &AccumulatedState {
        &self.state
    }
    /// Drops every channel, e.g. after a configuration change.
    pub fn reset(&mut self) {
        self.state = AccumulatedState::new();
    }
    pub fn into_state(self) -> AccumulatedState {
        self.state
    }
}
