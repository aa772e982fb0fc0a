use log::debug;
use crate::drivers::AccumulatedState;
/// Outcome of a cadence check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CadenceDecision<'a> {
    /// Nothing changed; keep the previous output.
    Unchanged,
    /// Acquire now. Carries the current state (if any) forward to the caller.
    Fetch(Option<&'a AccumulatedState>),
}
impl CadenceDecision<'_> {
    pub fn should_fetch(&self) -> bool {
        matches!(self, CadenceDecision::Fetch(_))
    }
}
/// Gates acquisition to every `fetch_interval`-th tick, except on cold start.
#[derive(Clone, Copy, Debug)]
pub struct CadenceController {
    fetch_interval: u64,
}
impl CadenceController {
    /// An interval of zero is treated as one (fetch on every tick).
    pub fn new(fetch_interval: u64) -> Self {
        Self {
            fetch_interval: fetch_interval.max(1),
        }
    }
    pub fn fetch_interval(&self) -> u64 {
        self.fetch_interval
    }
    pub fn decide<'a>(
        &self,
        tick: u64,
        state: Option<&'a AccumulatedState>,
    ) -> CadenceDecision<'a> {
        let cold = state.map_or(true, AccumulatedState::is_empty);
        if cold || tick % self.fetch_interval == 0 {
            CadenceDecision::Fetch(state)
        } else {
            debug!("tick {tick}: skipping acquisition");
            CadenceDecision::Unchanged
        }
    }
}
impl Default for CadenceController {
    fn default() -> Self {
        Self::new(5)
    }
}
