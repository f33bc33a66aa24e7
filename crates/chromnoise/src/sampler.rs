use bitvec::vec::BitVec;
use rand::Rng;
use tracing::trace;

use crate::error::NoiseError;

/// Draws distinct window start offsets at random.
///
/// Each draw is uniform over the full offset range `0..=len - window`.
/// Offsets already seen in the current run are rejected, but every draw
/// counts against the budget, so a run can accept fewer offsets than its
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSampler {
    window: usize,
    span: usize,
    budget: usize,
}

impl WindowSampler {
    /// Create a sampler for a signal of `signal_len` points.
    pub fn new(signal_len: usize, window: usize, budget: usize) -> Result<Self, NoiseError> {
        if signal_len == 0 {
            return Err(NoiseError::InvalidSignal);
        }
        if window == 0 {
            return Err(NoiseError::ZeroWindow);
        }
        if window > signal_len {
            return Err(NoiseError::WindowTooLarge {
                window,
                len: signal_len,
            });
        }
        if budget == 0 {
            return Err(NoiseError::ZeroBudget);
        }
        Ok(Self {
            window,
            span: signal_len - window + 1,
            budget,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of distinct valid offsets.
    pub fn offset_space(&self) -> usize {
        self.span
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Start a fresh run. Each call has its own visited set.
    pub fn offsets<'r, R: Rng>(&self, rng: &'r mut R) -> Offsets<'r, R> {
        Offsets {
            rng,
            span: self.span,
            budget: self.budget,
            visited: BitVec::repeat(false, self.span),
            accepted: 0,
            draws: 0,
        }
    }
}

/// Lazy stream of accepted offsets for one sampling run.
pub struct Offsets<'r, R> {
    rng: &'r mut R,
    span: usize,
    budget: usize,
    visited: BitVec,
    accepted: usize,
    draws: usize,
}

impl<R> Offsets<'_, R> {
    /// Draws made so far, rejected duplicates included.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Distinct offsets handed out so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// True once every valid offset has been visited.
    pub fn exhausted(&self) -> bool {
        self.accepted == self.span
    }
}

impl<R: Rng> Iterator for Offsets<'_, R> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        // Once the space is exhausted further draws can only repeat, so stop.
        while self.draws < self.budget && !self.exhausted() {
            let offset = self.rng.gen_range(0..self.span);
            self.draws += 1;
            if self.visited[offset] {
                trace!(offset, draw = self.draws, "duplicate window offset");
                continue;
            }
            self.visited.set(offset, true);
            self.accepted += 1;
            return Some(offset);
        }
        None
    }
}
