//! Test doubles shared by the unit tests.

use crate::agent::{Agent, Reproduction};
use rand::{Rng, RngCore};

/// Generator yielding a fixed cycle of uniform draws in `[0, 1)`.
///
/// Each draw is encoded as the fraction of the full `u64` range, so both
/// `Rng::random::<f64>()` and `Bernoulli` sampling see the chosen value.
pub struct ScriptedRng {
    vals: Vec<u64>,
    i_val: usize,
}

impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty(), "at least one draw is required");
        let vals = draws
            .iter()
            .map(|&draw| (draw * 2f64.powi(64)) as u64)
            .collect();
        Self { vals, i_val: 0 }
    }

    pub fn repeat(draw: f64) -> Self {
        Self::new(&[draw])
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let val = self.vals[self.i_val % self.vals.len()];
        self.i_val += 1;
        val
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Agent with fixed, non-random behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct StubAgent {
    pub clears: bool,
    pub reproduces: bool,
    pub resistances: Vec<String>,
}

impl StubAgent {
    pub fn new(clears: bool, reproduces: bool) -> Self {
        Self {
            clears,
            reproduces,
            resistances: Vec::new(),
        }
    }

    pub fn resistant_to(mut self, drug: &str) -> Self {
        self.resistances.push(drug.to_string());
        self
    }
}

impl Agent for StubAgent {
    fn does_clear<R: Rng + ?Sized>(&self, _rng: &mut R) -> bool {
        self.clears
    }

    fn is_resistant_to(&self, drug: &str) -> bool {
        self.resistances.iter().any(|res| res == drug)
    }

    fn reproduce<R: Rng + ?Sized>(
        &self,
        _pop_density: f64,
        active_drugs: &[String],
        _rng: &mut R,
    ) -> Reproduction<Self> {
        let blocked = active_drugs.iter().any(|drug| !self.is_resistant_to(drug));
        if self.reproduces && !blocked {
            Reproduction::Offspring(self.clone())
        } else {
            Reproduction::NoOffspring
        }
    }
}
