use crate::agent::{Agent, Reproduction};
use crate::error::{SimError, check_prob};
use rand::prelude::*;
use rand_distr::Bernoulli;
use std::collections::BTreeMap;

/// Virus particle with optional drug resistances.
///
/// A virus without resistances and with `mut_prob = 0` behaves as a simple
/// virus that is blocked by any active drug.
#[derive(Debug, Clone, PartialEq)]
pub struct Virus {
    max_birth_prob: f64,
    clear_prob: f64,
    resistances: BTreeMap<String, bool>,
    mut_prob: f64,

    clear_dist: Bernoulli,
    mut_dist: Bernoulli,
}

impl Virus {
    /// Create a new virus, validating all probabilities.
    pub fn new(
        max_birth_prob: f64,
        clear_prob: f64,
        resistances: BTreeMap<String, bool>,
        mut_prob: f64,
    ) -> Result<Self, SimError> {
        check_prob("maximum birth probability", max_birth_prob)?;
        check_prob("clearance probability", clear_prob)?;
        check_prob("mutation probability", mut_prob)?;

        let clear_dist = bernoulli(clear_prob)?;
        let mut_dist = bernoulli(mut_prob)?;

        Ok(Self {
            max_birth_prob,
            clear_prob,
            resistances,
            mut_prob,
            clear_dist,
            mut_dist,
        })
    }

    /// Create a virus without resistances that never mutates.
    pub fn simple(max_birth_prob: f64, clear_prob: f64) -> Result<Self, SimError> {
        Self::new(max_birth_prob, clear_prob, BTreeMap::new(), 0.0)
    }

    pub fn max_birth_prob(&self) -> f64 {
        self.max_birth_prob
    }

    pub fn clear_prob(&self) -> f64 {
        self.clear_prob
    }

    pub fn mut_prob(&self) -> f64 {
        self.mut_prob
    }

    pub fn resistances(&self) -> &BTreeMap<String, bool> {
        &self.resistances
    }

    /// Reproduction probability at the given density, clamped to `[0, 1]`.
    ///
    /// Once the population overshoots its maximum the probability is zero.
    pub fn birth_prob(&self, pop_density: f64) -> f64 {
        (self.max_birth_prob * (1.0 - pop_density)).clamp(0.0, 1.0)
    }

    fn mutated_resistances<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeMap<String, bool> {
        self.resistances
            .iter()
            .map(|(drug, &res)| {
                let res = if self.mut_dist.sample(rng) { !res } else { res };
                (drug.clone(), res)
            })
            .collect()
    }
}

impl Agent for Virus {
    fn does_clear<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.clear_dist.sample(rng)
    }

    fn is_resistant_to(&self, drug: &str) -> bool {
        self.resistances.get(drug).copied().unwrap_or(false)
    }

    fn reproduce<R: Rng + ?Sized>(
        &self,
        pop_density: f64,
        active_drugs: &[String],
        rng: &mut R,
    ) -> Reproduction<Self> {
        // Every active drug must be resisted before reproduction is attempted.
        if active_drugs.iter().any(|drug| !self.is_resistant_to(drug)) {
            return Reproduction::NoOffspring;
        }

        if rng.random::<f64>() >= self.birth_prob(pop_density) {
            return Reproduction::NoOffspring;
        }

        Reproduction::Offspring(Self {
            resistances: self.mutated_resistances(rng),
            ..self.clone()
        })
    }
}

fn bernoulli(prob: f64) -> Result<Bernoulli, SimError> {
    Bernoulli::new(prob).map_err(|err| SimError::InvalidConfiguration(err.to_string()))
}
