//! Agent capabilities used by the population.

use rand::Rng;

/// Outcome of a reproduction attempt.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Reproduction<A> {
    /// The agent produced a new agent.
    Offspring(A),
    /// The agent did not reproduce this step.
    NoOffspring,
}

impl<A> Reproduction<A> {
    /// Convert into the offspring, if any.
    pub fn offspring(self) -> Option<A> {
        match self {
            Reproduction::Offspring(agt) => Some(agt),
            Reproduction::NoOffspring => None,
        }
    }
}

/// Member of a stochastically evolving population.
///
/// All randomness is drawn from the generator passed in, so an agent never
/// holds random state of its own.
pub trait Agent: Sized {
    /// Decide whether the agent is cleared this step.
    fn does_clear<R: Rng + ?Sized>(&self, rng: &mut R) -> bool;

    /// Stored resistance to `drug`; unknown drugs are not resisted.
    fn is_resistant_to(&self, drug: &str) -> bool;

    /// Attempt to reproduce at the given population density.
    ///
    /// `active_drugs` is empty when no treatment is in effect.
    fn reproduce<R: Rng + ?Sized>(
        &self,
        pop_density: f64,
        active_drugs: &[String],
        rng: &mut R,
    ) -> Reproduction<Self>;
}
