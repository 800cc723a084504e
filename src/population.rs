use crate::agent::Agent;
use crate::error::SimError;
use crate::treatment::Treatment;
use rand::Rng;

/// Population of agents evolving in discrete time steps.
///
/// `max_population` only throttles reproduction through the population
/// density. The number of agents is never capped and may exceed it.
#[derive(Debug, Clone)]
pub struct Population<A> {
    agt_vec: Vec<A>,
    max_population: usize,
    treatment: Treatment,
}

impl<A: Agent> Population<A> {
    /// Create a new untreated population.
    pub fn new(agt_vec: Vec<A>, max_population: usize) -> Result<Self, SimError> {
        if max_population == 0 {
            return Err(SimError::InvalidConfiguration(
                "maximum population must be positive".to_string(),
            ));
        }
        Ok(Self {
            agt_vec,
            max_population,
            treatment: Treatment::new(),
        })
    }

    pub fn agents(&self) -> &[A] {
        &self.agt_vec
    }

    pub fn max_population(&self) -> usize {
        self.max_population
    }

    pub fn total_population(&self) -> usize {
        self.agt_vec.len()
    }

    /// Current number of agents divided by the maximum population.
    pub fn density(&self) -> f64 {
        self.agt_vec.len() as f64 / self.max_population as f64
    }

    pub fn agent(&self, index: usize) -> Result<&A, SimError> {
        self.agt_vec.get(index).ok_or(SimError::UnknownAgent {
            index,
            len: self.agt_vec.len(),
        })
    }

    /// Remove the agent at `index`, keeping the order of the others.
    pub fn remove(&mut self, index: usize) -> Result<A, SimError> {
        if index >= self.agt_vec.len() {
            return Err(SimError::UnknownAgent {
                index,
                len: self.agt_vec.len(),
            });
        }
        Ok(self.agt_vec.remove(index))
    }

    pub fn treatment(&self) -> &Treatment {
        &self.treatment
    }

    pub fn active_drugs(&self) -> &[String] {
        self.treatment.active_drugs()
    }

    /// Start administering `drug`. Already active drugs are ignored.
    pub fn administer(&mut self, drug: &str) -> bool {
        let added = self.treatment.administer(drug);
        if added {
            log::debug!("administered {drug} to population of {}", self.agt_vec.len());
        }
        added
    }

    /// Number of agents resistant to every drug in `drugs`.
    ///
    /// An empty list is resisted by every agent.
    pub fn resistant_count<S: AsRef<str>>(&self, drugs: &[S]) -> usize {
        self.agt_vec
            .iter()
            .filter(|agt| drugs.iter().all(|drug| agt.is_resistant_to(drug.as_ref())))
            .count()
    }

    /// Advance the population by one time step and return its new size.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.clear_agents(rng);
        self.reproduce_agents(rng);
        self.agt_vec.len()
    }

    fn clear_agents<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        // Decide on the pre-step snapshot before removing anything.
        let cleared: Vec<bool> = self.agt_vec.iter().map(|agt| agt.does_clear(rng)).collect();
        let mut cleared = cleared.into_iter();
        self.agt_vec.retain(|_| !cleared.next().unwrap_or(false));
    }

    fn reproduce_agents<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pop_density = self.density();
        let active_drugs = self.treatment.active_drugs();

        // Only agents that survived clearing reproduce; offspring wait for the next step.
        let offspring: Vec<A> = self
            .agt_vec
            .iter()
            .filter_map(|agt| agt.reproduce(pop_density, active_drugs, rng).offspring())
            .collect();

        self.agt_vec.extend(offspring);
    }
}
