use crate::agent::Agent;
use crate::error::SimError;
use crate::population::Population;
use crate::treatment::Schedule;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Population counts recorded during a single trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Number of agents before the first step.
    pub init_pop: usize,

    /// Total population after each step.
    pub total: Vec<usize>,

    /// Population resistant to all scheduled drugs after each step.
    ///
    /// Only drugs in the schedule are tracked; resistances of the initial
    /// agents to drugs that are never administered do not count. Only
    /// recorded when the schedule contains at least one dose.
    pub resistant: Option<Vec<usize>>,
}

impl TrialRecord {
    pub fn final_pop(&self) -> usize {
        self.total.last().copied().unwrap_or(self.init_pop)
    }
}

/// Records of all trials of a run, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    records: Vec<TrialRecord>,
}

impl Batch {
    pub fn from_records(records: Vec<TrialRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn n_trials(&self) -> usize {
        self.records.len()
    }

    /// Average total population at each step.
    pub fn avg_total(&self) -> Vec<f64> {
        average(self.records.iter().map(|rec| rec.total.as_slice()))
    }

    /// Average resistant population at each step, if it was recorded.
    pub fn avg_resistant(&self) -> Option<Vec<f64>> {
        let resistant: Option<Vec<&[usize]>> = self
            .records
            .iter()
            .map(|rec| rec.resistant.as_deref())
            .collect();
        resistant.map(|resistant| average(resistant.into_iter()))
    }

    /// Population at the end of each trial.
    pub fn final_populations(&self) -> Vec<usize> {
        self.records.iter().map(TrialRecord::final_pop).collect()
    }
}

/// Element-wise mean of equally long sequences.
fn average<'a, I>(seqs: I) -> Vec<f64>
where
    I: Iterator<Item = &'a [usize]>,
{
    let mut sum: Vec<f64> = Vec::new();
    let mut n_seqs = 0;
    for seq in seqs {
        if sum.len() < seq.len() {
            sum.resize(seq.len(), 0.0);
        }
        for (acc, &val) in sum.iter_mut().zip(seq) {
            *acc += val as f64;
        }
        n_seqs += 1;
    }
    sum.iter_mut().for_each(|acc| *acc /= n_seqs as f64);
    sum
}

/// Runs independent trials of a population and collects their counts.
///
/// Each trial gets its own generator, derived from the run seed and the
/// trial index, so results do not depend on how trials are scheduled on
/// threads.
pub struct TrialRunner {
    n_trials: usize,
    n_steps: usize,
    max_population: usize,
    schedule: Schedule,
    seed: u64,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TrialRunner {
    pub fn new(
        n_trials: usize,
        n_steps: usize,
        max_population: usize,
        schedule: Schedule,
    ) -> Result<Self, SimError> {
        if n_trials == 0 {
            return Err(SimError::InvalidConfiguration(
                "number of trials must be positive".to_string(),
            ));
        }
        if max_population == 0 {
            return Err(SimError::InvalidConfiguration(
                "maximum population must be positive".to_string(),
            ));
        }
        if let Some(dose) = schedule.doses().iter().find(|dose| dose.step >= n_steps) {
            return Err(SimError::InvalidConfiguration(format!(
                "dose of {} at step {} is outside the {n_steps} simulated steps",
                dose.drug, dose.step
            )));
        }

        let seed = rand::rng().random();

        Ok(Self {
            n_trials,
            n_steps,
            max_population,
            schedule,
            seed,
            cancel_flag: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stop the run between time steps once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run all trials.
    ///
    /// `seed_factory` builds the initial agents of each trial from the
    /// trial's generator.
    pub fn run<A, F>(&self, seed_factory: F) -> Result<Batch, SimError>
    where
        A: Agent,
        F: Fn(&mut ChaCha12Rng) -> Vec<A> + Sync,
    {
        log::info!(
            "running {} trials of {} steps (seed {})",
            self.n_trials,
            self.n_steps,
            self.seed
        );

        let n_done = AtomicUsize::new(0);
        let records = (0..self.n_trials)
            .into_par_iter()
            .map(|i_trial| -> Result<TrialRecord, SimError> {
                let record = self.run_trial(i_trial, &seed_factory)?;

                let n_done = n_done.fetch_add(1, Ordering::Relaxed) + 1;
                let progress = 100.0 * n_done as f64 / self.n_trials as f64;
                log::info!("completed {progress:06.2}%");

                Ok(record)
            })
            .collect::<Result<Vec<_>, SimError>>()?;

        Ok(Batch::from_records(records))
    }

    fn run_trial<A, F>(&self, i_trial: usize, seed_factory: &F) -> Result<TrialRecord, SimError>
    where
        A: Agent,
        F: Fn(&mut ChaCha12Rng) -> Vec<A>,
    {
        let mut rng = ChaCha12Rng::seed_from_u64(self.seed);
        rng.set_stream(i_trial as u64);

        let mut pop = Population::new(seed_factory(&mut rng), self.max_population)?;
        let init_pop = pop.total_population();
        if init_pop == 0 {
            log::warn!("trial {i_trial} starts with an empty population");
        }

        let tracked_drugs = self.schedule.drugs();
        let mut total = Vec::with_capacity(self.n_steps);
        let mut resistant = (!tracked_drugs.is_empty()).then(|| Vec::with_capacity(self.n_steps));

        for step in 0..self.n_steps {
            self.check_cancelled(i_trial, step)?;

            for drug in self.schedule.due_at(step) {
                pop.administer(drug);
            }

            total.push(pop.step(&mut rng));
            if let Some(resistant) = resistant.as_mut() {
                resistant.push(pop.resistant_count(tracked_drugs.as_slice()));
            }
        }

        Ok(TrialRecord {
            init_pop,
            total,
            resistant,
        })
    }

    fn check_cancelled(&self, trial: usize, step: usize) -> Result<(), SimError> {
        match &self.cancel_flag {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(SimError::Cancelled { trial, step }),
            _ => Ok(()),
        }
    }
}
