use crate::treatment::{Dose, Schedule};
use crate::virus::Virus;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
    pub init: InitConfig,
    #[serde(default)]
    pub treatment: TreatmentConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

/// Parameters of the virus particles and their host.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Reproduction probability at zero population density.
    pub max_birth_prob: f64,
    /// Probability of being cleared each step.
    pub clear_prob: f64,
    /// Probability of each resistance flipping in an offspring.
    #[serde(default)]
    pub mut_prob: f64,
    /// Population at which reproduction stops.
    pub max_population: usize,
}

/// Initial population of every trial.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// Initial number of agents.
    pub n_agents: usize,
    /// Resistance of the initial agents to each drug.
    #[serde(default)]
    pub resistances: BTreeMap<String, bool>,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentConfig {
    #[serde(default)]
    pub doses: Vec<Dose>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of independent trials.
    pub n_trials: usize,
    /// Number of time steps per trial.
    pub n_steps: usize,
    /// Seed of the run (drawn at random if absent).
    pub seed: Option<u64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of bins of the final population histogram.
    pub hist_bins: usize,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Dosing schedule shared by all trials.
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.treatment.doses.clone())
    }

    /// Virus every trial starts from.
    pub fn initial_virus(&self) -> Result<Virus> {
        let virus = Virus::new(
            self.model.max_birth_prob,
            self.model.clear_prob,
            self.init.resistances.clone(),
            self.model.mut_prob,
        )?;
        Ok(virus)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.model.max_birth_prob, 0.0..=1.0)
            .context("invalid maximum birth probability")?;
        check_num(self.model.clear_prob, 0.0..=1.0).context("invalid clearance probability")?;
        check_num(self.model.mut_prob, 0.0..=1.0).context("invalid mutation probability")?;
        check_num(self.model.max_population, 1..10_000_000)
            .context("invalid maximum population")?;

        check_num(self.init.n_agents, 1..10_000_000).context("invalid initial number of agents")?;
        if self.init.resistances.keys().any(String::is_empty) {
            bail!("drug names must not be empty");
        }

        check_num(self.run.n_trials, 1..100_000).context("invalid number of trials")?;
        check_num(self.run.n_steps, 0..1_000_000).context("invalid number of steps")?;

        for (i_dose, dose) in self.treatment.doses.iter().enumerate() {
            check_dose(dose, self.run.n_steps).with_context(|| format!("invalid dose {i_dose}"))?;
        }

        check_num(self.output.hist_bins, 1..10_000).context("invalid number of histogram bins")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_dose(dose: &Dose, n_steps: usize) -> Result<()> {
    if dose.drug.is_empty() {
        bail!("drug name must not be empty");
    }
    check_num(dose.step, 0..n_steps).context("invalid administration step")?;
    Ok(())
}
