use crate::analysis::{Analyzer, save_batch};
use crate::config::Config;
use crate::runner::TrialRunner;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Manages the runs of a simulation directory.
///
/// The directory holds `config.toml` and one `run-NNNN` directory per run.
pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Run a new batch of trials into the next run directory.
    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let mut runner = TrialRunner::new(
            self.cfg.run.n_trials,
            self.cfg.run.n_steps,
            self.cfg.model.max_population,
            self.cfg.schedule(),
        )
        .context("failed to construct runner")?;
        if let Some(seed) = self.cfg.run.seed {
            runner = runner.with_seed(seed);
        }

        let virus = self
            .cfg
            .initial_virus()
            .context("failed to construct initial virus")?;
        let n_agents = self.cfg.init.n_agents;

        let batch = runner
            .run(|_| vec![virus.clone(); n_agents])
            .context("failed to run trials")?;

        let final_pops = batch.final_populations();
        let mean_final = final_pops.iter().sum::<usize>() as f64 / final_pops.len() as f64;
        log::info!("mean final population {mean_final:.2}");

        let trials_file = self.trials_file(run_idx);
        save_batch(&batch, &trials_file)
            .with_context(|| format!("failed to save {trials_file:?}"))?;
        log::info!("saved {trials_file:?}");

        Ok(())
    }

    /// Analyze every run and save its results.
    pub fn analyze_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let mut analyzer = Analyzer::new(self.cfg.output.hist_bins);

            analyzer
                .add_file(self.trials_file(run_idx))
                .context("failed to add file")?;

            let results_file = self.results_file(run_idx);
            analyzer
                .save_results(&results_file)
                .context("failed to save results")?;
            log::info!("saved {results_file:?}");
        }

        Ok(())
    }

    /// Remove every run directory.
    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs().context("failed to list run dirs")? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }
        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let run_dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(run_dirs)
    }

    fn count_run_dirs(&self) -> Result<usize> {
        Ok(self.run_dirs()?.len())
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn trials_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trials.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }
}
