use crate::runner::{Batch, TrialRecord};
use crate::stats::{Accumulator, AccumulatorReport, Histogram};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Summary produced by an observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Report {
    /// Per-step mean and standard deviation across trials.
    Trajectory {
        name: String,
        steps: Vec<AccumulatorReport>,
    },
    /// Distribution of a per-trial value.
    Distribution {
        name: String,
        summary: AccumulatorReport,
        hist: Histogram,
    },
}

pub trait Obs {
    fn update(&mut self, record: &TrialRecord) -> Result<()>;
    fn report(&self) -> Report;
}

/// Per-step statistics of a trajectory recorded in every trial.
pub struct Trajectory {
    name: &'static str,
    select: fn(&TrialRecord) -> Option<&[usize]>,
    acc_vec: Vec<Accumulator>,
}

impl Trajectory {
    pub fn total_pop() -> Self {
        Self {
            name: "total_pop",
            select: select_total,
            acc_vec: Vec::new(),
        }
    }

    pub fn resistant_pop() -> Self {
        Self {
            name: "resistant_pop",
            select: select_resistant,
            acc_vec: Vec::new(),
        }
    }
}

fn select_total(record: &TrialRecord) -> Option<&[usize]> {
    Some(record.total.as_slice())
}

fn select_resistant(record: &TrialRecord) -> Option<&[usize]> {
    record.resistant.as_deref()
}

impl Obs for Trajectory {
    fn update(&mut self, record: &TrialRecord) -> Result<()> {
        let Some(vals) = (self.select)(record) else {
            return Ok(());
        };
        if self.acc_vec.len() < vals.len() {
            self.acc_vec.resize_with(vals.len(), Accumulator::new);
        }
        for (acc, &val) in self.acc_vec.iter_mut().zip(vals) {
            acc.add(val as f64);
        }
        Ok(())
    }

    fn report(&self) -> Report {
        Report::Trajectory {
            name: self.name.to_string(),
            steps: self.acc_vec.iter().map(|acc| acc.report()).collect(),
        }
    }
}

/// Distribution of the population at the end of each trial.
pub struct FinalPop {
    n_bins: usize,
    acc: Accumulator,
    vals: Vec<f64>,
}

impl FinalPop {
    pub fn new(n_bins: usize) -> Self {
        Self {
            n_bins,
            acc: Accumulator::new(),
            vals: Vec::new(),
        }
    }
}

impl Obs for FinalPop {
    fn update(&mut self, record: &TrialRecord) -> Result<()> {
        let val = record.final_pop() as f64;
        self.acc.add(val);
        self.vals.push(val);
        Ok(())
    }

    fn report(&self) -> Report {
        Report::Distribution {
            name: "final_pop".to_string(),
            summary: self.acc.report(),
            hist: Histogram::new(&self.vals, self.n_bins),
        }
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(hist_bins: usize) -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(Trajectory::total_pop()),
            Box::new(Trajectory::resistant_pop()),
            Box::new(FinalPop::new(hist_bins)),
        ];
        Self { obs_ptr_vec }
    }

    pub fn add_batch(&mut self, batch: &Batch) -> Result<()> {
        for record in batch.records() {
            for obs in &mut self.obs_ptr_vec {
                obs.update(record).context("failed to update observable")?;
            }
        }
        Ok(())
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let batch = load_batch(file)?;
        self.add_batch(&batch)
    }

    pub fn reports(&self) -> Vec<Report> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        encode::write_named(&mut writer, &self.reports()).context("failed to serialize reports")?;
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }
}

pub fn save_batch<P: AsRef<Path>>(batch: &Batch, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);

    encode::write(&mut writer, batch).context("failed to serialize batch")?;
    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}

pub fn load_batch<P: AsRef<Path>>(file: P) -> Result<Batch> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let batch = decode::from_read(&mut reader).context("failed to deserialize batch")?;
    Ok(batch)
}

pub fn load_results<P: AsRef<Path>>(file: P) -> Result<Vec<Report>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let reports = decode::from_read(&mut reader).context("failed to deserialize reports")?;
    Ok(reports)
}
