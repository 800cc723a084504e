use serde::{Deserialize, Serialize};

/// Online mean and variance of a stream of values (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn n_vals(&self) -> usize {
        self.n_vals
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Equal-width histogram of a set of values.
///
/// `edges` holds `counts.len() + 1` bin boundaries; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn new(vals: &[f64], n_bins: usize) -> Self {
        if vals.is_empty() || n_bins == 0 {
            return Self {
                edges: Vec::new(),
                counts: Vec::new(),
            };
        }

        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Degenerate range: spread a single unit bin width over all bins.
        let width = if max > min {
            (max - min) / n_bins as f64
        } else {
            log::warn!("all {} values equal {min}, histogram range is degenerate", vals.len());
            1.0 / n_bins as f64
        };

        let edges = (0..=n_bins).map(|i_bin| min + i_bin as f64 * width).collect();
        let mut counts = vec![0; n_bins];
        for &val in vals {
            let i_bin = ((val - min) / width) as usize;
            counts[i_bin.min(n_bins - 1)] += 1;
        }

        Self { edges, counts }
    }

    pub fn n_vals(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_mean_and_std_dev() {
        let mut acc = Accumulator::new();
        assert!(acc.report().mean.is_nan());

        acc.add(2.0);
        assert_eq!(acc.report().mean, 2.0);
        assert!(acc.report().std_dev.is_nan());

        acc.add(4.0);
        let report = acc.report();
        assert_eq!(report.mean, 3.0);
        assert!((report.std_dev - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(acc.n_vals(), 2);
    }

    #[test]
    fn histogram_bins() {
        let hist = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(hist.edges, [0.0, 2.0, 4.0]);
        assert_eq!(hist.counts, [2, 3]);
        assert_eq!(hist.n_vals(), 5);
    }

    #[test]
    fn histogram_degenerate_range() {
        let hist = Histogram::new(&[7.0, 7.0, 7.0], 4);
        assert_eq!(hist.counts, [3, 0, 0, 0]);
        assert_eq!(hist.edges.len(), 5);

        let hist = Histogram::new(&[], 4);
        assert!(hist.counts.is_empty());
    }
}
