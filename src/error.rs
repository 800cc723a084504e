use thiserror::Error;

/// Errors raised by the simulation core.
///
/// A failed reproduction is not an error; see [`crate::agent::Reproduction`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown agent {index} (population has {len} agents)")]
    UnknownAgent { index: usize, len: usize },

    #[error("run cancelled at step {step} of trial {trial}")]
    Cancelled { trial: usize, step: usize },
}

/// Check that `prob` is a valid probability.
pub fn check_prob(name: &str, prob: f64) -> Result<(), SimError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(SimError::InvalidConfiguration(format!(
            "{name} must be in the range 0.0..=1.0, but is {prob}"
        )));
    }
    Ok(())
}
