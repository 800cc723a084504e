use serde::{Deserialize, Serialize};

/// Drugs currently administered to a population.
///
/// Drugs are kept in administration order and are never revoked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Treatment {
    active_drugs: Vec<String>,
}

impl Treatment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `drug` to the active set.
    ///
    /// Returns `false` if the drug was already active.
    pub fn administer(&mut self, drug: &str) -> bool {
        if self.is_active(drug) {
            return false;
        }
        self.active_drugs.push(drug.to_string());
        true
    }

    pub fn is_active(&self, drug: &str) -> bool {
        self.active_drugs.iter().any(|active| active == drug)
    }

    pub fn active_drugs(&self) -> &[String] {
        &self.active_drugs
    }
}

/// Administration of a drug right before a given time step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dose {
    pub drug: String,
    pub step: usize,
}

/// Dosing schedule applied to every trial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    doses: Vec<Dose>,
}

impl Schedule {
    pub fn new(doses: Vec<Dose>) -> Self {
        Self { doses }
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    pub fn doses(&self) -> &[Dose] {
        &self.doses
    }

    /// Drugs to administer right before time step `step`.
    pub fn due_at(&self, step: usize) -> impl Iterator<Item = &str> {
        self.doses
            .iter()
            .filter(move |dose| dose.step == step)
            .map(|dose| dose.drug.as_str())
    }

    /// Distinct scheduled drugs in order of first appearance.
    pub fn drugs(&self) -> Vec<String> {
        let mut drugs: Vec<String> = Vec::with_capacity(self.doses.len());
        for dose in &self.doses {
            if !drugs.contains(&dose.drug) {
                drugs.push(dose.drug.clone());
            }
        }
        drugs
    }
}
