use super::super::documents::TextExtraction;
use super::super::domain::{AdmissionDataset, ApplicationRecord, EligibilityCriteria};
use super::super::stages::StageError;

/// State threaded through one pipeline run.
///
/// Holds the dataset exclusively for the run, addressing the application under
/// processing by index. The run log and extraction scratch slots die with the context.
pub struct PipelineContext<'a> {
    dataset: &'a mut AdmissionDataset,
    index: usize,
    run_log: Vec<String>,
    pub(crate) marksheet_text: Option<TextExtraction>,
    pub(crate) identity_text: Option<TextExtraction>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(dataset: &'a mut AdmissionDataset, index: usize) -> Self {
        Self {
            dataset,
            index,
            run_log: Vec::new(),
            marksheet_text: None,
            identity_text: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> Result<&ApplicationRecord, StageError> {
        self.dataset
            .applications
            .get(self.index)
            .ok_or(StageError::RecordNotFound { index: self.index })
    }

    pub fn record_mut(&mut self) -> Result<&mut ApplicationRecord, StageError> {
        let index = self.index;
        self.dataset
            .applications
            .get_mut(index)
            .ok_or(StageError::RecordNotFound { index })
    }

    pub fn criteria(&self) -> &EligibilityCriteria {
        &self.dataset.eligibility_criteria
    }

    pub fn loan_budget(&self) -> u64 {
        self.dataset.loan_budget
    }

    pub fn disbursement_unit(&self) -> u64 {
        self.dataset.loan_disbursement_unit
    }

    /// Deduct one disbursement unit. Returns `false` and leaves the budget alone
    /// when it cannot cover the unit.
    pub(crate) fn debit_loan_budget(&mut self) -> bool {
        let unit = self.dataset.loan_disbursement_unit;
        match self.dataset.loan_budget.checked_sub(unit) {
            Some(remaining) => {
                self.dataset.loan_budget = remaining;
                true
            }
            None => false,
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.run_log.push(line.into());
    }

    pub fn run_log(&self) -> &[String] {
        &self.run_log
    }

    pub(crate) fn into_run_log(self) -> Vec<String> {
        self.run_log
    }
}
