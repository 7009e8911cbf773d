//! Fixed four-stage orchestration over one application.

mod context;

pub use context::PipelineContext;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use super::documents::TextExtractor;
use super::domain::{AdmissionDataset, ApplicationId, ApplicationIntake, ApplicationRecord};
use super::mailer::Mailer;
use super::stages::{self, Stage, StageError};
use super::store::{DatasetStore, StoreError};

/// Progress of a single run. `Failed` is terminal and names the stage that aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Extracted,
    Validated,
    Notified,
    LoanDecided,
    Failed { stage: Stage, reason: String },
}

impl PipelineState {
    fn after(stage: Stage) -> Self {
        match stage {
            Stage::ExtractFields => PipelineState::Extracted,
            Stage::Validate => PipelineState::Validated,
            Stage::Notify => PipelineState::Notified,
            Stage::DecideLoan => PipelineState::LoanDecided,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PipelineState::LoanDecided)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PipelineState::Failed { .. })
    }
}

/// What a caller gets back from one run: the final record, state, and run log.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub app_id: ApplicationId,
    pub state: PipelineState,
    pub run_log: Vec<String>,
    pub record: ApplicationRecord,
}

/// Runs field extraction, validation, notification, and the loan decision in that order.
pub struct AdmissionPipeline<X, M> {
    extractor: X,
    mailer: M,
}

impl<X, M> AdmissionPipeline<X, M>
where
    X: TextExtractor,
    M: Mailer,
{
    pub fn new(extractor: X, mailer: M) -> Self {
        Self { extractor, mailer }
    }

    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    /// Append the intake as a new record and drive it through every stage.
    ///
    /// A stage failure stops the run and leaves an `ERROR:` entry in the audit log; the
    /// progress made before it stays on the record.
    pub fn run(&self, dataset: &mut AdmissionDataset, intake: ApplicationIntake) -> PipelineReport {
        let record = ApplicationRecord::from_intake(intake, Utc::now());
        let app_id = record.app_id.clone();
        let index = dataset.push_application(record);

        let mut ctx = PipelineContext::new(dataset, index);
        let mut state = PipelineState::Pending;
        for stage in Stage::ORDER {
            match self.execute(stage, &mut ctx) {
                Ok(()) => state = PipelineState::after(stage),
                Err(err) => {
                    error!(app_id = %app_id, stage = stage.label(), error = %err, "pipeline run aborted");
                    state = PipelineState::Failed {
                        stage,
                        reason: err.to_string(),
                    };
                    break;
                }
            }
        }
        let run_log = ctx.into_run_log();

        let record = dataset.applications[index].clone();
        match &state {
            PipelineState::Failed { reason, .. } => dataset.log_event(format!("ERROR: {reason}")),
            _ => {
                info!(
                    app_id = %app_id,
                    validation = record.validation_status.label(),
                    loan = record.loan_status.label(),
                    "application processed"
                );
                dataset.log_event(format!(
                    "Processed application {app_id}: validation {}, loan {}",
                    record.validation_status.label(),
                    record.loan_status.label()
                ));
            }
        }

        PipelineReport {
            app_id,
            state,
            run_log,
            record,
        }
    }

    /// Run and then persist the dataset whatever the outcome.
    pub fn run_and_persist<S>(
        &self,
        dataset: &mut AdmissionDataset,
        intake: ApplicationIntake,
        store: &S,
    ) -> Result<PipelineReport, StoreError>
    where
        S: DatasetStore + ?Sized,
    {
        let report = self.run(dataset, intake);
        store.save(dataset)?;
        Ok(report)
    }

    fn execute(&self, stage: Stage, ctx: &mut PipelineContext<'_>) -> Result<(), StageError> {
        match stage {
            Stage::ExtractFields => stages::extract_fields(ctx, &self.extractor),
            Stage::Validate => stages::validate(ctx),
            Stage::Notify => stages::notify(ctx, &self.mailer),
            Stage::DecideLoan => stages::decide_loan(ctx),
        }
    }
}
