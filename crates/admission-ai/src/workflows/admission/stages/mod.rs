mod extraction;
mod loan;
mod notification;
mod validation;

pub use extraction::{extract_fields, IdentityFields, MarksheetFields};
pub use loan::{decide_loan, LoanDecision, LOAN_REJECTION_REASON};
pub use notification::{compose_message, notify, NoticeKind};
pub use validation::{assess, validate, Eligibility, VALIDATION_FAILURE_REASON};

use serde::Serialize;

use super::domain::{ApplicationId, IntakeError};

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ExtractFields,
    Validate,
    Notify,
    DecideLoan,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::ExtractFields,
        Stage::Validate,
        Stage::Notify,
        Stage::DecideLoan,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Stage::ExtractFields => "field extraction",
            Stage::Validate => "validation",
            Stage::Notify => "notification",
            Stage::DecideLoan => "loan decision",
        }
    }
}

/// Failure that aborts the remainder of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("application index {index} is not present in the dataset")]
    RecordNotFound { index: usize },
    #[error("application {app_id} is malformed: {source}")]
    MalformedRecord {
        app_id: ApplicationId,
        #[source]
        source: IntakeError,
    },
}
