//! Admission application processing.
//!
//! An application enters through [`AdmissionService::submit`], is appended to the
//! persisted [`AdmissionDataset`], and is driven by [`AdmissionPipeline`] through field
//! extraction, validation, notification, and the loan decision. The dataset is written
//! back after every run, failed runs included.

pub mod criteria;
pub mod documents;
pub mod domain;
pub mod mailer;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod service;
pub mod shortlist;
pub mod stages;
pub mod store;

#[cfg(test)]
mod tests;

pub use criteria::{import_criteria, CriteriaUpdate};
pub use documents::{
    DocumentError, ExtractionSource, OcrEngine, PdfTextExtractor, TesseractOcr, TextExtraction,
    TextExtractor,
};
pub use domain::{
    AcademicMarks, AdmissionDataset, ApplicationId, ApplicationIntake, ApplicationRecord,
    CommunicationStatus, EligibilityCriteria, ExtractionStatus, FeeSlipStatus, IntakeError,
    LoanStatus, ShortlistStatus, ValidationStatus,
};
pub use mailer::{mailer_from_config, DisabledMailer, MailError, Mailer, OutboundMessage, SmtpMailer};
pub use pipeline::{AdmissionPipeline, PipelineContext, PipelineReport, PipelineState};
pub use report::{write_summary_csv, AdmissionDashboard, ApplicationSummaryRow};
pub use router::admission_router;
pub use service::{AdmissionService, AdmissionServiceError, CriteriaImport};
pub use shortlist::{shortlist_applicants, ShortlistOutcome};
pub use stages::{Stage, StageError};
pub use store::{DatasetStore, JsonFileStore, StoreError};
