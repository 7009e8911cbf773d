use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting/identity name used when no document or applicant supplied one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Stored in place of an identity number that could not be read.
pub const IDENTITY_NUMBER_SENTINEL: &str = "XXXX-XXXX-XXXX";

/// Amount deducted from the shared budget for every approved loan.
pub const LOAN_DISBURSEMENT_UNIT: u64 = 5000;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PCM percentages read from the marksheet, each 0-100 when known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicMarks {
    pub class10_pcm_perc: Option<f64>,
    pub class12_pcm_perc: Option<f64>,
}

/// Caller supplied fields for a new application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationIntake {
    #[serde(default)]
    pub app_id: Option<ApplicationId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub marks: AcademicMarks,
    #[serde(default)]
    pub exam_rank: Option<u32>,
    #[serde(default)]
    pub marksheet_path: Option<PathBuf>,
    #[serde(default)]
    pub identity_proof_path: Option<PathBuf>,
    #[serde(default)]
    pub identity_number: Option<String>,
    #[serde(default)]
    pub loan_requested: bool,
    #[serde(default)]
    pub family_income_lpa: Option<f64>,
}

/// Rejections raised before an intake is allowed into the pipeline.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IntakeError {
    #[error("an email address is required")]
    MissingEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("identity number must contain exactly 12 digits, found '{0}'")]
    InvalidIdentityNumber(String),
    #[error("{field} must be between 0 and 100, found {value}")]
    MarksOutOfRange { field: &'static str, value: f64 },
    #[error("family income must be a non-negative number of LPA, found {0}")]
    InvalidIncome(f64),
}

impl ApplicationIntake {
    pub fn validate(&self) -> Result<(), IntakeError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(IntakeError::MissingEmail)?;
        if !looks_like_email(email) {
            return Err(IntakeError::InvalidEmail(email.to_string()));
        }

        if let Some(number) = self.identity_number.as_deref() {
            if !is_identity_number(number) {
                return Err(IntakeError::InvalidIdentityNumber(number.to_string()));
            }
        }

        check_percentage("class10_pcm_perc", self.marks.class10_pcm_perc)?;
        check_percentage("class12_pcm_perc", self.marks.class12_pcm_perc)?;

        if let Some(income) = self.family_income_lpa {
            if !income.is_finite() || income < 0.0 {
                return Err(IntakeError::InvalidIncome(income));
            }
        }

        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Twelve digits, optionally grouped by single spaces as printed on the card.
fn is_identity_number(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 12 && digits.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn check_percentage(field: &'static str, value: Option<f64>) -> Result<(), IntakeError> {
    match value {
        Some(value) if !(0.0..=100.0).contains(&value) => {
            Err(IntakeError::MarksOutOfRange { field, value })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    #[default]
    Pending,
    Extracted,
    Partial,
    Unreadable,
}

impl ExtractionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ExtractionStatus::Pending => "Pending",
            ExtractionStatus::Extracted => "Extracted",
            ExtractionStatus::Partial => "Partial",
            ExtractionStatus::Unreadable => "Unreadable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
}

impl ValidationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ValidationStatus::Pending => "Pending",
            ValidationStatus::Valid => "Valid",
            ValidationStatus::Invalid => "Invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortlistStatus {
    #[default]
    Pending,
    Shortlisted,
    Waitlisted,
}

impl ShortlistStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ShortlistStatus::Pending => "Pending",
            ShortlistStatus::Shortlisted => "Shortlisted",
            ShortlistStatus::Waitlisted => "Waitlisted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationStatus {
    #[default]
    #[serde(rename = "Not Sent")]
    NotSent,
    #[serde(rename = "Email Sent")]
    EmailSent,
    #[serde(rename = "Failed to send")]
    FailedToSend,
}

impl CommunicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CommunicationStatus::NotSent => "Not Sent",
            CommunicationStatus::EmailSent => "Email Sent",
            CommunicationStatus::FailedToSend => "Failed to send",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "Not Applicable")]
    NotApplicable,
    #[serde(rename = "Not Requested")]
    NotRequested,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LoanStatus::NotApplicable => "Not Applicable",
            LoanStatus::NotRequested => "Not Requested",
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
        }
    }
}

/// Fee slips are rendered outside this service; only the initial marker is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeSlipStatus {
    #[default]
    #[serde(rename = "Not Sent")]
    NotSent,
}

impl FeeSlipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FeeSlipStatus::NotSent => "Not Sent",
        }
    }
}

/// One applicant's record as persisted in the admission dataset.
///
/// Key names follow the on-disk format so existing dataset files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub app_id: ApplicationId,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub applicant_name_marksheet: Option<String>,
    #[serde(default)]
    pub applicant_email: Option<String>,
    #[serde(default)]
    pub marks: AcademicMarks,
    #[serde(default, rename = "wbjee_rank")]
    pub exam_rank: Option<u32>,
    #[serde(default, rename = "aadhaar_name")]
    pub identity_name: Option<String>,
    #[serde(default, rename = "aadhaar_number")]
    pub identity_number: Option<String>,
    #[serde(default, rename = "marksheet_pdf_path")]
    pub marksheet_path: Option<PathBuf>,
    #[serde(default, rename = "aadhaar_pdf_path")]
    pub identity_proof_path: Option<PathBuf>,
    #[serde(default)]
    pub family_income_lpa: Option<f64>,
    #[serde(default)]
    pub loan_requested: bool,
    #[serde(default)]
    pub extraction_status: ExtractionStatus,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default)]
    pub validation_reason: Option<String>,
    #[serde(default)]
    pub shortlist_status: ShortlistStatus,
    #[serde(default)]
    pub communication_status: CommunicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_error: Option<String>,
    #[serde(default)]
    pub loan_status: LoanStatus,
    #[serde(default)]
    pub loan_rejection_reason: Option<String>,
    #[serde(default)]
    pub fee_slip_status: FeeSlipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    pub fn from_intake(intake: ApplicationIntake, submitted_at: DateTime<Utc>) -> Self {
        Self {
            app_id: intake.app_id.unwrap_or_else(ApplicationId::generate),
            applicant_name: intake.name.filter(|name| !name.trim().is_empty()),
            applicant_name_marksheet: None,
            applicant_email: intake.email.map(|email| email.trim().to_string()),
            marks: intake.marks,
            exam_rank: intake.exam_rank,
            identity_name: None,
            identity_number: intake
                .identity_number
                .filter(|number| !number.trim().is_empty()),
            marksheet_path: intake.marksheet_path,
            identity_proof_path: intake.identity_proof_path,
            family_income_lpa: intake.family_income_lpa,
            loan_requested: intake.loan_requested,
            extraction_status: ExtractionStatus::Pending,
            validation_status: ValidationStatus::Pending,
            validation_reason: None,
            shortlist_status: ShortlistStatus::Pending,
            communication_status: CommunicationStatus::NotSent,
            communication_error: None,
            loan_status: LoanStatus::NotApplicable,
            loan_rejection_reason: None,
            fee_slip_status: FeeSlipStatus::NotSent,
            submitted_at: Some(submitted_at),
        }
    }

    /// Name used when addressing the applicant.
    pub fn display_name(&self) -> &str {
        self.applicant_name
            .as_deref()
            .or(self.applicant_name_marksheet.as_deref())
            .unwrap_or(UNKNOWN_NAME)
    }
}

/// Thresholds applied by the validation and loan stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    pub min_class10_pcm_perc: f64,
    pub min_class12_pcm_perc: f64,
    pub max_wbjee_rank: u32,
    pub max_income_for_loan_lpa: f64,
    #[serde(default)]
    pub required_docs: Vec<String>,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self {
            min_class10_pcm_perc: 60.0,
            min_class12_pcm_perc: 60.0,
            max_wbjee_rank: 10000,
            max_income_for_loan_lpa: 5.0,
            required_docs: vec!["Marksheet".to_string(), "Aadhaar".to_string()],
        }
    }
}

fn default_disbursement_unit() -> u64 {
    LOAN_DISBURSEMENT_UNIT
}

/// Root aggregate persisted by the dataset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDataset {
    #[serde(default)]
    pub applications: Vec<ApplicationRecord>,
    #[serde(default)]
    pub eligibility_criteria: EligibilityCriteria,
    pub university_capacity: u32,
    pub loan_budget: u64,
    #[serde(default = "default_disbursement_unit")]
    pub loan_disbursement_unit: u64,
    pub fee_amount: u64,
    #[serde(default)]
    pub director_log: Vec<String>,
    #[serde(default)]
    pub criteria_file_path: Option<PathBuf>,
}

impl Default for AdmissionDataset {
    fn default() -> Self {
        Self {
            applications: Vec::new(),
            eligibility_criteria: EligibilityCriteria::default(),
            university_capacity: 3,
            loan_budget: 12000,
            loan_disbursement_unit: LOAN_DISBURSEMENT_UNIT,
            fee_amount: 5000,
            director_log: Vec::new(),
            criteria_file_path: None,
        }
    }
}

impl AdmissionDataset {
    /// Append in arrival order and return the new record's index.
    pub fn push_application(&mut self, record: ApplicationRecord) -> usize {
        self.applications.push(record);
        self.applications.len() - 1
    }

    pub fn find(&self, app_id: &ApplicationId) -> Option<&ApplicationRecord> {
        self.applications
            .iter()
            .find(|record| &record.app_id == app_id)
    }

    pub fn log_event(&mut self, entry: impl Into<String>) {
        self.director_log.push(entry.into());
    }
}
