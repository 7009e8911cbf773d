use std::io;

use serde::Serialize;

use super::domain::{AdmissionDataset, ApplicationRecord, LoanStatus, ValidationStatus};

/// Headline figures for the admissions dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionDashboard {
    pub total_applications: usize,
    pub valid_applications: usize,
    pub loans_approved: usize,
    pub remaining_loan_budget: u64,
    pub university_capacity: u32,
    pub audit_entries: usize,
}

impl AdmissionDashboard {
    pub fn from_dataset(dataset: &AdmissionDataset) -> Self {
        let applications = &dataset.applications;
        Self {
            total_applications: applications.len(),
            valid_applications: applications
                .iter()
                .filter(|record| record.validation_status == ValidationStatus::Valid)
                .count(),
            loans_approved: applications
                .iter()
                .filter(|record| record.loan_status == LoanStatus::Approved)
                .count(),
            remaining_loan_budget: dataset.loan_budget,
            university_capacity: dataset.university_capacity,
            audit_entries: dataset.director_log.len(),
        }
    }
}

/// One line of the application summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummaryRow {
    #[serde(rename = "App ID")]
    pub app_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "10th %")]
    pub class10_pcm_perc: Option<f64>,
    #[serde(rename = "12th %")]
    pub class12_pcm_perc: Option<f64>,
    #[serde(rename = "WBJEE Rank")]
    pub exam_rank: Option<u32>,
    #[serde(rename = "Aadhaar Name")]
    pub identity_name: String,
    #[serde(rename = "Aadhaar Number")]
    pub identity_number: String,
    #[serde(rename = "Validation")]
    pub validation: &'static str,
    #[serde(rename = "Shortlist")]
    pub shortlist: &'static str,
    #[serde(rename = "Loan")]
    pub loan: &'static str,
}

impl From<&ApplicationRecord> for ApplicationSummaryRow {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            app_id: record.app_id.to_string(),
            name: record.display_name().to_string(),
            email: record.applicant_email.clone().unwrap_or_default(),
            class10_pcm_perc: record.marks.class10_pcm_perc,
            class12_pcm_perc: record.marks.class12_pcm_perc,
            exam_rank: record.exam_rank,
            identity_name: record.identity_name.clone().unwrap_or_default(),
            identity_number: record.identity_number.clone().unwrap_or_default(),
            validation: record.validation_status.label(),
            shortlist: record.shortlist_status.label(),
            loan: record.loan_status.label(),
        }
    }
}

pub fn summary_rows(dataset: &AdmissionDataset) -> Vec<ApplicationSummaryRow> {
    dataset
        .applications
        .iter()
        .map(ApplicationSummaryRow::from)
        .collect()
}

/// Write the summary table as CSV with a header row.
pub fn write_summary_csv<W: io::Write>(
    writer: W,
    rows: &[ApplicationSummaryRow],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
