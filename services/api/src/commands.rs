use crate::infra::{build_service, ConfiguredService};
use admission_ai::config::AppConfig;
use admission_ai::error::AppError;
use admission_ai::telemetry;
use admission_ai::workflows::admission::{
    write_summary_csv, AcademicMarks, ApplicationIntake, ApplicationSummaryRow, PipelineState,
};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Applicant email address used for the status notification
    #[arg(long)]
    pub(crate) email: String,
    /// Applicant name; extracted from the marksheet when omitted
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Marksheet PDF
    #[arg(long)]
    pub(crate) marksheet: Option<PathBuf>,
    /// Identity proof (Aadhaar) PDF
    #[arg(long)]
    pub(crate) identity_proof: Option<PathBuf>,
    /// Identity number; takes precedence over the one read from the identity proof
    #[arg(long)]
    pub(crate) identity_number: Option<String>,
    /// Class 10 PCM percentage, when known ahead of extraction
    #[arg(long)]
    pub(crate) class10: Option<f64>,
    /// Class 12 PCM percentage, when known ahead of extraction
    #[arg(long)]
    pub(crate) class12: Option<f64>,
    /// WBJEE rank, when known ahead of extraction
    #[arg(long)]
    pub(crate) rank: Option<u32>,
    /// Request an education loan
    #[arg(long)]
    pub(crate) loan: bool,
    /// Declared family income in LPA
    #[arg(long)]
    pub(crate) income: Option<f64>,
}

impl From<SubmitArgs> for ApplicationIntake {
    fn from(args: SubmitArgs) -> Self {
        ApplicationIntake {
            app_id: None,
            name: args.name,
            email: Some(args.email),
            marks: AcademicMarks {
                class10_pcm_perc: args.class10,
                class12_pcm_perc: args.class12,
            },
            exam_rank: args.rank,
            marksheet_path: args.marksheet,
            identity_proof_path: args.identity_proof,
            identity_number: args.identity_number,
            loan_requested: args.loan,
            family_income_lpa: args.income,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct CriteriaArgs {
    /// Criteria document (PDF) listing the admission thresholds
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ApplicationsArgs {
    /// Write the summary table to this CSV file instead of printing it
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

fn open_service() -> Result<Arc<ConfiguredService>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    build_service(&config)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("output unavailable: {err}"),
    }
}

pub(crate) fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let service = open_service()?;
    let report = service.submit(args.into())?;

    match &report.state {
        PipelineState::Failed { stage, reason } => {
            println!(
                "Application {} stopped at {}: {}",
                report.app_id,
                stage.label(),
                reason
            );
        }
        _ => {
            println!(
                "Application {} processed: validation {}, communication {}, loan {}",
                report.app_id,
                report.record.validation_status.label(),
                report.record.communication_status.label(),
                report.record.loan_status.label()
            );
        }
    }
    for line in &report.run_log {
        println!("  - {line}");
    }
    Ok(())
}

pub(crate) fn run_criteria(args: CriteriaArgs) -> Result<(), AppError> {
    let service = open_service()?;
    let import = service.import_criteria(&args.path)?;

    println!("Criteria imported from {}", args.path.display());
    println!("- changed: {}", import.changed.describe());
    print_json(&import.criteria);
    Ok(())
}

pub(crate) fn run_applications(args: ApplicationsArgs) -> Result<(), AppError> {
    let service = open_service()?;
    let rows = service.summary()?;

    if let Some(path) = args.csv {
        let file = File::create(&path)?;
        write_summary_csv(file, &rows)?;
        println!("Wrote {} applications to {}", rows.len(), path.display());
        return Ok(());
    }

    if rows.is_empty() {
        println!("No applications on record");
        return Ok(());
    }
    println!("{} applications on record", rows.len());
    for row in &rows {
        println!("- {}", render_row(row));
    }
    Ok(())
}

pub(crate) fn run_shortlist() -> Result<(), AppError> {
    let service = open_service()?;
    let outcome = service.shortlist()?;

    println!(
        "Shortlisted {} | waitlisted {} | {} seats open",
        outcome.shortlisted.len(),
        outcome.waitlisted.len(),
        outcome.remaining_capacity
    );
    for app_id in &outcome.shortlisted {
        println!("  + {app_id}");
    }
    for app_id in &outcome.waitlisted {
        println!("  ~ {app_id}");
    }
    Ok(())
}

pub(crate) fn run_audit_log() -> Result<(), AppError> {
    let service = open_service()?;
    let entries = service.audit_log()?;

    if entries.is_empty() {
        println!("Audit log is empty");
    }
    for entry in entries {
        println!("{entry}");
    }
    Ok(())
}

fn render_row(row: &ApplicationSummaryRow) -> String {
    let rank = row
        .exam_rank
        .map(|rank| rank.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} <{}> | rank {} | {} | {} | loan {}",
        row.app_id, row.name, row.email, rank, row.validation, row.shortlist, row.loan
    )
}
