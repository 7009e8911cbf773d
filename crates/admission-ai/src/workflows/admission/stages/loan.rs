use tracing::info;

use super::super::domain::LoanStatus;
use super::super::pipeline::PipelineContext;
use super::StageError;

pub const LOAN_REJECTION_REASON: &str = "Income too high or insufficient budget";

/// Loan outcome computed before the budget is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanDecision {
    NotRequested,
    Approved,
    Rejected,
}

impl LoanDecision {
    /// Undeclared income never qualifies.
    pub fn decide(
        requested: bool,
        family_income_lpa: Option<f64>,
        max_income_lpa: f64,
        budget: u64,
        unit: u64,
    ) -> Self {
        if !requested {
            return LoanDecision::NotRequested;
        }
        let income_ok = family_income_lpa.is_some_and(|income| income <= max_income_lpa);
        if income_ok && budget >= unit {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }
}

pub fn decide_loan(ctx: &mut PipelineContext<'_>) -> Result<(), StageError> {
    let record = ctx.record()?;
    let mut decision = LoanDecision::decide(
        record.loan_requested,
        record.family_income_lpa,
        ctx.criteria().max_income_for_loan_lpa,
        ctx.loan_budget(),
        ctx.disbursement_unit(),
    );
    if decision == LoanDecision::Approved && !ctx.debit_loan_budget() {
        decision = LoanDecision::Rejected;
    }

    let remaining = ctx.loan_budget();
    let record = ctx.record_mut()?;
    let line = match decision {
        LoanDecision::NotRequested => {
            record.loan_status = LoanStatus::NotRequested;
            "Loan not requested."
        }
        LoanDecision::Approved => {
            record.loan_status = LoanStatus::Approved;
            info!(app_id = %record.app_id, remaining_budget = remaining, "loan approved");
            "Loan approved."
        }
        LoanDecision::Rejected => {
            record.loan_status = LoanStatus::Rejected;
            record.loan_rejection_reason = Some(LOAN_REJECTION_REASON.to_string());
            "Loan rejected."
        }
    };
    ctx.log(line);
    Ok(())
}
