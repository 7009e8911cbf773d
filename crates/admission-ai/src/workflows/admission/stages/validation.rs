use super::super::domain::{AcademicMarks, EligibilityCriteria, ValidationStatus};
use super::super::pipeline::PipelineContext;
use super::StageError;

pub const VALIDATION_FAILURE_REASON: &str = "Marks or WBJEE rank did not meet criteria";

/// Outcome of checking marks and rank against the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible,
}

/// Every threshold must be met by a known value; an absent mark or rank is ineligible.
pub fn assess(
    marks: &AcademicMarks,
    exam_rank: Option<u32>,
    criteria: &EligibilityCriteria,
) -> Eligibility {
    let class10_ok = marks
        .class10_pcm_perc
        .is_some_and(|value| value >= criteria.min_class10_pcm_perc);
    let class12_ok = marks
        .class12_pcm_perc
        .is_some_and(|value| value >= criteria.min_class12_pcm_perc);
    let rank_ok = exam_rank.is_some_and(|rank| rank <= criteria.max_wbjee_rank);

    if class10_ok && class12_ok && rank_ok {
        Eligibility::Eligible
    } else {
        Eligibility::Ineligible
    }
}

pub fn validate(ctx: &mut PipelineContext<'_>) -> Result<(), StageError> {
    let record = ctx.record()?;
    let eligibility = assess(&record.marks, record.exam_rank, ctx.criteria());

    let record = ctx.record_mut()?;
    let line = match eligibility {
        Eligibility::Eligible => {
            record.validation_status = ValidationStatus::Valid;
            "Application validated against marks and rank criteria."
        }
        Eligibility::Ineligible => {
            record.validation_status = ValidationStatus::Invalid;
            record.validation_reason = Some(VALIDATION_FAILURE_REASON.to_string());
            "Validation failed: marks or rank below criteria."
        }
    };
    ctx.log(line);
    Ok(())
}
