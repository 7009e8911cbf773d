use serde::Serialize;
use tracing::info;

use super::domain::{AdmissionDataset, ApplicationId, ShortlistStatus, ValidationStatus};

/// Applications decided by one shortlisting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShortlistOutcome {
    pub shortlisted: Vec<ApplicationId>,
    pub waitlisted: Vec<ApplicationId>,
    pub remaining_capacity: u32,
}

/// Fill the seats left under the university capacity with undecided valid applicants,
/// best rank first and earlier arrival on ties. Everyone else undecided and valid is
/// waitlisted; already decided applicants are left alone.
pub fn shortlist_applicants(dataset: &mut AdmissionDataset) -> ShortlistOutcome {
    let taken = dataset
        .applications
        .iter()
        .filter(|record| record.shortlist_status == ShortlistStatus::Shortlisted)
        .count();
    let taken = u32::try_from(taken).unwrap_or(u32::MAX);
    let mut open = dataset.university_capacity.saturating_sub(taken);

    let mut candidates: Vec<(u32, usize)> = dataset
        .applications
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            record.validation_status == ValidationStatus::Valid
                && record.shortlist_status == ShortlistStatus::Pending
        })
        .map(|(index, record)| (record.exam_rank.unwrap_or(u32::MAX), index))
        .collect();
    candidates.sort_unstable();

    let mut outcome = ShortlistOutcome::default();
    for (_, index) in candidates {
        let record = &mut dataset.applications[index];
        if open > 0 {
            open -= 1;
            record.shortlist_status = ShortlistStatus::Shortlisted;
            outcome.shortlisted.push(record.app_id.clone());
        } else {
            record.shortlist_status = ShortlistStatus::Waitlisted;
            outcome.waitlisted.push(record.app_id.clone());
        }
    }
    outcome.remaining_capacity = open;

    dataset.log_event(format!(
        "Shortlisting: {} shortlisted, {} waitlisted, {} seats open",
        outcome.shortlisted.len(),
        outcome.waitlisted.len(),
        open
    ));
    info!(
        shortlisted = outcome.shortlisted.len(),
        waitlisted = outcome.waitlisted.len(),
        "shortlist updated"
    );
    outcome
}
