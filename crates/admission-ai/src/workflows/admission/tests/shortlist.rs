use chrono::Utc;

use super::common::*;
use crate::workflows::admission::domain::{
    AdmissionDataset, ApplicationId, ApplicationIntake, ApplicationRecord, ShortlistStatus,
    ValidationStatus,
};
use crate::workflows::admission::shortlist::shortlist_applicants;

fn applicant(id: &str, rank: u32, status: ValidationStatus) -> ApplicationRecord {
    let mut record = ApplicationRecord::from_intake(
        ApplicationIntake {
            app_id: Some(ApplicationId(id.to_string())),
            exam_rank: Some(rank),
            ..intake(&format!("{id}@example.edu"))
        },
        Utc::now(),
    );
    record.validation_status = status;
    record
}

fn status_of(dataset: &AdmissionDataset, id: &str) -> ShortlistStatus {
    dataset
        .find(&ApplicationId(id.to_string()))
        .map(|record| record.shortlist_status)
        .expect("applicant present")
}

#[test]
fn best_ranks_fill_capacity_and_rest_are_waitlisted() {
    let mut dataset = AdmissionDataset {
        university_capacity: 2,
        ..AdmissionDataset::default()
    };
    dataset.push_application(applicant("a", 900, ValidationStatus::Valid));
    dataset.push_application(applicant("b", 150, ValidationStatus::Valid));
    dataset.push_application(applicant("c", 400, ValidationStatus::Valid));
    dataset.push_application(applicant("d", 10, ValidationStatus::Invalid));

    let outcome = shortlist_applicants(&mut dataset);

    assert_eq!(
        outcome.shortlisted,
        vec![ApplicationId("b".to_string()), ApplicationId("c".to_string())]
    );
    assert_eq!(outcome.waitlisted, vec![ApplicationId("a".to_string())]);
    assert_eq!(outcome.remaining_capacity, 0);
    assert_eq!(status_of(&dataset, "d"), ShortlistStatus::Pending);
    assert_eq!(dataset.director_log.len(), 1);
}

#[test]
fn equal_ranks_go_by_arrival() {
    let mut dataset = AdmissionDataset {
        university_capacity: 1,
        ..AdmissionDataset::default()
    };
    dataset.push_application(applicant("early", 300, ValidationStatus::Valid));
    dataset.push_application(applicant("late", 300, ValidationStatus::Valid));

    shortlist_applicants(&mut dataset);

    assert_eq!(status_of(&dataset, "early"), ShortlistStatus::Shortlisted);
    assert_eq!(status_of(&dataset, "late"), ShortlistStatus::Waitlisted);
}

#[test]
fn earlier_decisions_are_not_revisited() {
    let mut dataset = AdmissionDataset {
        university_capacity: 2,
        ..AdmissionDataset::default()
    };
    dataset.push_application(applicant("first", 800, ValidationStatus::Valid));
    shortlist_applicants(&mut dataset);

    dataset.push_application(applicant("second", 50, ValidationStatus::Valid));
    dataset.push_application(applicant("third", 60, ValidationStatus::Valid));
    let outcome = shortlist_applicants(&mut dataset);

    assert_eq!(status_of(&dataset, "first"), ShortlistStatus::Shortlisted);
    assert_eq!(outcome.shortlisted, vec![ApplicationId("second".to_string())]);
    assert_eq!(status_of(&dataset, "third"), ShortlistStatus::Waitlisted);
}
