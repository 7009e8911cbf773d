use chrono::Utc;

use super::common::*;
use crate::workflows::admission::domain::{
    AcademicMarks, AdmissionDataset, ApplicationIntake, ApplicationRecord, ExtractionStatus,
    IDENTITY_NUMBER_SENTINEL, UNKNOWN_NAME,
};
use crate::workflows::admission::pipeline::PipelineContext;
use crate::workflows::admission::stages::{
    extract_fields, IdentityFields, MarksheetFields, StageError,
};

fn dataset_with(intake: ApplicationIntake) -> (AdmissionDataset, usize) {
    let mut dataset = AdmissionDataset::default();
    let index = dataset.push_application(ApplicationRecord::from_intake(intake, Utc::now()));
    (dataset, index)
}

#[test]
fn marksheet_fields_are_pattern_matched() {
    let fields = MarksheetFields::parse(&marksheet_text("Riya Sen", 75.5, 80.0, 500));

    assert_eq!(fields.name.as_deref(), Some("Riya"));
    assert_eq!(fields.class10_pcm_perc, Some(75.5));
    assert_eq!(fields.class12_pcm_perc, Some(80.0));
    assert_eq!(fields.exam_rank, Some(500));
}

#[test]
fn identity_fields_capture_full_name_and_grouped_number() {
    let fields = IdentityFields::parse(&identity_text("Riya Sen", "1234 5678 9012"));

    assert_eq!(fields.name.as_deref(), Some("Riya Sen"));
    assert_eq!(fields.number.as_deref(), Some("1234 5678 9012"));
}

#[test]
fn empty_text_matches_nothing() {
    assert_eq!(MarksheetFields::parse(""), MarksheetFields::default());
    assert_eq!(IdentityFields::parse(""), IdentityFields::default());
}

#[test]
fn extraction_merges_both_documents() {
    let extractor = MapExtractor::documents(
        &marksheet_text("Riya", 75.0, 80.0, 500),
        &identity_text("Riya Sen", "1234 5678 9012"),
    );
    let (mut dataset, index) = dataset_with(intake("riya@example.edu"));

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &extractor).expect("extraction succeeds");
    assert_eq!(ctx.run_log().len(), 1);
    drop(ctx);

    let record = &dataset.applications[index];
    assert_eq!(record.applicant_name_marksheet.as_deref(), Some("Riya"));
    assert_eq!(record.marks.class10_pcm_perc, Some(75.0));
    assert_eq!(record.marks.class12_pcm_perc, Some(80.0));
    assert_eq!(record.exam_rank, Some(500));
    assert_eq!(record.identity_name.as_deref(), Some("Riya Sen"));
    assert_eq!(record.identity_number.as_deref(), Some("1234 5678 9012"));
    assert_eq!(record.extraction_status, ExtractionStatus::Extracted);
}

#[test]
fn applicant_supplied_identity_number_wins() {
    let extractor = MapExtractor::documents(
        &marksheet_text("Riya", 75.0, 80.0, 500),
        &identity_text("Riya Sen", "1234 5678 9012"),
    );
    let (mut dataset, index) = dataset_with(ApplicationIntake {
        identity_number: Some("999988887777".to_string()),
        ..intake("riya@example.edu")
    });

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &extractor).expect("extraction succeeds");

    assert_eq!(
        dataset.applications[index].identity_number.as_deref(),
        Some("999988887777")
    );
}

#[test]
fn pattern_misses_keep_known_values() {
    let extractor = MapExtractor::documents("Statement of marks\nRemarks: Pass\n", "");
    let (mut dataset, index) = dataset_with(ApplicationIntake {
        marks: AcademicMarks {
            class10_pcm_perc: Some(72.0),
            class12_pcm_perc: Some(68.5),
        },
        exam_rank: Some(1200),
        ..intake("riya@example.edu")
    });
    let before = dataset.applications[index].clone();

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &extractor).expect("extraction succeeds");

    let after = &dataset.applications[index];
    assert_eq!(after.app_id, before.app_id);
    assert_eq!(after.marks, before.marks);
    assert_eq!(after.exam_rank, before.exam_rank);
    assert_eq!(after.applicant_email, before.applicant_email);
}

#[test]
fn unmatched_names_and_numbers_fall_back_to_placeholders() {
    let (mut dataset, index) = dataset_with(intake("riya@example.edu"));

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &MapExtractor::default()).expect("extraction succeeds");

    let record = &dataset.applications[index];
    assert_eq!(record.applicant_name_marksheet.as_deref(), Some(UNKNOWN_NAME));
    assert_eq!(record.identity_name.as_deref(), Some(UNKNOWN_NAME));
    assert_eq!(
        record.identity_number.as_deref(),
        Some(IDENTITY_NUMBER_SENTINEL)
    );
    assert_eq!(record.extraction_status, ExtractionStatus::Unreadable);
}

#[test]
fn one_unreadable_document_is_partial() {
    let extractor =
        MapExtractor::default().with(MARKSHEET, marksheet_text("Riya", 75.0, 80.0, 500));
    let (mut dataset, index) = dataset_with(intake("riya@example.edu"));

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &extractor).expect("extraction succeeds");

    assert_eq!(
        dataset.applications[index].extraction_status,
        ExtractionStatus::Partial
    );
}

#[test]
fn out_of_range_document_marks_are_treated_as_misses() {
    let extractor = MapExtractor::documents(
        &marksheet_text("Riya", 750.0, 80.0, 500),
        &identity_text("Riya Sen", "1234 5678 9012"),
    );
    let (mut dataset, index) = dataset_with(intake("riya@example.edu"));

    let mut ctx = PipelineContext::new(&mut dataset, index);
    extract_fields(&mut ctx, &extractor).expect("extraction succeeds");
    assert_eq!(
        ctx.run_log()[1],
        "Ignored out-of-range marks read from marksheet: class10_pcm_perc."
    );
    drop(ctx);

    let record = &dataset.applications[index];
    assert_eq!(record.marks.class10_pcm_perc, None);
    assert_eq!(record.marks.class12_pcm_perc, Some(80.0));
    assert_eq!(record.extraction_status, ExtractionStatus::Extracted);
}

#[test]
fn marksheet_parse_records_discarded_fields() {
    let fields = MarksheetFields::parse(&marksheet_text("Riya", 75.0, 801.0, 500));

    assert_eq!(fields.class10_pcm_perc, Some(75.0));
    assert_eq!(fields.class12_pcm_perc, None);
    assert_eq!(fields.discarded, vec!["class12_pcm_perc"]);
}

#[test]
fn out_of_range_seeded_marks_fail_the_stage() {
    let (mut dataset, index) = dataset_with(seeded_intake(140.0, 80.0, 500));

    let mut ctx = PipelineContext::new(&mut dataset, index);
    let result = extract_fields(&mut ctx, &MapExtractor::default());

    assert!(matches!(result, Err(StageError::MalformedRecord { .. })));
}
