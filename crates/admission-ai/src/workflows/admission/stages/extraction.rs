use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::super::documents::{ExtractionSource, TextExtraction, TextExtractor};
use super::super::domain::{
    check_percentage, ApplicationRecord, ExtractionStatus, IntakeError, IDENTITY_NUMBER_SENTINEL,
    UNKNOWN_NAME,
};
use super::super::pipeline::PipelineContext;
use super::StageError;

static MARKSHEET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Name:\s*([A-Z][a-z]+)").expect("marksheet name pattern"));
static CLASS10_PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Class 10 PCM Percentage:\s*(\d+(?:\.\d+)?)").expect("class 10 pattern")
});
static CLASS12_PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Class 12 PCM Percentage:\s*(\d+(?:\.\d+)?)").expect("class 12 pattern")
});
static EXAM_RANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"WBJEE Rank:\s*(\d+)").expect("rank pattern"));
static IDENTITY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][a-z]+(?:\s[A-Z][a-z]+)+)").expect("identity name pattern")
});
static IDENTITY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}\s\d{4}\s\d{4}").expect("identity number pattern"));

/// Fields pattern-matched out of marksheet text. `None` means no match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarksheetFields {
    pub name: Option<String>,
    pub class10_pcm_perc: Option<f64>,
    pub class12_pcm_perc: Option<f64>,
    pub exam_rank: Option<u32>,
    /// Percentage fields that matched but fell outside 0..=100 and were dropped.
    pub discarded: Vec<&'static str>,
}

impl MarksheetFields {
    pub fn parse(text: &str) -> Self {
        let mut fields = Self {
            name: capture(&MARKSHEET_NAME, text).map(str::to_string),
            exam_rank: capture(&EXAM_RANK, text).and_then(|v| v.parse().ok()),
            ..Self::default()
        };
        fields.class10_pcm_perc = fields.percentage(&CLASS10_PERCENTAGE, text, "class10_pcm_perc");
        fields.class12_pcm_perc = fields.percentage(&CLASS12_PERCENTAGE, text, "class12_pcm_perc");
        fields
    }

    /// An out-of-range reading (a dropped decimal point in OCR output, say) counts as a miss.
    fn percentage(&mut self, pattern: &Regex, text: &str, field: &'static str) -> Option<f64> {
        let value: f64 = capture(pattern, text)?.parse().ok()?;
        if check_percentage(field, Some(value)).is_ok() {
            return Some(value);
        }
        warn!(field, value, "discarding out-of-range percentage read from marksheet");
        self.discarded.push(field);
        None
    }

    /// Matched values replace what the record holds; misses keep it, except an
    /// unknown name which falls back to [`UNKNOWN_NAME`].
    pub fn merge_into(self, record: &mut ApplicationRecord) {
        match self.name {
            Some(name) => record.applicant_name_marksheet = Some(name),
            None if record.applicant_name_marksheet.is_none() => {
                record.applicant_name_marksheet = Some(UNKNOWN_NAME.to_string());
            }
            None => {}
        }
        if let Some(value) = self.class10_pcm_perc {
            record.marks.class10_pcm_perc = Some(value);
        }
        if let Some(value) = self.class12_pcm_perc {
            record.marks.class12_pcm_perc = Some(value);
        }
        if let Some(rank) = self.exam_rank {
            record.exam_rank = Some(rank);
        }
    }
}

/// Fields pattern-matched out of identity-proof text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFields {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl IdentityFields {
    pub fn parse(text: &str) -> Self {
        Self {
            name: capture(&IDENTITY_NAME, text).map(|name| name.trim().to_string()),
            number: IDENTITY_NUMBER
                .find(text)
                .map(|found| found.as_str().trim().to_string()),
        }
    }

    /// A number the applicant typed in always wins over one read from the document.
    pub fn merge_into(self, record: &mut ApplicationRecord) {
        match self.name {
            Some(name) => record.identity_name = Some(name),
            None if record.identity_name.is_none() => {
                record.identity_name = Some(UNKNOWN_NAME.to_string());
            }
            None => {}
        }
        if record.identity_number.is_none() {
            record.identity_number = Some(
                self.number
                    .unwrap_or_else(|| IDENTITY_NUMBER_SENTINEL.to_string()),
            );
        }
    }
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str())
}

fn read_document<X: TextExtractor + ?Sized>(
    extractor: &X,
    path: Option<&Path>,
) -> TextExtraction {
    match path {
        Some(path) => extractor.extract_text(path),
        None => TextExtraction::unreadable("no document provided"),
    }
}

fn source_label(extraction: &TextExtraction) -> &'static str {
    match extraction.source {
        ExtractionSource::TextLayer => "text layer",
        ExtractionSource::Ocr => "OCR",
        ExtractionSource::Unreadable { .. } => "unreadable",
    }
}

fn check_record(record: &ApplicationRecord) -> Result<(), IntakeError> {
    check_percentage("class10_pcm_perc", record.marks.class10_pcm_perc)?;
    check_percentage("class12_pcm_perc", record.marks.class12_pcm_perc)?;
    match record.family_income_lpa {
        Some(income) if !income.is_finite() || income < 0.0 => Err(IntakeError::InvalidIncome(income)),
        _ => Ok(()),
    }
}

/// Read both documents and fold the matched fields into the application record.
///
/// Document readings are range-filtered by [`MarksheetFields::parse`]; the record check
/// afterwards only trips on values seeded by the caller or loaded from disk.
pub fn extract_fields<X: TextExtractor + ?Sized>(
    ctx: &mut PipelineContext<'_>,
    extractor: &X,
) -> Result<(), StageError> {
    let (marksheet_path, identity_path) = {
        let record = ctx.record()?;
        (
            record.marksheet_path.clone(),
            record.identity_proof_path.clone(),
        )
    };

    let marksheet = read_document(extractor, marksheet_path.as_deref());
    let identity = read_document(extractor, identity_path.as_deref());
    debug!(
        marksheet_chars = marksheet.text.len(),
        identity_chars = identity.text.len(),
        "document text extracted"
    );

    let status = match (marksheet.is_readable(), identity.is_readable()) {
        (true, true) => ExtractionStatus::Extracted,
        (false, false) => ExtractionStatus::Unreadable,
        _ => ExtractionStatus::Partial,
    };
    let note = format!(
        "Document data extracted (marksheet: {}, identity proof: {}).",
        source_label(&marksheet),
        source_label(&identity)
    );

    let marksheet_fields = MarksheetFields::parse(&marksheet.text);
    let discarded = (!marksheet_fields.discarded.is_empty()).then(|| {
        format!(
            "Ignored out-of-range marks read from marksheet: {}.",
            marksheet_fields.discarded.join(", ")
        )
    });

    let record = ctx.record_mut()?;
    marksheet_fields.merge_into(record);
    IdentityFields::parse(&identity.text).merge_into(record);
    record.extraction_status = status;
    check_record(record).map_err(|source| StageError::MalformedRecord {
        app_id: record.app_id.clone(),
        source,
    })?;

    ctx.marksheet_text = Some(marksheet);
    ctx.identity_text = Some(identity);
    ctx.log(note);
    if let Some(discarded) = discarded {
        ctx.log(discarded);
    }
    Ok(())
}
