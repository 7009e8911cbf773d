use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::documents::TextExtractor;
use super::domain::{AdmissionDataset, EligibilityCriteria};

static CLASS10_MINIMUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"10th[^\d]*(\d{2})%").expect("class 10 criteria pattern"));
static CLASS12_MINIMUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"12th[^\d]*(\d{2})%").expect("class 12 criteria pattern"));
static RANK_MAXIMUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"WBJEE[^\d]*(\d+)").expect("rank criteria pattern"));
static INCOME_MAXIMUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"income[^\d]*(\d+(\.\d+)?)\s*LPA").expect("income criteria pattern")
});

/// Thresholds found in a criteria document. Unmatched thresholds stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CriteriaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_class10_pcm_perc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_class12_pcm_perc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wbjee_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_income_for_loan_lpa: Option<f64>,
}

impl CriteriaUpdate {
    pub fn parse(text: &str) -> Self {
        Self {
            min_class10_pcm_perc: first_group(&CLASS10_MINIMUM, text),
            min_class12_pcm_perc: first_group(&CLASS12_MINIMUM, text),
            max_wbjee_rank: first_group(&RANK_MAXIMUM, text),
            max_income_for_loan_lpa: first_group(&INCOME_MAXIMUM, text),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, criteria: &mut EligibilityCriteria) {
        if let Some(value) = self.min_class10_pcm_perc {
            criteria.min_class10_pcm_perc = value;
        }
        if let Some(value) = self.min_class12_pcm_perc {
            criteria.min_class12_pcm_perc = value;
        }
        if let Some(value) = self.max_wbjee_rank {
            criteria.max_wbjee_rank = value;
        }
        if let Some(value) = self.max_income_for_loan_lpa {
            criteria.max_income_for_loan_lpa = value;
        }
    }

    /// Human readable list of the changed thresholds, e.g. `10th >= 70%, WBJEE rank <= 5000`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(value) = self.min_class10_pcm_perc {
            parts.push(format!("10th >= {value}%"));
        }
        if let Some(value) = self.min_class12_pcm_perc {
            parts.push(format!("12th >= {value}%"));
        }
        if let Some(value) = self.max_wbjee_rank {
            parts.push(format!("WBJEE rank <= {value}"));
        }
        if let Some(value) = self.max_income_for_loan_lpa {
            parts.push(format!("loan income <= {value} LPA"));
        }
        if parts.is_empty() {
            "no thresholds recognised".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn first_group<T: std::str::FromStr>(pattern: &Regex, text: &str) -> Option<T> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|found| found.as_str().parse().ok())
}

/// Read a criteria document and update only the thresholds it states.
pub fn import_criteria<X>(
    dataset: &mut AdmissionDataset,
    extractor: &X,
    path: &Path,
) -> CriteriaUpdate
where
    X: TextExtractor + ?Sized,
{
    let extraction = extractor.extract_text(path);
    if !extraction.is_readable() {
        warn!(path = %path.display(), "criteria document produced no text");
    }

    let update = CriteriaUpdate::parse(&extraction.text);
    update.apply(&mut dataset.eligibility_criteria);
    dataset.criteria_file_path = Some(path.to_path_buf());
    dataset.log_event(format!(
        "Criteria updated from {}: {}",
        path.display(),
        update.describe()
    ));
    info!(path = %path.display(), changes = %update.describe(), "eligibility criteria imported");
    update
}
