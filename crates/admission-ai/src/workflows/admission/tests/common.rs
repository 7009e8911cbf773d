use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::admission::documents::{ExtractionSource, TextExtraction, TextExtractor};
use crate::workflows::admission::domain::{
    AcademicMarks, AdmissionDataset, ApplicationIntake,
};
use crate::workflows::admission::mailer::{MailError, Mailer, OutboundMessage};
use crate::workflows::admission::pipeline::AdmissionPipeline;
use crate::workflows::admission::service::AdmissionService;
use crate::workflows::admission::store::{DatasetStore, StoreError};

pub(super) const MARKSHEET: &str = "uploads/marksheet.pdf";
pub(super) const IDENTITY_PROOF: &str = "uploads/aadhaar.pdf";

pub(super) fn marksheet_text(name: &str, class10: f64, class12: f64, rank: u32) -> String {
    format!(
        "West Bengal Council of Higher Secondary Education\n\
         Name: {name}\n\
         Class 10 PCM Percentage: {class10}\n\
         Class 12 PCM Percentage: {class12}\n\
         WBJEE Rank: {rank}\n"
    )
}

pub(super) fn identity_text(name: &str, number: &str) -> String {
    format!("GOVERNMENT OF INDIA\n{name}\nDOB: 01/01/2006\n{number}\n")
}

pub(super) fn intake(email: &str) -> ApplicationIntake {
    ApplicationIntake {
        name: Some("Riya Sen".to_string()),
        email: Some(email.to_string()),
        marksheet_path: Some(PathBuf::from(MARKSHEET)),
        identity_proof_path: Some(PathBuf::from(IDENTITY_PROOF)),
        ..ApplicationIntake::default()
    }
}

pub(super) fn loan_intake(email: &str, income: f64) -> ApplicationIntake {
    ApplicationIntake {
        loan_requested: true,
        family_income_lpa: Some(income),
        ..intake(email)
    }
}

pub(super) fn seeded_intake(class10: f64, class12: f64, rank: u32) -> ApplicationIntake {
    ApplicationIntake {
        marks: AcademicMarks {
            class10_pcm_perc: Some(class10),
            class12_pcm_perc: Some(class12),
        },
        exam_rank: Some(rank),
        marksheet_path: None,
        identity_proof_path: None,
        ..intake("riya@example.edu")
    }
}

/// Extractor answering from a fixed path-to-text table.
#[derive(Default, Clone)]
pub(super) struct MapExtractor {
    documents: HashMap<PathBuf, String>,
}

impl MapExtractor {
    pub(super) fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.documents.insert(path.into(), text.into());
        self
    }

    pub(super) fn documents(marksheet: &str, identity: &str) -> Self {
        Self::default()
            .with(MARKSHEET, marksheet)
            .with(IDENTITY_PROOF, identity)
    }
}

impl TextExtractor for MapExtractor {
    fn extract_text(&self, path: &Path) -> TextExtraction {
        match self.documents.get(path) {
            Some(text) => TextExtraction {
                text: text.clone(),
                source: ExtractionSource::TextLayer,
            },
            None => TextExtraction::unreadable("file not found"),
        }
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _message: &OutboundMessage) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

/// In-memory store counting saves.
#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    dataset: Arc<Mutex<Option<AdmissionDataset>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub(super) fn seeded(dataset: AdmissionDataset) -> Self {
        let store = Self::default();
        *store.dataset.lock().expect("store mutex poisoned") = Some(dataset);
        store
    }

    pub(super) fn snapshot(&self) -> Option<AdmissionDataset> {
        self.dataset.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn saves(&self) -> usize {
        *self.saves.lock().expect("store mutex poisoned")
    }
}

impl DatasetStore for MemoryStore {
    fn load(&self) -> Result<AdmissionDataset, StoreError> {
        let mut guard = self.dataset.lock().expect("store mutex poisoned");
        Ok(guard.get_or_insert_with(AdmissionDataset::default).clone())
    }

    fn save(&self, dataset: &AdmissionDataset) -> Result<(), StoreError> {
        *self.dataset.lock().expect("store mutex poisoned") = Some(dataset.clone());
        *self.saves.lock().expect("store mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl DatasetStore for UnavailableStore {
    fn load(&self) -> Result<AdmissionDataset, StoreError> {
        Ok(AdmissionDataset::default())
    }

    fn save(&self, _dataset: &AdmissionDataset) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

pub(super) fn pipeline(
    extractor: MapExtractor,
) -> (AdmissionPipeline<MapExtractor, RecordingMailer>, RecordingMailer) {
    let mailer = RecordingMailer::default();
    (AdmissionPipeline::new(extractor, mailer.clone()), mailer)
}

pub(super) fn build_service(
    extractor: MapExtractor,
) -> (
    AdmissionService<MemoryStore, MapExtractor, RecordingMailer>,
    MemoryStore,
    RecordingMailer,
) {
    let store = MemoryStore::default();
    let (pipeline, mailer) = pipeline(extractor);
    let service = AdmissionService::new(Arc::new(store.clone()), pipeline);
    (service, store, mailer)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
