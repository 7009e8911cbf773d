use admission_ai::config::AppConfig;
use admission_ai::error::AppError;
use admission_ai::workflows::admission::{
    mailer_from_config, AdmissionPipeline, AdmissionService, JsonFileStore, Mailer,
    PdfTextExtractor, TesseractOcr,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ConfiguredService =
    AdmissionService<JsonFileStore, PdfTextExtractor<TesseractOcr>, Box<dyn Mailer>>;

/// Wire the JSON file store, the text-layer/OCR extractor and the configured mail relay.
pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<ConfiguredService>, AppError> {
    let store = Arc::new(JsonFileStore::from_config(&config.storage));
    let extractor = PdfTextExtractor::from_config(&config.ocr);
    let mailer = mailer_from_config(config.mail.as_ref())?;
    let pipeline = AdmissionPipeline::new(extractor, mailer);
    Ok(Arc::new(AdmissionService::new(store, pipeline)))
}
