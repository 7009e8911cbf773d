use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::criteria::{self, CriteriaUpdate};
use super::documents::TextExtractor;
use super::domain::{
    AdmissionDataset, ApplicationId, ApplicationIntake, ApplicationRecord, EligibilityCriteria,
    IntakeError,
};
use super::mailer::Mailer;
use super::pipeline::{AdmissionPipeline, PipelineReport};
use super::report::{summary_rows, AdmissionDashboard, ApplicationSummaryRow};
use super::shortlist::{shortlist_applicants, ShortlistOutcome};
use super::store::{DatasetStore, StoreError};

/// Thresholds changed by a criteria import together with the criteria now in force.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaImport {
    pub changed: CriteriaUpdate,
    pub criteria: EligibilityCriteria,
}

/// Service composing the dataset store with the processing pipeline.
///
/// Every operation loads the dataset, works on it, and saves it while holding one lock,
/// so concurrent callers are processed one at a time.
pub struct AdmissionService<S, X, M> {
    store: Arc<S>,
    pipeline: Arc<AdmissionPipeline<X, M>>,
    lock: Mutex<()>,
}

impl<S, X, M> AdmissionService<S, X, M>
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    pub fn new(store: Arc<S>, pipeline: AdmissionPipeline<X, M>) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, view: impl FnOnce(&AdmissionDataset) -> T) -> Result<T, AdmissionServiceError> {
        let _guard = self.exclusive();
        let dataset = self.store.load()?;
        Ok(view(&dataset))
    }

    /// Check the intake, run it through the pipeline, and persist the outcome.
    ///
    /// A caller-chosen id already present in the dataset is rejected before any stage runs.
    pub fn submit(
        &self,
        intake: ApplicationIntake,
    ) -> Result<PipelineReport, AdmissionServiceError> {
        intake.validate()?;

        let _guard = self.exclusive();
        let mut dataset = self.store.load()?;
        if let Some(app_id) = &intake.app_id {
            if dataset.find(app_id).is_some() {
                return Err(AdmissionServiceError::Conflict(app_id.clone()));
            }
        }
        let report = self
            .pipeline
            .run_and_persist(&mut dataset, intake, self.store.as_ref())?;
        Ok(report)
    }

    pub fn import_criteria(&self, path: &Path) -> Result<CriteriaImport, AdmissionServiceError> {
        if !path.is_file() {
            return Err(AdmissionServiceError::MissingDocument(path.to_path_buf()));
        }

        let _guard = self.exclusive();
        let mut dataset = self.store.load()?;
        let changed = criteria::import_criteria(&mut dataset, self.pipeline.extractor(), path);
        self.store.save(&dataset)?;
        Ok(CriteriaImport {
            changed,
            criteria: dataset.eligibility_criteria,
        })
    }

    pub fn shortlist(&self) -> Result<ShortlistOutcome, AdmissionServiceError> {
        let _guard = self.exclusive();
        let mut dataset = self.store.load()?;
        let outcome = shortlist_applicants(&mut dataset);
        self.store.save(&dataset)?;
        Ok(outcome)
    }

    pub fn applications(&self) -> Result<Vec<ApplicationRecord>, AdmissionServiceError> {
        self.read(|dataset| dataset.applications.clone())
    }

    pub fn get(
        &self,
        app_id: &ApplicationId,
    ) -> Result<ApplicationRecord, AdmissionServiceError> {
        self.read(|dataset| dataset.find(app_id).cloned())?
            .ok_or_else(|| AdmissionServiceError::NotFound(app_id.clone()))
    }

    pub fn dashboard(&self) -> Result<AdmissionDashboard, AdmissionServiceError> {
        self.read(AdmissionDashboard::from_dataset)
    }

    pub fn summary(&self) -> Result<Vec<ApplicationSummaryRow>, AdmissionServiceError> {
        self.read(summary_rows)
    }

    pub fn audit_log(&self) -> Result<Vec<String>, AdmissionServiceError> {
        self.read(|dataset| dataset.director_log.clone())
    }
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {0} already exists")]
    Conflict(ApplicationId),
    #[error("criteria document {} does not exist", .0.display())]
    MissingDocument(PathBuf),
}
