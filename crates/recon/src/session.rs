use std::sync::Arc;

use crate::config::ReconConfig;
use crate::engine::diff_datasets;
use crate::error::ReconError;
use crate::materialize::{load_dataset, Dataset};
use crate::model::{DiffResult, Side};

/// Holds the two loaded datasets and the latest comparison.
///
/// Loading a side replaces it wholesale; a failed load leaves the previous
/// dataset in place. The last result stays readable until the next
/// successful `compare`.
#[derive(Debug, Default)]
pub struct ReconSession {
    config: ReconConfig,
    a: Option<Arc<Dataset>>,
    b: Option<Arc<Dataset>>,
    result: Option<Arc<DiffResult>>,
    stale: bool,
}

impl ReconSession {
    pub fn new(config: ReconConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn load(&mut self, side: Side, label: &str, raw: &str) -> Result<Arc<Dataset>, ReconError> {
        let dataset = Arc::new(load_dataset(label, raw, &self.config.decode)?);
        log::info!(
            "loaded dataset {side} '{label}': {} line item(s)",
            dataset.len()
        );
        match side {
            Side::A => self.a = Some(Arc::clone(&dataset)),
            Side::B => self.b = Some(Arc::clone(&dataset)),
        }
        self.stale = true;
        Ok(dataset)
    }

    pub fn dataset(&self, side: Side) -> Option<&Arc<Dataset>> {
        match side {
            Side::A => self.a.as_ref(),
            Side::B => self.b.as_ref(),
        }
    }

    /// Both sides loaded.
    pub fn is_ready(&self) -> bool {
        self.a.is_some() && self.b.is_some()
    }

    pub fn compare(&mut self) -> Result<Arc<DiffResult>, ReconError> {
        let a = self.a.as_ref().ok_or(ReconError::MissingDataset(Side::A))?;
        let b = self.b.as_ref().ok_or(ReconError::MissingDataset(Side::B))?;
        let result = Arc::new(diff_datasets(a, b, &self.config));
        self.result = Some(Arc::clone(&result));
        self.stale = false;
        Ok(result)
    }

    pub fn result(&self) -> Option<Arc<DiffResult>> {
        self.result.clone()
    }

    /// True when a dataset changed after the last comparison.
    pub fn is_stale(&self) -> bool {
        self.stale && self.result.is_some()
    }
}
