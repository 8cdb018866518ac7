use bevy::prelude::*;

use crate::engine::errors::ModelLoadError;

/// Settled results for the models one viewport asked for. A failed model
/// never blocks the rest of the batch.
#[derive(Component, Debug, Default, Clone)]
pub struct LoadBatch {
    expected: usize,
    loaded: usize,
    failures: Vec<ModelLoadError>,
    reported: bool,
}

/// What the page hears once every entry of a batch has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub loaded: usize,
    pub failed: Vec<String>,
}

impl LoadBatch {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..default()
        }
    }

    pub fn record_loaded(&mut self) {
        self.loaded += 1;
    }

    pub fn record_failed(&mut self, error: ModelLoadError) {
        self.failures.push(error);
    }

    pub fn settled(&self) -> usize {
        self.loaded + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.settled() >= self.expected
    }

    /// The summary, exactly once, after the last entry settles.
    pub fn take_summary(&mut self) -> Option<BatchSummary> {
        if self.reported || !self.is_complete() {
            return None;
        }
        self.reported = true;
        Some(BatchSummary {
            loaded: self.loaded,
            failed: self.failures.iter().map(|e| e.file().to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_error(file: &str) -> ModelLoadError {
        ModelLoadError::Fetch {
            file: file.to_string(),
            reason: "404".to_string(),
        }
    }

    #[test]
    fn summary_waits_for_every_entry() {
        let mut batch = LoadBatch::new(3);
        batch.record_loaded();
        batch.record_failed(fetch_error("b.glb"));
        assert!(batch.take_summary().is_none());

        batch.record_loaded();
        let summary = batch.take_summary().unwrap();
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.failed, vec!["b.glb".to_string()]);
        assert!(batch.take_summary().is_none());
    }

    #[test]
    fn empty_batch_is_complete_at_once() {
        let mut batch = LoadBatch::new(0);
        assert!(batch.is_complete());
        assert_eq!(
            batch.take_summary(),
            Some(BatchSummary {
                loaded: 0,
                failed: Vec::new()
            })
        );
    }
}
