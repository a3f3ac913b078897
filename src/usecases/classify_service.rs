//! Upload -> preprocess -> predict -> advice.

use crate::domain::{Diagnosis, DomainError, advice};
use crate::ports::{ClassifierPort, ImageDecoderPort};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ClassifyService {
    decoder: Arc<dyn ImageDecoderPort>,
    classifier: Arc<dyn ClassifierPort>,
}

impl ClassifyService {
    pub fn new(decoder: Arc<dyn ImageDecoderPort>, classifier: Arc<dyn ClassifierPort>) -> Self {
        Self {
            decoder,
            classifier,
        }
    }

    /// Classify an uploaded image and attach the precautions for its label.
    /// Decoding and inference are CPU-bound and run on the blocking pool.
    pub async fn diagnose(&self, bytes: Vec<u8>) -> Result<Diagnosis, DomainError> {
        let decoder = Arc::clone(&self.decoder);
        let classifier = Arc::clone(&self.classifier);
        let (prediction, original_dimensions) = tokio::task::spawn_blocking(move || {
            let (tensor, dims) = decoder.preprocess(&bytes)?;
            classifier.predict(&tensor).map(|p| (p, dims))
        })
        .await
        .map_err(|e| DomainError::Model(e.to_string()))??;

        let precautions = advice::precautions(prediction.label)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let diagnosis = Diagnosis {
            prediction,
            precautions,
            original_dimensions,
        };
        info!(
            label = %diagnosis.prediction.label,
            confidence = diagnosis.prediction.confidence,
            "image classified"
        );
        if let Ok(json) = serde_json::to_string(&diagnosis) {
            debug!(diagnosis = %json, "diagnosis detail");
        }
        Ok(diagnosis)
    }
}
