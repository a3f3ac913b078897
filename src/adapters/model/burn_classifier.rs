//! Implements ClassifierPort with the burn CNN on the NdArray (CPU) backend.
//!
//! Weights are loaded once at startup and never mutated. Forward passes are
//! serialized through a mutex: the module is shared by reference across sessions
//! and burn modules are not guaranteed reentrant.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::{Tensor, TensorData},
};
use burn_ndarray::{NdArray, NdArrayDevice};
use tracing::{debug, info};

use super::cnn::LeafCnn;
use crate::domain::{CHANNELS, DomainError, IMAGE_SIZE, ImageTensor, Prediction};
use crate::ports::ClassifierPort;

type Backend = NdArray;

/// Extension burn's file recorder enforces on weight files.
pub const WEIGHTS_EXTENSION: &str = "mpk";

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Path the recorder actually reads/writes for `path`.
fn weights_file(path: &Path) -> PathBuf {
    path.with_extension(WEIGHTS_EXTENSION)
}

pub struct BurnClassifier {
    model: Mutex<LeafCnn<Backend>>,
    device: NdArrayDevice,
}

impl BurnClassifier {
    /// Load weights from `path`. Fails if the file is missing, unreadable, or its
    /// tensors do not match the declared architecture.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let file = weights_file(path.as_ref());
        if !file.is_file() {
            return Err(DomainError::Model(format!(
                "weight file not found: {}",
                file.display()
            )));
        }
        let device = NdArrayDevice::default();
        let model = LeafCnn::<Backend>::new(&device)
            .load_file(file.clone(), &recorder(), &device)
            .map_err(|e| {
                DomainError::Model(format!("failed to load {}: {e:?}", file.display()))
            })?;
        if let Some(mismatch) = model.shape_mismatch() {
            return Err(DomainError::Model(format!(
                "incompatible weights in {}: {mismatch}",
                file.display()
            )));
        }
        info!(path = %file.display(), "classifier weights loaded");
        Ok(Self::from_model(model, device))
    }

    /// Wrap an already-built network.
    pub fn from_model(model: LeafCnn<Backend>, device: NdArrayDevice) -> Self {
        Self {
            model: Mutex::new(model),
            device,
        }
    }

    /// Network with random weights. Useful for tests and for exporting a template file.
    pub fn untrained() -> Self {
        let device = NdArrayDevice::default();
        Self::from_model(LeafCnn::new(&device), device)
    }

    /// Write the current weights to `path` (extension forced to `.mpk`).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, DomainError> {
        let file = weights_file(path.as_ref());
        let model = self
            .model
            .lock()
            .map_err(|_| DomainError::Model("classifier lock poisoned".into()))?
            .clone();
        model
            .save_file(file.clone(), &recorder())
            .map_err(|e| DomainError::Model(format!("failed to save weights: {e:?}")))?;
        Ok(file)
    }
}

impl ClassifierPort for BurnClassifier {
    fn predict(&self, image: &ImageTensor) -> Result<Prediction, DomainError> {
        let data = TensorData::new(image.to_chw(), [1, CHANNELS, IMAGE_SIZE, IMAGE_SIZE]);
        let input = Tensor::<Backend, 4>::from_data(data, &self.device);

        let probs = {
            let model = self
                .model
                .lock()
                .map_err(|_| DomainError::Model("classifier lock poisoned".into()))?;
            model.forward_softmax(input)
        };
        let values = probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| DomainError::Model(format!("reading output: {e:?}")))?;

        let prediction = Prediction::from_probabilities(values)
            .ok_or_else(|| DomainError::Model("unexpected output size".into()))?;
        debug!(label = %prediction.label, confidence = prediction.confidence, "prediction");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NUM_CLASSES;
    use burn::module::Param;

    fn gradient_image() -> ImageTensor {
        let data = (0..ImageTensor::LEN)
            .map(|i| (i % 256) as f32 / 255.0)
            .collect();
        ImageTensor::from_hwc(data).unwrap()
    }

    #[test]
    fn test_predict_is_deterministic() {
        let classifier = BurnClassifier::untrained();
        let image = gradient_image();

        let a = classifier.predict(&image).unwrap();
        let b = classifier.predict(&image).unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.probabilities, b.probabilities);
        assert_eq!(a.probabilities.len(), NUM_CLASSES);
        assert_eq!(a.label.index(), {
            let p = &a.probabilities;
            (0..NUM_CLASSES).fold(0, |best, i| if p[i] > p[best] { i } else { best })
        });
    }

    #[test]
    fn test_saved_weights_reload_identically() {
        let dir = tempfile::tempdir().unwrap();
        let original = BurnClassifier::untrained();
        let file = original.save(dir.path().join("model_weights")).unwrap();
        assert_eq!(file.extension().and_then(|e| e.to_str()), Some("mpk"));

        let loaded = BurnClassifier::load(&file).unwrap();
        let image = gradient_image();
        assert_eq!(
            original.predict(&image).unwrap(),
            loaded.predict(&image).unwrap()
        );
    }

    #[test]
    fn test_missing_weights_fail() {
        let dir = tempfile::tempdir().unwrap();
        let err = BurnClassifier::load(dir.path().join("absent.mpk"))
            .err()
            .expect("load should fail");
        assert!(matches!(err, DomainError::Model(_)));
    }

    #[test]
    fn test_wrong_bias_shape_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let device = NdArrayDevice::default();
        let mut model = LeafCnn::<Backend>::new(&device);
        model.fc2.bias = Some(Param::from_tensor(Tensor::zeros([NUM_CLASSES - 1], &device)));
        let file = BurnClassifier::from_model(model, device)
            .save(dir.path().join("short_head"))
            .unwrap();

        match BurnClassifier::load(&file) {
            Err(DomainError::Model(msg)) => assert!(msg.contains("fc2.bias"), "{msg}"),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("mismatched weights loaded"),
        }
    }

    #[test]
    fn test_corrupt_weights_fail() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("garbage.mpk");
        std::fs::write(&file, b"definitely not msgpack weights").unwrap();
        assert!(matches!(
            BurnClassifier::load(&file),
            Err(DomainError::Model(_))
        ));
    }
}
