//! Image classifier adapters.

pub mod burn_classifier;
pub mod cnn;

pub use burn_classifier::BurnClassifier;
pub use cnn::LeafCnn;
