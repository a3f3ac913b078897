pub mod preprocess;

pub use preprocess::{ImagePreprocessor, has_accepted_extension};
