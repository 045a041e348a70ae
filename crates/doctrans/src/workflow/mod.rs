//! The three translation workflow variants and their shared remote protocol.

pub mod batch;
pub mod engine;
pub mod ocr;
pub mod progress;
pub mod single;

pub use engine::{TranslationEngine, DETECTED_LANGUAGE_SENTINEL};
pub use progress::{NoopProgress, ProgressReporter, RegistryProgress};
