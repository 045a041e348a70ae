//! Boundary contracts for the cloud collaborators.
//!
//! The orchestration core talks to object storage, the document-translation
//! service, and the OCR analyzer exclusively through these traits. Production
//! deployments implement them against a vendor SDK; tests implement them in
//! memory.

pub mod access;
pub mod ocr;
pub mod store;
pub mod translator;

pub use access::{AccessMode, AccessScope};
pub use ocr::{
    BoundingRegion, OcrAnalysis, OcrAnalyzer, OcrPage, OcrParagraph, OcrPoller, READ_MODEL_ID,
};
pub use store::ObjectStore;
pub use translator::{
    DocumentResult, DocumentStatus, DocumentTranslator, RemoteError, TranslationPoller,
    TranslationSubmission, TranslationTarget,
};
