//! Request validation and non-blocking job dispatch.

pub mod dispatcher;
pub mod request;

pub use dispatcher::{Dispatched, JobDispatcher};
pub use request::{UploadedFile, WorkflowRequest};
