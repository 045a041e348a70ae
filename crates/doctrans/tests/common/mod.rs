//! Shared fixtures for integration tests.
//!
//! Provides an in-memory object store plus scripted translator and OCR
//! fakes, wired together into a `TestEnv` that mirrors a full deployment:
//! dispatcher, registry, and engine against temporary directories.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use doctrans::error::{OcrError, StorageError, TranslateError};
use doctrans::remote::{
    AccessScope, BoundingRegion, DocumentResult, DocumentStatus, DocumentTranslator, ObjectStore,
    OcrAnalysis, OcrAnalyzer, OcrPage, OcrParagraph, OcrPoller, RemoteError, TranslationPoller,
    TranslationSubmission,
};
use doctrans::{
    AccessMode, ContainerName, EngineConfig, JobDispatcher, JobRecord, JobRegistry,
    TranslationEngine, UploadedFile,
};

// ─── In-memory object store ─────────────────────────────────────────────────

const STORE_BASE_URL: &str = "https://testacct.store.example";

/// Object store backed by a map, shared between the gateway and the fakes.
pub struct InMemoryObjectStore {
    containers: Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            containers: Mutex::new(HashMap::new()),
        })
    }

    /// Direct read access for assertions and fakes.
    pub fn objects_in(&self, container: &str) -> BTreeMap<String, Vec<u8>> {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .cloned()
            .unwrap_or_default()
    }

    /// Direct write access for fakes acting as the remote service.
    pub fn insert_object(&self, container: &str, object: &str, bytes: Vec<u8>) {
        self.containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(object.to_string(), bytes);
    }

    pub fn object_url(container: &str, object: &str) -> String {
        format!("{}/{}/{}", STORE_BASE_URL, container, object)
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn create_container(&self, name: &ContainerName) -> Result<(), StorageError> {
        let mut containers = self.containers.lock().unwrap();
        if containers.contains_key(name.as_str()) {
            return Err(StorageError::ContainerAlreadyExists(name.to_string()));
        }
        containers.insert(name.to_string(), BTreeMap::new());
        Ok(())
    }

    fn put_object(
        &self,
        container: &ContainerName,
        object: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        self.insert_object(container.as_str(), object, bytes.to_vec());
        Ok(Self::object_url(container.as_str(), object))
    }

    fn list_objects(&self, container: &ContainerName) -> Result<Vec<String>, StorageError> {
        Ok(self.objects_in(container.as_str()).keys().cloned().collect())
    }

    fn get_object(
        &self,
        container: &ContainerName,
        object: &str,
    ) -> Result<Vec<u8>, StorageError> {
        self.objects_in(container.as_str())
            .get(object)
            .cloned()
            .ok_or_else(|| StorageError::Download {
                container: container.to_string(),
                object: object.to_string(),
                message: "object not found".to_string(),
            })
    }

    fn delete_object(&self, container: &ContainerName, object: &str) -> Result<(), StorageError> {
        if let Some(objects) = self.containers.lock().unwrap().get_mut(container.as_str()) {
            objects.remove(object);
        }
        Ok(())
    }

    fn container_url(&self, name: &ContainerName) -> String {
        format!("{}/{}", STORE_BASE_URL, name)
    }

    fn sign_container(
        &self,
        _name: &ContainerName,
        scope: AccessScope,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "sig=fixture&sp={}&se={}",
            scope.permissions(),
            ttl.as_secs()
        ))
    }
}

fn container_from_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ─── Scripted translator ────────────────────────────────────────────────────

/// Translator fake that behaves like the real service: reads every object in
/// the source container and writes a translated copy into each target
/// container, reporting per-document outcomes.
///
/// Translated bytes are `{lang}:{original bytes}` so tests can verify that
/// downloads carry the remote-produced content.
pub struct ScriptedTranslator {
    store: Arc<InMemoryObjectStore>,
    /// How many `is_done` calls report false before completion.
    polls_before_done: usize,
    /// `(source filename, language)` pairs that fail at the document level.
    failures: Vec<(String, String)>,
    /// When set, `begin_translation` itself errors.
    submission_error: Option<String>,
}

impl ScriptedTranslator {
    pub fn new(store: Arc<InMemoryObjectStore>) -> Self {
        Self {
            store,
            polls_before_done: 0,
            failures: Vec::new(),
            submission_error: None,
        }
    }

    pub fn with_polls_before_done(mut self, polls: usize) -> Self {
        self.polls_before_done = polls;
        self
    }

    pub fn with_failure(mut self, source_file: &str, language: &str) -> Self {
        self.failures
            .push((source_file.to_string(), language.to_string()));
        self
    }

    pub fn with_submission_error(mut self, message: &str) -> Self {
        self.submission_error = Some(message.to_string());
        self
    }
}

impl DocumentTranslator for ScriptedTranslator {
    fn begin_translation(
        &self,
        submission: &TranslationSubmission,
    ) -> Result<Box<dyn TranslationPoller>, TranslateError> {
        if let Some(message) = &self.submission_error {
            return Err(TranslateError::Submission(message.clone()));
        }
        Ok(Box::new(ScriptedPoller {
            store: Arc::clone(&self.store),
            submission: submission.clone(),
            remaining_polls: self.polls_before_done,
            failures: self.failures.clone(),
        }))
    }
}

struct ScriptedPoller {
    store: Arc<InMemoryObjectStore>,
    submission: TranslationSubmission,
    remaining_polls: usize,
    failures: Vec<(String, String)>,
}

impl TranslationPoller for ScriptedPoller {
    fn is_done(&mut self) -> Result<bool, TranslateError> {
        if self.remaining_polls == 0 {
            return Ok(true);
        }
        self.remaining_polls -= 1;
        Ok(false)
    }

    fn take_results(self: Box<Self>) -> Result<Vec<DocumentResult>, TranslateError> {
        let source_container = container_from_url(&self.submission.source_url);
        let documents = self.store.objects_in(&source_container);

        let mut results = Vec::new();
        for (name, bytes) in documents {
            for target in &self.submission.targets {
                let source_url = InMemoryObjectStore::object_url(&source_container, &name);
                let failed = self
                    .failures
                    .iter()
                    .any(|(file, lang)| file == &name && lang == &target.language);

                if failed {
                    results.push(DocumentResult {
                        status: DocumentStatus::Failed,
                        source_url,
                        translated_url: None,
                        translated_to: None,
                        error: Some(RemoteError {
                            code: "TargetFileError".to_string(),
                            message: format!("translation of {} to {} failed", name, target.language),
                        }),
                    });
                    continue;
                }

                let target_container = container_from_url(&target.target_url);
                let mut translated = target.language.clone().into_bytes();
                translated.push(b':');
                translated.extend_from_slice(&bytes);
                self.store
                    .insert_object(&target_container, &name, translated);

                results.push(DocumentResult {
                    status: DocumentStatus::Succeeded,
                    source_url,
                    translated_url: Some(InMemoryObjectStore::object_url(
                        &target_container,
                        &name,
                    )),
                    translated_to: Some(target.language.clone()),
                    error: None,
                });
            }
        }
        Ok(results)
    }
}

// ─── Scripted OCR analyzer ──────────────────────────────────────────────────

/// OCR fake returning a fixed two-page analysis.
pub struct ScriptedOcr {
    polls_before_done: usize,
    panic_on_result: bool,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self {
            polls_before_done: 0,
            panic_on_result: false,
        }
    }

    pub fn with_polls_before_done(mut self, polls: usize) -> Self {
        self.polls_before_done = polls;
        self
    }

    /// Makes `take_result` panic, for exercising the dispatcher's thread
    /// boundary.
    pub fn panicking(mut self) -> Self {
        self.panic_on_result = true;
        self
    }

    pub fn fixed_analysis() -> OcrAnalysis {
        OcrAnalysis {
            pages: vec![OcrPage { page_number: 1 }, OcrPage { page_number: 2 }],
            paragraphs: vec![
                OcrParagraph {
                    content: "Scanned heading".to_string(),
                    bounding_regions: vec![BoundingRegion { page_number: 1 }],
                },
                OcrParagraph {
                    content: "Body continues here".to_string(),
                    bounding_regions: vec![BoundingRegion { page_number: 2 }],
                },
            ],
        }
    }
}

impl OcrAnalyzer for ScriptedOcr {
    fn begin_analyze(
        &self,
        _document: &[u8],
        _model_id: &str,
    ) -> Result<Box<dyn OcrPoller>, OcrError> {
        Ok(Box::new(ScriptedOcrPoller {
            remaining_polls: self.polls_before_done,
            panic_on_result: self.panic_on_result,
        }))
    }
}

struct ScriptedOcrPoller {
    remaining_polls: usize,
    panic_on_result: bool,
}

impl OcrPoller for ScriptedOcrPoller {
    fn is_done(&mut self) -> Result<bool, OcrError> {
        if self.remaining_polls == 0 {
            return Ok(true);
        }
        self.remaining_polls -= 1;
        Ok(false)
    }

    fn take_result(self: Box<Self>) -> Result<OcrAnalysis, OcrError> {
        if self.panic_on_result {
            panic!("scripted OCR poller panic");
        }
        Ok(ScriptedOcr::fixed_analysis())
    }
}

// ─── Test environment ───────────────────────────────────────────────────────

/// A fully wired deployment over temporary directories.
pub struct TestEnv {
    pub temp: TempDir,
    pub store: Arc<InMemoryObjectStore>,
    pub registry: Arc<JobRegistry>,
    pub dispatcher: JobDispatcher,
    pub upload_root: PathBuf,
    pub output_root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = InMemoryObjectStore::new();
        let translator = ScriptedTranslator::new(Arc::clone(&store));
        Self::with_remotes(store, translator, ScriptedOcr::new())
    }

    pub fn with_remotes(
        store: Arc<InMemoryObjectStore>,
        translator: ScriptedTranslator,
        ocr: ScriptedOcr,
    ) -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let upload_root = temp.path().join("uploads");
        let output_root = temp.path().join("outputs");
        std::fs::create_dir_all(&upload_root).expect("create upload root");
        std::fs::create_dir_all(&output_root).expect("create output root");

        let config = EngineConfig {
            upload_root: upload_root.clone(),
            output_root: output_root.clone(),
            poll_interval: Duration::from_millis(10),
            poll_deadline: None,
            signed_url_ttl: Duration::from_secs(3600),
            access: AccessMode::AmbientIdentity,
            storage_account: Some("testacct".to_string()),
            storage_account_key: None,
        };

        let registry = Arc::new(JobRegistry::new());
        let engine = Arc::new(TranslationEngine::new(
            Arc::clone(&store) as Arc<dyn ObjectStore>,
            Arc::new(translator),
            Arc::new(ocr),
            config,
        ));
        let dispatcher = JobDispatcher::new(Arc::clone(&registry), engine);

        Self {
            temp,
            store,
            registry,
            dispatcher,
            upload_root,
            output_root,
        }
    }

    /// Writes a file into the upload root as the intake would.
    pub fn write_upload(&self, name: &str, content: &[u8]) -> UploadedFile {
        let path = self.upload_root.join(name);
        std::fs::write(&path, content).expect("write upload");
        UploadedFile::from_path(path)
    }

    /// Polls the registry until the job reaches a terminal state.
    pub fn wait_for_terminal(&self, job_id: &str, timeout: Duration) -> JobRecord {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(record) = self.registry.get(job_id) {
                if record.is_finished() {
                    return record;
                }
            }
            assert!(
                Instant::now() < deadline,
                "job {} did not finish within {:?}",
                job_id,
                timeout
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
