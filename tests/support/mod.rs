// ABOUTME: Test support utilities.
// ABOUTME: In-memory storage fakes, a recording upload transport, and a canned HTTP server.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imgdrop::Registry;
use imgdrop::remote::RemoteListing;
use imgdrop::storage::{KeyValueStore, StorageError, StructuredStore};
use imgdrop::types::{ImageId, ImageRecord};
use imgdrop::upload::{
    UploadClient, UploadError, UploadFile, UploadResponse, UploadTransport,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const IMAGES_PREFIX: &str = "/images/";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("imgdrop=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A local record uploaded at `millis` since the epoch.
pub fn record(id: &str, url: &str, millis: i64) -> ImageRecord {
    ImageRecord {
        id: ImageId::new(id),
        name: url.rsplit('/').next().unwrap_or(url).to_string(),
        url: url.to_string(),
        preview: None,
        size: Some(1024),
        mime_type: Some("image/png".to_string()),
        uploaded_at: Some(at(millis)),
    }
}

pub fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

fn injected() -> StorageError {
    StorageError::Io(std::io::Error::other("injected failure"))
}

// =============================================================================
// Storage fakes
// =============================================================================

/// In-memory key-value backup store.
#[derive(Default)]
pub struct MemoryBackup {
    blob: Mutex<Option<Vec<ImageRecord>>>,
    failing: AtomicBool,
    pub saves: AtomicUsize,
    pub clears: AtomicUsize,
}

impl MemoryBackup {
    pub fn with_records(records: Vec<ImageRecord>) -> Self {
        let store = Self::default();
        *store.blob.lock() = Some(records);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Option<Vec<ImageRecord>> {
        self.blob.lock().clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(injected())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryBackup {
    async fn save(&self, records: &[ImageRecord]) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        *self.blob.lock() = Some(records.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ImageRecord>, StorageError> {
        self.check()?;
        Ok(self.blob.lock().clone().unwrap_or_default())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        *self.blob.lock() = None;
        Ok(())
    }
}

/// In-memory structured catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    records: Mutex<Vec<ImageRecord>>,
    failing: AtomicBool,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MemoryCatalog {
    pub fn with_records(records: Vec<ImageRecord>) -> Self {
        let store = Self::default();
        *store.records.lock() = records;
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.id.to_string()).collect()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(injected())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StructuredStore for MemoryCatalog {
    async fn put(&self, record: &ImageRecord) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut records = self.records.lock();
        records.retain(|r| r.id != record.id);
        records.push(record.clone());
        Ok(())
    }

    async fn delete(&self, id: &ImageId) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.records.lock().retain(|r| &r.id != id);
        Ok(())
    }

    async fn get_all_sorted(&self) -> Result<Vec<ImageRecord>, StorageError> {
        self.check()?;
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        self.records.lock().clear();
        Ok(())
    }
}

// =============================================================================
// Remote fakes
// =============================================================================

/// Listing that always reports the same filenames.
pub struct StaticListing {
    filenames: Vec<String>,
    pub fetches: AtomicUsize,
}

impl StaticListing {
    pub fn new(filenames: &[&str]) -> Self {
        Self {
            filenames: filenames.iter().map(|s| s.to_string()).collect(),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteListing for StaticListing {
    async fn fetch_records(&self) -> Vec<ImageRecord> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.filenames
            .iter()
            .map(|name| ImageRecord::from_server_file(name, IMAGES_PREFIX))
            .collect()
    }
}

/// Upload transport that records every attempt and returns a fixed outcome.
pub struct RecordingTransport {
    outcome: Mutex<Result<UploadResponse, (u16, String)>>,
    pub attempts: AtomicUsize,
    pub names: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn succeeding(filename: Option<&str>, url: Option<&str>) -> Self {
        Self {
            outcome: Mutex::new(Ok(UploadResponse {
                filename: filename.map(str::to_string),
                url: url.map(str::to_string),
            })),
            attempts: AtomicUsize::new(0),
            names: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            outcome: Mutex::new(Err((status, message.to_string()))),
            attempts: AtomicUsize::new(0),
            names: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadTransport for RecordingTransport {
    async fn send(&self, file: &UploadFile) -> Result<UploadResponse, UploadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.names.lock().push(file.name.clone());
        match &*self.outcome.lock() {
            Ok(response) => Ok(response.clone()),
            Err((status, message)) => Err(UploadError::Rejected {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

// =============================================================================
// Registry harness
// =============================================================================

/// A registry wired to fakes, with handles to inspect them.
pub struct Harness {
    pub registry: Registry,
    pub backup: Arc<MemoryBackup>,
    pub catalog: Arc<MemoryCatalog>,
    pub listing: Arc<StaticListing>,
    pub transport: Arc<RecordingTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(
            MemoryBackup::default(),
            MemoryCatalog::default(),
            StaticListing::new(&[]),
            RecordingTransport::succeeding(None, None),
        )
    }

    pub fn with_parts(
        backup: MemoryBackup,
        catalog: MemoryCatalog,
        listing: StaticListing,
        transport: RecordingTransport,
    ) -> Self {
        init_tracing();
        let backup = Arc::new(backup);
        let catalog = Arc::new(catalog);
        let listing = Arc::new(listing);
        let transport = Arc::new(transport);
        let registry = Registry::new(
            backup.clone(),
            catalog.clone(),
            listing.clone(),
            UploadClient::new(transport.clone(), IMAGES_PREFIX),
        );
        Self {
            registry,
            backup,
            catalog,
            listing,
            transport,
        }
    }
}

// =============================================================================
// Canned HTTP server
// =============================================================================

/// Local HTTP server answering every request with the same response.
pub struct CannedServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl CannedServer {
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn request_text(&self, index: usize) -> String {
        String::from_utf8_lossy(&self.requests.lock()[index]).into_owned()
    }
}

pub async fn spawn_canned_server(status: u16, content_type: &str, body: &str) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let captured = requests.clone();
    let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let raw = read_request(&mut stream).await;
            captured.lock().push(raw);
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    CannedServer {
        base_url: format!("http://{addr}"),
        requests,
    }
}

/// Base URL of a port nothing is listening on.
pub async fn closed_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    buf
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
