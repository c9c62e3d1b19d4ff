#![allow(dead_code)]

use async_trait::async_trait;
use drive_browser_core::{
    ChatIdentity, ChatTransport, FileEntry, GatewayError, InteractionController, Keyboard,
    PageSize, SessionStore, StorageGateway, TransportError,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("drive_browser_core=debug")
        .with_test_writer()
        .try_init();
}

pub fn files(n: usize) -> Vec<FileEntry> {
    (1..=n)
        .map(|i| FileEntry::new(format!("id{i}"), format!("file{i}")))
        .collect()
}

/// Gateway serving a fixed list; downloads write `<id>.bin` unless the id is unknown.
pub struct ScriptedGateway {
    files: Vec<FileEntry>,
    fail_listing: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(files: Vec<FileEntry>) -> Self {
        Self {
            files,
            fail_listing: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageGateway for ScriptedGateway {
    async fn list_files(&self) -> Result<Vec<FileEntry>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.files.clone())
    }

    async fn download_file(
        &self,
        file_id: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf, GatewayError> {
        let entry = self
            .files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| GatewayError::NotFound(file_id.to_string()))?;

        tokio::fs::create_dir_all(destination_dir).await?;
        let path = destination_dir.join(&entry.name);
        tokio::fs::write(&path, entry.id.as_bytes()).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        chat: ChatIdentity,
        text: String,
        keyboard: Keyboard,
    },
    Document {
        chat: ChatIdentity,
        path: PathBuf,
    },
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn keyboards(&self) -> Vec<Keyboard> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { keyboard, .. } => Some(keyboard),
                Sent::Document { .. } => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<PathBuf> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Document { path, .. } => Some(path),
                Sent::Message { .. } => None,
            })
            .collect()
    }

    fn record(&self, entry: Sent) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(entry);
        }
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat: ChatIdentity,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.record(Sent::Message {
            chat,
            text: text.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn send_document(&self, chat: ChatIdentity, path: &Path) -> Result<(), TransportError> {
        self.record(Sent::Document {
            chat,
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

pub fn staging_dir() -> PathBuf {
    std::env::temp_dir().join(format!("drive-browser-test-{}", uuid::Uuid::new_v4()))
}

pub fn controller(
    gateway: Arc<ScriptedGateway>,
    transport: Arc<RecordingTransport>,
    page_size: usize,
) -> InteractionController {
    InteractionController::new(
        gateway,
        transport,
        SessionStore::new(1_000, Duration::from_secs(600)),
        PageSize::new(page_size).unwrap_or_default(),
        staging_dir(),
    )
}

/// File names on a rendered keyboard, navigation buttons excluded
pub fn file_labels(keyboard: &Keyboard) -> Vec<String> {
    keyboard
        .buttons()
        .filter(|b| b.payload.starts_with("file_"))
        .map(|b| b.label.clone())
        .collect()
}

/// Navigation payloads on a rendered keyboard
pub fn navigation(keyboard: &Keyboard) -> Vec<String> {
    keyboard
        .buttons()
        .filter(|b| !b.payload.starts_with("file_"))
        .map(|b| b.payload.clone())
        .collect()
}
