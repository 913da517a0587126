//! Mock implementations for testing
//!
//! These mocks enable integration testing of the executor without real I/O.

use super::traits::{Backend, PhotoStore, PhotoStoreError, Transport, TransportError};
use crate::backend::error::BackendError;
use crate::backend::types::{
    AnalyticsReport, EntryDraft, EntryRecord, TaskItem, UserProfile, WorkerDetails, WorkerSummary,
};
use crate::state_machine::event::MessageId;
use crate::state_machine::state::{BlobHandle, ChatId, PendingPhoto, PhotoRef, PhotoSlot};
use crate::texts::Keyboard;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued responses and records submissions.
#[derive(Default)]
pub struct MockBackend {
    pub email_checks: Mutex<VecDeque<Result<bool, BackendError>>>,
    pub logins: Mutex<VecDeque<Result<UserProfile, BackendError>>>,
    pub task_lists: Mutex<VecDeque<Result<Vec<TaskItem>, BackendError>>>,
    pub today_checks: Mutex<VecDeque<Result<bool, BackendError>>>,
    pub submit_results: Mutex<VecDeque<Result<EntryRecord, BackendError>>>,
    pub worker_lists: Mutex<VecDeque<Result<Vec<WorkerSummary>, BackendError>>>,
    pub worker_details: Mutex<VecDeque<Result<WorkerDetails, BackendError>>>,
    pub analytics: Mutex<VecDeque<Result<AnalyticsReport, BackendError>>>,
    /// Record of submitted drafts and whether each photo was attached.
    pub submissions: Mutex<Vec<(EntryDraft, bool, bool)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Result<T, BackendError>>>) -> Result<T, BackendError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(BackendError::transport("No mock response queued")))
}

#[async_trait]
impl Backend for MockBackend {
    async fn check_email(&self, _email: &str) -> Result<bool, BackendError> {
        pop(&self.email_checks)
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<UserProfile, BackendError> {
        pop(&self.logins)
    }

    async fn tasks_for_project(
        &self,
        _project: crate::state_machine::state::ProjectId,
    ) -> Result<Vec<TaskItem>, BackendError> {
        pop(&self.task_lists)
    }

    async fn today_entry_exists(
        &self,
        _user: crate::state_machine::state::UserId,
    ) -> Result<bool, BackendError> {
        pop(&self.today_checks)
    }

    async fn submit_daily_entry(
        &self,
        draft: &EntryDraft,
        check_in: Option<Vec<u8>>,
        check_out: Option<Vec<u8>>,
    ) -> Result<EntryRecord, BackendError> {
        self.submissions.lock().unwrap().push((
            draft.clone(),
            check_in.is_some(),
            check_out.is_some(),
        ));
        pop(&self.submit_results)
    }

    async fn workers(
        &self,
        _project: crate::state_machine::state::ProjectId,
    ) -> Result<Vec<WorkerSummary>, BackendError> {
        pop(&self.worker_lists)
    }

    async fn worker_details(
        &self,
        _worker: crate::state_machine::state::UserId,
    ) -> Result<WorkerDetails, BackendError> {
        pop(&self.worker_details)
    }

    async fn analytics(
        &self,
        _project: crate::state_machine::state::ProjectId,
    ) -> Result<AnalyticsReport, BackendError> {
        pop(&self.analytics)
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Outbound operations recorded by the mock transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    EditText {
        chat: ChatId,
        message: MessageId,
        text: String,
    },
    Photo {
        chat: ChatId,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    EditCaption {
        chat: ChatId,
        message: MessageId,
        caption: String,
    },
}

/// Mock transport that records every outbound operation.
#[derive(Default)]
pub struct MockTransport {
    pub outbound: Mutex<Vec<Outbound>>,
    /// Simulate "message too old to edit".
    pub fail_edits: AtomicBool,
    /// Simulate photo download failures.
    pub fail_fetch: AtomicBool,
    next_message_id: AtomicI64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.outbound.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|op| match op {
                Outbound::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        self.outbound.lock().unwrap().push(Outbound::Text {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        _keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::Request("message too old to edit".into()));
        }
        self.outbound.lock().unwrap().push(Outbound::EditText {
            chat,
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        _photo: Vec<u8>,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        self.outbound.lock().unwrap().push(Outbound::Photo {
            chat,
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_caption(
        &self,
        chat: ChatId,
        message: MessageId,
        caption: &str,
        _keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::Request("message too old to edit".into()));
        }
        self.outbound.lock().unwrap().push(Outbound::EditCaption {
            chat,
            message,
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn fetch_photo(&self, handle: &BlobHandle) -> Result<Vec<u8>, TransportError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TransportError::Request(format!(
                "download failed for {}",
                handle.0
            )));
        }
        Ok(vec![0xFF, 0xD8, 0xFF])
    }
}

// ============================================================================
// Mock Photo Store
// ============================================================================

/// Mock photo store with deterministic capture ids.
#[derive(Default)]
pub struct MockPhotoStore {
    counter: AtomicU64,
    pub stashed: Mutex<Vec<PendingPhoto>>,
    pub promoted: Mutex<Vec<PendingPhoto>>,
    pub discarded: Mutex<Vec<PendingPhoto>>,
    pub fail_stash: AtomicBool,
}

impl MockPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PhotoStore for MockPhotoStore {
    async fn stash(
        &self,
        slot: PhotoSlot,
        _bytes: Vec<u8>,
    ) -> Result<PendingPhoto, PhotoStoreError> {
        if self.fail_stash.load(Ordering::SeqCst) {
            return Err(PhotoStoreError::Missing("stash disabled".into()));
        }
        let pending = PendingPhoto {
            slot,
            id: format!("cap-{}", self.counter.fetch_add(1, Ordering::SeqCst)),
        };
        self.stashed.lock().unwrap().push(pending.clone());
        Ok(pending)
    }

    async fn promote(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        self.promoted.lock().unwrap().push(pending.clone());
        Ok(())
    }

    async fn discard(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        self.discarded.lock().unwrap().push(pending.clone());
        Ok(())
    }

    async fn read_pending(&self, _pending: &PendingPhoto) -> Result<Vec<u8>, PhotoStoreError> {
        Ok(vec![0xFF, 0xD8, 0xFF])
    }

    async fn read(&self, _photo: &PhotoRef) -> Result<Vec<u8>, PhotoStoreError> {
        Ok(vec![0xFF, 0xD8, 0xFF])
    }
}
