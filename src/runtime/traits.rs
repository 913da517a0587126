//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::backend::error::BackendError;
use crate::backend::types::{
    AnalyticsReport, EntryDraft, EntryRecord, TaskItem, UserProfile, WorkerDetails, WorkerSummary,
};
use crate::state_machine::event::MessageId;
use crate::state_machine::state::{
    BlobHandle, ChatId, PendingPhoto, PhotoRef, PhotoSlot, ProjectId, UserId,
};
use crate::texts::Keyboard;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure of an outbound transport operation. Edit failures ("message too
/// old to edit") fall back to a fresh send; send failures are logged and
/// never crash the session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Request(String),
    #[error("unexpected transport response: {0}")]
    Response(String),
}

/// Failure in transient or permanent photo storage.
#[derive(Debug, Error)]
pub enum PhotoStoreError {
    #[error("photo store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("photo not found: {0}")]
    Missing(String),
}

// ============================================================================
// Traits
// ============================================================================

/// The record-storage backend. One request per call, no internal retries;
/// callers treat transport failures as non-fatal to the session.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn check_email(&self, email: &str) -> Result<bool, BackendError>;

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, BackendError>;

    async fn tasks_for_project(&self, project: ProjectId) -> Result<Vec<TaskItem>, BackendError>;

    async fn today_entry_exists(&self, user: UserId) -> Result<bool, BackendError>;

    async fn submit_daily_entry(
        &self,
        draft: &EntryDraft,
        check_in: Option<Vec<u8>>,
        check_out: Option<Vec<u8>>,
    ) -> Result<EntryRecord, BackendError>;

    async fn workers(&self, project: ProjectId) -> Result<Vec<WorkerSummary>, BackendError>;

    async fn worker_details(&self, worker: UserId) -> Result<WorkerDetails, BackendError>;

    async fn analytics(&self, project: ProjectId) -> Result<AnalyticsReport, BackendError>;
}

/// Outbound half of the chat transport adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat: ChatId,
        photo: Vec<u8>,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    async fn edit_caption(
        &self,
        chat: ChatId,
        message: MessageId,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Resolve an inbound photo handle to its bytes.
    async fn fetch_photo(&self, handle: &BlobHandle) -> Result<Vec<u8>, TransportError>;
}

/// Blob store for confirmation photos: stash a capture under a temporary
/// reference, then promote it on confirm-yes or discard it on confirm-no.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn stash(&self, slot: PhotoSlot, bytes: Vec<u8>) -> Result<PendingPhoto, PhotoStoreError>;

    async fn promote(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError>;

    async fn discard(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError>;

    async fn read_pending(&self, pending: &PendingPhoto) -> Result<Vec<u8>, PhotoStoreError>;

    async fn read(&self, photo: &PhotoRef) -> Result<Vec<u8>, PhotoStoreError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn check_email(&self, email: &str) -> Result<bool, BackendError> {
        (**self).check_email(email).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        (**self).login(email, password).await
    }

    async fn tasks_for_project(&self, project: ProjectId) -> Result<Vec<TaskItem>, BackendError> {
        (**self).tasks_for_project(project).await
    }

    async fn today_entry_exists(&self, user: UserId) -> Result<bool, BackendError> {
        (**self).today_entry_exists(user).await
    }

    async fn submit_daily_entry(
        &self,
        draft: &EntryDraft,
        check_in: Option<Vec<u8>>,
        check_out: Option<Vec<u8>>,
    ) -> Result<EntryRecord, BackendError> {
        (**self).submit_daily_entry(draft, check_in, check_out).await
    }

    async fn workers(&self, project: ProjectId) -> Result<Vec<WorkerSummary>, BackendError> {
        (**self).workers(project).await
    }

    async fn worker_details(&self, worker: UserId) -> Result<WorkerDetails, BackendError> {
        (**self).worker_details(worker).await
    }

    async fn analytics(&self, project: ProjectId) -> Result<AnalyticsReport, BackendError> {
        (**self).analytics(project).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        (**self).send_text(chat, text, keyboard).await
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        (**self).edit_text(chat, message, text, keyboard).await
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        photo: Vec<u8>,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        (**self).send_photo(chat, photo, caption, keyboard).await
    }

    async fn edit_caption(
        &self,
        chat: ChatId,
        message: MessageId,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        (**self).edit_caption(chat, message, caption, keyboard).await
    }

    async fn fetch_photo(&self, handle: &BlobHandle) -> Result<Vec<u8>, TransportError> {
        (**self).fetch_photo(handle).await
    }
}

#[async_trait]
impl<T: PhotoStore + ?Sized> PhotoStore for Arc<T> {
    async fn stash(&self, slot: PhotoSlot, bytes: Vec<u8>) -> Result<PendingPhoto, PhotoStoreError> {
        (**self).stash(slot, bytes).await
    }

    async fn promote(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        (**self).promote(pending).await
    }

    async fn discard(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        (**self).discard(pending).await
    }

    async fn read_pending(&self, pending: &PendingPhoto) -> Result<Vec<u8>, PhotoStoreError> {
        (**self).read_pending(pending).await
    }

    async fn read(&self, photo: &PhotoRef) -> Result<Vec<u8>, PhotoStoreError> {
        (**self).read(photo).await
    }
}
