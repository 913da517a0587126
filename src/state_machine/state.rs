//! Session state types

use crate::backend::types::{Role, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable opaque identifier for one conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle to a photo held by the chat platform, as delivered in an
/// inbound photo message. Resolved to bytes through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHandle(pub String);

// ============================================================================
// Language
// ============================================================================

/// Conversation language, chosen at first contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    #[default]
    Ru,
    Ky,
    Kk,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ru => "ru",
            Lang::Ky => "ky",
            Lang::Kk => "kk",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Lang::En),
            "ru" => Some(Lang::Ru),
            "ky" => Some(Lang::Ky),
            "kk" => Some(Lang::Kk),
            _ => None,
        }
    }
}

// ============================================================================
// Photo references
// ============================================================================

/// Which photo of the work day a capture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSlot {
    CheckIn,
    CheckOut,
}

impl PhotoSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSlot::CheckIn => "checkin",
            PhotoSlot::CheckOut => "checkout",
        }
    }
}

/// An unconfirmed capture held in transient storage. Exists only while the
/// session sits in a confirmation state; promoted or discarded on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPhoto {
    pub slot: PhotoSlot,
    pub id: String,
}

impl PendingPhoto {
    /// The permanent reference this capture becomes on confirm-yes.
    ///
    /// The mapping is pure; the physical move in the photo store is an
    /// effect executed by the runtime.
    pub fn confirmed(&self) -> PhotoRef {
        PhotoRef {
            slot: self.slot,
            id: self.id.clone(),
        }
    }
}

/// Opaque reference to a confirmed photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub slot: PhotoSlot,
    pub id: String,
}

// ============================================================================
// Session state
// ============================================================================

/// Conversation state. Each variant carries exactly the fields that are
/// legal in that state, so an unconfirmed capture cannot outlive its
/// confirmation step and timer fields cannot exist before the timer starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// First contact; waiting for a language choice or the login button.
    #[default]
    LangSelect,

    /// Waiting for the user to type their email.
    LoginEmail,

    /// Email exists; waiting for the password.
    LoginPassword { email: String },

    /// Logged in, at the top-level menu.
    MainMenu,

    /// Task list requested or displayed; waiting for a pick.
    TaskSelect,

    /// Task picked; waiting for the start button.
    WaitStart { task_id: TaskId },

    /// Timer running; waiting for the check-in photo.
    WaitCheckinPhoto {
        task_id: TaskId,
        started_at: DateTime<Utc>,
    },

    /// Check-in capture stashed; waiting for yes/no.
    WaitConfirmCheckin {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        pending: PendingPhoto,
    },

    /// Check-in confirmed; waiting for the finish button.
    WaitFinish {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        check_in: PhotoRef,
    },

    /// Timer stopped; waiting for the check-out photo.
    WaitCheckoutPhoto {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        check_in: PhotoRef,
    },

    /// Check-out capture stashed; waiting for yes/no. Confirm-yes submits.
    WaitConfirmCheckout {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        check_in: PhotoRef,
        pending: PendingPhoto,
    },

    /// Admin: worker list displayed.
    ViewWorkers,

    /// Admin: one worker's entries displayed.
    WorkerDetails,

    /// Admin: project analytics displayed.
    Analytics,
}

impl SessionState {
    /// State name for logging and protocol-violation reporting.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::LangSelect => "lang_select",
            SessionState::LoginEmail => "login_email",
            SessionState::LoginPassword { .. } => "login_password",
            SessionState::MainMenu => "main_menu",
            SessionState::TaskSelect => "task_select",
            SessionState::WaitStart { .. } => "wait_start",
            SessionState::WaitCheckinPhoto { .. } => "wait_checkin_photo",
            SessionState::WaitConfirmCheckin { .. } => "wait_confirm_checkin",
            SessionState::WaitFinish { .. } => "wait_finish",
            SessionState::WaitCheckoutPhoto { .. } => "wait_checkout_photo",
            SessionState::WaitConfirmCheckout { .. } => "wait_confirm_checkout",
            SessionState::ViewWorkers => "view_workers",
            SessionState::WorkerDetails => "worker_details",
            SessionState::Analytics => "analytics",
        }
    }

    /// The unconfirmed capture, when the session is mid-confirmation.
    pub fn pending_photo(&self) -> Option<&PendingPhoto> {
        match self {
            SessionState::WaitConfirmCheckin { pending, .. }
            | SessionState::WaitConfirmCheckout { pending, .. } => Some(pending),
            _ => None,
        }
    }

    /// True for the worker check-in/check-out flow states.
    #[allow(dead_code)] // State query utility
    pub fn in_worker_flow(&self) -> bool {
        matches!(
            self,
            SessionState::TaskSelect
                | SessionState::WaitStart { .. }
                | SessionState::WaitCheckinPhoto { .. }
                | SessionState::WaitConfirmCheckin { .. }
                | SessionState::WaitFinish { .. }
                | SessionState::WaitCheckoutPhoto { .. }
                | SessionState::WaitConfirmCheckout { .. }
        )
    }

    /// True for the read-only admin states.
    #[allow(dead_code)] // State query utility
    pub fn in_admin_flow(&self) -> bool {
        matches!(
            self,
            SessionState::ViewWorkers | SessionState::WorkerDetails | SessionState::Analytics
        )
    }
}

// ============================================================================
// Session
// ============================================================================

/// One mutable record per chat identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: ChatId,
    pub lang: Lang,
    /// Populated by a successful login, cleared on logout.
    pub auth: Option<UserProfile>,
    pub state: SessionState,
}

impl Session {
    /// Fresh session for a previously unseen chat identity.
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            lang: Lang::default(),
            auth: None,
            state: SessionState::LangSelect,
        }
    }

    #[allow(dead_code)] // State query utility
    pub fn is_admin(&self) -> bool {
        self.auth
            .as_ref()
            .is_some_and(|profile| profile.role == Role::Admin)
    }
}
