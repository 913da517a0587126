//! Events that drive a session's state machine

use crate::backend::types::{AnalyticsReport, TaskItem, UserProfile, WorkerDetails, WorkerSummary};
use crate::state_machine::state::{BlobHandle, Lang, PendingPhoto, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an outbound chat message, used to edit it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Where a button press came from: the message carrying the pressed
/// keyboard. Editing a photo message means editing its caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: MessageId,
    pub has_photo: bool,
}

// ============================================================================
// Button vocabulary
// ============================================================================

/// Yes/no answer in a photo confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Yes,
    No,
}

/// The fixed callback-data vocabulary. Anything the parser does not
/// recognize never becomes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Lang(Lang),
    Login,
    Cancel,
    EnterDailyEntry,
    Task(TaskId),
    StartTask,
    ConfirmCheckin(Confirm),
    FinishTask,
    ConfirmCheckout(Confirm),
    Logout,
    AdminViewWorkers,
    Worker(UserId),
    AdminAnalytics,
    AdminBack,
}

impl Button {
    /// Parse inbound callback data. Unknown tokens yield `None` and are
    /// dropped at the transport boundary.
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(lang) = Lang::from_code(data) {
            return Some(Button::Lang(lang));
        }
        if let Some(id) = data.strip_prefix("task_") {
            return id.parse().ok().map(|id| Button::Task(TaskId(id)));
        }
        if let Some(id) = data.strip_prefix("worker_") {
            return id.parse().ok().map(|id| Button::Worker(UserId(id)));
        }
        match data {
            "login" => Some(Button::Login),
            "cancel_conversation" => Some(Button::Cancel),
            "enter_daily_entry" => Some(Button::EnterDailyEntry),
            "start_task" => Some(Button::StartTask),
            "confirm_checkin_yes" => Some(Button::ConfirmCheckin(Confirm::Yes)),
            "confirm_checkin_no" => Some(Button::ConfirmCheckin(Confirm::No)),
            "finish_task" => Some(Button::FinishTask),
            "confirm_checkout_yes" => Some(Button::ConfirmCheckout(Confirm::Yes)),
            "confirm_checkout_no" => Some(Button::ConfirmCheckout(Confirm::No)),
            "logout" => Some(Button::Logout),
            "admin_view_workers" => Some(Button::AdminViewWorkers),
            "admin_analytics" => Some(Button::AdminAnalytics),
            "admin_back" => Some(Button::AdminBack),
            _ => None,
        }
    }

    /// The callback data emitted when rendering this button into a keyboard.
    pub fn callback_data(&self) -> String {
        match self {
            Button::Lang(lang) => lang.code().to_string(),
            Button::Login => "login".to_string(),
            Button::Cancel => "cancel_conversation".to_string(),
            Button::EnterDailyEntry => "enter_daily_entry".to_string(),
            Button::Task(id) => format!("task_{id}"),
            Button::StartTask => "start_task".to_string(),
            Button::ConfirmCheckin(Confirm::Yes) => "confirm_checkin_yes".to_string(),
            Button::ConfirmCheckin(Confirm::No) => "confirm_checkin_no".to_string(),
            Button::FinishTask => "finish_task".to_string(),
            Button::ConfirmCheckout(Confirm::Yes) => "confirm_checkout_yes".to_string(),
            Button::ConfirmCheckout(Confirm::No) => "confirm_checkout_no".to_string(),
            Button::Logout => "logout".to_string(),
            Button::AdminViewWorkers => "admin_view_workers".to_string(),
            Button::Worker(id) => format!("worker_{id}"),
            Button::AdminAnalytics => "admin_analytics".to_string(),
            Button::AdminBack => "admin_back".to_string(),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Why a login attempt did not produce a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    InvalidCredentials,
    Transport,
}

/// Events that trigger state transitions. The first group arrives from the
/// transport adapter; the rest are outcomes of effects, fed back by the
/// runtime before the next inbound event is taken off the queue.
#[derive(Debug, Clone)]
pub enum Event {
    // Inbound from the transport adapter
    Text {
        text: String,
    },
    Photo {
        handle: BlobHandle,
    },
    Button {
        press: Button,
        /// The message the keyboard was attached to, when known.
        origin: Option<MessageRef>,
        /// Stamped at ingestion so transitions stay pure.
        at: DateTime<Utc>,
    },

    // Backend call outcomes
    EmailChecked {
        email: String,
        exists: bool,
    },
    EmailCheckFailed,
    LoginSucceeded {
        profile: UserProfile,
    },
    LoginFailed {
        reason: LoginFailure,
    },
    TasksFetched {
        tasks: Vec<TaskItem>,
    },
    TaskFetchFailed,
    TodayEntryChecked {
        exists: bool,
        via: Option<MessageRef>,
    },
    EntrySubmitted {
        accepted: bool,
    },
    WorkersFetched {
        workers: Vec<WorkerSummary>,
        via: Option<MessageRef>,
    },
    WorkerDetailsFetched {
        details: WorkerDetails,
        via: Option<MessageRef>,
    },
    AnalyticsFetched {
        report: AnalyticsReport,
        via: Option<MessageRef>,
    },
    AdminFetchFailed {
        via: Option<MessageRef>,
    },

    // Photo store outcomes
    PhotoStashed {
        pending: PendingPhoto,
    },
    PhotoStashFailed,
}

impl Event {
    /// Event name for logging and protocol-violation reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text { .. } => "text",
            Event::Photo { .. } => "photo",
            Event::Button { .. } => "button",
            Event::EmailChecked { .. } => "email_checked",
            Event::EmailCheckFailed => "email_check_failed",
            Event::LoginSucceeded { .. } => "login_succeeded",
            Event::LoginFailed { .. } => "login_failed",
            Event::TasksFetched { .. } => "tasks_fetched",
            Event::TaskFetchFailed => "task_fetch_failed",
            Event::TodayEntryChecked { .. } => "today_entry_checked",
            Event::EntrySubmitted { .. } => "entry_submitted",
            Event::WorkersFetched { .. } => "workers_fetched",
            Event::WorkerDetailsFetched { .. } => "worker_details_fetched",
            Event::AnalyticsFetched { .. } => "analytics_fetched",
            Event::AdminFetchFailed { .. } => "admin_fetch_failed",
            Event::PhotoStashed { .. } => "photo_stashed",
            Event::PhotoStashFailed => "photo_stash_failed",
        }
    }
}
