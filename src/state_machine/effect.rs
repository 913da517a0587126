//! Effects produced by state transitions
//!
//! The transition function is pure; everything that touches the network,
//! the photo store, or the chat transport is described here and executed
//! by the session runtime.

use crate::backend::types::{
    AnalyticsReport, EntryDraft, Role, TaskItem, WorkerDetails, WorkerSummary,
};
use crate::state_machine::event::MessageRef;
use crate::state_machine::state::{
    BlobHandle, PendingPhoto, PhotoRef, PhotoSlot, ProjectId, UserId,
};

/// Effects to be executed after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a prompt. With `via`, edit that message first and fall back
    /// to a fresh send when editing fails.
    Prompt {
        prompt: Prompt,
        via: Option<MessageRef>,
    },

    /// Blank out an old prompt so the next one stands alone. Failures are
    /// logged and ignored.
    ClearPrompt { via: MessageRef },

    /// Send the stashed capture back to the user with yes/no controls.
    ConfirmPhoto { pending: PendingPhoto },

    // Backend calls
    CheckEmail {
        email: String,
    },
    Login {
        email: String,
        password: String,
    },
    FetchTasks {
        project_id: ProjectId,
    },
    CheckTodayEntry {
        user_id: UserId,
        via: Option<MessageRef>,
    },
    SubmitEntry {
        draft: EntryDraft,
        check_in: PhotoRef,
        check_out: PhotoRef,
    },
    FetchWorkers {
        project_id: ProjectId,
        via: Option<MessageRef>,
    },
    FetchWorkerDetails {
        worker_id: UserId,
        via: Option<MessageRef>,
    },
    FetchAnalytics {
        project_id: ProjectId,
        via: Option<MessageRef>,
    },

    // Photo store
    StashPhoto {
        slot: PhotoSlot,
        handle: BlobHandle,
    },
    PromotePhoto {
        pending: PendingPhoto,
    },
    DiscardPhoto {
        pending: PendingPhoto,
    },
}

impl Effect {
    pub fn prompt(prompt: Prompt) -> Self {
        Effect::Prompt { prompt, via: None }
    }

    pub fn prompt_via(prompt: Prompt, via: Option<MessageRef>) -> Self {
        Effect::Prompt { prompt, via }
    }
}

// ============================================================================
// Prompts
// ============================================================================

/// What the main menu offers, decided by role and the today's-entry check.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuView {
    Worker {
        email: String,
        role: Role,
        entry_exists: bool,
    },
    Admin {
        email: String,
    },
}

/// Semantic outbound messages. Rendering to localized text and keyboards
/// happens in `texts`, outside the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Welcome,
    LoginGate,
    EmailPrompt,
    EmailNotFound,
    TransientError,
    PasswordPrompt,
    LoginFailed,
    Menu(MenuView),
    NoProject,
    TaskList { tasks: Vec<TaskItem> },
    NoTasks,
    TaskFetchError,
    PressStart,
    CheckinPrompt,
    CheckoutPrompt,
    PleaseSendPhoto,
    ConfirmPhoto { slot: PhotoSlot },
    PhotoSaved,
    NewCheckinPhoto,
    NewCheckoutPhoto,
    SubmissionSuccess,
    SubmissionError,
    WorkerList { workers: Vec<WorkerSummary> },
    NoWorkers,
    WorkerDetails { details: WorkerDetails },
    Analytics { report: AnalyticsReport },
    AdminFetchError,
}
