//! Pure state transition function
//!
//! `transition` is free of I/O: given the same session and event it always
//! produces the same next session and effect list. Backend calls, photo
//! stashing, and message delivery happen in the runtime, which feeds their
//! outcomes back in as events.

use super::effect::{Effect, MenuView, Prompt};
use super::event::{Button, Confirm, Event, MessageRef};
use super::state::{PhotoSlot, Session, SessionState};
use crate::backend::types::{EntryDraft, Role, UserProfile};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result of a state transition.
#[derive(Debug)]
pub struct TransitionResult {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// An event arrived that is not legal for the current state. Never fatal:
/// the runtime logs it and drops the event.
#[derive(Debug, Error)]
#[error("event `{event}` is not legal in state `{state}`")]
pub struct ProtocolViolation {
    pub state: &'static str,
    pub event: &'static str,
}

fn violation(session: &Session, event: &Event) -> ProtocolViolation {
    ProtocolViolation {
        state: session.state.name(),
        event: event.kind(),
    }
}

fn button_violation(session: &Session) -> ProtocolViolation {
    ProtocolViolation {
        state: session.state.name(),
        event: "button",
    }
}

/// Elapsed hours between the two stamps, rounded to two decimals. Negative
/// when clocks regress; that is passed through as a data anomaly.
#[allow(clippy::cast_precision_loss)]
pub fn hours_between(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> f64 {
    let hours = (finished_at - started_at).num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

/// Effects that render the main menu: admins get their menu directly, for
/// everyone else the today's-entry check decides what the menu offers.
fn menu_effects(profile: &UserProfile, via: Option<MessageRef>) -> Vec<Effect> {
    if profile.role == Role::Admin {
        vec![Effect::prompt_via(
            Prompt::Menu(MenuView::Admin {
                email: profile.email.clone(),
            }),
            via,
        )]
    } else {
        vec![Effect::CheckTodayEntry {
            user_id: profile.user_id,
            via,
        }]
    }
}

/// Full rollback of the current submission attempt. Login fields survive
/// when a login has happened; otherwise the session resets to first
/// contact, language included.
fn cancel(session: &Session, via: Option<MessageRef>) -> TransitionResult {
    let mut effects = Vec::new();
    if let Some(pending) = session.state.pending_photo() {
        effects.push(Effect::DiscardPhoto {
            pending: pending.clone(),
        });
    }
    match &session.auth {
        Some(profile) => {
            let mut next = session.clone();
            next.state = SessionState::MainMenu;
            effects.extend(menu_effects(profile, via));
            TransitionResult {
                session: next,
                effects,
            }
        }
        None => TransitionResult {
            session: Session::new(session.chat_id),
            effects,
        }
        .with_effect(Effect::prompt_via(Prompt::Welcome, via)),
    }
}

fn is_cancel_word(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("cancel")
}

/// Pure transition function.
#[allow(clippy::too_many_lines)]
pub fn transition(session: &Session, event: Event) -> Result<TransitionResult, ProtocolViolation> {
    // Cancel is legal in every state except the main menu.
    if let Event::Button {
        press: Button::Cancel,
        origin,
        ..
    } = &event
    {
        if matches!(session.state, SessionState::MainMenu) {
            return Err(violation(session, &event));
        }
        return Ok(cancel(session, *origin));
    }

    match (&session.state, event) {
        // ============================================================
        // First contact and language selection
        // ============================================================
        (SessionState::LangSelect, Event::Text { .. }) => {
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::prompt(Prompt::Welcome)))
        }

        (
            SessionState::LangSelect,
            Event::Button {
                press: Button::Lang(lang),
                origin,
                ..
            },
        ) => {
            let mut next = session.clone();
            next.lang = lang;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::prompt_via(Prompt::LoginGate, origin)))
        }

        (
            SessionState::LangSelect,
            Event::Button {
                press: Button::Login,
                origin,
                ..
            },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::LoginEmail;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::prompt_via(Prompt::EmailPrompt, origin)))
        }

        // ============================================================
        // Login: email
        // ============================================================
        (SessionState::LoginEmail, Event::Text { text }) => {
            if is_cancel_word(&text) {
                return Ok(cancel(session, None));
            }
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::CheckEmail {
                email: text.trim().to_string(),
            }))
        }

        (SessionState::LoginEmail, Event::EmailChecked { email, exists }) => {
            if exists {
                let mut next = session.clone();
                next.state = SessionState::LoginPassword { email };
                Ok(TransitionResult::new(next).with_effect(Effect::prompt(Prompt::PasswordPrompt)))
            } else {
                Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt(Prompt::EmailNotFound))
                    .with_effect(Effect::prompt(Prompt::EmailPrompt)))
            }
        }

        (SessionState::LoginEmail, Event::EmailCheckFailed) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt(Prompt::TransientError)))
        }

        // ============================================================
        // Login: password
        // ============================================================
        (SessionState::LoginPassword { email }, Event::Text { text }) => {
            if is_cancel_word(&text) {
                return Ok(cancel(session, None));
            }
            // The password rides the effect only; it is never stored.
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::Login {
                email: email.clone(),
                password: text.trim().to_string(),
            }))
        }

        (SessionState::LoginPassword { .. }, Event::LoginSucceeded { profile }) => {
            let mut next = session.clone();
            next.state = SessionState::MainMenu;
            next.auth = Some(profile.clone());
            Ok(TransitionResult::new(next).with_effects(menu_effects(&profile, None)))
        }

        (SessionState::LoginPassword { .. }, Event::LoginFailed { .. }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt(Prompt::LoginFailed)))
        }

        // ============================================================
        // Main menu
        // ============================================================
        (SessionState::MainMenu, Event::TodayEntryChecked { exists, via }) => {
            let Some(profile) = &session.auth else {
                return Err(violation(session, &Event::TodayEntryChecked { exists, via }));
            };
            let menu = MenuView::Worker {
                email: profile.email.clone(),
                role: profile.role.clone(),
                entry_exists: exists,
            };
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt_via(Prompt::Menu(menu), via)))
        }

        (SessionState::MainMenu, Event::EntrySubmitted { accepted }) => {
            let Some(profile) = &session.auth else {
                return Err(violation(session, &Event::EntrySubmitted { accepted }));
            };
            let message = if accepted {
                Prompt::SubmissionSuccess
            } else {
                Prompt::SubmissionError
            };
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt(message))
                .with_effect(Effect::CheckTodayEntry {
                    user_id: profile.user_id,
                    via: None,
                }))
        }

        (
            SessionState::MainMenu,
            Event::Button {
                press: Button::EnterDailyEntry,
                origin,
                ..
            },
        ) => {
            let Some(profile) = &session.auth else {
                return Err(button_violation(session));
            };
            if profile.role == Role::Admin {
                // Admin sessions never enter the worker flow.
                return Err(button_violation(session));
            }
            match profile.project_id {
                Some(project_id) => {
                    let mut next = session.clone();
                    next.state = SessionState::TaskSelect;
                    Ok(TransitionResult::new(next).with_effect(Effect::FetchTasks { project_id }))
                }
                None => Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt_via(Prompt::NoProject, origin))),
            }
        }

        (
            SessionState::MainMenu,
            Event::Button {
                press: Button::Logout,
                origin,
                ..
            },
        ) => Ok(TransitionResult::new(Session::new(session.chat_id))
            .with_effect(Effect::prompt_via(Prompt::Welcome, origin))),

        (
            SessionState::MainMenu,
            Event::Button {
                press: Button::AdminViewWorkers,
                origin,
                ..
            },
        ) => {
            let Some(profile) = &session.auth else {
                return Err(button_violation(session));
            };
            if profile.role != Role::Admin {
                return Err(button_violation(session));
            }
            match profile.project_id {
                Some(project_id) => {
                    let mut next = session.clone();
                    next.state = SessionState::ViewWorkers;
                    Ok(TransitionResult::new(next).with_effect(Effect::FetchWorkers {
                        project_id,
                        via: origin,
                    }))
                }
                None => Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt_via(Prompt::AdminFetchError, origin))),
            }
        }

        (
            SessionState::MainMenu,
            Event::Button {
                press: Button::AdminAnalytics,
                origin,
                ..
            },
        ) => {
            let Some(profile) = &session.auth else {
                return Err(button_violation(session));
            };
            if profile.role != Role::Admin {
                return Err(button_violation(session));
            }
            match profile.project_id {
                Some(project_id) => {
                    let mut next = session.clone();
                    next.state = SessionState::Analytics;
                    Ok(TransitionResult::new(next).with_effect(Effect::FetchAnalytics {
                        project_id,
                        via: origin,
                    }))
                }
                None => Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt_via(Prompt::AdminFetchError, origin))),
            }
        }

        // ============================================================
        // Task selection
        // ============================================================
        (SessionState::TaskSelect, Event::TasksFetched { tasks }) => {
            if tasks.is_empty() {
                // No partial session is left behind; the flow aborts whole.
                let mut next = session.clone();
                next.state = SessionState::MainMenu;
                Ok(TransitionResult::new(next).with_effect(Effect::prompt(Prompt::NoTasks)))
            } else {
                Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt(Prompt::TaskList { tasks })))
            }
        }

        (SessionState::TaskSelect, Event::TaskFetchFailed) => {
            let mut next = session.clone();
            next.state = SessionState::MainMenu;
            Ok(TransitionResult::new(next).with_effect(Effect::prompt(Prompt::TaskFetchError)))
        }

        (
            SessionState::TaskSelect,
            Event::Button {
                press: Button::Task(task_id),
                origin,
                ..
            },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::WaitStart { task_id };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::prompt_via(Prompt::PressStart, origin)))
        }

        // ============================================================
        // Work timer: start
        // ============================================================
        (
            SessionState::WaitStart { task_id },
            Event::Button {
                press: Button::StartTask,
                origin,
                at,
            },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::WaitCheckinPhoto {
                task_id: *task_id,
                started_at: at,
            };
            let mut result = TransitionResult::new(next);
            if let Some(via) = origin {
                result = result.with_effect(Effect::ClearPrompt { via });
            }
            Ok(result.with_effect(Effect::prompt(Prompt::CheckinPrompt)))
        }

        // ============================================================
        // Photo sub-protocol: check-in
        // ============================================================
        (SessionState::WaitCheckinPhoto { .. }, Event::Photo { handle }) => {
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::StashPhoto {
                slot: PhotoSlot::CheckIn,
                handle,
            }))
        }

        (SessionState::WaitCheckinPhoto { .. }, Event::Text { .. }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt(Prompt::PleaseSendPhoto)))
        }

        (
            SessionState::WaitCheckinPhoto {
                task_id,
                started_at,
            },
            Event::PhotoStashed { pending },
        ) if pending.slot == PhotoSlot::CheckIn => {
            let mut next = session.clone();
            next.state = SessionState::WaitConfirmCheckin {
                task_id: *task_id,
                started_at: *started_at,
                pending: pending.clone(),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::ConfirmPhoto { pending }))
        }

        (
            SessionState::WaitCheckinPhoto { .. } | SessionState::WaitCheckoutPhoto { .. },
            Event::PhotoStashFailed,
        ) => Ok(TransitionResult::new(session.clone())
            .with_effect(Effect::prompt(Prompt::TransientError))),

        (
            SessionState::WaitConfirmCheckin {
                task_id,
                started_at,
                pending,
            },
            Event::Button {
                press: Button::ConfirmCheckin(answer),
                origin,
                ..
            },
        ) => match answer {
            Confirm::Yes => {
                let mut next = session.clone();
                next.state = SessionState::WaitFinish {
                    task_id: *task_id,
                    started_at: *started_at,
                    check_in: pending.confirmed(),
                };
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::PromotePhoto {
                        pending: pending.clone(),
                    })
                    .with_effect(Effect::prompt_via(Prompt::PhotoSaved, origin)))
            }
            Confirm::No => {
                let mut next = session.clone();
                next.state = SessionState::WaitCheckinPhoto {
                    task_id: *task_id,
                    started_at: *started_at,
                };
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::DiscardPhoto {
                        pending: pending.clone(),
                    })
                    .with_effect(Effect::prompt_via(Prompt::NewCheckinPhoto, origin)))
            }
        },

        // ============================================================
        // Work timer: finish
        // ============================================================
        (
            SessionState::WaitFinish {
                task_id,
                started_at,
                check_in,
            },
            Event::Button {
                press: Button::FinishTask,
                origin,
                at,
            },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::WaitCheckoutPhoto {
                task_id: *task_id,
                started_at: *started_at,
                finished_at: at,
                check_in: check_in.clone(),
            };
            let mut result = TransitionResult::new(next);
            if let Some(via) = origin {
                result = result.with_effect(Effect::ClearPrompt { via });
            }
            Ok(result.with_effect(Effect::prompt(Prompt::CheckoutPrompt)))
        }

        // ============================================================
        // Photo sub-protocol: check-out
        // ============================================================
        (SessionState::WaitCheckoutPhoto { .. }, Event::Photo { handle }) => {
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::StashPhoto {
                slot: PhotoSlot::CheckOut,
                handle,
            }))
        }

        (SessionState::WaitCheckoutPhoto { .. }, Event::Text { .. }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt(Prompt::PleaseSendPhoto)))
        }

        (
            SessionState::WaitCheckoutPhoto {
                task_id,
                started_at,
                finished_at,
                check_in,
            },
            Event::PhotoStashed { pending },
        ) if pending.slot == PhotoSlot::CheckOut => {
            let mut next = session.clone();
            next.state = SessionState::WaitConfirmCheckout {
                task_id: *task_id,
                started_at: *started_at,
                finished_at: *finished_at,
                check_in: check_in.clone(),
                pending: pending.clone(),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::ConfirmPhoto { pending }))
        }

        (
            SessionState::WaitConfirmCheckout {
                task_id,
                started_at,
                finished_at,
                check_in,
                pending,
            },
            Event::Button {
                press: Button::ConfirmCheckout(answer),
                origin,
                ..
            },
        ) => match answer {
            Confirm::Yes => {
                let Some(profile) = &session.auth else {
                    return Err(button_violation(session));
                };
                let draft = EntryDraft {
                    user_id: profile.user_id,
                    task_id: *task_id,
                    hours_worked: hours_between(*started_at, *finished_at),
                    started_at: *started_at,
                    finished_at: *finished_at,
                };
                let mut next = session.clone();
                next.state = SessionState::MainMenu;
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::PromotePhoto {
                        pending: pending.clone(),
                    })
                    .with_effect(Effect::SubmitEntry {
                        draft,
                        check_in: check_in.clone(),
                        check_out: pending.confirmed(),
                    }))
            }
            Confirm::No => {
                let mut next = session.clone();
                next.state = SessionState::WaitCheckoutPhoto {
                    task_id: *task_id,
                    started_at: *started_at,
                    finished_at: *finished_at,
                    check_in: check_in.clone(),
                };
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::DiscardPhoto {
                        pending: pending.clone(),
                    })
                    .with_effect(Effect::prompt_via(Prompt::NewCheckoutPhoto, origin)))
            }
        },

        // ============================================================
        // Admin flow
        // ============================================================
        (SessionState::ViewWorkers, Event::WorkersFetched { workers, via }) => {
            if workers.is_empty() {
                let mut next = session.clone();
                next.state = SessionState::MainMenu;
                Ok(TransitionResult::new(next)
                    .with_effect(Effect::prompt_via(Prompt::NoWorkers, via)))
            } else {
                Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::prompt_via(Prompt::WorkerList { workers }, via)))
            }
        }

        (
            SessionState::ViewWorkers,
            Event::Button {
                press: Button::Worker(worker_id),
                origin,
                ..
            },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::WorkerDetails;
            Ok(TransitionResult::new(next).with_effect(Effect::FetchWorkerDetails {
                worker_id,
                via: origin,
            }))
        }

        (SessionState::WorkerDetails, Event::WorkerDetailsFetched { details, via }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt_via(Prompt::WorkerDetails { details }, via)))
        }

        (SessionState::Analytics, Event::AnalyticsFetched { report, via }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::prompt_via(Prompt::Analytics { report }, via)))
        }

        (
            SessionState::ViewWorkers | SessionState::WorkerDetails | SessionState::Analytics,
            Event::AdminFetchFailed { via },
        ) => {
            let mut next = session.clone();
            next.state = SessionState::MainMenu;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::prompt_via(Prompt::AdminFetchError, via)))
        }

        (
            SessionState::ViewWorkers | SessionState::WorkerDetails | SessionState::Analytics,
            Event::Button {
                press: Button::AdminBack,
                origin,
                ..
            },
        ) => {
            let Some(profile) = &session.auth else {
                return Err(button_violation(session));
            };
            let mut next = session.clone();
            next.state = SessionState::MainMenu;
            Ok(TransitionResult::new(next).with_effect(Effect::prompt_via(
                Prompt::Menu(MenuView::Admin {
                    email: profile.email.clone(),
                }),
                origin,
            )))
        }

        // ============================================================
        // Everything else is a protocol violation
        // ============================================================
        (_, event) => Err(violation(session, &event)),
    }
}
