//! Session runtime executor
//!
//! Owns one session and its inbound queue. Events for the same chat are
//! processed strictly in arrival order: a transition's effects (including
//! backend calls) run to completion, and the outcome events they generate
//! are applied, before the next inbound event is taken off the queue.
//! Different chats run in independent tasks.

use super::traits::{Backend, PhotoStore, Transport};
use crate::backend::error::BackendErrorKind;
use crate::state_machine::effect::{Effect, Prompt};
use crate::state_machine::event::{Event, LoginFailure, MessageRef};
use crate::state_machine::state::{PhotoRef, Session};
use crate::state_machine::transition::transition;
use crate::texts::{self, Keyboard};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Generic session runtime that works with any backend, transport, and
/// photo store implementations.
pub struct SessionRuntime<B, T, P>
where
    B: Backend + 'static,
    T: Transport + 'static,
    P: PhotoStore + 'static,
{
    session: Session,
    backend: Arc<B>,
    transport: Arc<T>,
    photos: Arc<P>,
    event_rx: mpsc::Receiver<Event>,
    idle_ttl: Duration,
}

impl<B, T, P> SessionRuntime<B, T, P>
where
    B: Backend + 'static,
    T: Transport + 'static,
    P: PhotoStore + 'static,
{
    pub fn new(
        session: Session,
        backend: Arc<B>,
        transport: Arc<T>,
        photos: Arc<P>,
        event_rx: mpsc::Receiver<Event>,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            session,
            backend,
            transport,
            photos,
            event_rx,
            idle_ttl,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(mut self) {
        tracing::info!(chat_id = %self.session.chat_id, "Starting session runtime");

        loop {
            match tokio::time::timeout(self.idle_ttl, self.event_rx.recv()).await {
                Ok(Some(event)) => self.process_event(event).await,
                Ok(None) => break,
                Err(_) => {
                    self.expire().await;
                    break;
                }
            }
        }

        tracing::info!(chat_id = %self.session.chat_id, "Session runtime stopped");
    }

    /// Idle-timeout cleanup: an abandoned conversation must not leak its
    /// unconfirmed capture.
    async fn expire(&mut self) {
        if let Some(pending) = self.session.state.pending_photo().cloned() {
            if let Err(error) = self.photos.discard(&pending).await {
                tracing::warn!(
                    chat_id = %self.session.chat_id,
                    %error,
                    "Failed to discard pending photo on expiry"
                );
            }
        }
        tracing::info!(
            chat_id = %self.session.chat_id,
            state = self.session.state.name(),
            "Session expired after idle timeout"
        );
    }

    pub(crate) async fn process_event(&mut self, event: Event) {
        // Effects can generate follow-up events (backend outcomes); process
        // the whole chain before returning to the queue.
        let mut events_to_process = vec![event];

        while let Some(current) = events_to_process.pop() {
            match transition(&self.session, current) {
                Ok(result) => {
                    self.session = result.session;
                    for effect in result.effects {
                        if let Some(generated) = self.execute_effect(effect).await {
                            events_to_process.push(generated);
                        }
                    }
                }
                Err(violation) => {
                    tracing::debug!(
                        chat_id = %self.session.chat_id,
                        %violation,
                        "Ignoring illegal event"
                    );
                }
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        let chat_id = self.session.chat_id;
        match effect {
            Effect::Prompt { prompt, via } => {
                let rendered = texts::render(&prompt, self.session.lang);
                self.deliver(via, &rendered.text, rendered.keyboard.as_ref())
                    .await;
                None
            }

            Effect::ClearPrompt { via } => {
                let cleared = if via.has_photo {
                    self.transport
                        .edit_caption(chat_id, via.id, " ", None)
                        .await
                } else {
                    self.transport.edit_text(chat_id, via.id, " ", None).await
                };
                if let Err(error) = cleared {
                    tracing::warn!(chat_id = %chat_id, %error, "Failed to clear old prompt");
                }
                None
            }

            Effect::ConfirmPhoto { pending } => {
                let rendered = texts::render(
                    &Prompt::ConfirmPhoto { slot: pending.slot },
                    self.session.lang,
                );
                match self.photos.read_pending(&pending).await {
                    Ok(bytes) => {
                        if let Err(error) = self
                            .transport
                            .send_photo(chat_id, bytes, &rendered.text, rendered.keyboard.as_ref())
                            .await
                        {
                            // Keep the confirmation controls reachable even
                            // when the photo echo cannot be delivered.
                            tracing::warn!(
                                chat_id = %chat_id,
                                %error,
                                "Sending photo failed, falling back to text"
                            );
                            self.send_fresh(&rendered.text, rendered.keyboard.as_ref())
                                .await;
                        }
                    }
                    Err(error) => {
                        tracing::error!(chat_id = %chat_id, %error, "Failed to read stashed photo");
                        self.send_fresh(&rendered.text, rendered.keyboard.as_ref())
                            .await;
                    }
                }
                None
            }

            Effect::CheckEmail { email } => match self.backend.check_email(&email).await {
                Ok(exists) => Some(Event::EmailChecked { email, exists }),
                Err(error) => {
                    tracing::warn!(chat_id = %chat_id, %error, "Email existence check failed");
                    Some(Event::EmailCheckFailed)
                }
            },

            Effect::Login { email, password } => {
                match self.backend.login(&email, &password).await {
                    Ok(profile) => Some(Event::LoginSucceeded { profile }),
                    Err(error) => {
                        let reason = if error.kind == BackendErrorKind::Transport {
                            LoginFailure::Transport
                        } else {
                            LoginFailure::InvalidCredentials
                        };
                        tracing::warn!(chat_id = %chat_id, %error, "Login failed");
                        Some(Event::LoginFailed { reason })
                    }
                }
            }

            Effect::FetchTasks { project_id } => {
                match self.backend.tasks_for_project(project_id).await {
                    Ok(tasks) => Some(Event::TasksFetched { tasks }),
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Task fetch failed");
                        Some(Event::TaskFetchFailed)
                    }
                }
            }

            Effect::CheckTodayEntry { user_id, via } => {
                // A failed probe counts as "no entry". The backend stays
                // authoritative at submission time.
                let exists = match self.backend.today_entry_exists(user_id).await {
                    Ok(exists) => exists,
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Today's-entry check failed");
                        false
                    }
                };
                Some(Event::TodayEntryChecked { exists, via })
            }

            Effect::SubmitEntry {
                draft,
                check_in,
                check_out,
            } => {
                let check_in_bytes = self.read_photo(&check_in).await;
                let check_out_bytes = self.read_photo(&check_out).await;
                match self
                    .backend
                    .submit_daily_entry(&draft, check_in_bytes, check_out_bytes)
                    .await
                {
                    Ok(entry) => {
                        tracing::info!(
                            chat_id = %chat_id,
                            entry_id = entry.id,
                            hours = entry.hours_worked,
                            "Daily entry submitted"
                        );
                        Some(Event::EntrySubmitted { accepted: true })
                    }
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Daily entry rejected");
                        Some(Event::EntrySubmitted { accepted: false })
                    }
                }
            }

            Effect::FetchWorkers { project_id, via } => {
                match self.backend.workers(project_id).await {
                    Ok(workers) => Some(Event::WorkersFetched { workers, via }),
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Worker list fetch failed");
                        Some(Event::AdminFetchFailed { via })
                    }
                }
            }

            Effect::FetchWorkerDetails { worker_id, via } => {
                match self.backend.worker_details(worker_id).await {
                    Ok(details) => Some(Event::WorkerDetailsFetched { details, via }),
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Worker details fetch failed");
                        Some(Event::AdminFetchFailed { via })
                    }
                }
            }

            Effect::FetchAnalytics { project_id, via } => {
                match self.backend.analytics(project_id).await {
                    Ok(report) => Some(Event::AnalyticsFetched { report, via }),
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Analytics fetch failed");
                        Some(Event::AdminFetchFailed { via })
                    }
                }
            }

            Effect::StashPhoto { slot, handle } => {
                let bytes = match self.transport.fetch_photo(&handle).await {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Failed to fetch inbound photo");
                        return Some(Event::PhotoStashFailed);
                    }
                };
                match self.photos.stash(slot, bytes).await {
                    Ok(pending) => Some(Event::PhotoStashed { pending }),
                    Err(error) => {
                        tracing::warn!(chat_id = %chat_id, %error, "Failed to stash photo");
                        Some(Event::PhotoStashFailed)
                    }
                }
            }

            Effect::PromotePhoto { pending } => {
                if let Err(error) = self.photos.promote(&pending).await {
                    // Submission degrades to a missing attachment.
                    tracing::error!(chat_id = %chat_id, %error, "Failed to promote photo");
                }
                None
            }

            Effect::DiscardPhoto { pending } => {
                if let Err(error) = self.photos.discard(&pending).await {
                    tracing::warn!(chat_id = %chat_id, %error, "Failed to discard photo");
                }
                None
            }
        }
    }

    /// Attachments are optional: a missing file degrades the submission,
    /// never the session.
    async fn read_photo(&self, photo: &PhotoRef) -> Option<Vec<u8>> {
        match self.photos.read(photo).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                tracing::warn!(
                    chat_id = %self.session.chat_id,
                    slot = photo.slot.as_str(),
                    %error,
                    "Photo unavailable at submission"
                );
                None
            }
        }
    }

    /// Edit the originating message when one is known, otherwise (or when
    /// the edit fails, e.g. the message is too old) send a fresh message.
    async fn deliver(&self, via: Option<MessageRef>, text: &str, keyboard: Option<&Keyboard>) {
        let chat_id = self.session.chat_id;
        if let Some(origin) = via {
            let edited = if origin.has_photo {
                self.transport
                    .edit_caption(chat_id, origin.id, text, keyboard)
                    .await
            } else {
                self.transport
                    .edit_text(chat_id, origin.id, text, keyboard)
                    .await
            };
            match edited {
                Ok(()) => return,
                Err(error) => {
                    tracing::warn!(chat_id = %chat_id, %error, "Edit failed, sending a fresh message");
                }
            }
        }
        self.send_fresh(text, keyboard).await;
    }

    async fn send_fresh(&self, text: &str, keyboard: Option<&Keyboard>) {
        if let Err(error) = self
            .transport
            .send_text(self.session.chat_id, text, keyboard)
            .await
        {
            tracing::error!(chat_id = %self.session.chat_id, %error, "Failed to deliver message");
        }
    }
}
