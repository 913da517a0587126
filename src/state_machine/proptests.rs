//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::effect::Effect;
use super::event::{Button, Confirm, Event, LoginFailure, MessageId, MessageRef};
use super::state::*;
use super::transition::{hours_between, transition};
use crate::backend::types::{Role, TaskItem, UserProfile, WorkerDetails, WorkerSummary};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_lang() -> impl Strategy<Value = Lang> {
    prop_oneof![
        Just(Lang::En),
        Just(Lang::Ru),
        Just(Lang::Ky),
        Just(Lang::Kk),
    ]
}

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..200_000).prop_map(|offset| Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap())
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Worker),
        Just(Role::Admin),
        Just(Role::Other("analyst".to_string())),
    ]
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    (1i64..100, arb_role(), proptest::option::of(1i64..50)).prop_map(|(id, role, project)| {
        UserProfile {
            user_id: UserId(id),
            email: format!("user{id}@site.example"),
            role,
            project_id: project.map(ProjectId),
        }
    })
}

fn arb_pending(slot: PhotoSlot) -> impl Strategy<Value = PendingPhoto> {
    "[a-z0-9]{6}".prop_map(move |id| PendingPhoto { slot, id })
}

fn arb_origin() -> impl Strategy<Value = Option<MessageRef>> {
    proptest::option::of((1i64..1000, any::<bool>()).prop_map(|(id, has_photo)| MessageRef {
        id: MessageId(id),
        has_photo,
    }))
}

fn arb_button() -> impl Strategy<Value = Button> {
    prop_oneof![
        arb_lang().prop_map(Button::Lang),
        Just(Button::Login),
        Just(Button::Cancel),
        Just(Button::EnterDailyEntry),
        (1i64..20).prop_map(|id| Button::Task(TaskId(id))),
        Just(Button::StartTask),
        Just(Button::ConfirmCheckin(Confirm::Yes)),
        Just(Button::ConfirmCheckin(Confirm::No)),
        Just(Button::FinishTask),
        Just(Button::ConfirmCheckout(Confirm::Yes)),
        Just(Button::ConfirmCheckout(Confirm::No)),
        Just(Button::Logout),
        Just(Button::AdminViewWorkers),
        (1i64..20).prop_map(|id| Button::Worker(UserId(id))),
        Just(Button::AdminAnalytics),
        Just(Button::AdminBack),
    ]
}

fn arb_tasks() -> impl Strategy<Value = Vec<TaskItem>> {
    proptest::collection::vec(
        (1i64..50, "[a-z]{1,10}").prop_map(|(id, name)| TaskItem {
            id: TaskId(id),
            name,
        }),
        0..4,
    )
}

fn arb_workers() -> impl Strategy<Value = Vec<WorkerSummary>> {
    proptest::collection::vec(
        (1i64..50).prop_map(|id| WorkerSummary {
            id: UserId(id),
            email: format!("w{id}@site.example"),
        }),
        0..4,
    )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z@. ]{0,20}".prop_map(|text| Event::Text { text }),
        "[a-z0-9]{4}".prop_map(|id| Event::Photo {
            handle: BlobHandle(id)
        }),
        (arb_button(), arb_origin(), arb_time()).prop_map(|(press, origin, at)| Event::Button {
            press,
            origin,
            at
        }),
        ("[a-z]{1,8}", any::<bool>()).prop_map(|(name, exists)| Event::EmailChecked {
            email: format!("{name}@site.example"),
            exists,
        }),
        Just(Event::EmailCheckFailed),
        arb_profile().prop_map(|profile| Event::LoginSucceeded { profile }),
        prop_oneof![
            Just(LoginFailure::InvalidCredentials),
            Just(LoginFailure::Transport)
        ]
        .prop_map(|reason| Event::LoginFailed { reason }),
        arb_tasks().prop_map(|tasks| Event::TasksFetched { tasks }),
        Just(Event::TaskFetchFailed),
        (any::<bool>(), arb_origin())
            .prop_map(|(exists, via)| Event::TodayEntryChecked { exists, via }),
        any::<bool>().prop_map(|accepted| Event::EntrySubmitted { accepted }),
        (arb_workers(), arb_origin()).prop_map(|(workers, via)| Event::WorkersFetched {
            workers,
            via
        }),
        (arb_workers(), arb_origin()).prop_map(|(mut workers, via)| {
            let worker = workers.pop().unwrap_or(WorkerSummary {
                id: UserId(1),
                email: "w1@site.example".to_string(),
            });
            Event::WorkerDetailsFetched {
                details: WorkerDetails {
                    worker,
                    entries: vec![],
                },
                via,
            }
        }),
        arb_origin().prop_map(|via| Event::AdminFetchFailed { via }),
        prop_oneof![Just(PhotoSlot::CheckIn), Just(PhotoSlot::CheckOut)]
            .prop_flat_map(arb_pending)
            .prop_map(|pending| Event::PhotoStashed { pending }),
        Just(Event::PhotoStashFailed),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    let photo = PhotoRef {
        slot: PhotoSlot::CheckIn,
        id: "confirmed".to_string(),
    };
    prop_oneof![
        Just(SessionState::LangSelect),
        Just(SessionState::LoginEmail),
        "[a-z]{1,8}".prop_map(|name| SessionState::LoginPassword {
            email: format!("{name}@site.example"),
        }),
        Just(SessionState::MainMenu),
        Just(SessionState::TaskSelect),
        (1i64..20).prop_map(|id| SessionState::WaitStart {
            task_id: TaskId(id)
        }),
        (1i64..20, arb_time()).prop_map(|(id, started_at)| SessionState::WaitCheckinPhoto {
            task_id: TaskId(id),
            started_at,
        }),
        (1i64..20, arb_time(), arb_pending(PhotoSlot::CheckIn)).prop_map(
            |(id, started_at, pending)| SessionState::WaitConfirmCheckin {
                task_id: TaskId(id),
                started_at,
                pending,
            }
        ),
        (1i64..20, arb_time()).prop_map({
            let photo = photo.clone();
            move |(id, started_at)| SessionState::WaitFinish {
                task_id: TaskId(id),
                started_at,
                check_in: photo.clone(),
            }
        }),
        (1i64..20, arb_time(), arb_time()).prop_map({
            let photo = photo.clone();
            move |(id, started_at, finished_at)| SessionState::WaitCheckoutPhoto {
                task_id: TaskId(id),
                started_at,
                finished_at,
                check_in: photo.clone(),
            }
        }),
        (
            1i64..20,
            arb_time(),
            arb_time(),
            arb_pending(PhotoSlot::CheckOut)
        )
            .prop_map(move |(id, started_at, finished_at, pending)| {
                SessionState::WaitConfirmCheckout {
                    task_id: TaskId(id),
                    started_at,
                    finished_at,
                    check_in: photo.clone(),
                    pending,
                }
            }),
        Just(SessionState::ViewWorkers),
        Just(SessionState::WorkerDetails),
        Just(SessionState::Analytics),
    ]
}

fn arb_session() -> impl Strategy<Value = Session> {
    (
        arb_lang(),
        proptest::option::of(arb_profile()),
        arb_state(),
    )
        .prop_map(|(lang, auth, state)| Session {
            chat_id: ChatId(1),
            lang,
            auth,
            state,
        })
}

// ============================================================================
// Invariant checks
// ============================================================================

fn invariants_hold(session: &Session) -> bool {
    // A stashed capture always matches the confirmation it is waiting for.
    match &session.state {
        SessionState::WaitConfirmCheckin { pending, .. }
            if pending.slot != PhotoSlot::CheckIn =>
        {
            return false;
        }
        SessionState::WaitConfirmCheckout { pending, .. }
            if pending.slot != PhotoSlot::CheckOut =>
        {
            return false;
        }
        _ => {}
    }
    // Without a login the session can only sit in the pre-login states.
    if session.auth.is_none()
        && !matches!(
            session.state,
            SessionState::LangSelect | SessionState::LoginEmail | SessionState::LoginPassword { .. }
        )
    {
        return false;
    }
    // Admins never reach the worker flow; non-admins never reach the admin
    // flow.
    if session.is_admin() && session.state.in_worker_flow() {
        return false;
    }
    if !session.is_admin() && session.state.in_admin_flow() {
        return false;
    }
    true
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    // Invariant 1: random event sequences from first contact keep the
    // session inside the legal state/field combinations.
    #[test]
    fn prop_sequences_preserve_invariants(
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut session = Session::new(ChatId(1));
        for event in events {
            if let Ok(result) = transition(&session, event) {
                session = result.session;
                prop_assert!(invariants_hold(&session), "broken invariants: {session:?}");
            }
            // Illegal events are dropped without touching the session.
        }
    }

    // Invariant 2: cancel always lands in a known state and discards any
    // unconfirmed capture.
    #[test]
    fn prop_cancel_lands_in_known_state(session in arb_session(), origin in arb_origin()) {
        if matches!(session.state, SessionState::MainMenu) {
            return Ok(());
        }
        let had_pending = session.state.pending_photo().cloned();
        let result = transition(&session, Event::Button {
            press: Button::Cancel,
            origin,
            at: Utc::now(),
        }).unwrap();

        match &session.auth {
            Some(_) => {
                prop_assert_eq!(&result.session.state, &SessionState::MainMenu);
                prop_assert_eq!(&result.session.auth, &session.auth);
            }
            None => prop_assert_eq!(&result.session, &Session::new(session.chat_id)),
        }
        if let Some(pending) = had_pending {
            prop_assert!(result.effects.contains(&Effect::DiscardPhoto { pending }), "expected DiscardPhoto effect");
        }
    }

    // Invariant 3: typed passwords never survive into the session record.
    #[test]
    fn prop_password_is_never_retained(
        email in "[a-z]{1,8}",
        password in "[a-zA-Z0-9!?]{1,16}",
    ) {
        let session = Session {
            chat_id: ChatId(1),
            lang: Lang::Ru,
            auth: None,
            state: SessionState::LoginPassword { email: format!("{email}@site.example") },
        };
        let result = transition(&session, Event::Text { text: password.clone() }).unwrap();
        let serialized = serde_json::to_string(&result.session).unwrap();
        prop_assert!(!serialized.contains(&password));
    }

    // Invariant 4: rejecting a capture discards exactly that capture and
    // returns to the originating photo state.
    #[test]
    fn prop_confirm_no_returns_to_photo_state(
        session in arb_session().prop_filter(
            "confirmation states only",
            |s| s.state.pending_photo().is_some(),
        )
    ) {
        let pending = session.state.pending_photo().cloned().unwrap();
        let press = match pending.slot {
            PhotoSlot::CheckIn => Button::ConfirmCheckin(Confirm::No),
            PhotoSlot::CheckOut => Button::ConfirmCheckout(Confirm::No),
        };
        let result = transition(&session, Event::Button {
            press,
            origin: None,
            at: Utc::now(),
        }).unwrap();

        prop_assert!(result.session.state.pending_photo().is_none());
        prop_assert!(matches!(
            result.session.state,
            SessionState::WaitCheckinPhoto { .. } | SessionState::WaitCheckoutPhoto { .. }
        ), "expected a wait-photo state");
        prop_assert!(result.effects.contains(&Effect::DiscardPhoto { pending }), "expected DiscardPhoto effect");
    }

    // Invariant 5: hours are rounded to two decimals and non-negative for
    // monotonic clocks.
    #[test]
    fn prop_hours_rounding(start_offset in 0i64..100_000, minutes in 0i64..1440) {
        let started_at = Utc.timestamp_opt(1_700_000_000 + start_offset, 0).unwrap();
        let finished_at = started_at + chrono::Duration::minutes(minutes);
        let hours = hours_between(started_at, finished_at);
        prop_assert!(hours >= 0.0);
        let scaled = hours * 100.0;
        prop_assert!((scaled - scaled.round()).abs() < 1e-9, "not two decimals: {hours}");
    }

    // Invariant 6: non-photo input in a photo state never mutates the
    // session.
    #[test]
    fn prop_text_in_photo_state_is_inert(
        text in "[a-z ]{0,20}",
        task_id in 1i64..20,
        started in arb_time(),
    ) {
        let session = Session {
            chat_id: ChatId(1),
            lang: Lang::Kk,
            auth: None,
            state: SessionState::WaitCheckinPhoto {
                task_id: TaskId(task_id),
                started_at: started,
            },
        };
        let result = transition(&session, Event::Text { text }).unwrap();
        prop_assert_eq!(result.session, session);
    }
}
