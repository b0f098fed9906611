use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notesync_core::clock::ManualClock;
use notesync_core::gateway::{LocalNotesGateway, NotesGateway, Subscription};
use notesync_core::models::NoteDraft;
use notesync_core::sync::NoteList;
use notesync_core::translate::Translator;
use notesync_core::{
    AuthUser, EngineConfig, Error, LanguageCode, Note, NoteId, NotesSession, OperationStatus,
    Result, SessionContext, SyncState, UserId,
};
use pretty_assertions::assert_eq;

const NOW: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum GatewayCall {
    Add(Note),
    Replace(NoteId, Note),
    Delete(NoteId),
}

/// Local gateway that records every write and can be told to fail them.
#[derive(Default)]
struct RecordingGateway {
    inner: LocalNotesGateway,
    calls: Mutex<Vec<GatewayCall>>,
    write_failure: Mutex<Option<String>>,
}

impl RecordingGateway {
    fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn fail_writes_with(&self, reason: &str) {
        *self.write_failure.lock().unwrap() = Some(reason.to_string());
    }

    fn record(&self, call: GatewayCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.write_failure.lock().unwrap().clone() {
            Some(reason) => Err(Error::Gateway(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotesGateway for RecordingGateway {
    fn subscribe(&self, user: &UserId) -> Result<Subscription> {
        self.inner.subscribe(user)
    }

    async fn add(&self, user: &UserId, note: Note) -> Result<NoteId> {
        self.record(GatewayCall::Add(note.clone()))?;
        self.inner.add(user, note).await
    }

    async fn replace(&self, user: &UserId, id: &NoteId, note: Note) -> Result<()> {
        self.record(GatewayCall::Replace(id.clone(), note.clone()))?;
        self.inner.replace(user, id, note).await
    }

    async fn delete(&self, user: &UserId, id: &NoteId) -> Result<()> {
        self.record(GatewayCall::Delete(id.clone()))?;
        self.inner.delete(user, id).await
    }
}

struct FixedTranslator(Option<String>);

#[async_trait]
impl Translator for FixedTranslator {
    async fn translate(&self, _text: &str, _target: LanguageCode) -> Option<String> {
        self.0.clone()
    }
}

struct Fixture {
    gateway: Arc<RecordingGateway>,
    clock: Arc<ManualClock>,
    session: NotesSession,
}

fn user() -> UserId {
    "alice".parse().unwrap()
}

fn signed_in() -> SessionContext {
    SessionContext::signed_in(AuthUser::new(
        user(),
        Some("alice@example.com".to_string()),
    ))
}

fn fixture(context: SessionContext, translation: Option<&str>) -> Fixture {
    let gateway = Arc::new(RecordingGateway::default());
    let clock = Arc::new(ManualClock::new(NOW));
    let session = NotesSession::builder(gateway.clone(), context)
        .clock(clock.clone())
        .translator(Arc::new(FixedTranslator(translation.map(str::to_string))))
        .config(EngineConfig::default())
        .build();
    Fixture {
        gateway,
        clock,
        session,
    }
}

async fn started(translation: Option<&str>) -> Fixture {
    let fixture = fixture(signed_in(), translation);
    fixture.session.start_listening().unwrap();
    assert_eq!(fixture.session.wait_until_loaded().await, SyncState::Synced);
    fixture
}

async fn wait_for_notes(session: &NotesSession, predicate: impl FnMut(&NoteList) -> bool) -> NoteList {
    let mut receiver = session.subscribe_notes();
    let notes = tokio::time::timeout(Duration::from_secs(5), receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("notes channel closed")
        .clone();
    notes
}

async fn seed(gateway: &RecordingGateway, title: &str, timestamp: i64, pinned: bool) {
    let note = NoteDraft::new(title, "")
        .with_pinned(pinned)
        .into_note(timestamp, "Untitled");
    gateway.inner.add(&user(), note).await.unwrap();
}

fn titles(notes: &[Note]) -> Vec<String> {
    notes.iter().map(|note| note.title.clone()).collect()
}

fn without_ids(notes: &[Note]) -> Vec<Note> {
    notes
        .iter()
        .map(|note| Note {
            id: None,
            ..note.clone()
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn new_note_is_added_and_status_returns_to_idle() {
    let fixture = started(None).await;

    let draft = NoteDraft::new("Groceries", "Milk, eggs")
        .with_color(0xFFFF_F59D)
        .with_language(LanguageCode::En);
    let id = fixture.session.create_or_update(draft).await.unwrap();

    let calls = fixture.gateway.calls();
    assert_eq!(calls.len(), 1);
    let GatewayCall::Add(written) = &calls[0] else {
        panic!("expected add, got {:?}", calls[0]);
    };
    assert_eq!(written.id, None);
    assert_eq!(written.title, "Groceries");
    assert_eq!(written.content, "Milk, eggs");
    assert_eq!(written.color, 0xFFFF_F59D);
    assert!(!written.pinned);
    assert_eq!(written.timestamp, NOW);
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Success("Saved".to_string())
    );

    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;
    assert_eq!(notes[0].id.as_ref(), Some(&id));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(fixture.session.status(), OperationStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn blank_note_is_rejected_without_gateway_calls() {
    let fixture = started(None).await;

    let error = fixture
        .session
        .create_or_update(NoteDraft::new("", "  "))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Validation(_)));
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("Note cannot be empty".to_string())
    );
    assert!(fixture.gateway.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blank_title_is_saved_as_untitled() {
    let fixture = started(None).await;

    fixture
        .session
        .create_or_update(NoteDraft::new(" ", "just content"))
        .await
        .unwrap();

    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;
    assert_eq!(notes[0].title, "Untitled");
}

#[tokio::test(start_paused = true)]
async fn draft_with_id_replaces_existing_note() {
    let fixture = started(None).await;
    let id = fixture
        .session
        .create_or_update(NoteDraft::new("Draft", "v1"))
        .await
        .unwrap();
    wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    fixture.clock.advance(1_000);
    fixture
        .session
        .create_or_update(NoteDraft::new("Draft", "v2").with_id(id.to_string()))
        .await
        .unwrap();

    assert!(matches!(
        fixture.gateway.calls().last(),
        Some(GatewayCall::Replace(replaced, _)) if *replaced == id
    ));
    let notes = wait_for_notes(&fixture.session, |notes| {
        notes.first().is_some_and(|note| note.content == "v2")
    })
    .await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].timestamp, NOW + 1_000);
}

#[tokio::test(start_paused = true)]
async fn pin_toggle_moves_note_to_the_top() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "A", 100, false).await;
    seed(&fixture.gateway, "B", 200, false).await;

    let before = wait_for_notes(&fixture.session, |notes| notes.len() == 2).await;
    assert_eq!(titles(&before), vec!["B", "A"]);

    let note_a = before[1].clone();
    fixture.session.toggle_pin(&note_a).await.unwrap();

    let after = wait_for_notes(&fixture.session, |notes| {
        notes.first().is_some_and(|note| note.pinned)
    })
    .await;
    assert_eq!(titles(&after), vec!["A", "B"]);
    assert_eq!(after[0].id, note_a.id);
    assert_eq!(after[0].timestamp, NOW);
    assert_eq!(after[0].content, note_a.content);
}

#[tokio::test(start_paused = true)]
async fn delete_with_blank_id_fails_fast() {
    let fixture = started(None).await;

    let error = fixture.session.delete("   ").await.unwrap_err();

    assert!(matches!(error, Error::Validation(_)));
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("Note ID cannot be empty".to_string())
    );
    assert!(fixture.gateway.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn gateway_failure_surfaces_reason_and_keeps_list() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Existing", 10, false).await;
    wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    fixture.gateway.fail_writes_with("PERMISSION_DENIED");
    let error = fixture
        .session
        .create_or_update(NoteDraft::new("New", "note"))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Gateway(_)));
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("PERMISSION_DENIED".to_string())
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(fixture.session.status().is_error());
    assert_eq!(titles(&fixture.session.notes()), vec!["Existing"]);
}

#[tokio::test(start_paused = true)]
async fn delete_then_undo_restores_previous_list() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Keep", 50, false).await;
    fixture
        .session
        .create_or_update(
            NoteDraft::new("Trip", "Pack bags")
                .with_color(0xFFC8_E6C9)
                .with_language(LanguageCode::De)
                .with_pinned(true),
        )
        .await
        .unwrap();
    let before = wait_for_notes(&fixture.session, |notes| notes.len() == 2).await;
    let deleted = before[0].clone();
    assert_eq!(deleted.title, "Trip");

    let pending = fixture.session.delete_with_undo(&deleted).await.unwrap();
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Success("Deleted".to_string())
    );
    wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    fixture.clock.advance(500);
    let restored_id = fixture.session.undo(pending).await.unwrap();
    let after = wait_for_notes(&fixture.session, |notes| notes.len() == 2).await;

    assert_eq!(without_ids(&after), without_ids(&before));
    assert_ne!(Some(restored_id), deleted.id);
}

#[tokio::test(start_paused = true)]
async fn undo_after_window_is_rejected() {
    let fixture = started(None).await;
    fixture
        .session
        .create_or_update(NoteDraft::new("Gone", "soon"))
        .await
        .unwrap();
    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    let pending = fixture.session.delete_with_undo(&notes[0]).await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(pending.is_expired());

    let error = fixture.session.undo(pending).await.unwrap_err();
    assert!(matches!(error, Error::UndoExpired));
    let adds = fixture
        .gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayCall::Add(_)))
        .count();
    assert_eq!(adds, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_translation_performs_no_write() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Hello", 10, false).await;
    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    let error = fixture
        .session
        .translate(&notes[0], LanguageCode::Fr)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::TranslationFailed));
    assert!(fixture
        .gateway
        .calls()
        .iter()
        .all(|call| !matches!(call, GatewayCall::Replace(..))));
    assert_eq!(fixture.session.status(), OperationStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn blank_translation_counts_as_failure() {
    let fixture = started(Some("   ")).await;
    seed(&fixture.gateway, "Hello", 10, false).await;
    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    let result = fixture.session.translate(&notes[0], LanguageCode::Ja).await;
    assert!(matches!(result, Err(Error::TranslationFailed)));
    assert!(fixture.gateway.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn successful_translation_replaces_content_and_language() {
    let fixture = started(Some("Hola mundo")).await;
    let id = fixture
        .session
        .create_or_update(NoteDraft::new("Greeting", "Hello world"))
        .await
        .unwrap();
    let notes = wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    fixture.clock.advance(10);
    fixture
        .session
        .translate(&notes[0], LanguageCode::Es)
        .await
        .unwrap();

    let translated = wait_for_notes(&fixture.session, |notes| {
        notes
            .first()
            .is_some_and(|note| note.language_code == LanguageCode::Es)
    })
    .await;
    assert_eq!(translated[0].id.as_ref(), Some(&id));
    assert_eq!(translated[0].content, "Hola mundo");
    assert_eq!(translated[0].title, "Greeting");
    assert_eq!(translated[0].timestamp, NOW + 10);
    assert_eq!(fixture.session.status(), OperationStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn subscription_error_keeps_stale_notes() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Cached", 10, false).await;
    wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    fixture
        .gateway
        .inner
        .broadcast_error(&user(), "network unavailable");
    let mut status = fixture.session.subscribe_status();
    tokio::time::timeout(Duration::from_secs(5), status.wait_for(OperationStatus::is_error))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("network unavailable".to_string())
    );
    assert_eq!(fixture.session.sync_state(), SyncState::Error);
    assert_eq!(titles(&fixture.session.notes()), vec!["Cached"]);
}

#[tokio::test(start_paused = true)]
async fn stopped_engine_ignores_later_snapshots() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Before", 10, false).await;
    wait_for_notes(&fixture.session, |notes| notes.len() == 1).await;

    fixture.session.stop_listening();
    fixture.session.stop_listening();
    seed(&fixture.gateway, "After", 20, false).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(fixture.session.sync_state(), SyncState::Offline);
    assert_eq!(titles(&fixture.session.notes()), vec!["Before"]);
    assert_eq!(fixture.gateway.inner.listener_count(&user()), 0);
}

#[tokio::test(start_paused = true)]
async fn signed_out_session_cannot_write() {
    let fixture = fixture(SessionContext::signed_out(), None);

    assert!(matches!(
        fixture.session.start_listening(),
        Err(Error::Unauthenticated)
    ));
    let error = fixture
        .session
        .create_or_update(NoteDraft::new("Hi", "there"))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Unauthenticated));
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("User must be logged in".to_string())
    );
    assert!(fixture.gateway.calls().is_empty());
    assert_eq!(fixture.session.user_email(), "");
}

#[tokio::test(start_paused = true)]
async fn signed_out_translate_reports_error_status() {
    let fixture = fixture(SessionContext::signed_out(), Some("Bonjour"));
    let note = NoteDraft::new("Hello", "Hello")
        .into_note(10, "Untitled")
        .with_id("n1".parse().unwrap());
    assert_eq!(fixture.session.status(), OperationStatus::Idle);

    let error = fixture
        .session
        .translate(&note, LanguageCode::Fr)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Unauthenticated));
    assert_eq!(
        fixture.session.status(),
        OperationStatus::Error("User must be logged in".to_string())
    );
    assert!(fixture.gateway.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn filtered_notes_follow_list_and_filters() {
    let fixture = started(None).await;
    seed(&fixture.gateway, "Project plan", 30, true).await;
    seed(&fixture.gateway, "Groceries", 20, false).await;
    seed(&fixture.gateway, "project retro", 10, false).await;
    wait_for_notes(&fixture.session, |notes| notes.len() == 3).await;
    assert_eq!(fixture.session.user_email(), "alice@example.com");

    fixture.session.update_search("PROJECT");
    assert_eq!(
        titles(&fixture.session.filtered_notes()),
        vec!["Project plan", "project retro"]
    );

    fixture.session.set_pinned_only(true);
    assert_eq!(titles(&fixture.session.filtered_notes()), vec!["Project plan"]);
    assert_eq!(
        titles(&fixture.session.subscribe_filtered_notes().borrow()),
        vec!["Project plan"]
    );

    seed(&fixture.gateway, "Project budget", 40, true).await;
    let mut filtered = fixture.session.subscribe_filtered_notes();
    let projected = tokio::time::timeout(
        Duration::from_secs(5),
        filtered.wait_for(|notes| notes.len() == 2),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(titles(&projected), vec!["Project budget", "Project plan"]);
    assert_eq!(fixture.session.search_text(), "PROJECT");
    assert!(fixture.session.pinned_only());
}
