use folio_babel::EditorMode;
use folio_editor::{
    AutoSaveSettings, DocumentStore, EditorState, MemoryStore, SaveCoordinator, SaveOutcome,
    SaveStatus, SaveTrigger, SwitcherSettings,
};
use std::time::{Duration, Instant};

fn editor() -> EditorState {
    EditorState::new(EditorMode::Markdown, &SwitcherSettings::default())
}

#[test]
fn auto_and_manual_save_racing_write_once() {
    let start = Instant::now();
    let mut store = MemoryStore::new();
    let mut state = editor();
    let mut saves = SaveCoordinator::new("review-1", AutoSaveSettings::default());

    state.edit_markdown("## Verdict\n\nBuy it.").unwrap();
    saves.note_edit(start);

    // Auto-save becomes due and starts, then the author hits save.
    assert!(saves.tick(start, &mut state, &mut store).unwrap().is_none());
    let job = saves
        .begin(&mut state, SaveTrigger::Auto)
        .unwrap()
        .expect("first save runs");
    assert!(state.is_saving());
    assert!(saves.begin(&mut state, SaveTrigger::Manual).unwrap().is_none());

    let result = store.save(saves.document_id(), job.document());
    assert_eq!(
        saves.finish(&mut state, job, result),
        Ok(SaveOutcome::Written { revision: 1 })
    );
    assert_eq!(saves.save_now(&mut state, &mut store), Ok(SaveOutcome::Skipped));
    assert_eq!(
        saves.tick(start + Duration::from_secs(10), &mut state, &mut store),
        Ok(None)
    );
    assert_eq!(store.revisions("review-1"), 1);
}

#[test]
fn switching_mode_mid_save_does_not_cancel_it() {
    let mut store = MemoryStore::new();
    let mut state = editor();
    let mut saves = SaveCoordinator::new("review-2", AutoSaveSettings::default());
    state.edit_markdown("Hello.").unwrap();

    let job = saves.begin(&mut state, SaveTrigger::Manual).unwrap().unwrap();
    state.switch_to(EditorMode::Traditional).unwrap();
    assert!(state.is_saving());

    let result = store.save(saves.document_id(), job.document());
    saves.finish(&mut state, job, result).unwrap();
    assert_eq!(saves.status(), &SaveStatus::Saved { revision: 1 });

    // The mode change is a new snapshot.
    assert_eq!(
        saves.save_now(&mut state, &mut store),
        Ok(SaveOutcome::Written { revision: 2 })
    );
}

#[test]
fn saved_document_reopens_in_its_mode() {
    let mut store = MemoryStore::new();
    let mut state = editor();
    state.edit_markdown("# Nimbus\n\n## Camera\n\nSharp.").unwrap();
    state.switch_to(EditorMode::Sectioned).unwrap();

    let mut saves = SaveCoordinator::new("review-3", AutoSaveSettings::default());
    saves.save_now(&mut state, &mut store).unwrap();

    let stored = store.load("review-3").unwrap();
    assert_eq!(stored.revision, 1);
    let reopened = stored.document.restore(&SwitcherSettings::default()).unwrap();
    assert_eq!(reopened.mode(), EditorMode::Sectioned);
    assert_eq!(reopened.draft(), state.draft());
    assert!(reopened.content().metadata.created_at.is_some());
}

#[test]
fn publish_behind_running_auto_save_is_written_by_tick() {
    let start = Instant::now();
    let mut store = MemoryStore::new();
    let mut state = editor();
    let mut saves = SaveCoordinator::new("review-4", AutoSaveSettings::default());

    state.edit_markdown("Draft one.").unwrap();
    let job = saves.begin(&mut state, SaveTrigger::Auto).unwrap().unwrap();
    state.edit_markdown("Final text.").unwrap();
    assert_eq!(saves.save_now(&mut state, &mut store), Ok(SaveOutcome::Queued));

    let result = store.save(saves.document_id(), job.document());
    saves.finish(&mut state, job, result).unwrap();
    assert_eq!(
        saves.tick(start, &mut state, &mut store),
        Ok(Some(SaveOutcome::Written { revision: 2 }))
    );
    assert_eq!(store.revisions("review-4"), 2);
    assert_eq!(store.load("review-4").unwrap().document.content, "Final text.");
    assert_eq!(saves.status(), &SaveStatus::Saved { revision: 2 });
}
