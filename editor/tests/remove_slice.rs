//! End-to-end runs of the editor commands against a shared document.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use sliceworks_core::access::DocumentObserver;
use sliceworks_doc::{Document, ObjectId, Rect, Slice, SliceCommand, SliceKey};
use sliceworks_editor::{
    EditContext, EditError, EditorCommand, EditorConfig, Params, RedoCommand,
    RemoveSliceCommand, SharedSprite, StatusBuffer, UndoCommand, command, share,
};

fn key(x: i32) -> SliceKey {
    SliceKey::new(Rect::new(x, 0, 8, 8))
}

struct Fixture {
    shared: SharedSprite,
    ctx: EditContext,
    status: Arc<StatusBuffer>,
    icon: ObjectId,
}

/// A 4-frame sprite with an 'Icon' slice keyed at `icon_frames` and a
/// 'Button' slice keyed at frame 0.
fn fixture(icon_frames: &[u32], frame: u32) -> Fixture {
    let config = EditorConfig::default();
    let mut document = Document::new("sprite", 4);
    let layer = document.add_layer("Layer 1");
    let mut icon = Slice::new("Icon");
    for &f in icon_frames {
        icon.set_key(f, key(f as i32));
    }
    let icon = document.push_slice(icon).unwrap();
    document
        .push_slice(Slice::new("Button").with_key(0, key(9)))
        .unwrap();

    let shared = share(document, &config);
    let status = Arc::new(StatusBuffer::default());
    let ctx = EditContext::new(config)
        .with_document(shared.clone())
        .with_frame(frame)
        .with_active_layer(layer)
        .with_status(status.clone());
    Fixture {
        shared,
        ctx,
        status,
        icon,
    }
}

fn snapshot(shared: &SharedSprite) -> Document {
    shared.read().unwrap().clone()
}

fn remove(ctx: &EditContext, params: &Params) -> Result<(), EditError> {
    command::run(&mut RemoveSliceCommand::new(), ctx, params)
}

fn by_name(name: &str) -> Params {
    Params::new().with("name", name)
}

#[test]
fn clears_only_the_current_frame_key() {
    let f = fixture(&[0, 1, 2], 1);
    let before = snapshot(&f.shared);

    remove(&f.ctx, &by_name("Icon")).unwrap();

    let after = snapshot(&f.shared);
    let icon = after.slices().get_by_id(f.icon).unwrap();
    assert_eq!(icon.keys().frames().collect::<Vec<_>>(), vec![0, 2]);

    let reader = f.shared.read().unwrap();
    assert_eq!(reader.history().undo_count(), 1);
    assert_eq!(reader.history().undo_descriptions().next(), Some("Remove Slice"));
    drop(reader);

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    let undone = snapshot(&f.shared);
    assert_eq!(undone, before);
    assert_eq!(undone.slices().get_by_id(f.icon).unwrap().get_key(1), Some(&key(1)));
}

#[test]
fn removes_a_single_key_slice_and_undo_restores_it() {
    let f = fixture(&[0], 0);
    let before = snapshot(&f.shared);

    remove(&f.ctx, &by_name("Icon")).unwrap();
    let after = snapshot(&f.shared);
    assert!(after.slices().get_by_name("Icon").is_none());
    assert_eq!(after.slices().len(), 1);

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    assert_eq!(snapshot(&f.shared), before);

    command::run(&mut RedoCommand, &f.ctx, &Params::new()).unwrap();
    assert_eq!(snapshot(&f.shared), after);
}

#[test]
fn selects_by_id() {
    let f = fixture(&[0], 0);
    let params = Params::new().with("id", f.icon.to_string());
    remove(&f.ctx, &params).unwrap();
    assert!(!snapshot(&f.shared).slices().contains(f.icon));
}

#[test]
fn name_wins_over_id() {
    let f = fixture(&[0], 0);
    let params = Params::new()
        .with("name", "Button")
        .with("id", f.icon.to_string());
    remove(&f.ctx, &params).unwrap();

    let doc = snapshot(&f.shared);
    assert!(doc.slices().contains(f.icon));
    assert!(doc.slices().get_by_name("Button").is_none());
}

#[test]
fn write_timeout_leaves_document_untouched() {
    let f = fixture(&[0, 1, 2], 1);
    let before = snapshot(&f.shared);

    let (acquired_tx, acquired_rx) = mpsc::channel();
    let reader_doc = f.shared.clone();
    let reader = thread::spawn(move || {
        let guard = reader_doc.read().unwrap();
        acquired_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(600));
        drop(guard);
    });
    acquired_rx.recv().unwrap();

    // The reader arrived after the enabled check, so execute directly.
    let mut command = RemoveSliceCommand::new();
    command.load_params(&by_name("Icon"));
    let err = command.execute(&f.ctx).unwrap_err();
    assert!(matches!(err, EditError::LockTimeout { waited } if waited >= Duration::from_millis(500)));

    reader.join().unwrap();
    assert_eq!(snapshot(&f.shared), before);
    assert!(!f.shared.read().unwrap().history().can_undo());
    assert!(f.status.tips().is_empty());
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let f = fixture(&[0, 1, 2, 3], 0);

    let mut ctx = f.ctx;
    remove(&ctx, &by_name("Icon")).unwrap();
    ctx.set_frame(1);
    remove(&ctx, &by_name("Icon")).unwrap();

    command::run(&mut UndoCommand, &ctx, &Params::new()).unwrap();
    assert!(f.shared.read().unwrap().history().can_redo());

    ctx.set_frame(2);
    remove(&ctx, &by_name("Icon")).unwrap();

    let reader = f.shared.read().unwrap();
    assert!(!reader.history().can_redo());
    assert_eq!(reader.history().undo_count(), 2);
    let icon = reader.slices().get_by_id(f.icon).unwrap();
    assert_eq!(icon.keys().frames().collect::<Vec<_>>(), vec![1, 3]);
    drop(reader);

    let err = command::run(&mut RedoCommand, &ctx, &Params::new()).unwrap_err();
    assert_eq!(err, EditError::Disabled("Redo"));
}

#[test]
fn unknown_slice_is_a_no_op() {
    let f = fixture(&[0, 1], 0);
    let before = snapshot(&f.shared);

    let err = remove(&f.ctx, &by_name("Missing")).unwrap_err();
    assert_eq!(err, EditError::NotFound("name 'Missing'".into()));

    let err = remove(&f.ctx, &Params::new().with("id", "not-a-number")).unwrap_err();
    assert_eq!(err, EditError::NotFound("no selector".into()));

    assert_eq!(snapshot(&f.shared), before);
    assert!(!f.shared.read().unwrap().history().can_undo());
    assert!(f.status.tips().is_empty());
}

#[test]
fn unkeyed_current_frame_is_left_alone() {
    let f = fixture(&[0, 2], 1);
    let before = snapshot(&f.shared);

    let err = remove(&f.ctx, &by_name("Icon")).unwrap_err();
    assert_eq!(
        err,
        EditError::NotFound("a key at frame 1 for name 'Icon'".into())
    );

    assert_eq!(snapshot(&f.shared), before);
    assert_eq!(f.shared.read().unwrap().history().undo_count(), 0);
    assert!(f.status.tips().is_empty());
    assert_eq!(f.status.invalidations(), 0);
}

/// Commits `command` as a separate edit, the way another editor would.
fn commit_other_edit(shared: &SharedSprite, command: SliceCommand) {
    let mut writer = shared.write_for(Duration::from_millis(50)).unwrap();
    let mut tx = writer.transaction("Other Edit");
    tx.execute(command).unwrap();
    tx.commit().unwrap();
}

#[test]
fn slice_removed_between_read_and_write_rolls_back() {
    let f = fixture(&[0, 1], 1);
    let icon = f.icon;
    let mut command = RemoveSliceCommand::new().with_before_write(move |shared| {
        commit_other_edit(shared, SliceCommand::remove_slice(icon));
    });

    let err = command::run(&mut command, &f.ctx, &by_name("Icon")).unwrap_err();
    assert!(matches!(err, EditError::StaleReference(_)));

    let reader = f.shared.read().unwrap();
    assert!(!reader.slices().contains(icon));
    assert_eq!(reader.history().undo_count(), 1);
    assert_eq!(reader.history().undo_descriptions().next(), Some("Other Edit"));
    drop(reader);
    assert!(f.status.tips().is_empty());
    assert!(!f.shared.is_locked());
}

#[test]
fn key_removed_between_read_and_write_detaches_slice() {
    let f = fixture(&[0, 1], 1);
    let before = snapshot(&f.shared);
    let icon = f.icon;
    let mut command = RemoveSliceCommand::new().with_before_write(move |shared| {
        commit_other_edit(shared, SliceCommand::clear_slice_key(icon, 0));
    });

    // Clearing frame 1 now empties the slice, so the slice goes with it.
    command::run(&mut command, &f.ctx, &by_name("Icon")).unwrap();
    let after = snapshot(&f.shared);
    assert!(!after.slices().contains(icon));
    for slice in after.slices().iter() {
        assert!(slice.key_count() > 0);
    }
    assert_eq!(f.status.last_tip().unwrap().text, "Slice 'Icon' removed");

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    let undone = snapshot(&f.shared);
    let slice = undone.slices().get_by_id(icon).unwrap();
    assert_eq!(slice.keys().frames().collect::<Vec<_>>(), vec![1]);

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    assert_eq!(snapshot(&f.shared), before);
}

#[test]
fn disabled_without_layer_or_while_locked() {
    let f = fixture(&[0], 0);
    let mut ctx = f.ctx;

    let guard = f.shared.read().unwrap();
    assert_eq!(
        remove(&ctx, &by_name("Icon")).unwrap_err(),
        EditError::Disabled("RemoveSlice")
    );
    drop(guard);

    ctx.set_active_layer(None);
    assert!(!RemoveSliceCommand::new().is_enabled(&ctx));

    ctx.set_active_layer(Some(ObjectId::next()));
    assert!(!RemoveSliceCommand::new().is_enabled(&ctx));
}

#[test]
fn closed_document_is_disabled() {
    let f = fixture(&[0], 0);
    f.shared.close();
    assert_eq!(
        remove(&f.ctx, &by_name("Icon")).unwrap_err(),
        EditError::Disabled("RemoveSlice")
    );

    let mut command = RemoveSliceCommand::new();
    command.load_params(&by_name("Icon"));
    assert_eq!(command.execute(&f.ctx).unwrap_err(), EditError::DocumentClosed);
}

#[test]
fn status_tips_and_invalidation() {
    let f = fixture(&[0, 1], 1);
    remove(&f.ctx, &by_name("Icon")).unwrap();

    let tip = f.status.last_tip().unwrap();
    assert_eq!(tip.text, "Slice 'Icon' removed");
    assert_eq!(tip.duration, Duration::from_millis(1000));
    assert_eq!(f.status.invalidations(), 1);

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    assert_eq!(f.status.last_tip().unwrap().text, "Undid Remove Slice");
}

#[test]
fn unnamed_slice_tip() {
    let f = fixture(&[0], 0);
    let unnamed = {
        let mut writer = f.shared.write_for(Duration::from_millis(50)).unwrap();
        writer
            .target_mut()
            .push_slice(Slice::new("").with_key(0, key(3)))
            .unwrap()
    };

    let params = Params::new().with("id", unnamed.to_string());
    remove(&f.ctx, &params).unwrap();
    assert_eq!(f.status.last_tip().unwrap().text, "Slice removed");
}

#[test]
fn tips_can_be_turned_off() {
    let mut config = EditorConfig::default();
    config.status.show_tips = false;

    let mut document = Document::new("sprite", 1);
    let layer = document.add_layer("Layer 1");
    document
        .push_slice(Slice::new("Icon").with_key(0, key(0)))
        .unwrap();
    let shared = share(document, &config);
    let status = Arc::new(StatusBuffer::default());
    let ctx = EditContext::new(config)
        .with_document(shared)
        .with_active_layer(layer)
        .with_status(status.clone());

    remove(&ctx, &by_name("Icon")).unwrap();
    assert!(status.tips().is_empty());
    assert_eq!(status.invalidations(), 1);
}

struct CountingObserver(AtomicUsize);

impl DocumentObserver for CountingObserver {
    fn on_general_update(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn observers_hear_committed_edits_only() {
    let f = fixture(&[0, 1], 0);
    let observer = Arc::new(CountingObserver(AtomicUsize::new(0)));
    f.shared.add_observer(observer.clone());

    remove(&f.ctx, &by_name("Missing")).unwrap_err();
    assert_eq!(observer.0.load(Ordering::SeqCst), 0);

    remove(&f.ctx, &by_name("Icon")).unwrap();
    assert_eq!(observer.0.load(Ordering::SeqCst), 1);

    command::run(&mut UndoCommand, &f.ctx, &Params::new()).unwrap();
    assert_eq!(observer.0.load(Ordering::SeqCst), 2);
}

#[test]
fn history_is_bounded_by_config() {
    let mut config = EditorConfig::default();
    config.editing.max_undo = 2;

    let mut document = Document::new("sprite", 4);
    let layer = document.add_layer("Layer 1");
    let mut icon = Slice::new("Icon");
    for f in 0..4 {
        icon.set_key(f, key(f as i32));
    }
    document.push_slice(icon).unwrap();
    let shared = share(document, &config);
    let mut ctx = EditContext::new(config)
        .with_document(shared.clone())
        .with_active_layer(layer);

    for frame in 0..3 {
        ctx.set_frame(frame);
        remove(&ctx, &by_name("Icon")).unwrap();
    }
    assert_eq!(shared.read().unwrap().history().undo_count(), 2);
}
