mod support;

use taskstash::book::{MoveKind, PendingMove};
use taskstash::storage::KeyValueStore;
use taskstash::task::encode_tasks;
use taskstash::{Task, TaskInput};

use support::TestStash;

fn pending_json(kind: MoveKind, task: &Task) -> String {
    serde_json::to_string(&PendingMove {
        kind,
        task: task.clone(),
    })
    .unwrap()
}

#[test]
fn crash_before_any_collection_write_is_replayed_on_open() {
    let stash = TestStash::new();
    let task = stash.book().tasks().create(TaskInput::new("half done")).unwrap();

    // Only the intent made it to disk.
    stash
        .storage()
        .set("@logs_pending", &pending_json(MoveKind::Complete, &task))
        .unwrap();

    let book = stash.book();
    assert!(book.tasks().list_active().unwrap().is_empty());
    assert_eq!(book.done().list_completed().unwrap(), vec![task]);
    assert_eq!(stash.read_file("logs_pending.json").as_deref(), Some("null"));
}

#[test]
fn crash_between_destination_and_source_does_not_duplicate() {
    let stash = TestStash::new();
    let book = stash.book();
    let other = book.tasks().create(TaskInput::new("other")).unwrap();
    let task = book.tasks().create(TaskInput::new("moving")).unwrap();
    book.tasks().mark_done(&task.id).unwrap();
    drop(book);

    // Destination (active) already has the task prepended, source still has it too.
    let storage = stash.storage();
    storage
        .set("@logs_task", &encode_tasks(&[task.clone(), other.clone()]).unwrap())
        .unwrap();
    storage
        .set("@logs_pending", &pending_json(MoveKind::Restore, &task))
        .unwrap();

    let book = stash.book();
    assert_eq!(book.tasks().list_active().unwrap(), vec![task, other]);
    assert!(book.done().list_completed().unwrap().is_empty());
}

#[test]
fn explicit_recover_reports_the_replayed_move() {
    let stash = TestStash::new();
    let book = stash.book();
    let task = book.tasks().create(TaskInput::new("x")).unwrap();

    stash
        .storage()
        .set("@logs_pending", &pending_json(MoveKind::Complete, &task))
        .unwrap();

    let replayed = book.recover().unwrap().expect("pending move");
    assert_eq!(replayed.kind, MoveKind::Complete);
    assert_eq!(replayed.task.id, task.id);
    assert_eq!(book.recover().unwrap(), None);
}

#[test]
fn garbage_pending_record_is_ignored() {
    let stash = TestStash::new();
    stash.write_file("logs_pending.json", "garbage").unwrap();

    let book = stash.book();
    book.tasks().create(TaskInput::new("still works")).unwrap();
    assert_eq!(book.tasks().list_active().unwrap().len(), 1);
}
