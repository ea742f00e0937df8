mod support;

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use taskstash::error::{CategoryError, Error};
use taskstash::sort;
use taskstash::storage::KeyValueStore;
use taskstash::task::{Moment, NO_CATEGORY};
use taskstash::{Priority, TaskInput};

use support::TestStash;

#[test]
fn blank_category_is_stored_as_none_selected() {
    let stash = TestStash::new();
    let book = stash.book();

    let created = book
        .tasks()
        .create(
            TaskInput::new("Buy milk")
                .category("")
                .priority(Priority::Medium),
        )
        .unwrap();
    assert_eq!(created.category, NO_CATEGORY);

    let active = book.tasks().list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0], created);
    assert_eq!(active[0].category, NO_CATEGORY);
}

#[test]
fn mark_done_moves_task_exactly_once() {
    let stash = TestStash::new();
    let book = stash.book();
    let keep = book.tasks().create(TaskInput::new("keep")).unwrap();
    let finish = book.tasks().create(TaskInput::new("finish")).unwrap();

    book.tasks().mark_done(&finish.id).unwrap();

    let active = book.tasks().list_active().unwrap();
    assert_eq!(active, vec![keep]);
    let completed = book.done().list_completed().unwrap();
    assert_eq!(completed.iter().filter(|t| t.id == finish.id).count(), 1);

    // Marking again is a no-op.
    assert_eq!(book.tasks().mark_done(&finish.id).unwrap(), None);
    assert_eq!(book.done().list_completed().unwrap().len(), 1);
}

#[test]
fn duplicate_category_is_rejected() {
    let stash = TestStash::new();
    let book = stash.book();

    book.categories().create("Work").unwrap();
    let err = book.categories().create("Work").unwrap_err();
    assert!(matches!(
        err,
        Error::Category(CategoryError::DuplicateName(ref name)) if name == "Work"
    ));
    let names = book.categories().list().unwrap();
    assert_eq!(names.iter().filter(|name| *name == "Work").count(), 1);
}

#[test]
fn reserved_category_cannot_be_deleted() {
    let stash = TestStash::new();
    let book = stash.book();
    book.categories().create("Home").unwrap();
    let before = stash.storage().get("@logs_category").unwrap();

    let err = book.categories().delete(NO_CATEGORY).unwrap_err();
    assert!(matches!(err, Error::Category(CategoryError::ReservedName(_))));
    assert_eq!(stash.storage().get("@logs_category").unwrap(), before);
}

#[test]
fn priority_sort_keeps_identities() {
    let stash = TestStash::new();
    let book = stash.book();
    let low = book
        .tasks()
        .create(TaskInput::new("low").priority(Priority::Low))
        .unwrap();
    let high = book
        .tasks()
        .create(TaskInput::new("high").priority(Priority::High))
        .unwrap();
    let medium = book
        .tasks()
        .create(TaskInput::new("medium").priority(Priority::Medium))
        .unwrap();

    let sorted = book.tasks().sort_by_priority().unwrap();
    let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![high.id.as_str(), medium.id.as_str(), low.id.as_str()]);

    // The order is persisted.
    assert_eq!(stash.book().tasks().list_active().unwrap(), sorted);
}

#[test]
fn deadline_sort_puts_undated_last() {
    let stash = TestStash::new();
    let book = stash.book();
    let undated = book.tasks().create(TaskInput::new("someday")).unwrap();
    let later = book
        .tasks()
        .create(
            TaskInput::new("later")
                .deadline_date(Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();
    let sooner = book
        .tasks()
        .create(
            TaskInput::new("sooner")
                .deadline_date(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();

    let sorted = book.tasks().sort_by_deadline().unwrap();
    let ids: Vec<_> = sorted.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![sooner.id, later.id, undated.id]);
    assert_eq!(sort::by_deadline(sorted.clone()), sorted);
}

#[test]
fn restore_prepends_to_active() {
    let stash = TestStash::new();
    let book = stash.book();
    let first = book.tasks().create(TaskInput::new("first")).unwrap();
    let second = book.tasks().create(TaskInput::new("second")).unwrap();
    book.tasks().mark_done(&second.id).unwrap();

    let restored = book.done().restore(&second.id).unwrap();
    assert_eq!(restored.as_ref(), Some(&second));
    assert_eq!(book.tasks().list_active().unwrap(), vec![second, first]);
    assert!(book.done().list_completed().unwrap().is_empty());
}

#[test]
fn every_task_lives_in_exactly_one_collection() {
    let stash = TestStash::new();
    let book = stash.book();

    let ids: Vec<String> = (0..8)
        .map(|i| book.tasks().create(TaskInput::new(format!("task {i}"))).unwrap().id)
        .collect();
    for id in ids.iter().step_by(2) {
        book.tasks().mark_done(id).unwrap();
    }
    book.done().restore(&ids[2]).unwrap();
    book.tasks().delete(&ids[1]).unwrap();
    book.done().remove(&ids[4]).unwrap();

    let active: HashSet<_> = book
        .tasks()
        .list_active()
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    let completed: HashSet<_> = book
        .done()
        .list_completed()
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();

    assert!(active.is_disjoint(&completed));
    let expected_active: HashSet<_> = [&ids[2], &ids[3], &ids[5], &ids[7]]
        .into_iter()
        .cloned()
        .collect();
    let expected_done: HashSet<_> = [&ids[0], &ids[6]].into_iter().cloned().collect();
    assert_eq!(active, expected_active);
    assert_eq!(completed, expected_done);
}

#[test]
fn deleted_category_stays_on_tasks() {
    let stash = TestStash::new();
    let book = stash.book();
    book.categories().create("Gym").unwrap();
    let task = book
        .tasks()
        .create(TaskInput::new("squats").category("Gym"))
        .unwrap();

    book.categories().delete("Gym").unwrap();
    let stored = book.tasks().get(&task.id).unwrap().unwrap();
    assert_eq!(stored.category, "Gym");
    assert_eq!(stored.category_display(26), "Gym");
}

#[test]
fn legacy_records_load_and_repair_rekeys_collisions() {
    let stash = TestStash::new();
    stash
        .write_file(
            "logs_task.json",
            r#"[{"description":"a","category":"Casa","priority":1,"deadline_date":"Sem Data","deadline_time":"Sem Horário","_id":"1/2/3"},
                {"description":"b","category":"Casa","priority":3,"deadline_date":"2024-01-02T10:00:00.000Z","deadline_time":"Sem Horário","_id":"1/2/3"}]"#,
        )
        .unwrap();
    stash
        .write_file(
            "logs_done.json",
            r#"[{"description":"c","category":"Nenhuma Selecionada","priority":2,"deadline_date":"Sem Data","deadline_time":"Sem Horário","_id":"1/2/3"}]"#,
        )
        .unwrap();

    let book = stash.book();
    let active = book.tasks().list_active().unwrap();
    assert_eq!(active.len(), 2);
    assert!(matches!(active[1].deadline_date, Moment::At(_)));

    let report = book.repair().unwrap();
    assert_eq!(report.rekeyed, 2);
    assert!(report.recovered.is_none());

    let mut ids: Vec<String> = book
        .tasks()
        .list_active()
        .unwrap()
        .into_iter()
        .chain(book.done().list_completed().unwrap())
        .map(|t| t.id)
        .collect();
    assert_eq!(ids[0], "1/2/3");
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    assert_eq!(book.repair().unwrap().rekeyed, 0);
}

#[test]
fn corrupt_files_read_as_empty_and_are_overwritten() {
    let stash = TestStash::new();
    stash.write_file("logs_task.json", "{{{ not json").unwrap();
    stash.write_file("logs_category.json", "[1, 2").unwrap();

    let book = stash.book();
    assert!(book.tasks().list_active().unwrap().is_empty());
    assert!(book.categories().list().unwrap().is_empty());

    book.tasks().create(TaskInput::new("fresh")).unwrap();
    let raw = stash.read_file("logs_task.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(1));
}

#[test]
fn one_bad_record_does_not_cost_the_rest() {
    let stash = TestStash::new();
    stash
        .write_file(
            "logs_task.json",
            r#"[{"description":"keep","_id":"a"},{"description":"bad","priority":"x","_id":"b"}]"#,
        )
        .unwrap();

    let book = stash.book();
    let active = book.tasks().list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].description, "keep");

    book.tasks().create(TaskInput::new("fresh")).unwrap();
    let descriptions: Vec<_> = book
        .tasks()
        .list_active()
        .unwrap()
        .into_iter()
        .map(|task| task.description)
        .collect();
    assert!(descriptions.contains(&"keep".to_string()));
    assert!(descriptions.contains(&"fresh".to_string()));
}
