use chrono::{NaiveDate, NaiveTime};
use mytodo::models::{Tag, Task, TaskDraft, TaskPatch, TaskStatus};
use mytodo::storage::{FileBackend, MemoryBackend, StateBackend, TASKS_KEY};
use mytodo::store::{Lifecycle, TaskStore};
use mytodo::error::TaskError;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn seed() -> Vec<Task> {
    vec![
        TaskDraft::new("seed one", day()).into_task("s-1".into()).unwrap(),
        TaskDraft::new("seed two", day()).into_task("s-2".into()).unwrap(),
    ]
}

/// Simulates a reload: a fresh store hydrated from whatever was persisted.
fn reload<B: StateBackend>(store: TaskStore<B>) -> TaskStore<B> {
    TaskStore::open(store.into_backend(), Vec::new())
}

#[test]
fn test_reads_seed_until_hydrated() {
    let persisted = serde_json::to_string(&vec![
        TaskDraft::new("saved", day()).into_task("p-1".into()).unwrap(),
    ])
    .unwrap();
    let mut store = TaskStore::new(MemoryBackend::with_entry(TASKS_KEY, persisted), seed());

    assert_eq!(store.lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(store.tasks(), seed().as_slice());

    store.begin_hydration();
    assert_eq!(store.lifecycle(), Lifecycle::Hydrating);
    assert_eq!(store.tasks(), seed().as_slice());

    let loaded = store.load();
    store.finish_hydration(loaded);
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, "p-1");
}

#[test]
fn test_writes_before_hydration_do_not_clobber_saved_data() {
    let persisted = serde_json::to_string(&seed()).unwrap();
    let mut store = TaskStore::new(MemoryBackend::with_entry(TASKS_KEY, persisted.clone()), Vec::new());
    store.begin_hydration();

    assert!(!store.mutate(|_| Vec::new()));
    assert_eq!(store.cycle_status("s-1"), Err(TaskError::NotReady));
    assert_eq!(store.backend().get(TASKS_KEY), Some(persisted.as_str()));

    store.hydrate();
    assert_eq!(store.tasks().len(), 2);
}

#[test]
fn test_corrupt_data_falls_back_to_seed() {
    let store = TaskStore::open(MemoryBackend::with_entry(TASKS_KEY, "{not json"), seed());
    assert!(store.is_ready());
    assert_eq!(store.tasks(), seed().as_slice());
}

#[test]
fn test_missing_optional_fields_decode_as_absent() {
    let raw = r#"[{"id":"1","title":"Standup","date":"2024-06-10","startTime":"09:00","status":"todo"},
                 {"id":"2","title":"Read","date":"2024-06-10","status":"in_progress","color":"red"}]"#;
    let store = TaskStore::open(MemoryBackend::with_entry(TASKS_KEY, raw), seed());
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].start_time, NaiveTime::from_hms_opt(9, 0, 0));
    assert_eq!(tasks[1].start_time, None);
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
}

#[test]
fn test_create_update_delete_survive_reload() {
    let mut store = TaskStore::open(MemoryBackend::new(), seed());

    let id = store.create(TaskDraft::new("  Dentist ", day())).unwrap();
    assert_eq!(store.find(&id).unwrap().title, "Dentist");

    let patch = TaskPatch {
        start_time: Some(NaiveTime::from_hms_opt(15, 0, 0)),
        ..TaskPatch::default()
    };
    store.update(&id, &patch).unwrap();
    assert_eq!(store.find(&id).unwrap().start_time, NaiveTime::from_hms_opt(15, 0, 0));

    let removed = store.delete("s-1").unwrap();
    assert_eq!(removed.title, "seed one");
    assert!(store.find("s-1").is_none());

    let before: Vec<Task> = store.tasks().to_vec();
    let store = reload(store);
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn test_cycle_status_three_times_returns_to_todo() {
    let mut store = TaskStore::open(MemoryBackend::new(), seed());
    assert_eq!(store.cycle_status("s-2").unwrap(), TaskStatus::InProgress);
    assert_eq!(store.cycle_status("s-2").unwrap(), TaskStatus::Done);
    assert_eq!(store.cycle_status("s-2").unwrap(), TaskStatus::Todo);

    let store = reload(store);
    assert_eq!(store.find("s-2").unwrap().status, TaskStatus::Todo);
}

#[test]
fn test_unknown_ids_are_reported() {
    let mut store = TaskStore::open(MemoryBackend::new(), seed());
    assert_eq!(store.delete("nope").unwrap_err(), TaskError::NotFound("nope".into()));
    assert_eq!(
        store.update("nope", &TaskPatch::default()).unwrap_err(),
        TaskError::NotFound("nope".into())
    );
    assert_eq!(store.tasks().len(), 2);
}

#[test]
fn test_empty_title_never_reaches_the_collection() {
    let mut store = TaskStore::open(MemoryBackend::new(), Vec::new());
    assert_eq!(store.create(TaskDraft::new("", day())), Err(TaskError::EmptyTitle));
    assert!(store.tasks().is_empty());
}

#[test]
fn test_file_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = TaskStore::open(FileBackend::new(dir.path()), seed());
    let id = store.create(TaskDraft::new("On disk", day())).unwrap();
    drop(store);

    let store = TaskStore::open(FileBackend::new(dir.path()), Vec::new());
    assert_eq!(store.tasks().len(), 3);
    assert!(store.find(&id).is_some());

    let raw = std::fs::read_to_string(dir.path().join("mytodo.tasks.v1.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json.is_array());
}

#[test]
fn test_custom_key_is_isolated() {
    let mut store = TaskStore::open(MemoryBackend::new(), Vec::new());
    store.create(TaskDraft::new("default key", day())).unwrap();
    let mut other = TaskStore::new(store.into_backend(), seed()).with_key("other.v1");
    other.hydrate();
    assert_eq!(other.tasks(), seed().as_slice());
}

#[test]
fn test_records_written_by_the_web_app_survive_hydration() {
    let raw = r#"[{"id":"t-1","title":"写周报","date":"2024-06-10","startTime":"09:00","status":"done","tag":"工作"},
                 {"id":"t-9","title":"跑步","date":"2024-06-10","startTime":"19:00","status":"todo","tag":"习惯","priority":"high"}]"#;
    let store = TaskStore::open(MemoryBackend::with_entry(TASKS_KEY, raw), seed());

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t-1", "t-9"]);
    assert_eq!(store.find("t-9").unwrap().tag, Some(Tag::Habit));

    let saved: Vec<Task> = serde_json::from_str(store.backend().get(TASKS_KEY).unwrap()).unwrap();
    let saved_ids: Vec<&str> = saved.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(saved_ids, ["t-1", "t-9"]);
}

#[test]
fn test_unrecognised_values_do_not_discard_saved_tasks() {
    let raw = r#"[{"id":"a","title":"Odd tag","date":"2024-06-10","tag":"chores","priority":"urgent"},
                 {"id":"b","title":"Odd time","date":"2024-06-10","startTime":"25:99"},
                 {"id":"c","date":"2024-06-10"},
                 {"id":"d","title":"Fine","date":"2024-06-10","status":"done"}]"#;
    let store = TaskStore::open(MemoryBackend::with_entry(TASKS_KEY, raw), seed());

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "d"]);
    assert_eq!(store.find("a").unwrap().tag, None);
    assert_eq!(store.find("a").unwrap().priority, None);
    assert_eq!(store.find("b").unwrap().start_time, None);
}

#[test]
fn test_load_alone_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("mytodo");
    let store = TaskStore::new(FileBackend::new(&data_dir), seed());

    assert_eq!(store.load(), seed());
    assert!(!data_dir.exists());
}
