use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use curso_seeder::SeedError;
use curso_seeder::seed::{RunOptions, run};
use curso_seeder::store::{EXERCISES_TABLE, LESSONS_TABLE, MemoryStore};
use serde_json::{Value, json};
use tempfile::tempdir;

fn quick() -> RunOptions {
    RunOptions {
        dry_run: false,
        pause: Duration::ZERO,
    }
}

fn dry() -> RunOptions {
    RunOptions {
        dry_run: true,
        pause: Duration::ZERO,
    }
}

fn write_course(dir: &tempfile::TempDir, name: &str, document: &Value) -> PathBuf {
    let path = dir.path().join(name);
    let source = serde_json::to_string_pretty(document).expect("serialised course");
    fs::write(&path, source).expect("course file written");
    path
}

fn exercise(stimulus: &str) -> Value {
    json!({
        "type": "multiple_choice",
        "stimulus_md": stimulus,
        "choices": [{"id": "a", "label_md": "4", "correct": true}]
    })
}

#[test]
fn totals_accumulate_across_files() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let first = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [
                {"topic_slug": "sumas", "exercises": [exercise("uno"), exercise("dos")]},
                {"topic_slug": "restas", "exercises": [exercise("tres")]}
            ]
        }),
    );
    let second = write_course(
        &dir,
        "curso4.json",
        &json!({
            "grade": 4,
            "lessons": [
                {"topic_slug": "multiplicar", "exercises": [exercise("cuatro")]}
            ]
        }),
    );

    let totals = run(&store, &[first, second], &quick()).expect("run succeeded");

    assert_eq!(totals.lessons, 3);
    assert_eq!(totals.exercises, 4);
    assert_eq!(store.rows(LESSONS_TABLE).len(), 3);
    assert_eq!(store.rows(EXERCISES_TABLE).len(), 4);
}

#[test]
fn rerunning_the_same_file_is_idempotent() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [
                {"topic_slug": "sumas", "title": "Sumas", "exercises": [exercise("uno"), exercise("dos")]}
            ]
        }),
    );

    run(&store, std::slice::from_ref(&path), &quick()).expect("first run");
    run(&store, std::slice::from_ref(&path), &quick()).expect("second run");

    assert_eq!(store.rows(LESSONS_TABLE).len(), 1);
    assert_eq!(store.rows(EXERCISES_TABLE).len(), 2);
}

#[test]
fn lessons_inherit_the_file_grade_when_absent() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso5.json",
        &json!({
            "grade": 5,
            "lessons": [
                {"topic_slug": "heredado", "exercises": []},
                {"topic_slug": "propio", "grade": 6, "exercises": []}
            ]
        }),
    );

    run(&store, &[path], &quick()).expect("run succeeded");

    let rows = store.rows(LESSONS_TABLE);
    assert_eq!(rows[0]["grade"], json!(5));
    assert_eq!(rows[1]["grade"], json!(6));
}

#[test]
fn a_file_without_lessons_is_skipped_not_fatal() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let empty = write_course(&dir, "vacio.json", &json!({"grade": 3, "lessons": []}));
    let full = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [{"topic_slug": "sumas", "exercises": [exercise("uno")]}]
        }),
    );

    let totals = run(&store, &[empty, full], &quick()).expect("run succeeded");

    assert_eq!(totals.lessons, 1);
    assert_eq!(totals.exercises, 1);
}

#[test]
fn a_missing_file_aborts_the_run() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let missing = dir.path().join("no-existe.json");
    let error = run(&store, &[missing], &quick()).expect_err("must fail");

    assert!(matches!(error, SeedError::MissingInput(_)));
}

#[test]
fn malformed_json_stops_before_later_files() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let broken = dir.path().join("roto.json");
    fs::write(&broken, "{ not json").expect("broken file written");
    let healthy = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [{"topic_slug": "sumas", "exercises": [exercise("uno")]}]
        }),
    );

    let error = run(&store, &[broken, healthy], &quick()).expect_err("must fail");

    assert!(matches!(error, SeedError::MalformedCourse { .. }));
    assert!(store.rows(LESSONS_TABLE).is_empty());
    assert!(store.rows(EXERCISES_TABLE).is_empty());
}

#[test]
fn a_non_integer_grade_is_fatal() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(&dir, "curso.json", &json!({"grade": "tres", "lessons": []}));
    let error = run(&store, &[path], &quick()).expect_err("must fail");

    assert!(matches!(error, SeedError::InvalidCourse { .. }));
}

#[test]
fn dry_run_counts_without_writing() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [
                {"topic_slug": "sumas", "exercises": [exercise("uno"), exercise("dos")]},
                {"topic_slug": "restas", "exercises": []}
            ]
        }),
    );

    let totals = run(&store, &[path], &dry()).expect("dry run succeeded");

    assert_eq!(totals.lessons, 2);
    assert_eq!(totals.exercises, 2);
    assert!(store.rows(LESSONS_TABLE).is_empty());
    assert!(store.rows(EXERCISES_TABLE).is_empty());
}

#[test]
fn dry_run_requires_topic_slug() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({"grade": 3, "lessons": [{"title": "Sin slug", "exercises": []}]}),
    );

    let error = run(&store, &[path], &dry()).expect_err("must fail");
    assert!(matches!(error, SeedError::MissingTopicSlug { .. }));
}

#[test]
fn dry_run_requires_an_exercise_list() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({"grade": 3, "lessons": [{"topic_slug": "sumas"}]}),
    );

    let error = run(&store, &[path], &dry()).expect_err("must fail");
    assert!(matches!(error, SeedError::MissingExercises { .. }));
}

#[test]
fn live_mode_treats_a_missing_exercise_list_as_empty() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({"grade": 3, "lessons": [{"topic_slug": "sumas"}]}),
    );

    let totals = run(&store, &[path], &quick()).expect("run succeeded");

    assert_eq!(totals.lessons, 1);
    assert_eq!(totals.exercises, 0);
    assert_eq!(store.rows(LESSONS_TABLE).len(), 1);
    assert!(store.rows(EXERCISES_TABLE).is_empty());
}

#[test]
fn coerced_steps_reach_the_stored_row() {
    let dir = tempdir().expect("temporary directory");
    let store = MemoryStore::new();

    let path = write_course(
        &dir,
        "curso3.json",
        &json!({
            "grade": 3,
            "lessons": [{
                "topic_slug": "sumas",
                "worked_example_steps_md": "no soy una lista",
                "exercises": []
            }]
        }),
    );

    run(&store, &[path], &quick()).expect("run succeeded");

    let rows = store.rows(LESSONS_TABLE);
    assert_eq!(rows[0]["worked_example_steps_md"], json!([]));
}
