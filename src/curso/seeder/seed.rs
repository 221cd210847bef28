//! Course seeding orchestration: lesson upsert, exercise replacement, and
//! the file-by-file driver loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::curso::seeder::error::{Result, SeedError};
use crate::curso::seeder::model::{self, Course, Exercise, ExerciseRow, Lesson, LessonId, LessonRow};
use crate::curso::seeder::store::{EXERCISES_TABLE, Filter, LESSONS_TABLE, TableStore};

/// Pause inserted between course files to go easy on the backend.
const FILE_PAUSE: Duration = Duration::from_millis(200);

/// Counters accumulated across a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub lessons: u64,
    pub exercises: u64,
}

/// Options controlling a seeding run, decided once at startup.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Validate and count without touching the backend.
    pub dry_run: bool,
    /// Pause between course files. Tests zero this.
    pub pause: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            pause: FILE_PAUSE,
        }
    }
}

/// Reads and parses one course file.
pub fn read_course(path: &Path) -> Result<Course> {
    let source = fs::read_to_string(path)?;
    let document: Value =
        serde_json::from_str(&source).map_err(|source| SeedError::MalformedCourse {
            path: path.to_path_buf(),
            source,
        })?;
    model::parse_course(path, &document)
}

/// Creates or updates the lesson row keyed by `(grade, topic_slug)` and
/// returns the row's backend identifier.
///
/// One filtered read decides between updating the existing row and
/// inserting a new one, so each call costs exactly one remote read and one
/// remote write.
#[instrument(level = "info", skip_all, fields(grade = grade, topic_slug = %topic_slug))]
pub fn upsert_lesson(
    store: &dyn TableStore,
    grade: i64,
    topic_slug: &str,
    lesson: &Lesson,
) -> Result<LessonId> {
    let filters = [
        Filter::eq("grade", grade),
        Filter::eq("topic_slug", topic_slug),
    ];
    let existing = store.select(LESSONS_TABLE, "id", &filters)?;
    if existing.len() > 1 {
        return Err(SeedError::UnexpectedResponse(format!(
            "{} lesson rows for grade {grade}, topic_slug '{topic_slug}'",
            existing.len(),
        )));
    }

    let row = serde_json::to_value(LessonRow {
        grade,
        topic_slug: topic_slug.to_string(),
        title: lesson.title.clone(),
        concept_md: lesson.concept_md.clone(),
        worked_example_prompt_md: lesson.worked_example_prompt_md.clone(),
        worked_example_steps_md: lesson.worked_example_steps_md.clone(),
    })?;

    if let Some(found) = existing.first() {
        let id = row_id(found)?;
        store.update(LESSONS_TABLE, &[Filter::eq("id", id.as_str())], &row)?;
        debug!(id = %id, "updated existing lesson");
        Ok(id)
    } else {
        let inserted = store.insert(LESSONS_TABLE, &[row])?;
        let id = inserted
            .first()
            .map(row_id)
            .transpose()?
            .ok_or_else(|| SeedError::UnexpectedResponse("insert returned no lesson row".into()))?;
        debug!(id = %id, "inserted new lesson");
        Ok(id)
    }
}

/// Replaces every exercise row owned by `lesson_id` with `exercises`.
///
/// The existing rows are deleted unconditionally, then the new batch is
/// inserted in one call with `ex_order` assigned from input position. The
/// two steps are not atomic: a failure between them leaves the lesson
/// without exercises until the next run.
#[instrument(level = "info", skip_all, fields(lesson_id = %lesson_id, count = exercises.len()))]
pub fn replace_exercises(
    store: &dyn TableStore,
    lesson_id: &LessonId,
    exercises: &[Exercise],
) -> Result<usize> {
    store.delete(
        EXERCISES_TABLE,
        &[Filter::eq("lesson_id", lesson_id.as_str())],
    )?;

    let rows = exercises
        .iter()
        .enumerate()
        .map(|(index, exercise)| exercise_row(lesson_id, index, exercise))
        .collect::<Result<Vec<Value>>>()?;
    if !rows.is_empty() {
        store.insert(EXERCISES_TABLE, &rows)?;
    }
    Ok(rows.len())
}

fn exercise_row(lesson_id: &LessonId, index: usize, exercise: &Exercise) -> Result<Value> {
    let kind = exercise
        .kind
        .clone()
        .ok_or_else(|| SeedError::MissingExerciseType {
            lesson_id: lesson_id.clone(),
            position: index + 1,
        })?;

    Ok(serde_json::to_value(ExerciseRow {
        lesson_id: lesson_id.clone(),
        ex_order: (index + 1) as i64,
        kind,
        stimulus_md: exercise.stimulus_md.clone(),
        choices: exercise.choices.clone(),
        answer: exercise.answer.clone(),
        validators: exercise.validators.clone(),
        hints: exercise.hints.clone(),
    })?)
}

/// Pulls the backend-assigned identifier out of a returned row.
fn row_id(row: &Value) -> Result<LessonId> {
    match row.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(SeedError::UnexpectedResponse(
            "row without an 'id' column".into(),
        )),
    }
}

/// Seeds every course file in order, returning the accumulated totals.
///
/// Files without lessons are skipped with a warning; every other failure
/// aborts the run immediately, losing the counts gathered so far.
#[instrument(level = "info", skip_all, fields(files = paths.len(), dry_run = options.dry_run))]
pub fn run(store: &dyn TableStore, paths: &[PathBuf], options: &RunOptions) -> Result<Totals> {
    let mut totals = Totals::default();

    for path in paths {
        if !path.exists() {
            return Err(SeedError::MissingInput(path.clone()));
        }

        let course = read_course(path)?;
        if course.lessons.is_empty() {
            warn!(path = %path.display(), "no lessons to process, skipping file");
            continue;
        }
        info!(
            path = %path.display(),
            grade = course.grade,
            lessons = course.lessons.len(),
            "processing course file"
        );

        for lesson in &course.lessons {
            let grade = lesson.grade.unwrap_or(course.grade);
            let topic_slug =
                lesson
                    .topic_slug
                    .as_deref()
                    .ok_or_else(|| SeedError::MissingTopicSlug {
                        path: path.clone(),
                    })?;

            if options.dry_run {
                let exercises =
                    lesson
                        .exercises
                        .as_ref()
                        .ok_or_else(|| SeedError::MissingExercises {
                            topic_slug: topic_slug.to_string(),
                        })?;
                totals.lessons += 1;
                totals.exercises += exercises.len() as u64;
                continue;
            }

            let lesson_id = upsert_lesson(store, grade, topic_slug, lesson)?;
            let inserted = replace_exercises(
                store,
                &lesson_id,
                lesson.exercises.as_deref().unwrap_or_default(),
            )?;
            totals.lessons += 1;
            totals.exercises += inserted as u64;
            info!(topic_slug, exercises = inserted, "lesson seeded");
        }

        if !options.pause.is_zero() {
            thread::sleep(options.pause);
        }
    }

    Ok(totals)
}
