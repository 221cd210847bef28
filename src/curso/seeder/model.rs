//! Course data model and JSON shape validation.
//!
//! Course files arrive as operator-maintained JSON, so parsing is lenient:
//! scalar list entries are stringified, lesson grades may be digit strings,
//! and malformed optional fields degrade to empty defaults. The hard
//! requirements (integer file grade, topic slug presence, exercise type)
//! are enforced where the seeding operations need them.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::curso::seeder::error::{Result, SeedError};

/// Identifier the backend assigns to a lesson row. The schema uses opaque
/// uuid strings; numeric ids are stringified on read.
pub type LessonId = String;

/// One course file: a grade level plus the lessons that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub grade: i64,
    pub lessons: Vec<Lesson>,
}

/// A single lesson as described in the course JSON.
///
/// Fields the JSON omits are left at their empty defaults. `topic_slug`
/// stays optional because its absence is diagnosed by the driver, and
/// `exercises` distinguishes "absent or not a list" (`None`) from "present
/// but empty" (`Some` of an empty vector) for dry-run validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lesson {
    pub grade: Option<i64>,
    pub topic_slug: Option<String>,
    pub title: String,
    pub concept_md: String,
    pub worked_example_prompt_md: String,
    pub worked_example_steps_md: Vec<String>,
    pub exercises: Option<Vec<Exercise>>,
}

/// One practice item inside a lesson.
///
/// `kind` mirrors the JSON `type` field and is required before insertion;
/// the structured optionals pass through to the backend untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Exercise {
    pub kind: Option<String>,
    pub stimulus_md: String,
    pub choices: Option<Value>,
    pub answer: Option<Value>,
    pub validators: Option<Value>,
    pub hints: Vec<String>,
}

/// Mutable column set written on lesson insert and update.
#[derive(Debug, Clone, Serialize)]
pub struct LessonRow {
    pub grade: i64,
    pub topic_slug: String,
    pub title: String,
    pub concept_md: String,
    pub worked_example_prompt_md: String,
    pub worked_example_steps_md: Vec<String>,
}

/// Column set for one exercise row. `ex_order` is assigned from the
/// record's position in the input sequence, never from the source data.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseRow {
    pub lesson_id: LessonId,
    pub ex_order: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub stimulus_md: String,
    pub choices: Option<Value>,
    pub answer: Option<Value>,
    pub validators: Option<Value>,
    pub hints: Vec<String>,
}

/// Parses a whole course document, validating the top-level shape.
///
/// The file-level `grade` must be a JSON integer. A missing or non-list
/// `lessons` value yields an empty lesson list, which the driver skips with
/// a warning rather than treating as fatal.
pub fn parse_course(path: &Path, document: &Value) -> Result<Course> {
    let object = document
        .as_object()
        .ok_or_else(|| SeedError::InvalidCourse {
            path: path.to_path_buf(),
            reason: "expected a top-level JSON object".into(),
        })?;

    let grade = object
        .get("grade")
        .and_then(Value::as_i64)
        .ok_or_else(|| SeedError::InvalidCourse {
            path: path.to_path_buf(),
            reason: "'grade' must be an integer".into(),
        })?;

    let lessons = match object.get("lessons") {
        Some(Value::Array(items)) => items.iter().map(parse_lesson_value).collect(),
        _ => Vec::new(),
    };

    Ok(Course { grade, lessons })
}

fn parse_lesson_value(value: &Value) -> Lesson {
    match value {
        Value::Object(object) => parse_lesson(object),
        _ => Lesson::default(),
    }
}

fn parse_lesson(object: &Map<String, Value>) -> Lesson {
    let exercises = object
        .get("exercises")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse_exercise_value).collect());

    Lesson {
        grade: object.get("grade").and_then(integer_value),
        topic_slug: object
            .get("topic_slug")
            .filter(|value| !value.is_null())
            .map(text_value),
        title: text_field(object, "title").trim().to_string(),
        concept_md: text_field(object, "concept_md"),
        worked_example_prompt_md: text_field(object, "worked_example_prompt_md"),
        worked_example_steps_md: string_list(object.get("worked_example_steps_md")),
        exercises,
    }
}

fn parse_exercise_value(value: &Value) -> Exercise {
    match value {
        Value::Object(object) => parse_exercise(object),
        _ => Exercise::default(),
    }
}

fn parse_exercise(object: &Map<String, Value>) -> Exercise {
    Exercise {
        kind: object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string),
        stimulus_md: text_field(object, "stimulus_md"),
        choices: pass_through(object, "choices"),
        answer: pass_through(object, "answer"),
        validators: pass_through(object, "validators"),
        hints: string_list(object.get("hints")),
    }
}

/// Coerces a JSON value into a list of strings.
///
/// Non-list input is dropped to an empty list; scalar entries are
/// stringified rather than discarded.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(text_value).collect(),
        _ => Vec::new(),
    }
}

/// Accepts a JSON integer or a string of digits; anything else is `None`.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn pass_through(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|value| !value.is_null()).cloned()
}
