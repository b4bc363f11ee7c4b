//! Curriculum entries, their column catalog, and list filters.
//!
//! An entry is a flat record of optional text columns. The column list is
//! declared once in [`curriculum_columns!`] and drives the stored record, the
//! write payload, the CSV header dictionary, and the admin form catalog.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use curricula_core::serde::deserialize_optional_string;

/// A column of the curriculum table with its display/CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurriculumColumn {
    pub key: &'static str,
    pub label: &'static str,
}

macro_rules! curriculum_columns {
    ($(($key:ident, $label:literal)),+ $(,)?) => {
        /// A stored curriculum record.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
        pub struct CurriculumEntry {
            pub id: Uuid,
            $(pub $key: Option<String>,)+
            pub created_at: DateTime<Utc>,
        }

        /// Column values for a create or a partial update. Only `Some` columns
        /// are written; unknown keys are rejected during deserialization.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
        #[serde(deny_unknown_fields)]
        pub struct CurriculumFields {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $key: Option<String>,
            )+
        }

        pub const CURRICULUM_COLUMNS: &[CurriculumColumn] = &[
            $(CurriculumColumn { key: stringify!($key), label: $label },)+
        ];

        impl CurriculumFields {
            /// The set columns, in catalog order.
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                let mut entries = Vec::new();
                $(
                    if let Some(value) = self.$key.as_deref() {
                        entries.push((stringify!($key), value));
                    }
                )+
                entries
            }

            /// Sets a column by key. Fails with the key when it is not a column.
            pub fn set(&mut self, key: &str, value: String) -> Result<(), String> {
                match key {
                    $(stringify!($key) => self.$key = Some(value),)+
                    other => return Err(other.to_string()),
                }
                Ok(())
            }
        }

        impl CurriculumEntry {
            pub fn new(id: Uuid, created_at: DateTime<Utc>, fields: &CurriculumFields) -> Self {
                Self {
                    id,
                    $($key: fields.$key.clone(),)+
                    created_at,
                }
            }

            /// Overwrites every column that is set in `fields`.
            pub fn apply(&mut self, fields: &CurriculumFields) {
                $(
                    if let Some(value) = &fields.$key {
                        self.$key = Some(value.clone());
                    }
                )+
            }

            pub fn column(&self, key: &str) -> Option<&str> {
                match key {
                    $(stringify!($key) => self.$key.as_deref(),)+
                    _ => None,
                }
            }
        }
    };
}

curriculum_columns! {
    (quarter, "Quarter"),
    (grade, "Grade"),
    (subject, "Subject"),
    (curriculum, "Curriculum"),
    (unit, "Unit"),
    (week, "Week"),
    (date, "Date"),
    (scope_link, "Scope (link)"),
    (assessment_name, "Assessment Name"),
    (assessment_link, "Assessment Link"),
    (standards, "Standards"),
    (learning_targets, "Learning Targets"),
    (success_criteria, "Success Criteria"),
    (theme, "Theme"),
    (title, "Title"),
    (fq, "FQ"),
    (class_name, "Class"),
    (task, "Task"),
    (choice_text, "Choice Text"),
    (required_text, "Required Text"),
}

impl CurriculumFields {
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Maps a CSV header to a column key.
///
/// Known headers use the catalog; anything else falls back to the lower-cased
/// header with whitespace runs replaced by `_`.
pub fn key_for_header(header: &str) -> String {
    if let Some(column) = CURRICULUM_COLUMNS.iter().find(|c| c.label == header) {
        return column.key.to_string();
    }
    header
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn is_column_key(key: &str) -> bool {
    CURRICULUM_COLUMNS.iter().any(|c| c.key == key)
}

/// Equality filters for listing. Empty values mean "no constraint".
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CurriculumFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub quarter: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub curriculum: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub week: Option<String>,
}

impl CurriculumFilterParams {
    /// Active constraints as `(column, value)` pairs.
    pub fn constraints(&self) -> Vec<(&'static str, &str)> {
        [
            ("quarter", &self.quarter),
            ("grade", &self.grade),
            ("subject", &self.subject),
            ("curriculum", &self.curriculum),
            ("week", &self.week),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
        .collect()
    }

    pub fn matches(&self, entry: &CurriculumEntry) -> bool {
        self.constraints()
            .iter()
            .all(|(column, value)| entry.column(column) == Some(*value))
    }
}

/// Bulk import payload: raw CSV text or rows already split into key/value maps.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ImportRequest {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub rows: Option<Vec<BTreeMap<String, serde_json::Value>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_twenty_columns() {
        assert_eq!(CURRICULUM_COLUMNS.len(), 20);
        assert_eq!(CURRICULUM_COLUMNS[0].key, "quarter");
        assert_eq!(CURRICULUM_COLUMNS[16].key, "class_name");
        assert_eq!(CURRICULUM_COLUMNS[16].label, "Class");
    }

    #[test]
    fn test_key_for_header() {
        assert_eq!(key_for_header("Scope (link)"), "scope_link");
        assert_eq!(key_for_header("Class"), "class_name");
        assert_eq!(key_for_header("FQ"), "fq");
        assert_eq!(key_for_header("Learning  Targets"), "learning_targets");
        assert_eq!(key_for_header("Teacher Notes"), "teacher_notes");
    }

    #[test]
    fn test_fields_reject_unknown_keys() {
        let result: Result<CurriculumFields, _> =
            serde_json::from_str(r#"{"grade":"5","colour":"red"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_fields() {
        let fields: CurriculumFields = serde_json::from_str("{}").unwrap();
        assert!(fields.is_empty());

        let mut fields = CurriculumFields::default();
        fields.set("grade", "5".to_string()).unwrap();
        assert!(!fields.is_empty());
        assert_eq!(fields.entries(), vec![("grade", "5")]);
        assert_eq!(fields.set("colour", "red".to_string()), Err("colour".to_string()));
    }

    #[test]
    fn test_apply_overwrites_only_set_columns() {
        let mut original = CurriculumFields::default();
        original.grade = Some("5".to_string());
        original.subject = Some("Math".to_string());
        let mut entry = CurriculumEntry::new(Uuid::new_v4(), Utc::now(), &original);

        let mut patch = CurriculumFields::default();
        patch.subject = Some("ELA".to_string());
        entry.apply(&patch);

        assert_eq!(entry.grade.as_deref(), Some("5"));
        assert_eq!(entry.subject.as_deref(), Some("ELA"));
    }

    #[test]
    fn test_filters_are_exact_and_case_sensitive() {
        let mut fields = CurriculumFields::default();
        fields.subject = Some("Math".to_string());
        let entry = CurriculumEntry::new(Uuid::new_v4(), Utc::now(), &fields);

        let exact = CurriculumFilterParams {
            subject: Some("Math".to_string()),
            ..Default::default()
        };
        let lower = CurriculumFilterParams {
            subject: Some("math".to_string()),
            ..Default::default()
        };
        let empty = CurriculumFilterParams {
            subject: Some(String::new()),
            ..Default::default()
        };

        assert!(exact.matches(&entry));
        assert!(!lower.matches(&entry));
        assert!(empty.matches(&entry));
    }
}
