//! # Curricula Models
//!
//! Domain models and DTOs shared by the HTTP layer, the stores and the CLI.
//!
//! - [`curriculum`]: curriculum entries, the column catalog, filters and import payloads
//! - [`profiles`]: user profiles and the administrator edit DTO
//! - [`reference`]: districts, grades and subjects
//! - [`responses`]: `{ success, data }` envelopes

pub mod curriculum;
pub mod profiles;
pub mod reference;
pub mod responses;

pub use curriculum::{
    CURRICULUM_COLUMNS, CurriculumColumn, CurriculumEntry, CurriculumFields,
    CurriculumFilterParams, ImportRequest, is_column_key, key_for_header,
};
pub use profiles::{GradeLevel, NewProfile, Profile, SubjectArea, UpdateProfileDto};
pub use reference::{District, Grade, Subject};
pub use responses::{DataResponse, ListResponse, MessageResponse};
