//! User profiles: role and scope assignments keyed by identity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use curricula_auth::Role;
use curricula_core::serde::deserialize_clearable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    /// Stable user id issued by the identity provider.
    #[serde(skip_serializing, default)]
    pub provider_subject: String,
    pub email: String,
    /// Raw stored role. Use [`Profile::role`] for the parsed value.
    pub role: Option<String>,
    pub district: Option<String>,
    pub assigned_subject: Option<String>,
    pub assigned_grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// The parsed role. Unknown or missing values yield `None` (no access).
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Profile created by the sign-in flow on first login.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub provider_subject: String,
    pub email: String,
    pub role: Role,
}

/// Administrator edit of a profile. Absent keys are left unchanged;
/// `null` or `""` clears the nullable scope fields.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileDto {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[validate(length(max = 100, message = "District must be at most 100 characters"))]
    #[schema(value_type = Option<String>)]
    pub district: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[schema(value_type = Option<SubjectArea>)]
    pub assigned_subject: Option<Option<SubjectArea>>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[schema(value_type = Option<GradeLevel>)]
    pub assigned_grade: Option<Option<GradeLevel>>,
}

impl UpdateProfileDto {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.district.is_none()
            && self.assigned_subject.is_none()
            && self.assigned_grade.is_none()
    }

    /// Applies the change set to a profile in place.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(role) = self.role {
            profile.role = Some(role.as_str().to_string());
        }
        if let Some(district) = &self.district {
            profile.district = district.clone();
        }
        if let Some(subject) = &self.assigned_subject {
            profile.assigned_subject = subject.map(|s| s.as_str().to_string());
        }
        if let Some(grade) = &self.assigned_grade {
            profile.assigned_grade = grade.map(|g| g.as_str().to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SubjectArea {
    #[serde(rename = "ELA")]
    Ela,
    Math,
    Science,
    #[serde(rename = "Social Studies")]
    SocialStudies,
    #[serde(rename = "SLA")]
    Sla,
}

impl SubjectArea {
    pub const ALL: [SubjectArea; 5] = [
        SubjectArea::Ela,
        SubjectArea::Math,
        SubjectArea::Science,
        SubjectArea::SocialStudies,
        SubjectArea::Sla,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubjectArea::Ela => "ELA",
            SubjectArea::Math => "Math",
            SubjectArea::Science => "Science",
            SubjectArea::SocialStudies => "Social Studies",
            SubjectArea::Sla => "SLA",
        }
    }
}

impl FromStr for SubjectArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubjectArea::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| format!("Unknown subject `{s}`"))
    }
}

impl fmt::Display for SubjectArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GradeLevel {
    #[serde(rename = "K")]
    Kindergarten,
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "5")]
    Fifth,
    #[serde(rename = "6")]
    Sixth,
    #[serde(rename = "7")]
    Seventh,
    #[serde(rename = "8")]
    Eighth,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 9] = [
        GradeLevel::Kindergarten,
        GradeLevel::First,
        GradeLevel::Second,
        GradeLevel::Third,
        GradeLevel::Fourth,
        GradeLevel::Fifth,
        GradeLevel::Sixth,
        GradeLevel::Seventh,
        GradeLevel::Eighth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GradeLevel::Kindergarten => "K",
            GradeLevel::First => "1",
            GradeLevel::Second => "2",
            GradeLevel::Third => "3",
            GradeLevel::Fourth => "4",
            GradeLevel::Fifth => "5",
            GradeLevel::Sixth => "6",
            GradeLevel::Seventh => "7",
            GradeLevel::Eighth => "8",
        }
    }
}

impl FromStr for GradeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeLevel::ALL
            .into_iter()
            .find(|grade| grade.as_str() == s)
            .ok_or_else(|| format!("Unknown grade `{s}`"))
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
