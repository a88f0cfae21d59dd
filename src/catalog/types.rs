//! Types for the catalog module: persisted rows, derived projections and
//! request parameters.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::navigation::VideoNav;
use crate::catalog::schema::*;
use crate::catalog::unlock::{CompletionState, LockState};

// ============================================================================
// DATA MODELS
// ============================================================================

// ----- Course -----

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = courses)]
pub struct Course {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub course_type: String,
    pub price: Option<BigDecimal>,
    pub total_hours: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Public,
    Archived,
}

impl From<&str> for CourseStatus {
    fn from(s: &str) -> Self {
        match s {
            "public" => Self::Public,
            "archived" => Self::Archived,
            _ => Self::Draft,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Public => write!(f, "public"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Free,
    Paid,
}

impl From<&str> for CourseType {
    fn from(s: &str) -> Self {
        match s {
            "paid" => Self::Paid,
            _ => Self::Free,
        }
    }
}

impl std::fmt::Display for CourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

// ----- Content hierarchy -----

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = course_modules)]
pub struct CourseModule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = course_topics)]
pub struct CourseTopic {
    pub id: Uuid,
    pub module_id: Uuid,
    pub name: String,
    pub position: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = course_videos)]
pub struct CourseVideo {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: i32,
    pub position: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ----- Enrollment & progress -----

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = enrollments)]
pub struct Enrollment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrollment_type: String,
    pub status: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Playback telemetry row. Owned by the telemetry collaborator; this
/// service only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = video_progress)]
pub struct VideoProgress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub video_id: Uuid,
    pub completion_percentage: i32,
    pub is_completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = course_programs)]
pub struct CourseProgram {
    pub id: Uuid,
    pub course_id: Uuid,
    pub program_id: Uuid,
    pub specialization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// RESPONSE PROJECTIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub course_type: CourseType,
    pub price: Option<BigDecimal>,
    pub total_hours: i32,
    pub purchase_status: String,
    pub is_free: bool,
    pub is_purchased: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePage {
    pub items: Vec<CourseSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub topic_count: i64,
    pub video_count: i64,
    pub stats_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub video_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub duration_seconds: i32,
    pub completion_state: CompletionState,
    pub lock_state: LockState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: i32,
    pub position: i32,
    pub completion_state: CompletionState,
    pub lock_state: LockState,
    pub next: Option<VideoNav>,
    pub previous: Option<VideoNav>,
}

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

/// Raw query parameters for `GET /api/catalog/courses`.
///
/// Absent fields contribute no predicate at all. `programs` and
/// `specializations` are comma-separated uuid lists. `price_max` is
/// tri-state: absent means no constraint, an empty value selects only
/// unpriced courses, a numeric value is a price ceiling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub min_hours: Option<i32>,
    pub max_hours: Option<i32>,
    pub programs: Option<String>,
    pub specializations: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub price_max: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_status_conversion() {
        assert_eq!(CourseStatus::from("draft"), CourseStatus::Draft);
        assert_eq!(CourseStatus::from("public"), CourseStatus::Public);
        assert_eq!(CourseStatus::from("archived"), CourseStatus::Archived);
        assert_eq!(CourseStatus::from("unknown"), CourseStatus::Draft);
    }

    #[test]
    fn test_course_status_display() {
        assert_eq!(CourseStatus::Draft.to_string(), "draft");
        assert_eq!(CourseStatus::Public.to_string(), "public");
        assert_eq!(CourseStatus::Archived.to_string(), "archived");
    }

    #[test]
    fn test_course_type_conversion() {
        assert_eq!(CourseType::from("free"), CourseType::Free);
        assert_eq!(CourseType::from("paid"), CourseType::Paid);
        assert_eq!(CourseType::from(""), CourseType::Free);
        assert_eq!(CourseType::Paid.to_string(), "paid");
    }

    #[test]
    fn test_course_list_params_default_is_empty() {
        let params = CourseListParams::default();
        assert!(params.search.is_none());
        assert!(params.price_max.is_none());
        assert!(params.limit.is_none());
    }
}
