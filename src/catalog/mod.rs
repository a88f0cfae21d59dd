//! # Catalog Module - Course Catalog & Progressive Unlock
//!
//! Read path for the learning platform's course catalog:
//! - Course listings with search/filter/sort and purchase status
//! - Module/topic statistics over the content hierarchy
//! - Per-video lock and completion state under sequential-progress rules
//! - Next/previous navigation within a topic
//!
//! ## Architecture
//!
//! The module follows the same patterns as the rest of the server:
//! - Diesel ORM for database access
//! - Axum handlers for HTTP routes
//! - Serde for JSON serialization
//! - UUID for identifiers
//!
//! Every operation resolves the viewer's tenant scope first and applies
//! soft-delete filtering before any business rule runs. The engine holds
//! nothing but a pool handle; all state is per-request.

pub mod error;
pub mod filters;
pub mod navigation;
pub mod purchase;
pub mod schema;
pub mod scope;
pub mod types;
pub mod unlock;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::PgConnection;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

use error::CatalogError;
use filters::{apply_filters, apply_sort, merge_filters, BoxedCourseQuery, CourseFilter, CourseSort};
use schema::{course_modules, course_topics, course_videos, courses, enrollments, video_progress};
use scope::{TenantScope, Viewer};
use types::{
    Course, CourseListParams, CourseModule, CoursePage, CourseStatus, CourseSummary, CourseTopic,
    CourseType, CourseVideo, ModuleSummary, TopicSummary, VideoDetail, VideoProgress, VideoSummary,
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const ENROLLMENT_ACTIVE: &str = "active";

// ============================================================================
// CATALOG ENGINE
// ============================================================================

/// Catalog read engine. Constructed per request over a cloned pool handle.
pub struct CatalogEngine {
    db: DbPool,
}

impl CatalogEngine {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    // ----- Course listing -----

    pub async fn list_courses(
        &self,
        params: CourseListParams,
        viewer: &Viewer,
    ) -> Result<CoursePage, CatalogError> {
        let (limit, offset) = page_bounds(params.limit, params.offset);

        let scope = viewer.scope();
        if scope == TenantScope::Denied {
            log::debug!("catalog scope denied; returning empty course page");
            return Ok(CoursePage {
                items: Vec::new(),
                total: 0,
                limit,
                offset,
            });
        }

        let filters = merge_filters(CourseFilter::from_params(&params));
        let sort = CourseSort::from_params(params.sort_by.as_deref(), params.sort_dir.as_deref());

        let mut conn = self.db.get()?;

        let total: i64 = apply_filters(scoped_courses(&scope), &filters)
            .count()
            .get_result(&mut conn)?;

        let rows: Vec<Course> = apply_sort(apply_filters(scoped_courses(&scope), &filters), sort)
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        let purchased = purchased_course_ids(&mut conn, viewer.student_id, &rows)?;

        let items = rows
            .into_iter()
            .map(|course| {
                let status =
                    purchase::classify(course.price.as_ref(), purchased.contains(&course.id));
                CourseSummary {
                    id: course.id,
                    name: course.name,
                    description: course.description,
                    status: CourseStatus::from(course.status.as_str()),
                    course_type: CourseType::from(course.course_type.as_str()),
                    price: course.price,
                    total_hours: course.total_hours,
                    purchase_status: status.label,
                    is_free: status.is_free,
                    is_purchased: status.is_purchased,
                    created_at: course.created_at,
                    updated_at: course.updated_at,
                }
            })
            .collect();

        Ok(CoursePage {
            items,
            total,
            limit,
            offset,
        })
    }

    // ----- Content hierarchy -----

    pub async fn get_course_modules(
        &self,
        course_id: Uuid,
        viewer: &Viewer,
    ) -> Result<Vec<ModuleSummary>, CatalogError> {
        let scope = viewer.scope();
        let mut conn = self.db.get()?;
        visible_course(&mut conn, course_id, &scope)?;

        let modules: Vec<CourseModule> = course_modules::table
            .filter(course_modules::course_id.eq(course_id))
            .filter(course_modules::is_active.eq(true))
            .filter(course_modules::is_deleted.eq(false))
            .order((course_modules::position.asc(), course_modules::id.asc()))
            .load(&mut conn)?;

        if modules.is_empty() {
            return Ok(Vec::new());
        }

        let module_ids: Vec<Uuid> = modules.iter().map(|module| module.id).collect();
        let topic_counts = topic_counts_by_module(&mut conn, &module_ids)?;
        let video_counts = video_counts_by_module(&mut conn, &module_ids)?;

        Ok(modules
            .into_iter()
            .map(|module| {
                // A module missing from the grouped counts has zero
                // children; count failures have already propagated.
                let topics = topic_counts.get(&module.id).copied().unwrap_or(0);
                let videos = video_counts.get(&module.id).copied().unwrap_or(0);
                ModuleSummary {
                    id: module.id,
                    name: module.name,
                    position: module.position,
                    topic_count: topics,
                    video_count: videos,
                    stats_label: stats_label(topics, videos),
                }
            })
            .collect())
    }

    pub async fn get_topics(
        &self,
        module_id: Uuid,
        viewer: &Viewer,
    ) -> Result<Vec<TopicSummary>, CatalogError> {
        let scope = viewer.scope();
        let mut conn = self.db.get()?;
        visible_module(&mut conn, module_id, &scope)?;

        let topics: Vec<CourseTopic> = course_topics::table
            .filter(course_topics::module_id.eq(module_id))
            .filter(course_topics::is_active.eq(true))
            .filter(course_topics::is_deleted.eq(false))
            .order((course_topics::position.asc(), course_topics::id.asc()))
            .load(&mut conn)?;

        if topics.is_empty() {
            return Ok(Vec::new());
        }

        let topic_ids: Vec<Uuid> = topics.iter().map(|topic| topic.id).collect();
        let video_counts = video_counts_by_topic(&mut conn, &topic_ids)?;

        Ok(topics
            .into_iter()
            .map(|topic| TopicSummary {
                id: topic.id,
                name: topic.name,
                position: topic.position,
                video_count: video_counts.get(&topic.id).copied().unwrap_or(0),
            })
            .collect())
    }

    // ----- Playback state -----

    pub async fn get_videos(
        &self,
        topic_id: Uuid,
        viewer: &Viewer,
    ) -> Result<Vec<VideoSummary>, CatalogError> {
        let scope = viewer.scope();
        let mut conn = self.db.get()?;
        visible_topic(&mut conn, topic_id, &scope)?;

        let videos: Vec<CourseVideo> = course_videos::table
            .filter(course_videos::topic_id.eq(topic_id))
            .filter(course_videos::is_active.eq(true))
            .filter(course_videos::is_deleted.eq(false))
            .load(&mut conn)?;

        let progress = progress_for(&mut conn, viewer.student_id, &videos)?;
        let states = unlock::project(&videos, &progress, viewer.student_id);
        let ordered = unlock::sibling_order(&videos);

        Ok(ordered
            .iter()
            .zip(states.iter())
            .map(|(video, state)| VideoSummary {
                id: video.id,
                name: video.name.clone(),
                position: video.position,
                duration_seconds: video.duration_seconds,
                completion_state: state.completion_state,
                lock_state: state.lock_state,
            })
            .collect())
    }

    pub async fn get_video_detail(
        &self,
        video_id: Uuid,
        viewer: &Viewer,
    ) -> Result<VideoDetail, CatalogError> {
        let scope = viewer.scope();
        let mut conn = self.db.get()?;
        let video = visible_video(&mut conn, video_id, &scope)?;

        let siblings: Vec<CourseVideo> = course_videos::table
            .filter(course_videos::topic_id.eq(video.topic_id))
            .filter(course_videos::is_active.eq(true))
            .filter(course_videos::is_deleted.eq(false))
            .load(&mut conn)?;

        let progress = progress_for(&mut conn, viewer.student_id, &siblings)?;
        let states = unlock::project(&siblings, &progress, viewer.student_id);
        let state = states
            .iter()
            .find(|state| state.video_id == video.id)
            .copied()
            .ok_or_else(|| CatalogError::NotFound("video".to_string()))?;
        let (previous, next) = navigation::neighbors(&siblings, video.id)
            .ok_or_else(|| CatalogError::NotFound("video".to_string()))?;

        Ok(VideoDetail {
            id: video.id,
            topic_id: video.topic_id,
            name: video.name,
            description: video.description,
            video_url: video.video_url,
            duration_seconds: video.duration_seconds,
            position: video.position,
            completion_state: state.completion_state,
            lock_state: state.lock_state,
            next,
            previous,
        })
    }
}

// ============================================================================
// SCOPED LOOKUPS & BATCHED AGGREGATES
// ============================================================================

fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset.unwrap_or(0).max(0),
    )
}

fn stats_label(topic_count: i64, video_count: i64) -> String {
    format!("{} Topics | {} Video Lectures", topic_count, video_count)
}

/// Base course query: soft-delete filtering plus the tenant predicate.
/// `Denied` scopes never reach this; callers short-circuit first.
fn scoped_courses(scope: &TenantScope) -> BoxedCourseQuery<'static> {
    let mut query = courses::table
        .filter(courses::is_active.eq(true))
        .filter(courses::is_deleted.eq(false))
        .into_boxed();
    if let TenantScope::Tenant(tenant_id) = scope {
        query = query.filter(courses::tenant_id.eq(*tenant_id));
    }
    query
}

fn visible_course(
    conn: &mut PgConnection,
    course_id: Uuid,
    scope: &TenantScope,
) -> Result<Course, CatalogError> {
    if *scope == TenantScope::Denied {
        return Err(CatalogError::NotFound("course".to_string()));
    }
    scoped_courses(scope)
        .filter(courses::id.eq(course_id))
        .first::<Course>(conn)
        .optional()?
        .ok_or_else(|| CatalogError::NotFound("course".to_string()))
}

fn visible_module(
    conn: &mut PgConnection,
    module_id: Uuid,
    scope: &TenantScope,
) -> Result<CourseModule, CatalogError> {
    if *scope == TenantScope::Denied {
        return Err(CatalogError::NotFound("module".to_string()));
    }
    let mut query = course_modules::table
        .inner_join(courses::table)
        .filter(course_modules::id.eq(module_id))
        .filter(course_modules::is_active.eq(true))
        .filter(course_modules::is_deleted.eq(false))
        .filter(courses::is_active.eq(true))
        .filter(courses::is_deleted.eq(false))
        .select(course_modules::all_columns)
        .into_boxed();
    if let TenantScope::Tenant(tenant_id) = scope {
        query = query.filter(courses::tenant_id.eq(*tenant_id));
    }
    query
        .first::<CourseModule>(conn)
        .optional()?
        .ok_or_else(|| CatalogError::NotFound("module".to_string()))
}

fn visible_topic(
    conn: &mut PgConnection,
    topic_id: Uuid,
    scope: &TenantScope,
) -> Result<CourseTopic, CatalogError> {
    if *scope == TenantScope::Denied {
        return Err(CatalogError::NotFound("topic".to_string()));
    }
    let mut query = course_topics::table
        .inner_join(course_modules::table.inner_join(courses::table))
        .filter(course_topics::id.eq(topic_id))
        .filter(course_topics::is_active.eq(true))
        .filter(course_topics::is_deleted.eq(false))
        .filter(course_modules::is_active.eq(true))
        .filter(course_modules::is_deleted.eq(false))
        .filter(courses::is_active.eq(true))
        .filter(courses::is_deleted.eq(false))
        .select(course_topics::all_columns)
        .into_boxed();
    if let TenantScope::Tenant(tenant_id) = scope {
        query = query.filter(courses::tenant_id.eq(*tenant_id));
    }
    query
        .first::<CourseTopic>(conn)
        .optional()?
        .ok_or_else(|| CatalogError::NotFound("topic".to_string()))
}

fn visible_video(
    conn: &mut PgConnection,
    video_id: Uuid,
    scope: &TenantScope,
) -> Result<CourseVideo, CatalogError> {
    if *scope == TenantScope::Denied {
        return Err(CatalogError::NotFound("video".to_string()));
    }
    let mut query = course_videos::table
        .inner_join(course_topics::table.inner_join(course_modules::table.inner_join(courses::table)))
        .filter(course_videos::id.eq(video_id))
        .filter(course_videos::is_active.eq(true))
        .filter(course_videos::is_deleted.eq(false))
        .filter(course_topics::is_active.eq(true))
        .filter(course_topics::is_deleted.eq(false))
        .filter(course_modules::is_active.eq(true))
        .filter(course_modules::is_deleted.eq(false))
        .filter(courses::is_active.eq(true))
        .filter(courses::is_deleted.eq(false))
        .select(course_videos::all_columns)
        .into_boxed();
    if let TenantScope::Tenant(tenant_id) = scope {
        query = query.filter(courses::tenant_id.eq(*tenant_id));
    }
    query
        .first::<CourseVideo>(conn)
        .optional()?
        .ok_or_else(|| CatalogError::NotFound("video".to_string()))
}

/// One grouped query for topic counts across all of a course's modules.
fn topic_counts_by_module(
    conn: &mut PgConnection,
    module_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, CatalogError> {
    let rows: Vec<(Uuid, i64)> = course_topics::table
        .filter(course_topics::module_id.eq_any(module_ids.to_vec()))
        .filter(course_topics::is_active.eq(true))
        .filter(course_topics::is_deleted.eq(false))
        .group_by(course_topics::module_id)
        .select((course_topics::module_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

/// One grouped query for video counts across all of a course's modules,
/// reaching videos through their topics.
fn video_counts_by_module(
    conn: &mut PgConnection,
    module_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, CatalogError> {
    let rows: Vec<(Uuid, i64)> = course_videos::table
        .inner_join(course_topics::table)
        .filter(course_topics::module_id.eq_any(module_ids.to_vec()))
        .filter(course_topics::is_active.eq(true))
        .filter(course_topics::is_deleted.eq(false))
        .filter(course_videos::is_active.eq(true))
        .filter(course_videos::is_deleted.eq(false))
        .group_by(course_topics::module_id)
        .select((course_topics::module_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

fn video_counts_by_topic(
    conn: &mut PgConnection,
    topic_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, CatalogError> {
    let rows: Vec<(Uuid, i64)> = course_videos::table
        .filter(course_videos::topic_id.eq_any(topic_ids.to_vec()))
        .filter(course_videos::is_active.eq(true))
        .filter(course_videos::is_deleted.eq(false))
        .group_by(course_videos::topic_id)
        .select((course_videos::topic_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

/// Course ids the student holds an active enrollment for, fetched in one
/// `eq_any` query for the whole page.
fn purchased_course_ids(
    conn: &mut PgConnection,
    student_id: Option<Uuid>,
    rows: &[Course],
) -> Result<HashSet<Uuid>, CatalogError> {
    let Some(student_id) = student_id else {
        return Ok(HashSet::new());
    };
    if rows.is_empty() {
        return Ok(HashSet::new());
    }
    let course_ids: Vec<Uuid> = rows.iter().map(|course| course.id).collect();
    let purchased: Vec<Uuid> = enrollments::table
        .filter(enrollments::student_id.eq(student_id))
        .filter(enrollments::course_id.eq_any(course_ids))
        .filter(enrollments::status.eq(ENROLLMENT_ACTIVE))
        .filter(enrollments::is_active.eq(true))
        .filter(enrollments::is_deleted.eq(false))
        .select(enrollments::course_id)
        .load(conn)?;
    Ok(purchased.into_iter().collect())
}

/// The viewing student's progress rows over the given videos, keyed by
/// video id. Anonymous viewers get an empty map.
fn progress_for(
    conn: &mut PgConnection,
    student_id: Option<Uuid>,
    videos: &[CourseVideo],
) -> Result<HashMap<Uuid, VideoProgress>, CatalogError> {
    let Some(student_id) = student_id else {
        return Ok(HashMap::new());
    };
    if videos.is_empty() {
        return Ok(HashMap::new());
    }
    let video_ids: Vec<Uuid> = videos.iter().map(|video| video.id).collect();
    let rows: Vec<VideoProgress> = video_progress::table
        .filter(video_progress::student_id.eq(student_id))
        .filter(video_progress::video_id.eq_any(video_ids))
        .load(conn)?;
    Ok(rows.into_iter().map(|row| (row.video_id, row)).collect())
}

// ============================================================================
// HTTP HANDLERS
// ============================================================================

/// List courses with optional filters, scoped to the viewer's tenant
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CourseListParams>,
) -> impl IntoResponse {
    let viewer = Viewer::from_headers(&headers);
    let engine = CatalogEngine::new(state.conn.clone());

    match engine.list_courses(params, &viewer).await {
        Ok(page) => Json(serde_json::json!({
            "success": true,
            "data": page
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Modules of a course with topic/video statistics
pub async fn get_course_modules(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse {
    let viewer = Viewer::from_headers(&headers);
    let engine = CatalogEngine::new(state.conn.clone());

    match engine.get_course_modules(course_id, &viewer).await {
        Ok(modules) => Json(serde_json::json!({
            "success": true,
            "data": modules
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Topics of a module with video counts
pub async fn get_topics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(module_id): Path<Uuid>,
) -> impl IntoResponse {
    let viewer = Viewer::from_headers(&headers);
    let engine = CatalogEngine::new(state.conn.clone());

    match engine.get_topics(module_id, &viewer).await {
        Ok(topics) => Json(serde_json::json!({
            "success": true,
            "data": topics
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Videos of a topic with lock and completion state
pub async fn get_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(topic_id): Path<Uuid>,
) -> impl IntoResponse {
    let viewer = Viewer::from_headers(&headers);
    let engine = CatalogEngine::new(state.conn.clone());

    match engine.get_videos(topic_id, &viewer).await {
        Ok(videos) => Json(serde_json::json!({
            "success": true,
            "data": videos
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Single video with playback state and next/previous navigation
pub async fn get_video_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(video_id): Path<Uuid>,
) -> impl IntoResponse {
    let viewer = Viewer::from_headers(&headers);
    let engine = CatalogEngine::new(state.conn.clone());

    match engine.get_video_detail(video_id, &viewer).await {
        Ok(detail) => Json(serde_json::json!({
            "success": true,
            "data": detail
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Configure all Catalog module routes
pub fn configure_catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog/courses", get(list_courses))
        .route("/api/catalog/courses/:id/modules", get(get_course_modules))
        .route("/api/catalog/modules/:id/topics", get(get_topics))
        .route("/api/catalog/topics/:id/videos", get(get_videos))
        .route("/api/catalog/videos/:id", get(get_video_detail))
}

/// Simplified configure function for module registration
pub fn configure(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    router.merge(configure_catalog_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_label_format() {
        assert_eq!(stats_label(3, 12), "3 Topics | 12 Video Lectures");
        assert_eq!(stats_label(0, 0), "0 Topics | 0 Video Lectures");
    }

    #[test]
    fn test_page_bounds_defaults_and_clamps() {
        assert_eq!(page_bounds(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_bounds(Some(7), Some(40)), (7, 40));
        assert_eq!(page_bounds(Some(0), Some(-5)), (1, 0));
        assert_eq!(page_bounds(Some(10_000), None), (MAX_PAGE_SIZE, 0));
    }
}
