//! Diesel schema for the catalog tables.
//!
//! Every content table carries the `is_active`/`is_deleted` pair; default
//! queries must exclude rows where either flag disqualifies the row.

diesel::table! {
    courses (id) {
        id -> Uuid,
        tenant_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        status -> Text,
        course_type -> Text,
        price -> Nullable<Numeric>,
        total_hours -> Int4,
        is_active -> Bool,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    course_modules (id) {
        id -> Uuid,
        course_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        position -> Int4,
        is_active -> Bool,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    course_topics (id) {
        id -> Uuid,
        module_id -> Uuid,
        name -> Text,
        position -> Int4,
        is_active -> Bool,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    course_videos (id) {
        id -> Uuid,
        topic_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        video_url -> Nullable<Text>,
        duration_seconds -> Int4,
        position -> Int4,
        is_active -> Bool,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    enrollments (id) {
        id -> Uuid,
        tenant_id -> Uuid,
        student_id -> Uuid,
        course_id -> Uuid,
        enrollment_type -> Text,
        status -> Text,
        is_active -> Bool,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    video_progress (id) {
        id -> Uuid,
        student_id -> Uuid,
        video_id -> Uuid,
        completion_percentage -> Int4,
        is_completed -> Bool,
        last_watched_at -> Timestamptz,
    }
}

diesel::table! {
    course_programs (id) {
        id -> Uuid,
        course_id -> Uuid,
        program_id -> Uuid,
        specialization_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(course_modules -> courses (course_id));
diesel::joinable!(course_topics -> course_modules (module_id));
diesel::joinable!(course_videos -> course_topics (topic_id));
diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(course_programs -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    courses,
    course_modules,
    course_topics,
    course_videos,
    enrollments,
    video_progress,
    course_programs,
);
