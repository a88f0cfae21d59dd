//! Catalog query composer.
//!
//! Raw request parameters are lowered into [`CourseFilter`] values, one
//! tagged variant per filter kind, merged with last-wins precedence per
//! kind, and only then applied to a boxed Diesel query. Absent parameters
//! never produce a filter. Sort fields go through the [`CourseSort`]
//! allow-list; anything outside it falls back to the default instead of
//! reaching the SQL layer.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::catalog::schema::{course_programs, courses};
use crate::catalog::types::{CourseListParams, CourseStatus};

pub type BoxedCourseQuery<'a> = courses::BoxedQuery<'a, Pg>;

/// Absent / explicit-null / value, modelled explicitly instead of leaning
/// on loose optional checks. `Unset` contributes nothing; `Null` selects
/// rows where the column itself is NULL; `Value` constrains by the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriState<T> {
    Unset,
    Null,
    Value(T),
}

impl<T: FromStr> TriState<T> {
    /// Query strings cannot carry a literal null, so an empty value (or
    /// the token `null`) stands in for it. Unparseable values degrade to
    /// `Unset`: a malformed parameter must not invent a constraint.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unset,
            Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("null") => Self::Null,
            Some(s) => s.trim().parse().map(Self::Value).unwrap_or(Self::Unset),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseFilter {
    /// Case-insensitive substring match over name and description.
    Search(String),
    Status(CourseStatus),
    HoursBetween {
        min: Option<i32>,
        max: Option<i32>,
    },
    /// Courses mapped to any of these programs.
    Programs(Vec<Uuid>),
    /// Courses mapped to any of these specializations.
    Specializations(Vec<Uuid>),
    CreatedBetween {
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
    UpdatedBetween {
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
    /// Price ceiling. Unpriced courses satisfy any ceiling.
    PriceAtMost(BigDecimal),
    /// Only courses with no price at all.
    Unpriced,
}

impl CourseFilter {
    /// Discriminant used by [`merge_filters`]; the two price variants
    /// share a kind because they target the same column.
    fn kind(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Status(_) => "status",
            Self::HoursBetween { .. } => "hours",
            Self::Programs(_) => "programs",
            Self::Specializations(_) => "specializations",
            Self::CreatedBetween { .. } => "created",
            Self::UpdatedBetween { .. } => "updated",
            Self::PriceAtMost(_) | Self::Unpriced => "price",
        }
    }

    /// Lowers raw request parameters into filter values. Uuid lists are
    /// comma-separated; entries that fail to parse are dropped, and a
    /// present-but-unparseable list still filters (to nothing) rather
    /// than silently widening the result.
    pub fn from_params(params: &CourseListParams) -> Vec<CourseFilter> {
        let mut filters = Vec::new();

        if let Some(search) = params.search.as_deref() {
            if !search.trim().is_empty() {
                filters.push(Self::Search(search.trim().to_string()));
            }
        }
        if let Some(status) = params.status.as_deref() {
            filters.push(Self::Status(CourseStatus::from(status)));
        }
        if params.min_hours.is_some() || params.max_hours.is_some() {
            filters.push(Self::HoursBetween {
                min: params.min_hours,
                max: params.max_hours,
            });
        }
        if let Some(raw) = params.programs.as_deref() {
            filters.push(Self::Programs(parse_uuid_list(raw)));
        }
        if let Some(raw) = params.specializations.as_deref() {
            filters.push(Self::Specializations(parse_uuid_list(raw)));
        }
        if params.created_after.is_some() || params.created_before.is_some() {
            filters.push(Self::CreatedBetween {
                after: params.created_after,
                before: params.created_before,
            });
        }
        if params.updated_after.is_some() || params.updated_before.is_some() {
            filters.push(Self::UpdatedBetween {
                after: params.updated_after,
                before: params.updated_before,
            });
        }
        match TriState::<BigDecimal>::from_param(params.price_max.as_deref()) {
            TriState::Unset => {}
            TriState::Null => filters.push(Self::Unpriced),
            TriState::Value(ceiling) => filters.push(Self::PriceAtMost(ceiling)),
        }

        filters
    }
}

/// Combines filters with last-wins precedence: when two filters target
/// the same kind, the later one replaces the earlier one in place.
pub fn merge_filters(filters: Vec<CourseFilter>) -> Vec<CourseFilter> {
    let mut merged: Vec<CourseFilter> = Vec::new();
    for filter in filters {
        match merged.iter_mut().find(|m| m.kind() == filter.kind()) {
            Some(slot) => *slot = filter,
            None => merged.push(filter),
        }
    }
    merged
}

pub fn apply_filters(
    mut query: BoxedCourseQuery<'static>,
    filters: &[CourseFilter],
) -> BoxedCourseQuery<'static> {
    for filter in filters {
        query = match filter {
            CourseFilter::Search(term) => {
                let pattern = format!("%{}%", term.to_lowercase());
                query.filter(
                    courses::name
                        .ilike(pattern.clone())
                        .or(courses::description.ilike(pattern)),
                )
            }
            CourseFilter::Status(status) => query.filter(courses::status.eq(status.to_string())),
            CourseFilter::HoursBetween { min, max } => {
                if let Some(min) = min {
                    query = query.filter(courses::total_hours.ge(*min));
                }
                if let Some(max) = max {
                    query = query.filter(courses::total_hours.le(*max));
                }
                query
            }
            CourseFilter::Programs(program_ids) => {
                let mapped = course_programs::table
                    .filter(course_programs::program_id.eq_any(program_ids.clone()))
                    .select(course_programs::course_id);
                query.filter(courses::id.eq_any(mapped))
            }
            CourseFilter::Specializations(specialization_ids) => {
                let mapped = course_programs::table
                    .filter(
                        course_programs::specialization_id
                            .eq_any(specialization_ids.iter().map(|id| Some(*id)).collect::<Vec<_>>()),
                    )
                    .select(course_programs::course_id);
                query.filter(courses::id.eq_any(mapped))
            }
            CourseFilter::CreatedBetween { after, before } => {
                if let Some(after) = after {
                    query = query.filter(courses::created_at.ge(*after));
                }
                if let Some(before) = before {
                    query = query.filter(courses::created_at.le(*before));
                }
                query
            }
            CourseFilter::UpdatedBetween { after, before } => {
                if let Some(after) = after {
                    query = query.filter(courses::updated_at.ge(*after));
                }
                if let Some(before) = before {
                    query = query.filter(courses::updated_at.le(*before));
                }
                query
            }
            CourseFilter::PriceAtMost(ceiling) => query.filter(
                courses::price
                    .is_null()
                    .or(courses::price.le(Some(ceiling.clone()))),
            ),
            CourseFilter::Unpriced => query.filter(courses::price.is_null()),
        };
    }
    query
}

/// Sort allow-list. Every variant maps to a concrete ORDER BY clause; a
/// caller-supplied field outside this list falls back to [`CourseSort::Newest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSort {
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    HoursAsc,
    HoursDesc,
}

impl CourseSort {
    pub fn from_params(field: Option<&str>, dir: Option<&str>) -> Self {
        let descending = matches!(
            dir.map(str::to_ascii_lowercase).as_deref(),
            Some("desc") | Some("descending")
        );
        match field.map(str::to_ascii_lowercase).as_deref() {
            Some("created_at") => {
                if descending {
                    Self::Newest
                } else {
                    Self::Oldest
                }
            }
            Some("name") => {
                if descending {
                    Self::NameDesc
                } else {
                    Self::NameAsc
                }
            }
            Some("price") => {
                if descending {
                    Self::PriceDesc
                } else {
                    Self::PriceAsc
                }
            }
            Some("total_hours") => {
                if descending {
                    Self::HoursDesc
                } else {
                    Self::HoursAsc
                }
            }
            _ => Self::Newest,
        }
    }
}

pub fn apply_sort(query: BoxedCourseQuery<'static>, sort: CourseSort) -> BoxedCourseQuery<'static> {
    // Secondary id ordering keeps pagination stable across equal keys.
    let query = match sort {
        CourseSort::Newest => query.order(courses::created_at.desc()),
        CourseSort::Oldest => query.order(courses::created_at.asc()),
        CourseSort::NameAsc => query.order(courses::name.asc()),
        CourseSort::NameDesc => query.order(courses::name.desc()),
        CourseSort::PriceAsc => query.order(courses::price.asc()),
        CourseSort::PriceDesc => query.order(courses::price.desc()),
        CourseSort::HoursAsc => query.order(courses::total_hours.asc()),
        CourseSort::HoursDesc => query.order(courses::total_hours.desc()),
    };
    query.then_order_by(courses::id.asc())
}

fn parse_uuid_list(raw: &str) -> Vec<Uuid> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_params_produce_no_filters() {
        let filters = CourseFilter::from_params(&CourseListParams::default());
        assert!(filters.is_empty());
    }

    #[test]
    fn test_present_params_each_produce_one_filter() {
        let params = CourseListParams {
            search: Some("rust".to_string()),
            status: Some("public".to_string()),
            min_hours: Some(2),
            ..Default::default()
        };
        let filters = CourseFilter::from_params(&params);
        assert_eq!(filters.len(), 3);
        assert!(filters.contains(&CourseFilter::Search("rust".to_string())));
        assert!(filters.contains(&CourseFilter::Status(CourseStatus::Public)));
    }

    #[test]
    fn test_blank_search_is_a_no_op() {
        let params = CourseListParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(CourseFilter::from_params(&params).is_empty());
    }

    #[test]
    fn test_merge_last_wins_per_kind() {
        let merged = merge_filters(vec![
            CourseFilter::Search("old".to_string()),
            CourseFilter::Status(CourseStatus::Public),
            CourseFilter::Search("new".to_string()),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], CourseFilter::Search("new".to_string()));
        assert_eq!(merged[1], CourseFilter::Status(CourseStatus::Public));
    }

    #[test]
    fn test_price_variants_share_a_merge_kind() {
        let merged = merge_filters(vec![
            CourseFilter::Unpriced,
            CourseFilter::PriceAtMost(BigDecimal::from(10)),
        ]);
        assert_eq!(merged, vec![CourseFilter::PriceAtMost(BigDecimal::from(10))]);
    }

    #[test]
    fn test_tri_state_from_param() {
        assert_eq!(TriState::<BigDecimal>::from_param(None), TriState::Unset);
        assert_eq!(TriState::<BigDecimal>::from_param(Some("")), TriState::Null);
        assert_eq!(
            TriState::<BigDecimal>::from_param(Some("null")),
            TriState::Null
        );
        assert_eq!(
            TriState::<BigDecimal>::from_param(Some("49.90")),
            TriState::Value("49.90".parse().unwrap())
        );
        // Malformed input must not invent a constraint.
        assert_eq!(
            TriState::<BigDecimal>::from_param(Some("cheap")),
            TriState::Unset
        );
    }

    #[test]
    fn test_sort_allow_list_fallback() {
        assert_eq!(CourseSort::from_params(None, None), CourseSort::Newest);
        assert_eq!(
            CourseSort::from_params(Some("created_at"), Some("desc")),
            CourseSort::Newest
        );
        assert_eq!(
            CourseSort::from_params(Some("name"), None),
            CourseSort::NameAsc
        );
        assert_eq!(
            CourseSort::from_params(Some("price"), Some("DESC")),
            CourseSort::PriceDesc
        );
        // Not on the allow-list: never reaches the SQL layer.
        assert_eq!(
            CourseSort::from_params(Some("tenant_id; DROP TABLE"), Some("asc")),
            CourseSort::Newest
        );
    }

    #[test]
    fn test_parse_uuid_list_drops_garbage() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let raw = format!("{a}, junk,{b},");
        assert_eq!(parse_uuid_list(&raw), vec![a, b]);
        assert!(parse_uuid_list("nope").is_empty());
    }
}
