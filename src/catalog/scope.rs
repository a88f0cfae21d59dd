//! Viewer principal and tenant scoping.
//!
//! The identity gateway authenticates requests upstream and forwards the
//! principal as headers; this module turns those headers into a
//! [`Viewer`] and resolves the tenant scope every catalog query runs
//! under. Any ambiguity resolves to [`TenantScope::Denied`], which yields
//! empty results or NotFound instead of rows from another tenant.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_HEADER: &str = "x-viewer-role";
pub const TENANT_HEADER: &str = "x-tenant-id";
pub const CROSS_TENANT_HEADER: &str = "x-cross-tenant";
pub const STUDENT_HEADER: &str = "x-student-id";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    Anonymous,
    Student,
    Staff,
    PlatformAdmin,
}

impl From<&str> for ViewerRole {
    fn from(s: &str) -> Self {
        match s {
            "student" => Self::Student,
            "staff" => Self::Staff,
            "platform_admin" => Self::PlatformAdmin,
            _ => Self::Anonymous,
        }
    }
}

impl std::fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Student => write!(f, "student"),
            Self::Staff => write!(f, "staff"),
            Self::PlatformAdmin => write!(f, "platform_admin"),
        }
    }
}

/// The authenticated (or anonymous) principal for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewer {
    pub role: ViewerRole,
    pub tenant_id: Option<Uuid>,
    pub cross_tenant: bool,
    pub student_id: Option<Uuid>,
}

impl Viewer {
    pub fn anonymous(tenant_id: Uuid) -> Self {
        Self {
            role: ViewerRole::Anonymous,
            tenant_id: Some(tenant_id),
            cross_tenant: false,
            student_id: None,
        }
    }

    pub fn student(tenant_id: Uuid, student_id: Uuid) -> Self {
        Self {
            role: ViewerRole::Student,
            tenant_id: Some(tenant_id),
            cross_tenant: false,
            student_id: Some(student_id),
        }
    }

    /// Builds a viewer from gateway headers. Malformed values degrade the
    /// principal (unparseable uuids become `None`) so scope resolution
    /// fails closed rather than erroring in a way that reveals anything.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let header_uuid = |name: &str| header_str(name).and_then(|v| Uuid::parse_str(v).ok());

        Self {
            role: ViewerRole::from(header_str(ROLE_HEADER).unwrap_or_default()),
            tenant_id: header_uuid(TENANT_HEADER),
            cross_tenant: matches!(header_str(CROSS_TENANT_HEADER), Some("true") | Some("1")),
            student_id: header_uuid(STUDENT_HEADER),
        }
    }

    pub fn scope(&self) -> TenantScope {
        TenantScope::for_viewer(self)
    }
}

/// The predicate fragment every catalog query is restricted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Cross-tenant privileged principal; no tenant predicate.
    Global,
    /// Rows of this tenant only.
    Tenant(Uuid),
    /// Ambiguous principal; resolves every operation to an empty result
    /// or NotFound without touching the store.
    Denied,
}

impl TenantScope {
    pub fn for_viewer(viewer: &Viewer) -> Self {
        if viewer.cross_tenant {
            // The flag is honored only for the platform admin role.
            return if viewer.role == ViewerRole::PlatformAdmin {
                Self::Global
            } else {
                Self::Denied
            };
        }
        match viewer.tenant_id {
            Some(tenant_id) => Self::Tenant(tenant_id),
            None => Self::Denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn tenant() -> Uuid {
        Uuid::from_u128(0xA)
    }

    #[test]
    fn test_scope_is_tenant_bound_by_default() {
        let viewer = Viewer::anonymous(tenant());
        assert_eq!(viewer.scope(), TenantScope::Tenant(tenant()));
    }

    #[test]
    fn test_scope_denied_without_tenant() {
        let viewer = Viewer {
            role: ViewerRole::Student,
            tenant_id: None,
            cross_tenant: false,
            student_id: Some(Uuid::from_u128(1)),
        };
        assert_eq!(viewer.scope(), TenantScope::Denied);
    }

    #[test]
    fn test_cross_tenant_requires_platform_admin() {
        let mut viewer = Viewer::anonymous(tenant());
        viewer.cross_tenant = true;
        assert_eq!(viewer.scope(), TenantScope::Denied);

        viewer.role = ViewerRole::PlatformAdmin;
        assert_eq!(viewer.scope(), TenantScope::Global);
    }

    #[test]
    fn test_from_headers_parses_principal() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("student"));
        headers.insert(
            TENANT_HEADER,
            HeaderValue::from_str(&tenant().to_string()).unwrap(),
        );
        headers.insert(
            STUDENT_HEADER,
            HeaderValue::from_str(&Uuid::from_u128(7).to_string()).unwrap(),
        );

        let viewer = Viewer::from_headers(&headers);
        assert_eq!(viewer.role, ViewerRole::Student);
        assert_eq!(viewer.tenant_id, Some(tenant()));
        assert_eq!(viewer.student_id, Some(Uuid::from_u128(7)));
        assert!(!viewer.cross_tenant);
        assert_eq!(viewer.scope(), TenantScope::Tenant(tenant()));
    }

    #[test]
    fn test_from_headers_fails_closed_on_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("sudo"));
        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));

        let viewer = Viewer::from_headers(&headers);
        assert_eq!(viewer.role, ViewerRole::Anonymous);
        assert_eq!(viewer.tenant_id, None);
        assert_eq!(viewer.scope(), TenantScope::Denied);
    }
}
