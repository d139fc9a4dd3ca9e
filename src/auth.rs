//! # Authorization Gate
//!
//! Every request under `/admin` or `/api/admin` must carry a verified admin
//! session cookie. API callers are refused with a 401 JSON body; page callers
//! are redirected to the login page with a `callbackUrl` pointing back.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, Uri, header::LOCATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, unauthorized};
use crate::server::AppState;
use crate::session::{Claims, SessionKeys};

pub const LOGIN_PATH: &str = "/auth/login";

/// Which protected area, if any, a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminArea {
    Api,
    Pages,
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// 401 JSON error
    RejectApi,
    /// 303 to the login page
    RedirectToLogin,
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn admin_area(path: &str) -> Option<AdminArea> {
    if under(path, "/api/admin") {
        Some(AdminArea::Api)
    } else if under(path, "/admin") {
        Some(AdminArea::Pages)
    } else {
        None
    }
}

/// Pure gate decision from the request path and the verified session, if any.
pub fn authorize(path: &str, session: Option<&Claims>) -> GateDecision {
    let Some(area) = admin_area(path) else {
        return GateDecision::Allow;
    };

    match (session, area) {
        (Some(claims), _) if claims.is_admin() => GateDecision::Allow,
        (_, AdminArea::Api) => GateDecision::RejectApi,
        (_, AdminArea::Pages) => GateDecision::RedirectToLogin,
    }
}

/// Verified admin session, inserted by [`admin_gate`] for admin routes.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl FromRef<AppState> for Arc<SessionKeys> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.sessions)
    }
}

/// Authorization middleware layered over the whole router.
pub async fn admin_gate(
    State(sessions): State<Arc<SessionKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if admin_area(path).is_none() {
        return next.run(request).await;
    }

    let claims = match sessions.from_headers(request.headers()) {
        Some(Ok(claims)) => Some(claims),
        Some(Err(err)) => {
            tracing::debug!(error = %err, path, "Rejected admin session cookie");
            None
        }
        None => None,
    };

    match authorize(path, claims.as_ref()) {
        GateDecision::Allow => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(AdminSession(claims));
            }
            next.run(request).await
        }
        GateDecision::RejectApi => {
            let message = if claims.is_some() {
                "Admin role required"
            } else {
                "Unauthorized"
            };
            unauthorized(Some(message)).into_response()
        }
        GateDecision::RedirectToLogin => login_redirect(request.uri()),
    }
}

/// `303 See Other` to the login page carrying the original path and query.
pub fn login_redirect(original: &Uri) -> Response {
    let target = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| original.path());
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    let location = format!("{LOGIN_PATH}?callbackUrl={encoded}");

    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::SEE_OTHER, [(LOCATION, value)]).into_response(),
        Err(_) => (
            StatusCode::SEE_OTHER,
            [(LOCATION, HeaderValue::from_static(LOGIN_PATH))],
        )
            .into_response(),
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Unauthorized")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use axum::{Router, body::Body, http::Request as HttpRequest, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &[u8] = b"gate-test-secret-gate-test-secret";

    fn claims(role: Role) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role,
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn area_matching_respects_segment_boundaries() {
        assert_eq!(admin_area("/admin"), Some(AdminArea::Pages));
        assert_eq!(admin_area("/admin/brands/1/offers"), Some(AdminArea::Pages));
        assert_eq!(admin_area("/api/admin/brands"), Some(AdminArea::Api));
        assert_eq!(admin_area("/administrator"), None);
        assert_eq!(admin_area("/api/administer"), None);
        assert_eq!(admin_area("/api/brands"), None);
        assert_eq!(admin_area("/"), None);
    }

    #[test]
    fn decision_table() {
        let admin = claims(Role::Admin);
        let user = claims(Role::User);

        assert_eq!(authorize("/api/brands", None), GateDecision::Allow);
        assert_eq!(authorize("/api/admin/brands", None), GateDecision::RejectApi);
        assert_eq!(
            authorize("/api/admin/brands", Some(&user)),
            GateDecision::RejectApi
        );
        assert_eq!(
            authorize("/api/admin/brands", Some(&admin)),
            GateDecision::Allow
        );
        assert_eq!(authorize("/admin", None), GateDecision::RedirectToLogin);
        assert_eq!(
            authorize("/admin/brands/x/offers", Some(&user)),
            GateDecision::RedirectToLogin
        );
        assert_eq!(authorize("/admin", Some(&admin)), GateDecision::Allow);
    }

    async fn run_gate(request: HttpRequest<Body>) -> Response {
        async fn handler(session: AdminSession) -> String {
            session.0.email
        }
        async fn public() -> &'static str {
            "public"
        }

        let sessions = Arc::new(SessionKeys::new(SECRET, 3600, false));
        Router::new()
            .route("/api/admin/whoami", get(handler))
            .route("/admin", get(handler))
            .route("/api/brands", get(public))
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&sessions),
                admin_gate,
            ))
            .oneshot(request)
            .await
            .unwrap()
    }

    fn cookie_for(role: Role) -> String {
        let keys = SessionKeys::new(SECRET, 3600, false);
        format!("admin_token={}", keys.sign(&claims(role)).unwrap())
    }

    #[tokio::test]
    async fn api_without_cookie_is_401_json() {
        let response = run_gate(
            HttpRequest::builder()
                .uri("/api/admin/whoami")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn page_without_cookie_redirects_with_callback() {
        let response = run_gate(
            HttpRequest::builder()
                .uri("/admin?tab=offers")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login?callbackUrl=%2Fadmin%3Ftab%3Doffers"
        );
    }

    #[tokio::test]
    async fn non_admin_role_is_rejected() {
        let response = run_gate(
            HttpRequest::builder()
                .uri("/api/admin/whoami")
                .header("cookie", cookie_for(Role::User))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tampered_cookie_is_rejected() {
        let mut cookie = cookie_for(Role::Admin);
        cookie.push('x');
        let response = run_gate(
            HttpRequest::builder()
                .uri("/api/admin/whoami")
                .header("cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_cookie_reaches_handler_with_session() {
        let response = run_gate(
            HttpRequest::builder()
                .uri("/api/admin/whoami")
                .header("cookie", cookie_for(Role::Admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"ada@example.com");
    }

    #[tokio::test]
    async fn public_paths_pass_through() {
        let response = run_gate(
            HttpRequest::builder()
                .uri("/api/brands")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
