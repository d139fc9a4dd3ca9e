//! # HTML Pages
//!
//! Plain server-rendered pages for the public directory and the admin area.
//! Every interpolated value goes through [`escape`]. The admin pages sit behind
//! the authorization gate like the admin API.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::activity::{OfferStatus, admin_badge};
use crate::auth::AdminSession;
use crate::error::{ApiError, RepositoryError};
use crate::handlers::types::{BrandListQuery, page_request};
use crate::models::offer;
use crate::repositories::{BrandRepository, OfferRepository, Page};
use crate::server::AppState;

const LOGIN_TEMPLATE: &str = include_str!("login.html");
const DEFAULT_CALLBACK: &str = "/admin";

/// Escape text for use in HTML content and quoted attributes.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Only same-origin relative paths are followed after sign-in.
pub fn safe_callback(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path
        }
        _ => DEFAULT_CALLBACK,
    }
}

/// Error rendered as an HTML page instead of the JSON error body.
#[derive(Debug)]
pub struct PageError(ApiError);

impl PageError {
    pub fn status(&self) -> StatusCode {
        self.0.status
    }
}

impl From<ApiError> for PageError {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

impl From<RepositoryError> for PageError {
    fn from(error: RepositoryError) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status;
        let body = format!(
            "<h1>{}</h1><p>{}</p><p><a href=\"/\">Back to the directory</a></p>",
            status.as_u16(),
            escape(&self.0.message)
        );
        (status, layout(status.canonical_reason().unwrap_or("Error"), &body)).into_response()
    }
}

type PageResult = Result<Html<String>, PageError>;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} - Brand Directory</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    ))
}

fn date(value: &DateTime<FixedOffset>) -> String {
    value.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}

fn offer_dates(offer: &offer::Model) -> String {
    match &offer.end_date {
        Some(end) => format!("{} to {}", date(&offer.start_date), date(end)),
        None => format!("from {}", date(&offer.start_date)),
    }
}

fn offer_extras(offer: &offer::Model) -> String {
    let mut extras = String::new();
    if let Some(discount) = offer.discount_percent {
        extras.push_str(&format!(" <strong>{discount}% off</strong>"));
    }
    if let Some(code) = &offer.coupon_code {
        extras.push_str(&format!(" <code>{}</code>", escape(code)));
    }
    extras
}

fn pager<T>(page: &Page<T>, base: &str, search: Option<&str>) -> String {
    let search = search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
            format!("&search={encoded}")
        })
        .unwrap_or_default();
    let link = |target: u64, label: &str| {
        format!(
            "<a href=\"{base}?page={target}&limit={}{}\">{label}</a>",
            page.limit,
            escape(&search)
        )
    };

    let mut nav = String::from("<nav>");
    if page.page > 1 {
        nav.push_str(&link(page.page - 1, "Previous"));
    }
    nav.push_str(&format!(
        " Page {} of {} ",
        page.page,
        page.total_pages().max(1)
    ));
    if page.page < page.total_pages() {
        nav.push_str(&link(page.page + 1, "Next"));
    }
    nav.push_str("</nav>");
    nav
}

/// `GET /` public brand list with search and pagination
pub async fn brand_list_page(
    State(state): State<AppState>,
    query: Result<Query<BrandListQuery>, QueryRejection>,
) -> PageResult {
    let Query(query) = query.map_err(ApiError::from)?;
    let request = page_request(query.page, query.limit)?;
    let search = query.search.as_deref();

    let page = BrandRepository::new(&state.db)
        .list_public(request, search, Utc::now())
        .await?;

    let mut body = format!(
        "<h1>Brands</h1>\n<form method=\"get\" action=\"/\">\
         <input type=\"search\" name=\"search\" value=\"{}\" placeholder=\"Search brands\">\
         <button type=\"submit\">Search</button></form>\n",
        escape(search.unwrap_or_default())
    );

    if page.items.is_empty() {
        body.push_str("<p>No brands found.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for row in &page.items {
            let brand = &row.brand;
            let preview = row
                .preview_image
                .as_deref()
                .map(|url| format!("<img src=\"{}\" alt=\"\" width=\"120\"> ", escape(url)))
                .unwrap_or_default();
            let location = brand
                .location
                .as_deref()
                .map(|location| format!(" <small>{}</small>", escape(location)))
                .unwrap_or_default();
            body.push_str(&format!(
                "<li>{preview}<a href=\"/brands/{}\">{}</a>{location} <span>{} active offers</span>\
                 <p>{}</p></li>\n",
                brand.id,
                escape(&brand.name),
                row.offers_count,
                escape(&brand.description)
            ));
        }
        body.push_str("</ul>\n");
    }
    body.push_str(&pager(&page, "/", search));

    Ok(layout("Brands", &body))
}

/// `GET /brands/{id}` public brand detail with its effective offers
pub async fn brand_detail_page(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> PageResult {
    let Path(id) = id.map_err(ApiError::from)?;
    let detail = BrandRepository::new(&state.db)
        .public_detail(id, Utc::now())
        .await?;
    let brand = &detail.brand;

    let mut body = format!(
        "<p><a href=\"/\">All brands</a></p>\n<h1><img src=\"{}\" alt=\"\" width=\"64\"> {}</h1>\n<p>{}</p>\n",
        escape(&brand.logo),
        escape(&brand.name),
        escape(&brand.description)
    );
    if let Some(location) = &brand.location {
        body.push_str(&format!("<p>Location: {}</p>\n", escape(location)));
    }

    if !detail.images.is_empty() {
        body.push_str("<section>\n");
        for image in &detail.images {
            body.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\" width=\"240\">\n",
                escape(&image.url),
                escape(image.alt_text.as_deref().unwrap_or_default())
            ));
        }
        body.push_str("</section>\n");
    }

    body.push_str("<h2>Current offers</h2>\n");
    if detail.offers.is_empty() {
        body.push_str("<p>No offers right now.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for offer in &detail.offers {
            body.push_str(&format!(
                "<li><h3>{}</h3><p>{}</p><p>{}{}</p></li>\n",
                escape(&offer.title),
                escape(&offer.description),
                offer_dates(offer),
                offer_extras(offer)
            ));
        }
        body.push_str("</ul>\n");
    }

    Ok(layout(&brand.name, &body))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageQuery {
    pub callback_url: Option<String>,
}

/// `GET /auth/login`
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let callback = safe_callback(query.callback_url.as_deref());
    Html(LOGIN_TEMPLATE.replace("__CALLBACK_URL__", &escape(callback)))
}

const LOGOUT_SCRIPT: &str = "<script>\
document.getElementById('logout').addEventListener('click', async () => {\
await fetch('/api/auth/logout', { method: 'POST', credentials: 'same-origin' });\
window.location.assign('/auth/login');\
});</script>";

/// `GET /admin` dashboard listing every brand with its counts
pub async fn admin_dashboard_page(
    State(state): State<AppState>,
    session: AdminSession,
    query: Result<Query<BrandListQuery>, QueryRejection>,
) -> PageResult {
    let Query(query) = query.map_err(ApiError::from)?;
    let request = page_request(query.page, query.limit)?;
    let search = query.search.as_deref();

    let page = BrandRepository::new(&state.db)
        .list_admin(request, search, Utc::now())
        .await?;

    let mut body = format!(
        "<header><span>Signed in as {}</span> <button id=\"logout\" type=\"button\">Sign out</button></header>\n\
         <h1>Brands</h1>\n<form method=\"get\" action=\"/admin\">\
         <input type=\"search\" name=\"search\" value=\"{}\"><button type=\"submit\">Search</button></form>\n\
         <table>\n<thead><tr><th>Name</th><th>Offers</th><th>Active offers</th><th>Images</th><th>Created</th></tr></thead>\n<tbody>\n",
        escape(&session.0.email),
        escape(search.unwrap_or_default())
    );
    for row in &page.items {
        body.push_str(&format!(
            "<tr><td><a href=\"/admin/brands/{}/offers\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.brand.id,
            escape(&row.brand.name),
            row.offer_count,
            row.effective_offer_count,
            row.image_count,
            date(&row.brand.created_at)
        ));
    }
    body.push_str("</tbody>\n</table>\n");
    body.push_str(&pager(&page, "/admin", search));
    body.push_str(LOGOUT_SCRIPT);

    Ok(layout("Admin", &body))
}

fn badge(status: OfferStatus) -> String {
    format!(
        "<span class=\"badge badge-{}\">{}</span>",
        status.label().to_lowercase(),
        status.label()
    )
}

/// `GET /admin/brands/{id}/offers` every offer of a brand with its status badge
pub async fn admin_brand_offers_page(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> PageResult {
    let Path(id) = id.map_err(ApiError::from)?;
    let brand = BrandRepository::new(&state.db).get(id).await?;
    let offers = OfferRepository::new(&state.db).list_for_brand(id).await?;

    let now = Utc::now();
    let policy = state.config.admin_status_policy;

    let mut body = format!(
        "<p><a href=\"/admin\">All brands</a></p>\n<h1>{} offers</h1>\n",
        escape(&brand.name)
    );
    if offers.is_empty() {
        body.push_str("<p>This brand has no offers yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<thead><tr><th>Title</th><th>Dates</th><th>Details</th><th>Status</th></tr></thead>\n<tbody>\n",
        );
        for offer in &offers {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&offer.title),
                offer_dates(offer),
                offer_extras(offer),
                badge(admin_badge(offer, now, policy))
            ));
        }
        body.push_str("</tbody>\n</table>\n");
    }

    Ok(layout(&format!("{} offers", brand.name), &body))
}
