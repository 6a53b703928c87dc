//! Public page route handlers.
//!
//! Each page is an askama template wrapping the view model built by
//! [`PublicPages`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lakeside_core::{ContactMessage, NewsId};

use super::forms::FormOrJson;
use crate::error::{AppError, Result};
use crate::services::pages::{
    AboutPage, ContactPage, HomePage, NewsDetailPage, NewsPage, PublicPages, ServicesPage,
};
use crate::state::AppState;

fn loader(state: &AppState, now: DateTime<Utc>) -> PublicPages<'_> {
    PublicPages::new(state.pool(), state.uploads(), &state.config().social, now)
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: HomePage,
}

#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub page: AboutPage,
}

#[derive(Template, WebTemplate)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub page: ServicesPage,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: ContactPage,
}

#[derive(Template, WebTemplate)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub page: NewsPage,
}

#[derive(Template, WebTemplate)]
#[template(path = "news_detail.html")]
pub struct NewsDetailTemplate {
    pub page: NewsDetailPage,
}

/// Home page.
///
/// GET /
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let now = Utc::now();
    let page = loader(&state, now).home(now).await?;
    Ok(HomeTemplate { page })
}

/// About page.
///
/// GET /about
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = loader(&state, Utc::now()).about().await?;
    Ok(AboutTemplate { page })
}

/// Services page.
///
/// GET /services
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn services(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = loader(&state, Utc::now()).services().await?;
    Ok(ServicesTemplate { page })
}

/// Contact page.
///
/// GET /contact
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn contact(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = loader(&state, Utc::now()).contact().await?;
    Ok(ContactTemplate { page })
}

/// Published news.
///
/// GET /news
///
/// # Errors
///
/// Returns 500 if a query fails.
#[instrument(skip(state))]
pub async fn news(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = loader(&state, Utc::now()).news().await?;
    Ok(NewsTemplate { page })
}

/// One published article.
///
/// GET /news/{id}
///
/// # Errors
///
/// Returns 404 if the article does not exist or is unpublished.
#[instrument(skip(state))]
pub async fn news_detail(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<impl IntoResponse> {
    let page = loader(&state, Utc::now()).news_detail(id).await?;
    Ok(NewsDetailTemplate { page })
}

/// Contact form fields.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// Accept a contact form submission.
///
/// POST /contact
///
/// The message is validated and logged; delivery is handled elsewhere.
///
/// # Errors
///
/// Returns 400 if name, email or message is missing or malformed.
#[instrument(skip_all)]
pub async fn submit_contact(
    FormOrJson(form): FormOrJson<ContactForm>,
) -> Result<impl IntoResponse> {
    let message = ContactMessage::parse(
        &form.name,
        &form.email,
        form.phone.as_deref(),
        form.subject.as_deref(),
        &form.message,
    )
    .map_err(|e| AppError::BadRequest(capitalize(&e.to_string())))?;

    tracing::info!(
        subject = message.subject.as_deref().unwrap_or(""),
        length = message.message.len(),
        "Contact form submitted"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for contacting us! We will get back to you soon.".to_owned(),
    }))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("email address is not valid"), "Email address is not valid");
        assert_eq!(capitalize(""), "");
    }
}
