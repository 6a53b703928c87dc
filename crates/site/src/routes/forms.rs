//! Request body helpers shared by the route handlers.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::uploads::UploadedFile;

/// Body accepted either as JSON or as an urlencoded form.
///
/// Admin pages post JSON from scripts while the login form posts
/// `application/x-www-form-urlencoded`; handlers do not care which.
#[derive(Debug, Clone)]
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// A checkbox or boolean field: JSON booleans, or `true`/`on`/`1` text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub(crate) fn is_set(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => matches!(text.trim(), "true" | "on" | "1"),
        }
    }
}

/// A fully buffered multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<(String, UploadedFile)>,
}

impl UploadForm {
    /// Read every part. Parts without a filename are ignored.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the body is not valid multipart or exceeds
    /// the body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut files = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let Some(original_name) = field.file_name().map(str::to_owned) else {
                continue;
            };
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            files.push((
                name,
                UploadedFile {
                    original_name,
                    content_type,
                    bytes,
                },
            ));
        }
        Ok(Self { files })
    }

    /// Every file posted under `field`, in order.
    #[must_use]
    pub fn take_all(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }

    /// The single file posted under `field`.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` naming `what` when no file was posted.
    pub fn take_one(&mut self, field: &str, what: &str) -> Result<UploadedFile, AppError> {
        self.take_all(field)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::BadRequest(format!("{what} is required")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, Bytes};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Label {
        label: String,
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            original_name: name.to_owned(),
            content_type: "image/png".to_owned(),
            bytes: Bytes::from_static(b"png"),
        }
    }

    #[tokio::test]
    async fn test_form_or_json_reads_both_encodings() {
        let json = Request::builder()
            .method("PUT")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"label":"Dairy"}"#))
            .unwrap();
        let FormOrJson(body) = FormOrJson::<Label>::from_request(json, &()).await.unwrap();
        assert_eq!(body.label, "Dairy");

        let form = Request::builder()
            .method("PUT")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("label=Fresh+Vegetables"))
            .unwrap();
        let FormOrJson(body) = FormOrJson::<Label>::from_request(form, &()).await.unwrap();
        assert_eq!(body.label, "Fresh Vegetables");
    }

    #[tokio::test]
    async fn test_form_or_json_rejects_bad_json() {
        let request = Request::builder()
            .method("PUT")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let result = FormOrJson::<Label>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_take_all_and_take_one() {
        let mut form = UploadForm {
            files: vec![
                ("images".to_owned(), file("a.png")),
                ("cover".to_owned(), file("c.png")),
                ("images".to_owned(), file("b.png")),
            ],
        };
        let images = form.take_all("images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].original_name, "b.png");

        assert_eq!(form.take_one("cover", "Cover image").unwrap().original_name, "c.png");
        assert!(matches!(
            form.take_one("cover", "Cover image"),
            Err(AppError::BadRequest(msg)) if msg == "Cover image is required"
        ));
    }

    #[test]
    fn test_flag_accepts_booleans_and_checkbox_text() {
        assert!(Flag::Bool(true).is_set());
        assert!(Flag::Text("on".to_owned()).is_set());
        assert!(Flag::Text("1".to_owned()).is_set());
        assert!(!Flag::Text("false".to_owned()).is_set());
        assert!(!Flag::Text(String::new()).is_set());
    }
}
