//! Request extractors that turn malformed input into 400 responses.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::config::PaginationConfig;
use crate::database::Page;
use crate::error::ApiError;

/// JSON body that has been deserialized and passed its `validator` rules
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation_error(describe(&errors)))?;

        Ok(Self(value))
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| format!("{}: {}", field, m))
                    .unwrap_or_else(|| format!("{}: invalid value", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Numeric path id; anything else is a 400
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid id"))
}

/// Query-string parameters shared by the list endpoints.
///
/// Kept as raw strings so a bad `page` or `limit` falls back to its default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub service_type: Option<String>,
    pub role: Option<String>,
}

impl ListParams {
    pub fn page(&self, config: &PaginationConfig) -> Page {
        let page = lenient(self.page.as_deref()).unwrap_or(1);
        let limit = lenient(self.limit.as_deref())
            .unwrap_or(config.default_limit)
            .min(config.max_limit);
        Page::new(page, limit)
    }

    /// A filter value, ignoring blanks
    pub fn filter<'a>(value: &'a Option<String>) -> Option<&'a str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

fn lenient(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    fn params(page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_to_missing_or_bad_values() {
        assert_eq!(params(None, None).page(&pagination()), Page::new(1, 10));
        assert_eq!(params(Some("abc"), Some("-3")).page(&pagination()), Page::new(1, 10));
        assert_eq!(params(Some("0"), Some("0")).page(&pagination()), Page::new(1, 10));
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(params(Some("3"), Some("500")).page(&pagination()), Page::new(3, 100));
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("0").is_err());
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(ListParams::filter(&Some("  ".to_string())), None);
        assert_eq!(ListParams::filter(&Some("pending".to_string())), Some("pending"));
    }
}
