//! HTTP send helper with optional retry for transient errors.
//!
//! Every backend call goes through [`send_json`]. Reads pass
//! [`READ_RETRIES`] so a flaky connection does not immediately drop the
//! dashboard into fallback data; writes pass [`NO_RETRIES`] because they
//! are best-effort intents that must not be replayed.
//!
//! ```ignore
//! let body = retry::send_json(|| client.get(url.clone()), retry::READ_RETRIES).await?;
//! ```

use std::time::Duration;

use pothole_admin_api_models::ApiErrorBody;

use crate::ApiError;

/// Retry budget for idempotent reads.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds.
pub const READ_RETRIES: u32 = 3;

/// Retry budget for writes: send once.
pub const NO_RETRIES: u32 = 0;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends a request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
/// An empty success body parses as `null`.
///
/// Retries connection errors, timeouts, HTTP 429, and HTTP 5xx up to
/// `max_retries` times with exponential backoff. Other 4xx responses are
/// permanent and surface as [`ApiError::Rejected`] carrying the backend's
/// message.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails after all retries, the
/// backend rejects it, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F, max_retries: u32) -> Result<serde_json::Value, ApiError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON parse failed.\n  url: {url}\n  parse error: {e}\n  body preview: {}",
            preview(&text)
        );
        ApiError::Json(e)
    })
}

#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, ApiError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(ApiError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if (status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
                    && attempt < max_retries
                {
                    log::warn!("  HTTP {status} from {}", response.url());
                    attempt += 1;
                    continue;
                }

                if status.is_client_error() || status.is_server_error() {
                    return Err(rejection(response).await);
                }

                return Ok(response);
            }
        }
    }
}

/// Builds [`ApiError::Rejected`] from an error response, preferring the
/// backend's `message` field over the status reason.
async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = rejection_message(status, &body);
    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_prefers_backend_message() {
        let message = rejection_message(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message":"Contractor not found"}"#,
        );
        assert_eq!(message, "Contractor not found");
    }

    #[test]
    fn rejection_falls_back_to_status_reason() {
        assert_eq!(
            rejection_message(reqwest::StatusCode::UNAUTHORIZED, "<html>nope</html>"),
            "Unauthorized"
        );
        assert_eq!(
            rejection_message(reqwest::StatusCode::NOT_FOUND, r#"{"message":""}"#),
            "Not Found"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(BODY_PREVIEW_LEN);
        let cut = preview(&text);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(cut.chars().all(|c| c == 'é'));
        assert_eq!(preview("short"), "short");
    }
}
