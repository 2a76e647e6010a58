//! Error normalisation: maps vendor transport/HTTP failures into the
//! shared taxonomy.
//!
//! Every provider client funnels its failures through these functions so
//! that nothing vendor-shaped (status codes, HTML error pages, reqwest
//! error chains) leaks past the provider boundary. The awkward case this
//! module exists for: some vendors return `200 OK` with an HTML error
//! page where JSON was expected — detected here by content-type and
//! body-shape inspection, not status code.

use scraper::{Html, Selector};

use crate::provider::ProviderError;
use crate::types::OutcomeStatus;

/// Classify an HTTP status code into the taxonomy.
///
/// - 429 → `rate_limited`
/// - 401/403 → `auth_error`
/// - 408 and the Cloudflare-style 52x gateway timeouts → `upstream_error`
/// - any other 4xx → `upstream_error` (permanent, never retried)
/// - 5xx → `upstream_error`
///
/// 2xx and 3xx are not failures and classify as `ok`.
pub fn classify_status(code: u16) -> OutcomeStatus {
    match code {
        429 => OutcomeStatus::RateLimited,
        401 | 403 => OutcomeStatus::AuthError,
        400..=599 => OutcomeStatus::UpstreamError,
        _ => OutcomeStatus::Ok,
    }
}

/// Map a reqwest transport error into a [`ProviderError`].
///
/// Timeouts and cancellations classify as `timeout`; connect and body
/// failures as `upstream_error`. The reqwest error chain is flattened to
/// a single clean message.
pub fn from_transport(err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::new(OutcomeStatus::Timeout, "request timed out")
    } else if err.is_connect() {
        ProviderError::upstream(format!("connection failed: {err}"))
    } else {
        ProviderError::upstream(format!("transport error: {err}"))
    }
}

/// Validate a response that is supposed to carry JSON.
///
/// Checks the status code first, then guards against the 200-with-HTML
/// failure mode. On a non-2xx status the body is summarised (an HTML
/// error page is reduced to its `<title>`) so the message stays clean.
///
/// # Errors
///
/// Returns a classified [`ProviderError`] if the status is a failure or
/// the body is HTML where JSON was expected.
pub fn ensure_json(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<(), ProviderError> {
    let classified = classify_status(status);
    if classified != OutcomeStatus::Ok {
        return Err(ProviderError::new(
            classified,
            format!("HTTP {status}: {}", summarise_body(body)),
        ));
    }

    let html_content_type = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);
    if html_content_type || looks_like_html(body) {
        return Err(ProviderError::upstream(format!(
            "HTML response where JSON expected: {}",
            summarise_body(body)
        )));
    }

    Ok(())
}

/// Heuristic: does this body look like an HTML document rather than
/// structured data? Good enough for error-page detection; a JSON body
/// never starts with `<`.
pub fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with('<')
        && (trimmed[..trimmed.len().min(256)]
            .to_ascii_lowercase()
            .contains("<html")
            || trimmed.to_ascii_lowercase().starts_with("<!doctype"))
}

/// Reduce a response body to a short, log-safe summary.
///
/// HTML bodies are reduced to their `<title>` text (e.g. a Cloudflare
/// 524 page becomes "524: A timeout occurred"); anything else is
/// truncated. Raw HTML never reaches diagnostics or the caller.
pub fn summarise_body(body: &str) -> String {
    if looks_like_html(body) {
        if let Some(title) = html_title(body) {
            return title;
        }
        return "HTML error page".into();
    }
    let trimmed = body.trim();
    if trimmed.len() > 160 {
        let mut end = 160;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}

/// Extract the `<title>` text from an HTML document, if present.
fn html_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
