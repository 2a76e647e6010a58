//! URL canonicalisation for result deduplication.
//!
//! Two hits referring to the same page must compare equal even when they
//! differ in scheme/host capitalisation, default ports, tracking query
//! parameters, parameter order, trailing slashes, or fragments.

use url::Url;

/// Tracking query parameters stripped during canonicalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "fbclid",
    "gclid",
    "igshid",
    "mc_cid",
    "mc_eid",
    "ref",
    "si",
    "feature",
];

/// Canonicalise a URL for use as a deduplication key.
///
/// Transformations applied:
///
/// 1. Lowercase scheme and host (the `url` crate does this on parse).
/// 2. Strip default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Strip the fragment.
/// 4. Drop tracking parameters and sort the survivors by key so that
///    parameter order cannot defeat deduplication.
/// 5. Strip a trailing slash from the path (the bare-root `/` stays).
///
/// Unparseable input is returned unchanged — an opaque string still
/// deduplicates against an identical opaque string.
pub fn canonicalize(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    rebuild_query(&mut parsed);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

/// Drop tracking parameters and sort the rest, rewriting the query in
/// place (or clearing it entirely when nothing survives).
fn rebuild_query(parsed: &mut Url) {
    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if params.is_empty() {
        parsed.set_query(None);
        return;
    }

    params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let qs = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    parsed.set_query(Some(&qs));
}

fn is_tracking_param(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&lowered.as_str())
}
