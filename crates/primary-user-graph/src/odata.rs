// crates/primary-user-graph/src/odata.rs
// ============================================================================
// Module: OData Query Helpers
// Description: Literal escaping, filter builders, and query encoding.
// Purpose: Build query strings that cannot be broken out of by input values.
// Dependencies: time, url
// ============================================================================

//! ## Overview
//! Filter values originate from input files, group names, and configuration,
//! so every string literal is escaped by doubling single quotes and every
//! query value is percent-encoded before it reaches a URL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;
use url::form_urlencoded;

// ============================================================================
// SECTION: Literals
// ============================================================================

/// Returns `value` as a quoted OData string literal.
#[must_use]
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Returns an `eq` comparison against a string literal.
#[must_use]
pub fn eq_filter(property: &str, value: &str) -> String {
    format!("{property} eq {}", string_literal(value))
}

// ============================================================================
// SECTION: Sign-In Window
// ============================================================================

/// Returns the start of a trailing window ending at `now`, truncated to whole seconds.
#[must_use]
pub fn window_start(now: OffsetDateTime, window_days: u32) -> OffsetDateTime {
    let start = now - Duration::days(i64::from(window_days));
    start.replace_nanosecond(0).unwrap_or(start)
}

/// Returns the sign-in filter for a window start and optional application.
#[must_use]
pub fn signin_filter(since: OffsetDateTime, app_filter: Option<&str>) -> String {
    let since = since.format(&Rfc3339).unwrap_or_else(|_| since.unix_timestamp().to_string());
    let mut filter = format!("createdDateTime ge {since}");
    if let Some(app) = app_filter {
        filter.push_str(" and ");
        filter.push_str(&eq_filter("appDisplayName", app));
    }
    filter
}

// ============================================================================
// SECTION: Query Encoding
// ============================================================================

/// Percent-encodes a query component, encoding spaces as `%20`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>().replace('+', "%20")
}

/// Replaces the query of `url` with the encoded parameters.
pub(crate) fn set_query(url: &mut Url, params: &[(&str, &str)]) {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&query));
}

// ============================================================================
// SECTION: Tests
// ============================================================================
