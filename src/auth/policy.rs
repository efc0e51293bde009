//! Route protection. `authorize` is the whole policy; `is_gated` decides
//! which requests it runs for.

/// Root of every protected page
pub const DASHBOARD: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Deny,
    Redirect(String),
}

/// Signed-in users belong on the dashboard; everyone else may only see the
/// public pages.
pub fn authorize(is_logged_in: bool, path: &str) -> AuthDecision {
    let is_on_dashboard = path.starts_with(DASHBOARD);
    match (is_on_dashboard, is_logged_in) {
        (true, true) => AuthDecision::Allow,
        (true, false) => AuthDecision::Deny,
        (false, true) => AuthDecision::Redirect(DASHBOARD.to_string()),
        (false, false) => AuthDecision::Allow,
    }
}

/// Prefixes (after the leading slash) that never pass through the gate
const UNGATED_PREFIXES: [&str; 3] = ["api", "_next/static", "_next/image"];

/// Whether the gate runs for `path`. API routes, static asset pipelines and
/// PNG files are served without a policy check.
pub fn is_gated(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if UNGATED_PREFIXES.iter().any(|prefix| rest.starts_with(prefix)) {
        return false;
    }
    !path.ends_with(".png")
}
