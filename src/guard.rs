//! Route-guard predicates.
//!
//! Pure functions over [`SessionState`] so hosts can gate navigation
//! without the guard logic living in the presentation layer. A prerender
//! context always allows: guard decisions there would block rendering on
//! session state that cannot exist yet.

use crate::session::SessionState;

/// Entry route unauthenticated users are redirected to
pub const LOGIN_PATH: &str = "/auth/login";
/// Registration route, reachable while anonymous
pub const SIGNUP_PATH: &str = "/auth/signup";

/// Where guard evaluation is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardContext {
    /// An interactive client with a live session manager
    Interactive,
    /// Server-side prerendering; no session exists and blocking would
    /// deadlock the render
    Prerender,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Redirect to [`LOGIN_PATH`], remembering where the user was headed
    RedirectToLogin { return_url: String },
}

/// Guard for routes that require a signed-in user.
pub fn evaluate_auth(ctx: GuardContext, state: &SessionState, path: &str) -> GuardDecision {
    if ctx == GuardContext::Prerender {
        return GuardDecision::Allow;
    }
    if path == LOGIN_PATH || path == SIGNUP_PATH {
        return GuardDecision::Allow;
    }
    if !state.is_authenticated {
        return GuardDecision::RedirectToLogin {
            return_url: path.to_string(),
        };
    }
    GuardDecision::Allow
}

/// Guard for routes that once required a verified user.
///
/// Verification is informational now and no longer gates access, so this
/// only checks authentication; unverified residents pass.
pub fn evaluate_verification(ctx: GuardContext, state: &SessionState, path: &str) -> GuardDecision {
    evaluate_auth(ctx, state, path)
}
