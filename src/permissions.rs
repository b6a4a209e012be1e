use crate::models::session::Session;

/// The grant that satisfies every permission check.
pub const GLOBAL_WILDCARD: &str = "*";

/// Evaluates whether the session's granted permissions satisfy
/// `required`.
///
/// Rules, in order:
/// 1. An empty `required` is always satisfied.
/// 2. Without a session, nothing else is.
/// 3. A granted `"*"` satisfies everything.
/// 4. A verbatim grant of `required` satisfies it.
/// 5. A `required` of the form `"<prefix>.*"` is satisfied by any grant
///    under `<prefix>.` (the dot boundary is mandatory: `"bookingsX2"`
///    does not satisfy `"bookingsX.*"`).
///
/// Wildcards only expand on the request side: a user *holding*
/// `"bookings.*"` is not thereby granted a concrete `"bookings.read"`.
/// That asymmetry is inherited from the access-control model and must
/// not be widened here.
///
/// Pure and stateless: no I/O, no side effects.
pub fn has_permission(session: Option<&Session>, required: &str) -> bool {
    if required.is_empty() {
        return true;
    }
    let Some(session) = session else {
        return false;
    };

    let granted = &session.user.permissions;
    if granted.contains(GLOBAL_WILDCARD) {
        return true;
    }
    if granted.contains(required) {
        return true;
    }
    if let Some(prefix) = required.strip_suffix(".*") {
        let scope = format!("{prefix}.");
        return granted
            .iter()
            .any(|grant| grant == GLOBAL_WILDCARD || grant.starts_with(&scope));
    }

    false
}
