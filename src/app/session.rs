use super::helpers;
use actix_session::Session;
use actix_web::HttpResponse;
use log::warn;
use serde::{Deserialize, Serialize};

// The whole per-visitor state lives in a signed cookie:
// the authenticated marker, the acting username and the
// one-shot notice queue.

const LOGGED_IN_KEY: &str = "logged_in";
const USERNAME_KEY: &str = "username";
const NOTICES_KEY: &str = "notices";

// Notice severities, matching the CSS classes in the templates.
pub const SUCCESS: &str = "success";
pub const WARNING: &str = "warning";
pub const DANGER: &str = "danger";
pub const SECONDARY: &str = "secondary";

#[derive(Debug, Serialize, Deserialize)]
pub struct Notice {
  pub category: String,
  pub message: String
}

// Explicit request-scoped identity: every protected handler
// calls this (or require_login) at the top instead of reading
// some ambient global.
pub fn authenticated_user(session: &Session) -> Option<String> {
  let logged_in = session.get::<bool>(LOGGED_IN_KEY)
    .unwrap_or(None)
    .unwrap_or(false);
  if !logged_in {
    return None;
  }
  session.get::<String>(USERNAME_KEY).unwrap_or(None)
}

// On gate denial the wrapped handler body never executes: the
// caller returns the redirect straight away.
pub fn require_login(session: &Session) -> Result<String, HttpResponse> {
  match authenticated_user(session) {
    Some(username) => Ok(username),
    None => {
      push_notice(session, WARNING, "You must login first to view the page.");
      Err(helpers::redirect("/login"))
    }
  }
}

pub fn log_in(session: &Session, username: &str) {
  if session.set(LOGGED_IN_KEY, true).is_err()
    || session.set(USERNAME_KEY, username).is_err() {
    warn!("Could not write the authenticated marker to the session");
  }
}

// Idempotent, requires no prior authentication.
pub fn log_out(session: &Session) {
  session.clear();
}

// Notices survive exactly one render: push here, drained by
// take_notices on the next rendered view. A failing cookie
// write only loses the notice, never the request.
pub fn push_notice(session: &Session, category: &str, message: &str) {
  let mut notices = session.get::<Vec<Notice>>(NOTICES_KEY)
    .unwrap_or(None)
    .unwrap_or_default();
  notices.push(Notice {
    category: category.to_string(),
    message: message.to_string()
  });
  if session.set(NOTICES_KEY, notices).is_err() {
    warn!("Could not store a notice in the session");
  }
}

pub fn take_notices(session: &Session) -> Vec<Notice> {
  let notices = session.get::<Vec<Notice>>(NOTICES_KEY)
    .unwrap_or(None)
    .unwrap_or_default();
  session.remove(NOTICES_KEY);
  notices
}
