//! Session cookie composition.

use arbor_config::CookieConfig;

use crate::session::Session;

/// Builds a `Set-Cookie` header value for the given session.
///
/// The cookie's name and attributes are taken from the cookie
/// configuration and its value is the session key.
pub fn session_cookie(config: &CookieConfig, session: &Session) -> String {
    let mut cookie = format!("{}={}", config.name, session.key);
    if !config.path.is_empty() {
        cookie.push_str(&format!("; Path={}", config.path));
    }
    if !config.domain.is_empty() {
        cookie.push_str(&format!("; Domain={}", config.domain));
    }
    cookie.push_str(&format!(
        "; Expires={}",
        session.expires.format("%a, %d %b %Y %H:%M:%S GMT")
    ));
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}
