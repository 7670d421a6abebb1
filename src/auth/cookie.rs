use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Reads and writes the HTTP-only session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    /// `max_age` follows the session token's lifetime so the browser drops
    /// the cookie when the token inside it expires.
    pub fn new(name: impl Into<String>, secure: bool, max_age: chrono::Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age: Duration::seconds(max_age.num_seconds()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token carried by the request's session cookie, if any.
    pub fn extract(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value_trimmed().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn attach(&self, jar: CookieJar, token: impl Into<String>) -> CookieJar {
        jar.add(self.build(token.into(), self.max_age))
    }

    /// Expire the cookie on the client.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), Duration::ZERO))
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}
