use http::{HeaderMap, header};

pub const TOKEN_COOKIE: &str = "token";

/// Attributes of the session cookie that carries the JWT.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: u64,
}

impl CookieSettings {
    pub fn session_cookie(&self, token: &str) -> String {
        self.render(token, self.max_age_secs)
    }

    pub fn cleared_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Strict; Max-Age={}",
            TOKEN_COOKIE, value, max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Finds cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
