use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

/// One-shot message shown on the next rendered page. Travels in a cookie so
/// it survives the redirect after a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            category: "info".to_string(),
            message: message.into(),
        }
    }
}

pub fn set_flash(jar: CookieJar, flash: &Flash) -> CookieJar {
    let payload = match serde_json::to_vec(flash) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, "flash message could not be encoded");
            return jar;
        }
    };
    let mut cookie = Cookie::new(FLASH_COOKIE, Base64UrlUnpadded::encode_string(&payload));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Read and clear the pending flash message, if any.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Base64UrlUnpadded::decode_vec(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());

    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_round_trips_through_the_jar() {
        let jar = CookieJar::new();
        let jar = set_flash(jar, &Flash::success("Dog added successfully!"));
        let (jar, flash) = take_flash(jar);
        assert_eq!(flash, Some(Flash::success("Dog added successfully!")));
        let (_, flash) = take_flash(jar);
        assert_eq!(flash, None);
    }
}
