use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{template::Page, widgets::alert::ErrorAlert};

pub mod login;

pub const LOGIN_COOKIE: &str = "matchday_admin";

/// The one password which unlocks the admin functions.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const SESSION_HOURS: i64 = 12;

/// Proof that the holder has passed the admin gate.
///
/// Every mutating command takes a reference to one of these. It can only be
/// obtained from an [`AdminSession`] which has logged in, or from a request
/// carrying a valid admin session cookie.
#[derive(Debug, Clone)]
pub struct Admin {
    _private: (),
}

/// The admin flag together with the password typed into the login form.
#[derive(Debug, Default)]
pub struct AdminSession {
    is_admin: bool,
    pub password_input: String,
}

impl AdminSession {
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            is_admin: false,
            password_input: password.into(),
        }
    }

    /// Grants admin rights if the entered password is correct. A wrong
    /// password leaves the session as it was.
    pub fn login(&mut self) -> bool {
        if self.password_input == DEFAULT_ADMIN_PASSWORD {
            self.is_admin = true;
        }
        self.is_admin
    }

    pub fn logout(&mut self) {
        self.is_admin = false;
        self.password_input.clear();
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn admin(&self) -> Option<Admin> {
        self.is_admin.then_some(Admin { _private: () })
    }
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NotAdmin,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = match self {
            AuthError::CookieMissingOrMalformed => {
                "Your session cookie is missing or malformed. Please log in again."
            }
            AuthError::NotAdmin => {
                "Only the league admin can do that. Please log in first."
            }
        };
        let page = Page::new()
            .body(maud! {
                ErrorAlert msg=(msg);
                a href="/login" class="btn btn-primary" { "Log in" }
            })
            .render();

        (StatusCode::FORBIDDEN, Html(page.into_inner())).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginSession {
    expiry: NaiveDateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let login_cookie = match jar.get(LOGIN_COOKIE) {
            Some(cookie) => cookie,
            None => return Err(AuthError::NotAdmin),
        };

        match serde_json::from_str::<LoginSession>(login_cookie.value()) {
            Ok(t) if Utc::now().naive_utc() < t.expiry => {
                Ok(Admin { _private: () })
            }
            Ok(_) => Err(AuthError::NotAdmin),
            Err(_) => Err(AuthError::CookieMissingOrMalformed),
        }
    }
}

/// Records a successful login in the (encrypted) session cookie. The cookie
/// has no `Expires` attribute, so browsers drop it when they are closed.
pub fn set_login_cookie(
    _admin: &Admin,
    jar: PrivateCookieJar,
) -> Result<PrivateCookieJar, serde_json::Error> {
    let session = serde_json::to_string(&LoginSession {
        expiry: Utc::now().naive_utc() + TimeDelta::hours(SESSION_HOURS),
    })?;

    Ok(jar.add(
        Cookie::build((LOGIN_COOKIE, session))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

pub fn clear_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(LOGIN_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_is_not_admin() {
        let mut session = AdminSession::with_password("hunter2");
        assert!(!session.login());
        assert!(!session.is_admin());
        assert!(session.admin().is_none());
    }

    #[test]
    fn right_password_is_admin() {
        let mut session = AdminSession::with_password(DEFAULT_ADMIN_PASSWORD);
        assert!(session.login());
        assert!(session.admin().is_some());
    }

    #[test]
    fn logout_always_resets() {
        let mut session = AdminSession::default();
        session.logout();
        assert!(!session.is_admin());

        session.password_input = DEFAULT_ADMIN_PASSWORD.to_string();
        session.login();
        session.logout();
        assert!(!session.is_admin());
        assert!(session.password_input.is_empty());
        assert!(session.admin().is_none());
    }

    #[test]
    fn wrong_password_after_login_keeps_admin() {
        let mut session = AdminSession::with_password(DEFAULT_ADMIN_PASSWORD);
        session.login();
        session.password_input = "nope".to_string();
        assert!(session.login());
    }
}
