use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{Admin, AdminSession, clear_login_cookie, set_login_cookie},
    template::Page,
    util_resp::{StandardResponse, bad_request, error_page, server_error, success},
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize, Default)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_page(
    admin: Option<Admin>,
    Query(NextQuery { next }): Query<NextQuery>,
) -> StandardResponse {
    if admin.is_some() {
        return bad_request(
            Page::new()
                .admin(&admin)
                .body(maud! {
                    ErrorAlert
                        msg = "You are already logged in as the league admin.";
                })
                .render(),
        );
    }

    let next = local_path(next.as_deref());

    success(
        Page::new()
            .body(maud! {
                h1 { "Admin login" }
                form method="post" action="/login" {
                    input type="hidden" name="next" value=(next);
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" placeholder="Password";
                    }
                    button type="submit" class="btn btn-primary" { "Log in" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    password: String,
    #[serde(default)]
    next: Option<String>,
}

pub async fn do_login(
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut session = AdminSession::with_password(form.password);
    session.login();

    let Some(admin) = session.admin() else {
        tracing::info!("rejected admin login with a wrong password");
        // todo: password rate limiting
        return bad_request(
            Page::new()
                .body(maud! {
                    ErrorAlert msg =
                        "Incorrect password. Please return to the previous page
                         and try again.";
                })
                .render(),
        )
        .into_response();
    };

    let jar = match set_login_cookie(&admin, jar) {
        Ok(jar) => jar,
        Err(e) => {
            tracing::error!("failed to encode login session: {e}");
            let r: StandardResponse =
                server_error(error_page("Could not start a session."));
            return r.into_response();
        }
    };

    tracing::info!("admin logged in");
    (jar, Redirect::to(&local_path(form.next.as_deref()))).into_response()
}

pub async fn do_logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    tracing::info!("admin logged out");
    (clear_login_cookie(jar), Redirect::to("/"))
}

/// Reduces a user supplied redirect target to a path on this site, so that
/// the login form can't be used to send people elsewhere.
fn local_path(next: Option<&str>) -> String {
    let Some(next) = next.filter(|next| !next.is_empty()) else {
        return "/".to_string();
    };

    Url::parse("http://localhost")
        .and_then(|base| base.join(next))
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| "/".to_string())
}
