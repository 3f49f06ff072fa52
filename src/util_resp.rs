use axum::{
    extract::multipart::MultipartError,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect, Response},
};
use hypertext::{Rendered, prelude::*};

use crate::{
    store::StoreError, template::Page, validation::FormError,
    widgets::alert::ErrorAlert,
};

pub fn see_other_ok(r: Redirect) -> StandardResponse {
    Ok(SuccessResponse::SeeOther(r))
}

pub fn bad_request(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::BadRequest(html))
}

pub fn success(html: Rendered<String>) -> StandardResponse {
    Ok(SuccessResponse::Success(html))
}

pub fn server_error(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::ServerError(html))
}

/// Renders a full page containing just an error message.
pub fn error_page(msg: &str) -> Rendered<String> {
    Page::new()
        .body(maud! {
            ErrorAlert msg=(msg);
        })
        .render()
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

pub enum SuccessResponse {
    Success(Rendered<String>),
    SeeOther(Redirect),
    Csv(String),
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(html) => {
                Html(html.into_inner()).into_response()
            }
            SuccessResponse::SeeOther(redirect) => redirect.into_response(),
            SuccessResponse::Csv(body) => {
                ([(CONTENT_TYPE, "text/csv; charset=utf-8")], body)
                    .into_response()
            }
        }
    }
}

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(Rendered<String>),
    NotFound(()),
    ServerError(Rendered<String>),
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        match self {
            FailureResponse::BadRequest(html) => {
                (StatusCode::BAD_REQUEST, Html(html.into_inner()))
                    .into_response()
            }
            FailureResponse::NotFound(()) => (
                StatusCode::NOT_FOUND,
                Html(error_page("No such page or document.").into_inner()),
            )
                .into_response(),
            FailureResponse::ServerError(html) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Html(html.into_inner()))
                    .into_response()
            }
        }
    }
}

impl From<StoreError> for FailureResponse {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => {
                tracing::debug!("{e}");
                FailureResponse::NotFound(())
            }
            e => {
                tracing::error!("store operation failed: {e}");
                FailureResponse::ServerError(error_page(
                    "The league store could not complete that request. \
                     Please try again.",
                ))
            }
        }
    }
}

impl From<FormError> for FailureResponse {
    fn from(e: FormError) -> Self {
        tracing::debug!("rejected form: {e}");
        FailureResponse::BadRequest(error_page(&format!(
            "Could not save that: {e}. Please go back and try again."
        )))
    }
}

impl From<MultipartError> for FailureResponse {
    fn from(e: MultipartError) -> Self {
        tracing::debug!("malformed upload: {e}");
        FailureResponse::BadRequest(error_page(
            "The upload could not be read. Please go back and try again.",
        ))
    }
}
