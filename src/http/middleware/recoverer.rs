//! Panic recovery middleware.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::FutureExt;

use crate::http::request::RequestIdExt;
use crate::routing::{Middleware, Next};

/// Turn a panic anywhere downstream into a 500 for this request only.
pub fn recoverer() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let request_id = req.request_id().to_string();

        match AssertUnwindSafe(next.run(req)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                if request_id.is_empty() {
                    tracing::error!(panic = %message, "Handler panicked");
                } else {
                    tracing::error!(request_id = %request_id, panic = %message, "Handler panicked");
                }
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    })
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
