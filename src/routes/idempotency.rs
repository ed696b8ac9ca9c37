use poem::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    web::Json,
    Endpoint, Error, IntoResponse, Request, Response, Result,
};

use super::error::MyError;
use crate::domain::idempotency::{
    Fingerprint, GuardError, IdempotencyError, IdempotencyGuard, IdempotencyKey, RecordKey,
    ResponseSnapshot,
};

pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";
pub const IDEMPOTENCY_STATUS_HEADER: &str = "X-Idempotency-Status";
pub const IDEMPOTENT_REPLAY: &str = "IDEMPOTENT_REPLAY";

/// Runs a mutating endpoint at most once per `X-Idempotency-Key` and scope.
///
/// Only 2xx responses are recorded; anything else is returned as is and
/// frees the key for a retry.
pub async fn guard_mutation<E: Endpoint>(next: E, mut req: Request) -> Result<Response> {
    let Some(guard) = req.data::<IdempotencyGuard>().cloned() else {
        tracing::error!("no idempotency guard attached to the route");
        return Err(reject(IdempotencyError::Store(anyhow::anyhow!(
            "missing idempotency guard"
        ))));
    };
    let key = match read_key(&req) {
        Ok(key) => key,
        Err(e) => return Err(reject(e)),
    };
    let scope = format!("{} {}", req.method(), req.uri().path());
    let body = req.take_body().into_bytes().await?;
    let fingerprint = Fingerprint::of_body(&body);
    req.set_body(body);

    let execution = guard
        .execute(RecordKey::new(scope, key), Some(fingerprint), move || async move {
            let resp = next.call(req).await?.into_response();
            if !resp.status().is_success() {
                return Err(Error::from_response(resp));
            }
            ResponseSnapshot::capture(resp).await
        })
        .await;

    match execution {
        Ok(execution) if execution.replayed => Ok(replay(execution.response)),
        Ok(execution) => Ok(restore(execution.response)),
        Err(GuardError::Operation(e)) => Err(e),
        Err(GuardError::Rejected(e)) => Err(reject(e)),
    }
}

fn read_key(req: &Request) -> std::result::Result<IdempotencyKey, IdempotencyError> {
    match req.headers().get(IDEMPOTENCY_KEY_HEADER) {
        None => Err(IdempotencyError::MissingKey),
        Some(value) => {
            let value = value.to_str().map_err(|_| IdempotencyError::InvalidKey)?;
            IdempotencyKey::parse(Some(value))
        }
    }
}

fn restore(snapshot: ResponseSnapshot) -> Response {
    let mut builder = Response::builder().status(snapshot.status);
    for header in snapshot.headers {
        builder = builder.header(header.name, header.value);
    }
    builder.body(snapshot.body)
}

/// A recorded creation is replayed as a plain success.
fn replay(snapshot: ResponseSnapshot) -> Response {
    let status = match snapshot.status {
        StatusCode::CREATED => StatusCode::OK,
        status => status,
    };
    let mut resp = restore(snapshot);
    resp.set_status(status);
    resp.headers_mut().insert(
        IDEMPOTENCY_STATUS_HEADER,
        HeaderValue::from_static(IDEMPOTENT_REPLAY),
    );
    resp
}

fn reject(e: IdempotencyError) -> Error {
    let status = match &e {
        IdempotencyError::MissingKey | IdempotencyError::InvalidKey => StatusCode::BAD_REQUEST,
        IdempotencyError::KeyConflict | IdempotencyError::ConcurrentInProgress => {
            StatusCode::CONFLICT
        }
        IdempotencyError::Store(source) => {
            tracing::error!(error.cause_chain = ?source, error.message = %source, "idempotency store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let mut resp = Json(MyError::new_error(&e))
        .with_status(status)
        .into_response();
    if matches!(e, IdempotencyError::ConcurrentInProgress) {
        resp.headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from_static("1"));
    }
    Error::from_response(resp)
}
