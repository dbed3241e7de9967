use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use shared::api::error::ErrorBody;

/// Request body decoded from json, or from a urlencoded form when the
/// content type says so. A request with no content type is read as json, or
/// as `T::default()` when the body is empty. Rejections use the same json
/// error body as the routes and are always a 4xx other than 422
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .map_or(false, |m| {
            m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()
        })
}

fn reject(status: StatusCode, message: String) -> Response {
    // Bodies that parse but hold the wrong types are plain bad requests
    let status = match status {
        StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
        status => status,
    };
    (status, Json(ErrorBody::new(message))).into_response()
}

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| reject(rejection.status(), rejection.body_text()))?;
            Ok(Self(value))
        } else if !req.headers().contains_key(CONTENT_TYPE) {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| reject(rejection.status(), rejection.body_text()))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Self(T::default()));
            }
            let Json(value) = Json::<T>::from_bytes(&bytes)
                .map_err(|rejection| reject(rejection.status(), rejection.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| reject(rejection.status(), rejection.body_text()))?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod test {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        assert!(is_form(&headers));
    }

    #[test]
    fn test_reject_downgrades_unprocessable() {
        let response = reject(StatusCode::UNPROCESSABLE_ENTITY, "bad type".into());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = reject(StatusCode::UNSUPPORTED_MEDIA_TYPE, "no json".into());
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
