//! Request body extractor accepting JSON or URL-encoded forms.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body decoded from `application/x-www-form-urlencoded` when the request
/// says so, otherwise from JSON. Decoding failures go through the
/// `FormConfig`/`JsonConfig` error handlers registered on the app.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<T> JsonOrForm<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for JsonOrForm<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.content_type().eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
            let form = web::Form::<T>::from_request(req, payload);
            Box::pin(async move { form.await.map(|form| Self(form.into_inner())) })
        } else {
            let json = web::Json::<T>::from_request(req, payload);
            Box::pin(async move { json.await.map(|json| Self(json.into_inner())) })
        }
    }
}
