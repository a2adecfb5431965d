use std::sync::Arc;

use crate::core::models::http::{HttpRequest, HttpResponse, TransportError};

/// Port for sending HTTP requests.
///
/// Implementations live in `adapters::http`. API clients depend only on
/// this trait, so tests can script responses without a network.
pub trait HttpTransport: Send + Sync {
    /// Send one request and read the whole response.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}
