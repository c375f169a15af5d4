//! HTTP transport layer.

mod http;
mod error;
mod reqwest;
pub mod endpoints;
mod request;
mod response;

pub use http::{HttpTransport, HttpMethod, HttpRequest, HttpResponse, TransportFactory};
pub use error::TransportError;
pub use self::reqwest::{ReqwestTransport, ReqwestTransportFactory};
pub use request::RequestBuilder;
pub use response::ResponseParser;
