use crate::error::Error;
use crate::solarviz_log;
use crate::Result;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Request, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

const AGENT: &str = concat!("solarviz/", env!("CARGO_PKG_VERSION"));

/// Characters kept verbatim in a path segment or query value, as `encodeURIComponent` does.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Shared HTTP(S) client for the third-party APIs. Cheap to clone.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
}

impl Upstream {
    pub fn new() -> Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(Error::UpstreamTlsRoots)?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self { client })
    }

    /// GETs `url` and returns the raw body of a 2xx answer.
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let uri: Uri = url.parse().map_err(|_err| Error::InvalidUri(url.to_string()))?;
        let request = Request::get(uri)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(Error::ResponseBuild)?;

        solarviz_log!(trace, "upstream", "GET {}", url);
        let response = self
            .client
            .request(request)
            .await
            .map_err(|err| Error::UpstreamRequest(url.to_string(), err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(url.to_string(), status.as_u16()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| Error::UpstreamBody(url.to_string(), err))?
            .to_bytes();
        Ok(body)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|err| Error::DeserializeError(url.to_string(), err))
    }
}
