use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use ksql_core::{
    Bytes, ClientConfig, Context, Error, KsqlError, Request, Response, Result, Transport,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use std::time::Duration;
use url::Url;

/// [`Transport`] over HTTP/1.1, backed by a `reqwest` client.
///
/// The configured timeout bounds the connection and every single read of the
/// body, so a streaming query can stay open as long as the engine keeps
/// sending rows or heartbeats.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .read_timeout(config.timeout())
            .build()
            .context("While building the HTTP client")?;
        log::debug!("HTTP transport to `{}`", config.url());
        Ok(Self {
            client,
            url: config.url().clone(),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn map_error(error: reqwest::Error, timeout: Duration, context: impl FnOnce() -> String) -> Error {
    if error.is_timeout() {
        KsqlError::Timeout(format!("no answer within {:?}: {}", timeout, error)).into()
    } else {
        Error::new(error).context(context())
    }
}

impl Transport for HttpTransport {
    type Body = BoxStream<'static, Result<Bytes>>;

    async fn send(&self, request: Request) -> Result<Response<Self::Body>> {
        let url = request.endpoint.url(&self.url);
        let context = || format!("While sending to `{}`:\n{}", url, request.statement);
        let body = request.to_json().with_context(context)?;
        log::trace!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| map_error(e, self.timeout, context))?;
        let status = response.status().as_u16();
        let timeout = self.timeout;
        let endpoint = request.endpoint;
        let body = response
            .bytes_stream()
            .map_err(move |e| {
                map_error(e, timeout, || {
                    format!("While reading the body of a `{}` response", endpoint)
                })
            })
            .boxed();
        Ok(Response::new(status, body))
    }
}
