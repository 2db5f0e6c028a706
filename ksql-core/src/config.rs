use crate::{Context, Endpoint, Error, Result, truncate_long};
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::ZERO;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings of a [`Client`](crate::Client), fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    url: Url,
    max_retries: u32,
    delay: Duration,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parse a connection url like `http://localhost:8088?timeout=10&max_retries=5`.
    ///
    /// The `max_retries`, `delay` and `timeout` (seconds, fractions allowed)
    /// query parameters are taken out of the url. Missing ones are read from
    /// `KSQL_MAX_RETRIES`, `KSQL_RETRY_DELAY` and `KSQL_TIMEOUT`, then default.
    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While parsing the connection url `{}`", truncate_long!(url));
        let mut url = Url::parse(url).with_context(context)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::msg(format!(
                "KSQL connection url must start with `http://` or `https://`, found `{}://`",
                url.scheme()
            ))
            .context(context()));
        }
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut take_url_param = |key: &str, env_var: &str| {
            let value = pairs
                .iter()
                .position(|(k, _)| k == key)
                .map(|pos| pairs.remove(pos).1);
            value.or_else(|| env::var(env_var).ok())
        };
        let max_retries = take_url_param("max_retries", "KSQL_MAX_RETRIES")
            .map(|v| {
                v.parse::<u32>()
                    .with_context(|| format!("Invalid max_retries `{}`", v))
            })
            .transpose()
            .with_context(context)?
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let delay = take_url_param("delay", "KSQL_RETRY_DELAY")
            .map(|v| parse_seconds(&v))
            .transpose()
            .with_context(context)?
            .unwrap_or(DEFAULT_DELAY);
        let timeout = take_url_param("timeout", "KSQL_TIMEOUT")
            .map(|v| parse_seconds(&v))
            .transpose()
            .with_context(context)?
            .unwrap_or(DEFAULT_TIMEOUT);
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(Self {
            url,
            max_retries,
            delay,
            timeout,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
    /// Maximum number of attempts of a retried submission.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
    pub fn delay(&self) -> Duration {
        self.delay
    }
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full url of `endpoint`, query parameters left in the connection url are kept.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.url)
    }
}

fn parse_seconds(value: &str) -> Result<Duration> {
    let seconds = value
        .parse::<f64>()
        .with_context(|| format!("Invalid number of seconds `{}`", value))?;
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("Invalid number of seconds `{}`", value))
}
