use crate::{Statement, join_path};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::{self, Display},
};
use url::Url;

/// Execution hints forwarded verbatim with every request.
pub type SessionProperties = HashMap<String, Value>;

/// HTTP resource of the engine targeted by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/ksql`: statements answered with a single JSON document.
    Ksql,
    /// `/query`: queries answered with a body that stays open and streams rows.
    Query,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Ksql => "ksql",
            Endpoint::Query => "query",
        }
    }
    /// `base` with the endpoint appended to its path, the query is kept.
    pub fn url(&self, base: &Url) -> String {
        let mut url = base.clone();
        let path = join_path(url.path(), self.path());
        url.set_path(&path);
        url.into()
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON body of every request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestBody<'a> {
    pub ksql: &'a str,
    #[serde(rename = "streamsProperties")]
    pub streams_properties: &'a SessionProperties,
}

/// One outbound `POST`, handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub statement: Statement,
    pub properties: SessionProperties,
}

impl Request {
    pub fn new(endpoint: Endpoint, statement: Statement, properties: SessionProperties) -> Self {
        Self {
            endpoint,
            statement,
            properties,
        }
    }
    pub fn body(&self) -> RequestBody<'_> {
        RequestBody {
            ksql: self.statement.as_str(),
            streams_properties: &self.properties,
        }
    }
    /// Serialized JSON body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.body())
    }
}
