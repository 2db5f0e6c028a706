//! Async client for the HTTP interface of KSQL.
//!
//! ```rust,no_run
//! use ksql::{CreateAsDef, SessionProperties, ValueFormat, stream::TryStreamExt};
//!
//! # async fn run() -> ksql::Result<()> {
//! let client = ksql::connect("http://localhost:8088?timeout=10")?;
//! client
//!     .create_stream(
//!         "pageviews",
//!         [("viewtime", "BIGINT"), ("userid", "VARCHAR")],
//!         "pageviews_topic",
//!         ValueFormat::Json,
//!     )
//!     .await?;
//! client
//!     .create_stream_as(
//!         CreateAsDef::stream("pageviews_user1", "pageviews")
//!             .with_conditions(["userid = 'User_1'"]),
//!     )
//!     .await?;
//! let rows = client.query(
//!     "SELECT * FROM pageviews_user1",
//!     SessionProperties::new(),
//!     Default::default(),
//! );
//! let mut rows = std::pin::pin!(rows);
//! while let Some(row) = rows.try_next().await? {
//!     println!("{}", row);
//! }
//! # Ok(())
//! # }
//! ```
pub use ksql_core::*;
pub use ksql_http::*;

/// Client talking to the engine over HTTP.
pub type KsqlClient = Client<HttpTransport>;

/// Create a [`KsqlClient`] from a connection url, see [`ClientConfig::from_url`].
pub fn connect(url: &str) -> Result<KsqlClient> {
    let config = ClientConfig::from_url(url)?;
    let transport = HttpTransport::new(&config)?;
    Ok(Client::new(transport, config))
}
