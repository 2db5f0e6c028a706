mod client;
mod column_def;
mod config;
mod decoder;
mod error;
mod request;
mod response;
mod retry;
mod sql_writer;
mod statement;
mod transport;
mod util;

pub use ::anyhow::Context;
pub use client::*;
pub use column_def::*;
pub use config::*;
pub use decoder::*;
pub use error::*;
pub use request::*;
pub use response::*;
pub use retry::*;
pub use sql_writer::*;
pub use statement::*;
pub use transport::*;
pub use util::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::bytes::Bytes;
pub use ::futures::future;
pub use ::serde_json::Value;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
