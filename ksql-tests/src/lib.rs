mod mock;
mod streams;

pub use mock::*;

use ksql::{Client, Transport};
use log::LevelFilter;
use std::env;
use streams::streams;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the suite against a live server.
pub async fn execute_tests<T: Transport>(client: &Client<T>) {
    streams(client).await;
}
