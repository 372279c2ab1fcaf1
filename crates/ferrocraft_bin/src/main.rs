// Core modules
mod consts;
pub mod core;
pub mod network;
pub mod session;

use anyhow::Result;
use ferrocraft_config::{ServerProperties, load_favicon};
use tracing::warn;

use crate::consts::{FAVICON_PATH, PROPERTIES_PATH};
use crate::core::server::Server;

fn main() -> Result<()> {
    // Initialize logging with a custom format
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_max_level(tracing::Level::DEBUG)
        .compact()
        .init();

    let properties = ServerProperties::load(PROPERTIES_PATH);
    // Write the normalized copy back so the file always carries the full
    // recognized schema.
    if let Err(err) = properties.save(PROPERTIES_PATH) {
        warn!("[CONFIG] Could not write back {}: {}", PROPERTIES_PATH, err);
    }
    let favicon = load_favicon(FAVICON_PATH);

    let server = Server::bind(properties, favicon)?;
    server.run()
}
