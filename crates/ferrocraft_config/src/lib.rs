//! Server configuration: the `server.properties` document and the status
//! favicon.

pub mod favicon;
pub mod properties;

pub use favicon::load_favicon;
pub use properties::ServerProperties;
