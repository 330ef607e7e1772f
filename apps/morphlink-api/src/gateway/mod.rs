pub mod dispatcher;
pub mod error;
pub mod events;
pub mod registry;
pub mod schema;
pub mod server;
pub mod session;
