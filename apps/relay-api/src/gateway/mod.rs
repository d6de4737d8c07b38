pub mod connection;
pub mod events;
pub mod fanout;
pub mod origin;
pub mod registry;
pub mod server;
pub mod session;
