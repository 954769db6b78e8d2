pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod handle;
pub mod log;
pub mod media;
pub mod request;
pub mod sheet;
pub mod table;
pub mod transport;
