pub mod data;
pub mod defaults;
pub mod io;
pub mod printing;

pub use data::{path_display, ApiSettings, ClientOptions, Config};
pub use io::ConfigError;
