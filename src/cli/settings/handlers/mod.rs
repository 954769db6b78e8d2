//! Setting handlers for different value shapes.

pub mod boolean;
pub mod number;
pub mod prompt;
pub mod string;

pub use boolean::*;
pub use number::*;
pub use prompt::*;
pub use string::*;
