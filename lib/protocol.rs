mod command;
mod error;
mod handler;
mod notification;

pub use command::*;
pub use error::*;
pub use handler::*;
pub use notification::*;
