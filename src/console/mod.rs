pub mod error;
pub mod handlers;
pub mod types;

pub use error::ConsoleError;
pub use handlers::Console;
pub use types::MenuChoice;
