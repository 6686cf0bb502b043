pub mod library_manager;

pub use library_manager::*;
