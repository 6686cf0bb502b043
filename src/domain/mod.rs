pub mod book;
pub mod errors;
pub mod lending;
pub mod reservation;
pub mod value_objects;

pub use book::*;
pub use errors::*;
pub use reservation::*;
pub use value_objects::*;
