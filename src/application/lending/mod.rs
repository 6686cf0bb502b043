mod catalog;
mod errors;
mod library_service;
mod reservation_expiry;
mod reservation_worker;

pub use catalog::CatalogSnapshot;
pub use errors::{LendingError, Result};
pub use library_service::Library;
pub use reservation_worker::{
    RESERVATION_QUEUE_CAPACITY, ReservationClient, ReservationRequest, start_reservation_worker,
};
