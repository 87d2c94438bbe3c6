pub mod config;
pub mod engine;
pub mod model;
pub mod observability;
pub mod store;

pub use config::BookingConfig;
pub use engine::{BookingEngine, Rejection, Submission, evaluate};
pub use model::{BookingRequest, Field, ReservationRecord, RoomInfo, StayRange};
pub use store::{ReservationStore, StoreError};
