pub mod booking_repository;
pub mod event_repository;

pub use booking_repository::BookingRepository;
pub use event_repository::EventRepository;
