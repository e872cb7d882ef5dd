pub mod booking;
pub mod event;

pub use booking::{Booking, BookingInput};
pub use event::{Event, EventInput, EventMode};
