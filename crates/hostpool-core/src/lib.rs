//! Core types: hosts, slots, time windows, bookings, tracing

pub mod booking;
pub mod host;
pub mod slot;
pub mod time;
pub mod timezone;
pub mod tracing;

pub use booking::{BookingOutcome, BookingRequest, Invitee};
pub use host::{Host, HostRef};
pub use slot::Slot;
pub use time::{
    MAX_WINDOW_DAYS, MIN_LEAD_SECONDS, TimeWindow, WindowError, canonical, normalize_window,
    parse_field, parse_instant,
};
pub use timezone::{DEFAULT_TIMEZONE, canonical_timezone};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
