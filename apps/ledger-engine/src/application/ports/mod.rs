//! Application ports (interfaces to the outside world).

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
