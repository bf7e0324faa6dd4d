//! Booking requests against catalog products and their status lifecycle.
//!
//! The service validates every status change against the transition table, writes the
//! change and its audit entry through a single store call, and derives dashboard
//! aggregates from the stored requests.

pub mod clock;
pub mod domain;
pub mod memory;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    BookingDraft, BookingRequest, BookingStatus, Currency, LogAction, LogId, NewBookingRequest,
    Product, ProductId, RequestId, RequestLog, ShopId,
};
pub use memory::InMemoryBookingStore;
pub use router::booking_router;
pub use service::{BookingError, BookingLifecycleService};
pub use stats::{DashboardReport, DashboardStats};
pub use store::{
    BookingStore, ProductQuery, RequestQuery, StatusChange, StatusChangeOutcome, StoreError,
};
