//! Domain models shared by the auth and api services

pub mod court_request;
pub mod role;
pub mod user;

// Re-export for convenience
pub use court_request::{CourtRequest, Decision, RequestFilter, RequestStatus, RequestWithOwner};
pub use role::Role;
pub use user::{PendingVerification, PublicUser, User};
