//! Domain entities and error types
//!
//! Pure data types with no I/O: account records with their registration
//! lifecycle, notification records with their feed/user state, and the
//! typed error taxonomy used at the crate's public boundaries.

pub mod account;
pub mod errors;
pub mod notification;

pub use account::{AccountRecord, AccountType, RegistrationState};
pub use errors::{AuthError, Error};
pub use notification::{NotificationRecord, NotificationStatus, ReadState, UserActionState};
