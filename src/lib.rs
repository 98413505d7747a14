//! Form state, validation and submission engine for a travel booking client.
//!
//! A screen loads the signed-in user from the shared [`cache::UserCache`] into a
//! [`form::FormSession`], edits it by dot path, and submits it through a
//! [`submit::SubmissionController`]. Checkout, booking cancellation and device
//! sessions reuse the same message and lifecycle conventions.

pub mod backend;
pub mod cache;
pub mod cancel;
pub mod checkout;
pub mod config;
pub mod devices;
pub mod dirty;
pub mod error;
pub mod form;
pub mod http;
pub mod messages;
pub mod navigate;
pub mod path;
pub mod record;
pub mod store;
pub mod submit;
pub mod trip;
pub mod utils;
pub mod validate;

pub use backend::{Backend, Booking, BookingKind};
pub use cache::UserCache;
pub use error::{BackendError, PathError, TripError, WorkflowError};
pub use form::{FormSession, FormSpec};
pub use path::{FieldPath, Path};
pub use record::{Node, Record};
pub use submit::{SubmissionState, SubmitOutcome};
