//! Travel Forms Validation
//!
//! Pure validator functions for the booking form model, plus the
//! injectable email-directory contract used by the asynchronous
//! uniqueness check. Validators report typed failure kinds; they never
//! panic on malformed input.

pub mod boolean;
pub mod dates;
pub mod email;
pub mod error;
pub mod identity;
pub mod numeric;
pub mod string;

// Re-export all validators and the failure kinds
pub use boolean::*;
pub use dates::*;
pub use email::*;
pub use error::{DirectoryError, ValidationError};
pub use identity::*;
pub use numeric::*;
pub use string::*;
