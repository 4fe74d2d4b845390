//! Shared types for the pre-order checkout.
//!
//! Every other crate in the workspace speaks in these types: the order draft
//! the customer fills in, the validation error map, the order number, the
//! webhook payloads and the confirmation record handed to the thank-you view.

pub mod configs;
pub mod confirmation;
pub mod draft;
pub mod newsletter;
pub mod order;
pub mod provinces;
pub mod validation;

pub use configs::*;
pub use confirmation::*;
pub use draft::*;
pub use newsletter::*;
pub use order::*;
pub use provinces::THAI_PROVINCES;
pub use validation::*;
