//! Pure checks that run before any network access.

mod budget;
mod validation;

pub use budget::{Exhausted, RequestBudget};
pub use validation::{is_supported_scheme, validate};
