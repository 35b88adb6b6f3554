mod credits;
mod helpers;

pub mod op;

pub use credits::{Credits, CreditsConversionError};
pub use helpers::parse_boolean_flag;
