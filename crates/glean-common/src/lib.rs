pub mod error;
pub mod glean;
