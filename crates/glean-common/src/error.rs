/// Error types shared across the solution guide crates.
///
/// These cover failures that happen before any request is served, such as a
/// missing credential. Request-time failures of the Glean API are reported by
/// `GleanClientError`; application-specific errors should be defined in each
/// binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
}
