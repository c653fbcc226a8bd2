/// Failures surfaced by the loader and its capabilities.
///
/// Every mutator validates before touching state, so a returned error means
/// the loader is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("max must be a finite number greater than zero (got {0})")]
    InvalidMax(f64),
    #[error("progress must be a finite number (got {0})")]
    InvalidProgress(f64),
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("host could not provide a 2D drawing context")]
    MissingContext,
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("unknown shape '{0}'; expected pie or donut")]
    InvalidShape(String),
    #[error("failed to encode favicon image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("a favicon loader is already installed in this context")]
    AlreadyInstalled,
}
