use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("sample rate must be a finite value greater than zero, got {0}")]
    InvalidSampleRate(f64),
    #[error("buffer length must be a finite value greater than zero, got {0}")]
    InvalidBufferLength(f64),
    #[error("fetch interval must be at least one tick")]
    InvalidFetchInterval,
    #[error("unrecognised color token: {0}")]
    InvalidColor(String),
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("acquisition failed: {0}")]
    Acquisition(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Plot(value.to_string())
    }
}
