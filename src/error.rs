use thiserror::Error;

pub type StarMapResult<T> = Result<T, StarMapError>;

#[derive(Debug, Error)]
pub enum StarMapError {
    #[error("celestial renderer is not loaded")]
    RendererUnavailable,

    #[error("render surface is not attached")]
    SurfaceUnavailable,

    #[error("a star map generation is already in progress (generation {generation})")]
    GenerationInProgress { generation: u64 },

    #[error("invalid {field}: `{value}`")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("unsupported projection for this renderer: {0}")]
    UnsupportedProjection(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("invalid download filename: `{0}`")]
    InvalidFilename(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("scene capture failed: {0}")]
    Capture(String),

    #[error("platform call failed: {0}")]
    Platform(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
