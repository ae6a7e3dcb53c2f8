use thiserror::Error;

/// Typed failures surfaced by the rendering library.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Unknown color scheme '{0}'")]
    UnknownColorScheme(String),

    #[error("Unknown region '{0}'")]
    UnknownRegion(String),

    #[error("Unsupported boundary format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid boundary file: {0}")]
    InvalidBoundaries(String),

    #[error("Year column '{0}' not found in indicator table")]
    MissingYearColumn(String),

    #[error("Indicator table has no records")]
    EmptyTable,
}

pub type AtlasResult<T> = std::result::Result<T, AtlasError>;
