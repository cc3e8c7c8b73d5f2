use thiserror::Error;

#[derive(Debug, Error)]
pub enum GodownError {
    #[error("facility not found: {0}")]
    FacilityNotFound(String),

    #[error("lot not found: {0}")]
    LotNotFound(String),

    #[error("no facilities registered for user: {0}")]
    NoFacilities(String),

    #[error("unknown crop: {0}")]
    UnknownCrop(String),

    #[error("invalid capacity: {0}")]
    InvalidCapacity(f64),

    #[error("store error: {0}")]
    Store(String),

    #[error("weather lookup failed for '{city}': {reason}")]
    Weather { city: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GodownError>;
