use thiserror::Error;

use crate::core::types::BlockPos;

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("No gene data at {0}")]
    NoGeneData(BlockPos),

    #[error("Genotype is not identified")]
    Unidentified,

    #[error("Crop at {0} is already pollinated")]
    AlreadyPollinated(BlockPos),

    #[error("Not a crop on farmland: {0}")]
    NotACrop(BlockPos),

    #[error("Fertility {0} does not fit the chunk byte format")]
    FertilityOutOfRange(i32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Item tag error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FarmError>;
