use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationMapError {
    #[error("LocationMap failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("LocationMap failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
}

#[derive(Debug, Clone, Error)]
pub enum VariableError {
    #[error("Global variable {0} is already defined")]
    AlreadyDefined(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("Histogram sink failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Histogram sink failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[cfg(feature = "hdf5")]
    #[error("Histogram sink failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("Histogram sink could not store title {0:?}")]
    BadTitle(String),
}

#[derive(Debug, Error)]
pub enum DecDataError {
    #[error("DecData could not be created; only one instance may publish to a variable registry: {0}")]
    AlreadyDefined(#[from] VariableError),
    #[error("DecData failed due to LocationMap error: {0}")]
    MapError(#[from] LocationMapError),
    #[error("DecData failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("DecData failed due to histogram error: {0}")]
    HistogramError(#[from] HistogramError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Decode was called before DecData was successfully initialized")]
    NotInitialized,
    #[error("Decode failed to write histograms: {0}")]
    HistogramError(#[from] HistogramError),
}
