//! Normalization parameter artifacts and their process-wide store

pub mod params;

pub use params::{from_json, load_artifact, ParameterStore};
