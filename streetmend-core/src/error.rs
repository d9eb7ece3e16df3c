use thiserror::Error;

use crate::{LandmarkId, StreetId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Landmark {landmark} referenced by street {street} not found")]
    MissingLandmark {
        street: StreetId,
        landmark: LandmarkId,
    },
    #[error("Invalid street id: {0}")]
    InvalidStreet(StreetId),
    #[error("Invalid landmark id: {0}")]
    InvalidLandmark(LandmarkId),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("XML error: {0}")]
    XmlError(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
