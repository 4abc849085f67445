//! Shared primitive IDs and image reference types.

use serde::{Deserialize, Serialize};

/// Monotonic instrument identifier assigned at insert.
pub type InstrumentId = u64;

/// Image shown when no external match exists for an instrument.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150?text=No+Image";

/// Reference to an instrument picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    /// Remote picture address.
    Url(String),
    /// Uploaded picture bytes.
    Blob(Vec<u8>),
    /// Sentinel cached after a lookup found nothing.
    Placeholder,
}

impl ImageRef {
    /// Returns true for the placeholder sentinel.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Address to display, when the reference has one.
    pub fn display_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Placeholder => Some(PLACEHOLDER_IMAGE_URL),
            Self::Blob(_) => None,
        }
    }
}

/// Required fields checked when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredField {
    /// Instrument name.
    Name,
    /// Category.
    Category,
    /// Cabinet location.
    Cabinet,
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Cabinet => "cabinet",
        };
        f.write_str(label)
    }
}
