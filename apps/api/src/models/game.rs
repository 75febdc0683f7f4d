use serde::{Deserialize, Serialize};

/// Display metadata for one game, as reported by the storefront.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub app_id: u32,
    pub name: String,
    pub header_image: String,
    pub short_description: String,
    pub genres: Vec<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub release_date: Option<String>,
    pub is_free: bool,
}

impl GameMetadata {
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            app_id: self.app_id,
            name: self.name.clone(),
            header_image: self.header_image.clone(),
            genres: self.genres.clone(),
        }
    }
}

/// The slice of game metadata attached to a surfaced review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub app_id: u32,
    pub name: String,
    pub header_image: String,
    pub genres: Vec<String>,
}

impl GameSummary {
    /// Summary used when metadata could not be fetched.
    pub fn unknown(app_id: u32) -> Self {
        Self {
            app_id,
            ..Default::default()
        }
    }
}

/// A storefront search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub app_id: u32,
    pub name: String,
    pub tiny_image: String,
}
