use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Chart metadata for one song+difficulty pair
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChartInfo {
    pub chart_id: i32,
    pub title: Option<String>,
    pub difficulty: i32,
    pub note_level: i32,
    pub note_count: i32,
    pub play_count: i32,
    pub artist: Option<String>,
    pub charter: Option<String>,
    pub bpm: Option<f64>,
}

/// One chart in a search result, ordered by note level descending
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChartSearchRow {
    pub chart_id: i32,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub charter: Option<String>,
    pub bpm: Option<f64>,
    pub note_level: i32,
}

/// Which chart fields a keyword search matches, plus the level range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub level_min: i32,
    pub level_max: i32,
    pub title: bool,
    pub artist: bool,
    pub mapper: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            level_min: 0,
            level_max: 180,
            title: true,
            artist: true,
            mapper: true,
        }
    }
}

impl SearchOptions {
    /// A search with no enabled field cannot match anything
    pub fn has_enabled_field(&self) -> bool {
        self.title || self.artist || self.mapper
    }
}

/// Parsed chart search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    pub options: SearchOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_options() {
        let options = SearchOptions::default();
        assert_eq!(options.level_min, 0);
        assert_eq!(options.level_max, 180);
        assert!(options.has_enabled_field());
    }

    #[test]
    fn test_no_enabled_field() {
        let options = SearchOptions {
            title: false,
            artist: false,
            mapper: false,
            ..SearchOptions::default()
        };
        assert!(!options.has_enabled_field());
    }
}
