use crate::config::Constants;
use crate::error::{WebError, WebResult};
use crate::model::chart::{ChartSearchRow, SearchOptions, SearchRequest};
use sqlx::MySqlPool;

/// Keyword search over the chart catalogue
pub struct SearchService {
    pool: MySqlPool,
}

/// Escape LIKE wildcard characters in user input
///
/// Quoting is handled by parameter binding; this only neutralizes `%`,
/// `_` and the escape character itself so raw text cannot smuggle
/// wildcards into the pattern.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Parse a raw search query string into keywords and options
///
/// Space-separated tokens; `--level <min> <max>` narrows the note-level
/// range, and `--title-only` / `--artist-only` / `--mapper-only` restrict
/// the matched fields. A flag missing its arguments ends parsing with
/// what was collected; a malformed numeric bound rejects the query.
pub fn parse_search(query: &str) -> Option<SearchRequest> {
    let mut tokens = query.split(' ');
    let mut keywords = Vec::new();
    let mut options = SearchOptions::default();

    while let Some(token) = tokens.next() {
        match token {
            "--level" => {
                let (Some(min), Some(max)) = (tokens.next(), tokens.next()) else {
                    break;
                };
                options.level_min = min.parse().ok()?;
                options.level_max = max.parse().ok()?;
            }
            "--title-only" => {
                options.artist = false;
                options.mapper = false;
            }
            "--artist-only" => {
                options.title = false;
                options.mapper = false;
            }
            "--mapper-only" => {
                options.title = false;
                options.artist = false;
            }
            keyword => keywords.push(keyword),
        }
    }

    Some(SearchRequest {
        keywords: keywords.join(" "),
        options,
    })
}

impl SearchService {
    /// Create a new search service instance
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Find charts whose enabled fields contain the keyword
    ///
    /// Enabled fields are OR-combined and ANDed with the note-level range;
    /// results come back ordered by note level descending. At least one
    /// field flag must be enabled.
    pub async fn search_chart(&self, request: &SearchRequest) -> WebResult<Vec<ChartSearchRow>> {
        if !request.options.has_enabled_field() {
            return Err(WebError::input("No search field enabled."));
        }

        let mut field_filters = Vec::new();
        if request.options.title {
            field_filters.push("meta.title LIKE CONCAT('%', ?, '%')");
        }
        if request.options.artist {
            field_filters.push("meta.artist LIKE CONCAT('%', ?, '%')");
        }
        if request.options.mapper {
            field_filters.push("meta.charter LIKE CONCAT('%', ?, '%')");
        }

        let sql = format!(
            "SELECT
                meta.chart_id,
                meta.title,
                meta.artist,
                meta.charter,
                meta.bpm,
                data.note_level
            FROM chart_meta meta
            INNER JOIN (
                SELECT chart_id, note_level
                FROM chart_data
                WHERE difficulty = {}
            ) data ON data.chart_id = meta.chart_id
            WHERE data.note_level BETWEEN ? AND ?
                AND ({})
            ORDER BY data.note_level DESC",
            Constants::DEFAULT_GAUGE_DIFFICULTY,
            field_filters.join(" OR ")
        );

        let keyword = escape_like(&request.keywords);

        let mut query = sqlx::query_as::<_, ChartSearchRow>(&sql)
            .bind(request.options.level_min)
            .bind(request.options.level_max);
        for _ in &field_filters {
            query = query.bind(&keyword);
        }

        let charts = query.fetch_all(&self.pool).await?;

        Ok(charts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_parse_plain_keywords() {
        let request = parse_search("night sky").unwrap();
        assert_eq!(request.keywords, "night sky");
        assert_eq!(request.options, SearchOptions::default());
    }

    #[test]
    fn test_parse_level_range() {
        let request = parse_search("--level 30 70 storm").unwrap();
        assert_eq!(request.options.level_min, 30);
        assert_eq!(request.options.level_max, 70);
        assert_eq!(request.keywords, "storm");
    }

    #[test]
    fn test_parse_field_flags() {
        let request = parse_search("--title-only aurora").unwrap();
        assert!(request.options.title);
        assert!(!request.options.artist);
        assert!(!request.options.mapper);

        let request = parse_search("--mapper-only someone").unwrap();
        assert!(!request.options.title);
        assert!(!request.options.artist);
        assert!(request.options.mapper);
    }

    #[test]
    fn test_parse_malformed_level_is_rejected() {
        assert!(parse_search("--level ten 70").is_none());
        assert!(parse_search("--level 10 seventy").is_none());
    }

    #[test]
    fn test_parse_truncated_level_flag_ends_parsing() {
        let request = parse_search("aurora --level").unwrap();
        assert_eq!(request.keywords, "aurora");
        assert_eq!(request.options.level_min, 0);
        assert_eq!(request.options.level_max, 180);
    }
}
