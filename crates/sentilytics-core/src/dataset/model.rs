//! Dataset domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of rows kept in a dataset preview.
pub const PREVIEW_ROW_LIMIT: usize = 5;

/// A named, immutable snapshot of uploaded tabular text plus a bounded preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Unique identifier generated at upload time (UUID format)
    pub id: String,
    /// Original file name
    pub name: String,
    pub upload_date: DateTime<Utc>,
    /// Number of newline-delimited lines in `content`
    pub row_count: usize,
    /// First rows of `content`, each split into fields (at most [`PREVIEW_ROW_LIMIT`])
    pub preview: Vec<Vec<String>>,
    /// Full raw text
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let dataset = Dataset {
            id: "d-1".to_string(),
            name: "reviews.csv".to_string(),
            upload_date: Utc::now(),
            row_count: 1,
            preview: vec![vec!["a".to_string(), "b".to_string()]],
            content: "a,b".to_string(),
        };

        let json = serde_json::to_value(&dataset).unwrap();
        assert!(json.get("rowCount").is_some());
        assert!(json.get("uploadDate").is_some());
    }
}
