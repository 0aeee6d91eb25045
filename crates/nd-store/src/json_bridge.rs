use std::fs;
use std::path::Path;

use serde::Deserialize;

use nd_core::{AnalysisReport, ContentItem};

use crate::error::{Result, StoreError};

/// Accepted input shapes: a bare array, a content snapshot, or a signal list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsDocument {
    Bare(Vec<ContentItem>),
    Content { content: Vec<ContentItem> },
    Signals { signals: Vec<ContentItem> },
}

/// Parse items from any accepted JSON shape.
pub fn parse_items(json: &str) -> Result<Vec<ContentItem>> {
    // Parse to a value first so shape errors and syntax errors stay distinct.
    let value: serde_json::Value = serde_json::from_str(json)?;
    let doc: ItemsDocument = serde_json::from_value(value).map_err(|e| {
        StoreError::InvalidData(format!(
            "expected an item array, {{\"content\": [...]}} or {{\"signals\": [...]}}: {e}"
        ))
    })?;
    Ok(match doc {
        ItemsDocument::Bare(items)
        | ItemsDocument::Content { content: items }
        | ItemsDocument::Signals { signals: items } => items,
    })
}

pub fn read_items(path: &Path) -> Result<Vec<ContentItem>> {
    let json = fs::read_to_string(path)?;
    let items = parse_items(&json)?;
    tracing::debug!("read {} items from {}", items.len(), path.display());
    Ok(items)
}

pub fn report_to_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    fs::write(path, report_to_json(report)?)?;
    Ok(())
}

pub fn read_report(path: &Path) -> Result<AnalysisReport> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{NarrativeEngine, Source};

    #[test]
    fn test_bare_array() {
        let items = parse_items(
            r#"[{"id": "1", "text": "hello", "timestamp": "2026-03-10T00:00:00Z", "source": "web"}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, Source::Web);
    }

    #[test]
    fn test_content_snapshot_shape() {
        let items = parse_items(
            r#"{"content": [
                {"id": "a", "content": "Agents ship", "timestamp": "2026-03-10T00:00:00Z",
                 "source_type": "youtube", "source_handle": "solana",
                 "metadata": {"view_count": 1200}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(items[0].text, "Agents ship");
        assert_eq!(items[0].contributor(), "solana");
        assert_eq!(items[0].metadata["view_count"], 1200);
    }

    #[test]
    fn test_signals_shape() {
        let items = parse_items(
            r#"{"signals": [
                {"id": "s1", "signal": "New agent framework", "timestamp": "2026-03-10T00:00:00Z",
                 "source": "github", "type": "repo", "strength": 0.8}
            ]}"#,
        )
        .unwrap();
        assert_eq!(items[0].kind.as_deref(), Some("repo"));
        assert_eq!(items[0].strength, Some(0.8));
    }

    #[test]
    fn test_rejects_unknown_shapes() {
        assert!(matches!(parse_items("{\"posts\": []}"), Err(StoreError::InvalidData(_))));
        assert!(matches!(parse_items("not json"), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_report_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = NarrativeEngine::default().analyze_now(&[]);
        write_report(&path, &report).unwrap();
        assert_eq!(read_report(&path).unwrap(), report);
    }
}
