//! Context block formatting for prompts.

use futureme_ingest::CommitRecord;

/// Render retrieved records as prompt context.
///
/// Each record becomes a block of the form
///
/// ```text
/// [repo @ date sha]
/// commit message
/// ```
///
/// with a blank line between blocks. Record order is preserved, so
/// more relevant records appear first. Missing dates render empty
/// rather than as a placeholder.
pub fn format_context(records: &[CommitRecord]) -> String {
    let blocks: Vec<String> = records
        .iter()
        .map(|record| {
            let date = record
                .date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            format!(
                "[{} @ {} {}]\n{}",
                record.repo,
                date,
                record.short_sha(),
                record.text
            )
        })
        .collect();
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(sha: &str, repo: &str, text: &str) -> CommitRecord {
        CommitRecord {
            text: text.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
            author_name: "Me".to_string(),
            author_email: String::new(),
            date: Some(Utc.with_ymd_and_hms(2026, 1, 5, 12, 30, 0).unwrap()),
            url: None,
        }
    }

    #[test]
    fn test_format_single_block() {
        let records = vec![record("0123456789abcdef", "me/project", "fix parser")];
        let context = format_context(&records);
        assert_eq!(
            context,
            "[me/project @ 2026-01-05 12:30:00 0123456]\nfix parser"
        );
    }

    #[test]
    fn test_format_preserves_order_and_separates_blocks() {
        let records = vec![
            record("aaaaaaaa", "me/a", "first"),
            record("bbbbbbbb", "me/b", "second"),
        ];
        let context = format_context(&records);
        let blocks: Vec<&str> = context.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("me/a"));
        assert!(blocks[1].contains("me/b"));
    }

    #[test]
    fn test_missing_date_renders_empty() {
        let mut rec = record("aaaaaaaa", "me/a", "no date");
        rec.date = None;
        let context = format_context(&[rec]);
        assert_eq!(context, "[me/a @  aaaaaaa]\nno date");
    }

    #[test]
    fn test_empty_records_render_empty_string() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_format_is_deterministic() {
        let records = vec![
            record("aaaaaaaa", "me/a", "first"),
            record("bbbbbbbb", "me/b", "second"),
        ];
        assert_eq!(format_context(&records), format_context(&records));
    }
}
