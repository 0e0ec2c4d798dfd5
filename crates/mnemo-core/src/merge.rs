use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::store::{MemoryStore, HANDOFF_DOC};

/// Start marker of the machine-owned section. The full line carries the
/// capture timestamp; matching is on this prefix only.
pub const SECTION_BEGIN: &str = "<!-- mnemo:begin";
pub const SECTION_END: &str = "<!-- mnemo:end -->";

/// Render the auto-captured section: start marker with timestamp, one
/// bullet per classified line, end marker.
pub fn render_section(lines: &[String], now: DateTime<Utc>) -> String {
    let mut out = format!("{} {} -->\n", SECTION_BEGIN, now.format("%Y-%m-%dT%H:%M:%SZ"));
    for line in lines {
        out.push_str(&bullet(line));
        out.push('\n');
    }
    out.push_str(SECTION_END);
    out
}

/// Replace the marker-delimited section in place, or prepend a new one.
/// Everything outside the markers is returned byte-for-byte unchanged.
/// A begin marker whose end marker a manual edit deleted is treated as
/// the section to replace, so at most one marker pair ever survives.
pub fn replace_section(existing: &str, section: &str) -> String {
    if let Some(start) = existing.find(SECTION_BEGIN) {
        let rest = &existing[start..];
        let end = match rest.find(SECTION_END) {
            Some(at) => start + at + SECTION_END.len(),
            // Orphaned begin marker: replace through the end of its line.
            None => start + rest.find('\n').unwrap_or(rest.len()),
        };
        return format!("{}{}{}", &existing[..start], section, &existing[end..]);
    }
    if existing.is_empty() {
        format!("{section}\n")
    } else {
        format!("{section}\n\n{existing}")
    }
}

/// Parse the capture timestamp out of an existing section start marker.
pub fn section_timestamp(document: &str) -> Option<DateTime<Utc>> {
    let start = document.find(SECTION_BEGIN)?;
    let line = document[start..].lines().next()?;
    let raw = line
        .strip_prefix(SECTION_BEGIN)?
        .trim()
        .trim_end_matches("-->")
        .trim();
    raw.parse::<DateTime<Utc>>().ok()
}

/// Document name for a daily log.
pub fn daily_log_name(date: NaiveDate) -> String {
    format!("{}.md", date.format("%Y-%m-%d"))
}

/// True when a document name follows the dated-log pattern.
pub fn is_daily_log_name(name: &str) -> bool {
    name.strip_suffix(".md")
        .is_some_and(|stem| NaiveDate::parse_from_str(stem, "%Y-%m-%d").is_ok())
}

/// Append timestamped entries to a daily log body, creating the dated
/// header on first use. Prior lines are never rewritten.
pub fn append_daily_log(
    existing: Option<&str>,
    date: NaiveDate,
    entries: &[String],
    now: DateTime<Utc>,
) -> String {
    let mut out = match existing {
        Some(body) => body.to_string(),
        None => format!("# {}\n", date.format("%Y-%m-%d")),
    };
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for entry in entries {
        out.push_str(&format!(
            "- **{}** — {}\n",
            now.format("%H:%M"),
            strip_bullet(entry)
        ));
    }
    out
}

/// Replace (or create) the handoff document's auto-captured section.
/// Returns false without touching any document when there is nothing to merge.
pub fn merge_handoff(
    store: &MemoryStore,
    lines: &[String],
    now: DateTime<Utc>,
) -> Result<bool, CoreError> {
    if lines.is_empty() {
        return Ok(false);
    }
    let existing = store.read_document(HANDOFF_DOC)?.unwrap_or_default();
    let updated = replace_section(&existing, &render_section(lines, now));
    store.write_document(HANDOFF_DOC, &updated)?;
    Ok(true)
}

/// Append entries to today's daily log, creating it lazily.
/// Returns false without touching any document when there is nothing to merge.
pub fn merge_daily_log(
    store: &MemoryStore,
    entries: &[String],
    now: DateTime<Utc>,
) -> Result<bool, CoreError> {
    if entries.is_empty() {
        return Ok(false);
    }
    let date = now.date_naive();
    let name = daily_log_name(date);
    let existing = store.read_document(&name)?;
    let updated = append_daily_log(existing.as_deref(), date, entries, now);
    store.write_document(&name, &updated)?;
    Ok(true)
}

fn bullet(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.starts_with("- ") {
        trimmed.to_string()
    } else {
        format!("- {trimmed}")
    }
}

fn strip_bullet(line: &str) -> String {
    line.trim().trim_start_matches("- ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, h, m, 0).unwrap()
    }

    #[test]
    fn test_render_section() {
        let section = render_section(
            &["Implemented login endpoint".into(), "- Added validation".into()],
            ts(12, 0),
        );
        assert_eq!(
            section,
            "<!-- mnemo:begin 2026-08-28T12:00:00Z -->\n\
             - Implemented login endpoint\n\
             - Added validation\n\
             <!-- mnemo:end -->"
        );
    }

    #[test]
    fn test_replace_keeps_human_prose_intact() {
        let doc = "# Project\n\nHuman notes above.\n\n\
                   <!-- mnemo:begin 2026-08-27T09:00:00Z -->\n- old\n<!-- mnemo:end -->\n\n\
                   Human notes below.\n";
        let updated = replace_section(doc, &render_section(&["new".into()], ts(12, 0)));
        assert!(updated.starts_with("# Project\n\nHuman notes above.\n\n<!-- mnemo:begin"));
        assert!(updated.ends_with("<!-- mnemo:end -->\n\nHuman notes below.\n"));
        assert!(!updated.contains("- old"));
        assert!(updated.contains("- new"));
        // Exactly one marker pair survives.
        assert_eq!(updated.matches(SECTION_BEGIN).count(), 1);
        assert_eq!(updated.matches(SECTION_END).count(), 1);
    }

    #[test]
    fn test_replace_is_idempotent_outside_markers() {
        let doc = "prose before\n<!-- mnemo:begin x -->\n- a\n<!-- mnemo:end -->\nprose after\n";
        let section = render_section(&["b".into()], ts(1, 2));
        let once = replace_section(doc, &section);
        let twice = replace_section(&once, &section);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_orphan_begin_marker_is_replaced_not_duplicated() {
        // A manual edit deleted the end marker; only the begin line remains.
        let doc = "# Project\n\nHuman notes.\n\n<!-- mnemo:begin 2026-08-27T09:00:00Z -->\nMore notes.\n";
        let updated = replace_section(doc, &render_section(&["new".into()], ts(12, 0)));
        assert_eq!(updated.matches(SECTION_BEGIN).count(), 1);
        assert_eq!(updated.matches(SECTION_END).count(), 1);
        assert!(updated.starts_with("# Project\n\nHuman notes.\n\n<!-- mnemo:begin 2026-08-28"));
        assert!(updated.ends_with("<!-- mnemo:end -->\nMore notes.\n"));
        assert_eq!(section_timestamp(&updated), Some(ts(12, 0)));
    }

    #[test]
    fn test_orphan_begin_marker_at_end_of_document() {
        let doc = "Notes.\n<!-- mnemo:begin 2026-08-27T09:00:00Z -->";
        let updated = replace_section(doc, &render_section(&["x".into()], ts(3, 0)));
        assert_eq!(updated.matches(SECTION_BEGIN).count(), 1);
        assert!(updated.starts_with("Notes.\n<!-- mnemo:begin"));
        assert!(updated.ends_with(SECTION_END));
    }

    #[test]
    fn test_prepend_when_no_section() {
        let updated = replace_section("Existing notes.\n", "<!-- mnemo:begin t -->\n- x\n<!-- mnemo:end -->");
        assert_eq!(
            updated,
            "<!-- mnemo:begin t -->\n- x\n<!-- mnemo:end -->\n\nExisting notes.\n"
        );
    }

    #[test]
    fn test_section_alone_in_new_document() {
        let updated = replace_section("", "<!-- mnemo:begin t -->\n- x\n<!-- mnemo:end -->");
        assert_eq!(updated, "<!-- mnemo:begin t -->\n- x\n<!-- mnemo:end -->\n");
    }

    #[test]
    fn test_section_timestamp_roundtrip() {
        let doc = replace_section("", &render_section(&["x".into()], ts(12, 30)));
        assert_eq!(section_timestamp(&doc), Some(ts(12, 30)));
        assert_eq!(section_timestamp("no markers here"), None);
    }

    #[test]
    fn test_daily_log_name() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert_eq!(daily_log_name(date), "2026-08-28.md");
        assert!(is_daily_log_name("2026-08-28.md"));
        assert!(!is_daily_log_name("HANDOFF.md"));
        assert!(!is_daily_log_name("2026-13-99.md"));
        assert!(!is_daily_log_name("2026-08-28.txt"));
    }

    #[test]
    fn test_daily_log_appends_only() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let first = append_daily_log(None, date, &["Implemented login".into()], ts(9, 15));
        assert_eq!(first, "# 2026-08-28\n- **09:15** — Implemented login\n");

        let second = append_daily_log(Some(&first), date, &["- Fixed tests".into()], ts(11, 40));
        assert!(second.starts_with(&first));
        assert!(second.ends_with("- **11:40** — Fixed tests\n"));
    }

    #[test]
    fn test_merge_handoff_noop_on_empty() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        assert!(!merge_handoff(&store, &[], ts(1, 0)).unwrap());
        assert!(store.read_document(HANDOFF_DOC).unwrap().is_none());
    }

    #[test]
    fn test_merge_daily_log_noop_on_empty() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        assert!(!merge_daily_log(&store, &[], ts(1, 0)).unwrap());
        assert!(store.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_merge_paths_create_documents() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        assert!(merge_handoff(&store, &["did a thing".into()], ts(2, 0)).unwrap());
        assert!(merge_daily_log(&store, &["did a thing".into()], ts(2, 0)).unwrap());
        assert!(store.read_document(HANDOFF_DOC).unwrap().is_some());
        assert!(store.read_document("2026-08-28.md").unwrap().is_some());
    }
}
