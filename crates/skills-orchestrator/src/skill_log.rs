//! The write-into-skill algorithm (spec §4.5, §6): locate a known H2
//! section heading; if absent, append a new section at EOF; otherwise
//! insert the new timestamped entry immediately after the heading and
//! before the next `## ` heading. This is the mechanism by which the
//! Orchestrator feeds execution outcomes back into the skill document for
//! subsequent runs (spec §1's "skill-learning feedback cycle").

use chrono::{DateTime, Utc};

pub const SUCCESS_CASES_HEADING: &str = "Success Cases";
pub const FAILURE_CASES_HEADING: &str = "Failure Cases";
pub const OPERATOR_FEEDBACK_HEADING: &str = "Operator Feedback";

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Insert a `### [YYYY-MM-DD HH:MM UTC]\n<body>` entry under `## {heading}`
/// in `text`, preserving every prior section byte-for-byte (spec §8
/// scenario 6) — the insertion point is found by scanning for the heading
/// line's byte offset and splicing there, never by tokenizing the document
/// into lines and rejoining it, which would normalize CRLF line endings and
/// the trailing-newline count of everything else in the file. Appends a new
/// section at EOF if the heading is absent.
pub fn append_entry(text: &str, heading: &str, body: &str, at: DateTime<Utc>) -> String {
    let entry = format!("### [{}]\n{}", format_timestamp(at), body.trim());
    let heading_line = format!("## {heading}");

    match find_heading_line_end(text, &heading_line) {
        Some(insert_at) => {
            let newline = if text[..insert_at].ends_with("\r\n") { "\r\n" } else { "\n" };
            let mut out = String::with_capacity(text.len() + entry.len() + newline.len());
            out.push_str(&text[..insert_at]);
            out.push_str(&entry);
            out.push_str(newline);
            out.push_str(&text[insert_at..]);
            out
        }
        None => {
            let mut out = text.trim_end().to_string();
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&heading_line);
            out.push('\n');
            out.push_str(&entry);
            out.push('\n');
            out
        }
    }
}

/// Find the byte offset just past the end of the line (including its line
/// terminator, if any) whose trimmed content matches `heading_line`.
fn find_heading_line_end(text: &str, heading_line: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']).trim();
        if trimmed == heading_line {
            return Some(offset + line.len());
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn appends_new_section_when_heading_absent() {
        let original = "Goal text here.\n";
        let updated = append_entry(original, SUCCESS_CASES_HEADING, "looks good", fixed_time());
        assert!(updated.starts_with("Goal text here."));
        assert!(updated.contains("## Success Cases"));
        assert!(updated.contains("### [2026-03-05 14:30 UTC]"));
        assert!(updated.contains("looks good"));
    }

    #[test]
    fn inserts_immediately_after_existing_heading_preserving_prior_entries() {
        let original = "Goal.\n\n## Success Cases\n### [2026-01-01 00:00 UTC]\nFirst run.\n\n## Failure Cases\nNone yet.\n";
        let updated = append_entry(original, SUCCESS_CASES_HEADING, "second run", fixed_time());

        let heading_pos = updated.find("## Success Cases").unwrap();
        let new_entry_pos = updated.find("### [2026-03-05 14:30 UTC]").unwrap();
        let old_entry_pos = updated.find("### [2026-01-01 00:00 UTC]").unwrap();
        let failure_heading_pos = updated.find("## Failure Cases").unwrap();

        assert!(heading_pos < new_entry_pos);
        assert!(new_entry_pos < old_entry_pos);
        assert!(old_entry_pos < failure_heading_pos);
        assert!(updated.contains("First run."));
        assert!(updated.contains("None yet."));
    }

    #[test]
    fn byte_for_byte_preserves_unrelated_sections() {
        let original = "Goal.\n\n## Operator Feedback\nSome prior note.\n";
        let updated = append_entry(original, FAILURE_CASES_HEADING, "timed out", fixed_time());
        assert!(updated.contains("## Operator Feedback\nSome prior note."));
        assert!(updated.contains("## Failure Cases"));
        assert!(updated.contains("timed out"));
    }

    #[test]
    fn preserves_crlf_line_endings_and_does_not_touch_other_sections() {
        let original = "Goal.\r\n\r\n## Success Cases\r\n### [2026-01-01 00:00 UTC]\r\nFirst run.\r\n\r\n## Failure Cases\r\nNone yet.\r\n";
        let updated = append_entry(original, SUCCESS_CASES_HEADING, "second run", fixed_time());

        assert!(updated.starts_with("Goal.\r\n\r\n## Success Cases\r\n"));
        assert!(updated.contains("### [2026-03-05 14:30 UTC]\r\nsecond run\r\n### [2026-01-01 00:00 UTC]\r\nFirst run.\r\n"));
        assert!(updated.ends_with("## Failure Cases\r\nNone yet.\r\n"));
        assert!(!updated.contains("\n\r"));
    }

    #[test]
    fn preserves_unusual_trailing_newline_count_elsewhere_in_the_file() {
        let original = "Goal.\n\n\n## Success Cases\nExisting.\n\n\n## Failure Cases\nNone yet.\n\n\n";
        let updated = append_entry(original, SUCCESS_CASES_HEADING, "new one", fixed_time());

        assert!(updated.starts_with("Goal.\n\n\n## Success Cases\n"));
        assert!(updated.ends_with("## Failure Cases\nNone yet.\n\n\n"));
    }

    #[test]
    fn heading_match_tolerates_surrounding_whitespace() {
        let original = "Goal.\n\n## Success Cases   \nExisting.\n";
        let updated = append_entry(original, SUCCESS_CASES_HEADING, "new one", fixed_time());
        // Only one "## Success Cases" heading should exist afterward, not a
        // duplicate section appended at EOF.
        assert_eq!(updated.matches("## Success Cases").count(), 1);
    }
}
