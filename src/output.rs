//! Rendering of the final totals.
//!
//! Two formats: the human-readable text summary (line count, file list,
//! directory list) and a JSON object for scripting.

use std::fmt::Write as _;

use anyhow::Result;
use yansi::Paint;

use crate::counter::CountTotals;

/// Render the totals as the text summary.
#[must_use]
pub fn render_text(totals: &CountTotals) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Lines count: {}", totals.lines.bold().green());
    let _ = writeln!(out);
    let _ = writeln!(out, "Files: {}", totals.files.join(", "));
    let _ = writeln!(out);
    let _ = writeln!(out, "Total of {} files", totals.files.len().bold());
    let _ = writeln!(out);
    let _ = writeln!(out, "Directories: {}", totals.dirs.join(", "));
    let _ = writeln!(out);
    let _ = write!(out, "Total of {} directories", totals.dirs.len().bold());
    out
}

/// Render the totals as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(totals: &CountTotals) -> Result<String> {
    Ok(serde_json::to_string_pretty(totals)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_totals() -> CountTotals {
        CountTotals {
            lines: 42,
            files: vec!["a.txt".to_string(), "b.txt".to_string()],
            dirs: vec!["sub".to_string()],
        }
    }

    #[test]
    fn test_render_text_contains_all_sections() {
        let text = render_text(&sample_totals());
        assert!(text.contains("Lines count:"));
        assert!(text.contains("42"));
        assert!(text.contains("a.txt, b.txt"));
        assert!(text.contains("Total of 2 files"));
        assert!(text.contains("sub"));
        assert!(text.contains("Total of 1 directories"));
    }

    #[test]
    fn test_render_text_empty_totals() {
        let text = render_text(&CountTotals::default());
        assert!(text.contains("Lines count:"));
        assert!(text.contains("Total of 0 files"));
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json(&sample_totals()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lines"], 42);
        assert_eq!(value["files"][0], "a.txt");
        assert_eq!(value["dirs"][0], "sub");
    }
}
