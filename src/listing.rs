//! Listing Writer & Parser (§4.3, §4.4).
//!
//! The writer assigns each surviving path a 1-based line number and
//! formats `"<n>\t<path>\n"` lines; the parser reads those lines back
//! after the editor exits and produces an `edited[]` array indexed by the
//! original line number, where a missing index means "delete".

use std::path::Path;

use crate::error::{ListingParseError, VidirError};
use crate::normalize::normalize_display;

/// Build the original listing: filters out entries whose basename is `.`
/// or `..`, normalises each surviving path for display and assigns 1-based
/// line numbers in survival order.
pub fn build_listing(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    paths
        .into_iter()
        .filter(|p| {
            let basename = Path::new(p).file_name();
            !matches!(basename.and_then(|b| b.to_str()), Some(".") | Some(".."))
        })
        .map(|p| normalize_display(&p))
        .collect()
}

/// Render the listing as the temp file content the editor will see.
pub fn render_listing(original: &[String]) -> String {
    let mut out = String::new();
    for (i, path) in original.iter().enumerate() {
        out.push_str(&(i + 1).to_string());
        out.push('\t');
        out.push_str(path);
        out.push('\n');
    }
    out
}

/// Parse the edited temp file content into `edited[0..n-1]`, where `None`
/// means the line for that original index is gone (delete).
pub fn parse_listing(content: &str, n: usize) -> Result<Vec<Option<String>>, VidirError> {
    let mut edited: Vec<Option<String>> = vec![None; n];
    let mut seen = vec![false; n];

    for (line_no, raw_line) in content.lines().enumerate() {
        if raw_line.is_empty() {
            continue;
        }
        let line_no = line_no + 1;

        let tab_pos = raw_line
            .find('\t')
            .ok_or(ListingParseError::MissingTab { line: line_no })?;
        let (num_str, rest) = raw_line.split_at(tab_pos);
        let rest = &rest[1..]; // drop the tab itself

        if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
            Err(ListingParseError::BadIndex { line: line_no })?;
        }
        let index: usize = num_str
            .parse()
            .map_err(|_| ListingParseError::IndexOverflow { line: line_no })?;

        if index == 0 || index > n {
            Err(ListingParseError::IndexOutOfRange { index, max: n })?;
        }
        let slot = index - 1;
        if seen[slot] {
            Err(ListingParseError::DuplicateIndex { index })?;
        }
        seen[slot] = true;

        let target = rest.trim_end_matches([' ', '\t', '\r']);
        edited[slot] = Some(normalize_display(target));
    }

    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_dot_and_dotdot_basenames() {
        let listing = build_listing(vec!["a/.".to_string(), "a/..".to_string(), "a/b".to_string()]);
        assert_eq!(listing, vec!["./a/b"]);
    }

    #[test]
    fn render_round_trips_through_parse_identity() {
        let original = build_listing(vec!["a".to_string(), "b".to_string()]);
        let content = render_listing(&original);
        let edited = parse_listing(&content, original.len()).unwrap();
        assert_eq!(edited, vec![Some("./a".to_string()), Some("./b".to_string())]);
    }

    #[test]
    fn reordering_lines_has_no_effect_on_identity() {
        let original = build_listing(vec!["a".to_string(), "b".to_string()]);
        let content = render_listing(&original);
        let reordered: String = content.lines().rev().map(|l| format!("{l}\n")).collect();
        let edited = parse_listing(&reordered, original.len()).unwrap();
        assert_eq!(edited, vec![Some("./a".to_string()), Some("./b".to_string())]);
    }

    #[test]
    fn missing_line_means_delete() {
        let edited = parse_listing("1\t./a\n", 2).unwrap();
        assert_eq!(edited, vec![Some("./a".to_string()), None]);
    }

    #[test]
    fn trailing_whitespace_trimmed() {
        let edited = parse_listing("1\t./a  \t\r\n", 1).unwrap();
        assert_eq!(edited, vec![Some("./a".to_string())]);
    }

    #[test]
    fn missing_tab_is_an_error() {
        let err = parse_listing("1 ./a\n", 1).unwrap_err();
        assert!(matches!(
            err,
            VidirError::ListingParse(ListingParseError::MissingTab { line: 1 })
        ));
    }

    #[test]
    fn non_digit_index_is_an_error() {
        let err = parse_listing("x\t./a\n", 1).unwrap_err();
        assert!(matches!(
            err,
            VidirError::ListingParse(ListingParseError::BadIndex { line: 1 })
        ));
    }

    #[test]
    fn duplicate_index_is_an_error() {
        let err = parse_listing("1\t./a\n1\t./b\n", 2).unwrap_err();
        assert!(matches!(
            err,
            VidirError::ListingParse(ListingParseError::DuplicateIndex { index: 1 })
        ));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let err = parse_listing("5\t./a\n", 1).unwrap_err();
        assert!(matches!(
            err,
            VidirError::ListingParse(ListingParseError::IndexOutOfRange { index: 5, max: 1 })
        ));
    }
}
