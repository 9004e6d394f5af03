//! Expander (§4.2).
//!
//! Expands each collected path into the set of entries the listing writer
//! will assign line numbers to: directories are listed one level deep
//! (`.`/`..` filtered, byte-wise ascending sort with prefix tie-break),
//! files are passed through unchanged. A missing directory silently
//! contributes nothing (§7 Silent policy).

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// Expand a single collected path into zero or more concrete entries.
pub fn expand(path: &str) -> Vec<String> {
    let p = Path::new(path);
    if p.is_dir() {
        expand_dir(path)
    } else {
        vec![path.to_string()]
    }
}

fn expand_dir(dir: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name != "." && name != "..")
        .collect();

    names.sort_by(|a, b| byte_wise_cmp(a.as_bytes(), b.as_bytes()));

    names
        .into_iter()
        .map(|name| join(dir, &name))
        .collect()
}

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Byte-wise lexicographic comparison, with the shorter string ordering
/// first when one is a prefix of the other.
fn byte_wise_cmp(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn non_directory_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        File::create(&file).unwrap();
        let got = expand(file.to_str().unwrap());
        assert_eq!(got, vec![file.to_str().unwrap().to_string()]);
    }

    #[test]
    fn directory_expands_sorted_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("b")).unwrap();
        File::create(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("nested")).unwrap();

        let got = expand(dir.path().to_str().unwrap());
        let names: Vec<String> = got
            .iter()
            .map(|p| Path::new(p).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "sub"]);
    }

    #[test]
    fn missing_directory_is_silently_empty() {
        let got = expand("/this/path/does/not/exist/at/all");
        assert!(got.is_empty());
    }

    #[test]
    fn prefix_sorts_first() {
        let mut names = vec!["ab".to_string(), "a".to_string(), "abc".to_string()];
        names.sort_by(|a, b| byte_wise_cmp(a.as_bytes(), b.as_bytes()));
        assert_eq!(names, vec!["a", "ab", "abc"]);
    }
}
