//! File name validation and copy naming.

use dbox_core::error::AppError;
use dbox_core::result::AppResult;

/// Longest accepted name, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// Check that `name` can be used both as a display name and a storage key.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("File name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("Invalid file name: {name}")));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(AppError::validation(format!(
            "File name exceeds {MAX_NAME_BYTES} bytes"
        )));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(AppError::validation(format!(
            "File name contains a forbidden character: {name:?}"
        )));
    }
    Ok(())
}

/// Names to try, in order, for a copy of `name`.
///
/// The first candidate is `prefix + name`. Later ones insert ` (n)` before
/// the extension: `ca (1).txt`, `ca (2).txt`, up to `max_suffix`. The stem
/// is shortened when needed so every candidate fits in [`MAX_NAME_BYTES`].
pub fn copy_candidates<'a>(
    prefix: &'a str,
    name: &'a str,
    max_suffix: u32,
) -> impl Iterator<Item = String> + 'a {
    let (stem, ext) = match split_extension(name) {
        // An extension that leaves no room for the stem is kept as stem.
        (_, ext) if prefix.len() + ext.len() + 8 > MAX_NAME_BYTES => (name, ""),
        parts => parts,
    };
    std::iter::once(String::new())
        .chain((1..=max_suffix).map(|n| format!(" ({n})")))
        .map(move |suffix| {
            let room = MAX_NAME_BYTES.saturating_sub(prefix.len() + suffix.len() + ext.len());
            format!("{prefix}{}{suffix}{ext}", truncate_at_char(stem, room))
        })
}

/// Longest prefix of `s` no longer than `max` bytes, cut on a char boundary.
fn truncate_at_char(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Split at the last dot, keeping the dot with the extension. Dotfiles such
/// as `.env` have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("a.txt").is_ok());
        assert!(validate_name("report 2024 (final).pdf").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("dir/a.txt").is_err());
        assert!(validate_name("a\nb").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_copy_candidates() {
        let names: Vec<String> = copy_candidates("c", "a.txt", 2).collect();
        assert_eq!(names, vec!["ca.txt", "ca (1).txt", "ca (2).txt"]);
    }

    #[test]
    fn test_copy_candidates_without_extension() {
        let names: Vec<String> = copy_candidates("c", "Makefile", 1).collect();
        assert_eq!(names, vec!["cMakefile", "cMakefile (1)"]);

        let names: Vec<String> = copy_candidates("c", ".env", 1).collect();
        assert_eq!(names, vec!["c.env", "c.env (1)"]);
    }

    #[test]
    fn test_copy_candidates_fit_name_limit() {
        let name = format!("{}.txt", "a".repeat(MAX_NAME_BYTES - 4));
        let names: Vec<String> = copy_candidates("c", &name, 12).collect();

        for candidate in &names {
            assert!(validate_name(candidate).is_ok(), "{candidate} too long");
            assert!(candidate.starts_with("ca"));
            assert!(candidate.ends_with(".txt"));
        }
        assert_eq!(names[0].len(), MAX_NAME_BYTES);
        assert!(names[12].ends_with("a (12).txt"));
    }

    #[test]
    fn test_copy_candidates_truncate_on_char_boundary() {
        // 255 bytes; the cut for the prefix lands inside the last "é".
        let name = format!("x{}", "é".repeat(127));
        let names: Vec<String> = copy_candidates("c", &name, 1).collect();
        assert_eq!(names[0], format!("cx{}", "é".repeat(126)));
        assert!(names[1].ends_with("é (1)"));
        assert!(names.iter().all(|n| validate_name(n).is_ok()));
    }
}
