//! Work-item identifiers derived from file paths.

use std::path::Path;

/// The final path component with its last extension removed.
///
/// Only one extension is stripped: `archive.tar.gz` becomes `archive.tar`.
///
/// Returns `None` when there is nothing sensible to return, so callers cannot
/// silently proceed with a partial identifier:
/// - the final component has no `.` (`README`)
/// - the stem would be empty (`.bashrc`)
/// - the path has no final component (`/`, `..`)
///
/// # Examples
///
/// ```
/// use dirclaim::identifier::extract_identifier;
///
/// assert_eq!(extract_identifier("/data/run1/report.txt").as_deref(), Some("report"));
/// assert_eq!(extract_identifier("archive.tar.gz").as_deref(), Some("archive.tar"));
/// assert_eq!(extract_identifier("/data/run1/README"), None);
/// ```
pub fn extract_identifier<P: AsRef<Path>>(path: P) -> Option<String> {
    let name = path.as_ref().file_name()?.to_string_lossy();
    let (stem, _extension) = name.rsplit_once('.')?;

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directory_and_extension() {
        assert_eq!(
            extract_identifier("/data/run1/report.txt").as_deref(),
            Some("report")
        );
        assert_eq!(extract_identifier("a/b/report.txt").as_deref(), Some("report"));
    }

    #[test]
    fn strips_only_the_last_extension() {
        assert_eq!(
            extract_identifier("archive.tar.gz").as_deref(),
            Some("archive.tar")
        );
        assert_eq!(
            extract_identifier("/x/y/a.b.c.d").as_deref(),
            Some("a.b.c")
        );
    }

    #[test]
    fn no_extension_yields_none() {
        assert_eq!(extract_identifier("/data/run1/README"), None);
        assert_eq!(extract_identifier("plain"), None);
    }

    #[test]
    fn dotfile_yields_none() {
        assert_eq!(extract_identifier("/home/user/.bashrc"), None);
    }

    #[test]
    fn missing_final_component_yields_none() {
        assert_eq!(extract_identifier("/"), None);
        assert_eq!(extract_identifier(".."), None);
        assert_eq!(extract_identifier(""), None);
    }

    #[test]
    fn trailing_dot_keeps_stem() {
        assert_eq!(extract_identifier("report.").as_deref(), Some("report"));
    }

    #[test]
    fn dots_in_directories_are_ignored() {
        assert_eq!(
            extract_identifier("/data/v1.2/results").as_deref(),
            None
        );
        assert_eq!(
            extract_identifier("/data/v1.2/results.csv").as_deref(),
            Some("results")
        );
    }
}
