//! File path helpers

use std::path::PathBuf;

/// Expand a user-supplied path to an absolute path
///
/// `~` and `~/...` resolve against the home directory; relative paths
/// resolve against the current directory. Components are not canonicalized,
/// so the file does not need to exist yet.
///
/// ```text
/// expand_path("~/.dataportal/dataportal.json") // -> /home/user/.dataportal/dataportal.json
/// expand_path("mart.duckdb")                   // -> /current/dir/mart.duckdb
/// expand_path("/srv/mart.duckdb")              // -> /srv/mart.duckdb
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => home.join(&rest[1..]),
                None => PathBuf::from(path),
            }
        }
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        assert_eq!(
            expand_path("/srv/mart.duckdb"),
            PathBuf::from("/srv/mart.duckdb")
        );
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(
            expand_path("  /srv/mart.duckdb  "),
            PathBuf::from("/srv/mart.duckdb")
        );
    }

    #[test]
    fn test_expand_path_bare_name() {
        let result = expand_path("mart.duckdb");
        assert!(result.is_absolute());
        assert_eq!(result, std::env::current_dir().unwrap().join("mart.duckdb"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.dataportal/dataportal.json");
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".dataportal/dataportal.json"));
        if let Some(home) = dirs::home_dir() {
            assert!(result.starts_with(home));
        }
    }

    #[test]
    fn test_expand_path_tilde_only() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_expand_path_tilde_in_name_is_literal() {
        let result = expand_path("~backup.duckdb");
        assert!(result.ends_with("~backup.duckdb"));
    }

    #[test]
    fn test_expand_path_empty_is_current_dir() {
        assert!(expand_path("   ").is_absolute());
    }
}
