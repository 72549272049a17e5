//! Object key filtering and output naming.

/// Key suffixes accepted for processing. Matching is case-sensitive.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

pub fn is_supported_key(key: &str) -> bool {
    !key.ends_with('/') && SUPPORTED_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

/// Last path segment of `key` with its final extension replaced by `.jpg`.
///
/// Everything from the last `.` on is the extension, so a name that is only
/// an extension (`.jpg`) keeps an empty stem.
pub fn output_file_name(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    format!("{}.jpg", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_key("banners/summer.jpg"));
        assert!(is_supported_key("banners/summer.jpeg"));
        assert!(is_supported_key("banners/summer.png"));
    }

    #[test]
    fn test_unsupported_keys_are_rejected() {
        assert!(!is_supported_key("banners/photo.gif"));
        assert!(!is_supported_key("banners/notes.txt"));
        assert!(!is_supported_key("banners/"));
        assert!(!is_supported_key("banners/jpg"));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert!(!is_supported_key("banners/SUMMER.JPG"));
        assert!(!is_supported_key("banners/summer.Png"));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("banners/summer.png"), "summer.jpg");
        assert_eq!(output_file_name("a/b/c/hero.jpeg"), "hero.jpg");
        assert_eq!(output_file_name("photo.final.jpg"), "photo.final.jpg");
        assert_eq!(output_file_name("banners/noext"), "noext.jpg");
    }

    #[test]
    fn test_extension_only_name_keeps_empty_stem() {
        assert_eq!(output_file_name("banners/.jpg"), ".jpg");
        assert_eq!(output_file_name("banners/.png"), ".jpg");
        assert_eq!(output_file_name("banners/.hidden"), ".jpg");
    }
}
