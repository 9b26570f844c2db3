use std::fmt;

use serde::{Deserialize, Serialize};

/// Upload formats the service accepts, matched against the lowercased
/// extension after the last dot.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// A sanitized upload filename.
///
/// Construction goes through [`Filename::sanitize`], which strips path
/// components and every character outside `[A-Za-z0-9._-]`, so a `Filename`
/// can always be joined onto the upload directory without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filename(String);

impl Filename {
    /// Sanitize a client-supplied name into a safe filename.
    ///
    /// Keeps the final path component only, maps whitespace to `_`, drops
    /// any other character outside `[A-Za-z0-9._-]`, and strips leading
    /// dots. Returns `None` when nothing usable remains.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let last_component = raw
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();

        let cleaned: String = last_component
            .chars()
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    Some(c)
                } else if c.is_whitespace() {
                    Some('_')
                } else {
                    None
                }
            })
            .collect();

        let cleaned = cleaned.trim_start_matches('.');
        if cleaned.is_empty() {
            return None;
        }
        Some(Self(cleaned.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.0.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn has_allowed_extension(&self) -> bool {
        self.extension()
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        let name = Filename::sanitize("photo.png").expect("valid name");
        assert_eq!(name.as_str(), "photo.png");
    }

    #[test]
    fn strips_path_components() {
        let name = Filename::sanitize("../../etc/passwd.png").expect("valid name");
        assert_eq!(name.as_str(), "passwd.png");

        let name = Filename::sanitize("C:\\temp\\shot.jpg").expect("valid name");
        assert_eq!(name.as_str(), "shot.jpg");
    }

    #[test]
    fn maps_whitespace_and_drops_specials() {
        let name = Filename::sanitize("my holiday (1).jpeg").expect("valid name");
        assert_eq!(name.as_str(), "my_holiday_1.jpeg");
    }

    #[test]
    fn strips_leading_dots() {
        let name = Filename::sanitize(".hidden.png").expect("valid name");
        assert_eq!(name.as_str(), "hidden.png");
    }

    #[test]
    fn rejects_names_with_nothing_left() {
        assert!(Filename::sanitize("").is_none());
        assert!(Filename::sanitize("???").is_none());
        assert!(Filename::sanitize("..").is_none());
        assert!(Filename::sanitize("uploads/").is_none());
    }

    #[test]
    fn extension_policy() {
        let allowed = Filename::sanitize("cat.PNG").expect("valid name");
        assert_eq!(allowed.extension().as_deref(), Some("png"));
        assert!(allowed.has_allowed_extension());

        let script = Filename::sanitize("run.sh").expect("valid name");
        assert!(!script.has_allowed_extension());

        let bare = Filename::sanitize("noext").expect("valid name");
        assert_eq!(bare.extension(), None);
        assert!(!bare.has_allowed_extension());
    }
}
