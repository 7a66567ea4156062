//! Language detection from filenames such as `post.en.md`.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use crate::FsError;

/// Set of recognized language identifiers.
///
/// Empty identifiers are dropped on insertion, so a name without a language
/// suffix can never match.
///
/// ```rust
/// use anyfs_composite::Languages;
///
/// let langs: Languages = ["en", "sv", ""].into_iter().collect();
/// assert!(langs.contains("sv"));
/// assert!(!langs.contains(""));
/// assert_eq!(langs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<String>", into = "Vec<String>"))]
pub struct Languages(BTreeSet<String>);

impl Languages {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a language. Empty identifiers are ignored.
    pub fn insert(&mut self, lang: impl Into<String>) -> bool {
        let lang = lang.into();
        !lang.is_empty() && self.0.insert(lang)
    }

    /// Returns `true` if `lang` is a recognized language.
    pub fn contains(&self, lang: &str) -> bool {
        self.0.contains(lang)
    }

    /// Number of languages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no languages are recognized.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the languages in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Parse a JSON array of language identifiers.
    ///
    /// # Errors
    ///
    /// - [`FsError::Deserialization`] if `json` is not an array of strings
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, FsError> {
        serde_json::from_str(json).map_err(|e| FsError::Deserialization(e.to_string()))
    }
}

impl<S: Into<String>> FromIterator<S> for Languages {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut langs = Languages::new();
        for lang in iter {
            langs.insert(lang);
        }
        langs
    }
}

impl From<Vec<String>> for Languages {
    fn from(langs: Vec<String>) -> Self {
        langs.into_iter().collect()
    }
}

impl From<Languages> for Vec<String> {
    fn from(langs: Languages) -> Self {
        langs.0.into_iter().collect()
    }
}

/// Result of [`lang_info_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangInfo {
    /// Language found in the filename, if any.
    pub lang: Option<String>,
    /// Filename without extension and without language suffix.
    pub translation_base_name: String,
}

/// Extract the language from a filename.
///
/// The final extension is stripped first. If what remains has its own
/// extension and that extension is a known language, it is the detected
/// language and is stripped as well.
///
/// ```rust
/// use anyfs_composite::{lang_info_from, Languages};
///
/// let langs: Languages = ["sv", "en"].into_iter().collect();
///
/// let info = lang_info_from(&langs, "article.sv.md");
/// assert_eq!(info.lang.as_deref(), Some("sv"));
/// assert_eq!(info.translation_base_name, "article");
///
/// let info = lang_info_from(&langs, "article.xx.md");
/// assert_eq!(info.lang, None);
/// assert_eq!(info.translation_base_name, "article.xx");
/// ```
pub fn lang_info_from(languages: &Languages, name: &str) -> LangInfo {
    let base_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let translation_base_name = strip_ext(base_name);

    let lang_ext = ext(translation_base_name);
    let file_lang = lang_ext.trim_start_matches('.');

    if !file_lang.is_empty() && languages.contains(file_lang) {
        let stem = &translation_base_name[..translation_base_name.len() - lang_ext.len()];
        return LangInfo {
            lang: Some(file_lang.to_string()),
            translation_base_name: stem.to_string(),
        };
    }

    LangInfo {
        lang: None,
        translation_base_name: translation_base_name.to_string(),
    }
}

/// Weight assigned to a file found in a layer declaring `layer_lang`.
///
/// Returns the weight and the language the file should carry: no detected
/// language gives weight 0 and the layer's language; a detected language gives
/// weight 1, or 2 when it equals the layer's language.
pub fn weight_for(detected: Option<&str>, layer_lang: &str) -> (i32, String) {
    match detected {
        None => (0, layer_lang.to_string()),
        Some(lang) if lang == layer_lang => (2, lang.to_string()),
        Some(lang) => (1, lang.to_string()),
    }
}

/// Extension including the dot, or `""`.
fn ext(name: &str) -> &str {
    name.rfind('.').map_or("", |i| &name[i..])
}

fn strip_ext(name: &str) -> &str {
    &name[..name.len() - ext(name).len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn langs() -> Languages {
        ["sv", "en", "fr"].into_iter().collect()
    }

    #[rstest]
    #[case("article.sv.md", Some("sv"), "article")]
    #[case("article.xx.md", None, "article.xx")]
    #[case("post.md", None, "post")]
    #[case("post", None, "post")]
    #[case("post.en", None, "post")]
    #[case("my.post.fr.html", Some("fr"), "my.post")]
    #[case("content/blog/post.en.md", Some("en"), "post")]
    #[case(".en.md", Some("en"), "")]
    fn detects_language(
        #[case] name: &str,
        #[case] lang: Option<&str>,
        #[case] base: &str,
    ) {
        let info = lang_info_from(&langs(), name);
        assert_eq!(info.lang.as_deref(), lang);
        assert_eq!(info.translation_base_name, base);
    }

    #[rstest]
    #[case(None, "en", 0, "en")]
    #[case(Some("fr"), "en", 1, "fr")]
    #[case(Some("en"), "en", 2, "en")]
    fn weights(
        #[case] detected: Option<&str>,
        #[case] layer: &str,
        #[case] weight: i32,
        #[case] lang: &str,
    ) {
        assert_eq!(weight_for(detected, layer), (weight, lang.to_string()));
    }

    #[test]
    fn empty_language_is_never_inserted() {
        let mut l = Languages::new();
        assert!(!l.insert(""));
        assert!(l.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn languages_from_json() {
        let l = Languages::from_json(r#"["en", "nn", ""]"#).unwrap();
        assert_eq!(l.iter().collect::<Vec<_>>(), ["en", "nn"]);
        assert!(Languages::from_json("{}").is_err());
    }
}
