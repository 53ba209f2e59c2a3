// WHY: Raw speaker labels, annotator names and fan-fiction tags all spell characters differently
// Curated bins fold the variants onto one canonical name per character

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::screenplay::strip_continuation;

/// Outcome of resolving a raw label against the bins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    /// Label matched an alias (or canonical name) of a bin
    Canonical(String),
    /// Label is outside the bins; title-cased identity mapping
    Fallback(String),
}

impl NameResolution {
    pub fn as_str(&self) -> &str {
        match self {
            NameResolution::Canonical(name) | NameResolution::Fallback(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            NameResolution::Canonical(name) | NameResolution::Fallback(name) => name,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, NameResolution::Canonical(_))
    }
}

/// Curated character bins: canonical name to alias set, inverted for lookup
#[derive(Debug, Clone, Default)]
pub struct CharacterBins {
    canonical_names: Vec<String>,
    /// lowercased alias -> index into `canonical_names`
    alias_index: HashMap<String, usize>,
}

impl CharacterBins {
    /// Build bins from `(canonical, aliases)` pairs in priority order
    ///
    /// An alias claimed by two bins stays with the first. Each canonical name is also
    /// registered as an alias of its own bin so canonical names resolve to themselves.
    pub fn from_bins<I, N, A, S>(bins: I) -> Self
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = Self::default();

        for (canonical, aliases) in bins {
            let canonical = canonical.into();
            let index = result.canonical_names.len();

            for alias in aliases {
                result.register_alias(alias.as_ref(), index, &canonical);
            }
            result.register_alias(&canonical.clone(), index, &canonical);
            result.canonical_names.push(canonical);
        }

        debug!(
            "Loaded {} character bins with {} aliases",
            result.canonical_names.len(),
            result.alias_index.len()
        );

        result
    }

    fn register_alias(&mut self, alias: &str, index: usize, canonical: &str) {
        let key = alias.trim().to_lowercase();
        if let Some(&existing) = self.alias_index.get(&key) {
            if existing != index {
                warn!(
                    "Alias '{}' of '{}' already belongs to '{}'; keeping first",
                    key, canonical, self.canonical_names[existing]
                );
            }
            return;
        }
        self.alias_index.insert(key, index);
    }

    /// Parse a JSON object mapping canonical name to an array of aliases
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("Character bins are not valid JSON")?;
        let Value::Object(map) = value else {
            anyhow::bail!("Character bins must be a JSON object of name -> [aliases]");
        };

        let mut bins = Vec::with_capacity(map.len());
        for (canonical, aliases) in map {
            let Value::Array(aliases) = aliases else {
                anyhow::bail!("Aliases for '{}' must be an array", canonical);
            };
            let aliases = aliases
                .into_iter()
                .map(|alias| match alias {
                    Value::String(alias) => Ok(alias),
                    other => Err(anyhow::anyhow!(
                        "Alias {} for '{}' is not a string",
                        other,
                        canonical
                    )),
                })
                .collect::<Result<Vec<_>>>()?;
            bins.push((canonical, aliases));
        }

        Ok(Self::from_bins(bins))
    }

    /// Load bins from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read character bins {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse character bins {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.canonical_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_names.is_empty()
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical_names
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonical_names.iter().any(|canonical| canonical == name)
    }

    /// Resolve a raw label: case-insensitive, continuation marker ignored
    pub fn resolve(&self, raw_label: &str) -> NameResolution {
        let base = strip_continuation(raw_label.trim()).trim_end();
        match self.alias_index.get(&base.to_lowercase()) {
            Some(&index) => NameResolution::Canonical(self.canonical_names[index].clone()),
            None => NameResolution::Fallback(title_case(base)),
        }
    }

    /// Resolve a raw label to its final character name
    pub fn canonical_name(&self, raw_label: &str) -> String {
        self.resolve(raw_label).into_name()
    }
}

/// Capitalize the first letter of every word and lowercase the rest
///
/// A word starts at any letter that does not follow another letter, so
/// `dr. lecter` becomes `Dr. Lecter` and `o'brien` becomes `O'Brien`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bins() -> CharacterBins {
        CharacterBins::from_json_str(
            r#"{
                "Hannibal": ["hannibal lecter", "dr. lecter", "HANNIBAL"],
                "Will Graham": ["will", "will graham"],
                "Jack Crawford": ["jack", "jack crawford", "will"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_is_canonical_matches_bin_names_only() {
        let bins = sample_bins();
        assert!(bins.is_canonical("Will Graham"));
        assert!(!bins.is_canonical("will graham"));
        assert!(!bins.is_canonical("dr. lecter"));
        assert!(bins.is_canonical(&bins.canonical_name("DR. LECTER")));
    }

    #[test]
    fn test_alias_lookup_is_case_insensitive() {
        let bins = sample_bins();
        assert_eq!(
            bins.resolve("DR. LECTER"),
            NameResolution::Canonical("Hannibal".to_string())
        );
        assert_eq!(bins.canonical_name("Hannibal Lecter"), "Hannibal");
    }

    #[test]
    fn test_unlisted_label_title_cased() {
        let bins = sample_bins();
        let resolution = bins.resolve("RANDOM GUARD");
        assert_eq!(resolution, NameResolution::Fallback("Random Guard".to_string()));
        assert!(!resolution.is_canonical());
    }

    #[test]
    fn test_continuation_marker_ignored() {
        let bins = sample_bins();
        assert_eq!(bins.canonical_name("JACK CRAWFORD (CONT'D)"), "Jack Crawford");
        assert_eq!(bins.canonical_name("JACK CRAWFORD (CONT\u{2019}D)"), "Jack Crawford");
        assert_eq!(bins.canonical_name("ORDERLY (CONT'D)"), "Orderly");
    }

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        let bins = sample_bins();
        for name in bins.canonical_names() {
            let resolution = bins.resolve(name);
            assert!(resolution.is_canonical());
            assert_eq!(resolution.as_str(), name);
        }
    }

    #[test]
    fn test_alias_collision_first_wins_in_file_order() {
        let bins = sample_bins();
        assert_eq!(bins.canonical_name("WILL"), "Will Graham");
        assert_eq!(bins.len(), 3);
    }

    #[test]
    fn test_invalid_bins_rejected() {
        assert!(CharacterBins::from_json_str("[\"Hannibal\"]").is_err());
        assert!(CharacterBins::from_json_str(r#"{"Hannibal": "lecter"}"#).is_err());
        assert!(CharacterBins::from_json_str(r#"{"Hannibal": [1]}"#).is_err());
        assert!(CharacterBins::from_json_str("{").is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("dr. lecter"), "Dr. Lecter");
        assert_eq!(title_case("O'BRIEN"), "O'Brien");
        assert_eq!(title_case("-1"), "-1");
        assert_eq!(title_case(""), "");
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("character_bins.json");
        tokio::fs::write(&path, r#"{"Clarice": ["starling", "clarice starling"]}"#)
            .await
            .unwrap();

        let bins = CharacterBins::load(&path).await.unwrap();
        assert_eq!(bins.canonical_name("STARLING"), "Clarice");

        let missing = CharacterBins::load(temp_dir.path().join("missing.json")).await;
        assert!(missing.is_err());
    }
}
