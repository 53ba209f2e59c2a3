// WHY: Novels arrive pre-processed by an external NLP annotator
// This adapter only reads its book JSON and token table into the crate's own types

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::characters::CharacterBins;
use crate::network::NO_CHARACTER;
use crate::screenplay::Utterance;

/// Token-table value for tokens that are not character mentions
pub const NON_CHARACTER_TOKEN: &str = "O";

/// Column in the token table holding the character id of each token
pub const CHARACTER_ID_COLUMN: &str = "characterId";

/// Annotator book file: one entry per resolved character
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFile {
    pub characters: Vec<BookCharacter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookCharacter {
    /// Character id referenced by the token table
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub names: Vec<NameMention>,
    #[serde(default)]
    pub speaking: Vec<SpeechMention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameMention {
    /// Surface form of the name
    pub n: String,
    /// Mention count
    #[serde(default)]
    pub c: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechMention {
    /// Quoted text
    pub w: String,
    /// Token index of the quote in the novel
    pub i: usize,
}

impl BookCharacter {
    /// Display name: the first name mention, `None` for unnamed characters
    pub fn display_name(&self) -> Option<&str> {
        self.names.first().map(|name| name.n.as_str())
    }
}

impl BookFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let book: BookFile =
            serde_json::from_str(json).context("Book file is not valid annotator JSON")?;
        Ok(book)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read book file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse book file {}", path.display()))
    }

    /// Every quote of every named character, in novel order
    ///
    /// `order_index` is the token index of the quote. Characters without names are skipped.
    pub fn dialog(&self) -> Vec<Utterance> {
        let mut utterances = Vec::new();
        let mut unnamed = 0usize;

        for character in &self.characters {
            let Some(name) = character.display_name() else {
                unnamed += 1;
                continue;
            };
            utterances.extend(character.speaking.iter().map(|speech| Utterance {
                speaker: name.to_string(),
                text: speech.w.clone(),
                order_index: speech.i,
            }));
        }

        if unnamed > 0 {
            debug!("Skipped {} unnamed characters", unnamed);
        }

        utterances.sort_by_key(|utterance| utterance.order_index);
        utterances
    }

    /// Character id (as it appears in the token table) to display name
    pub fn names_by_id(&self) -> HashMap<String, String> {
        self.characters
            .iter()
            .filter_map(|character| {
                let id = character.id?;
                let name = character.display_name()?;
                Some((id.to_string(), name.to_string()))
            })
            .collect()
    }
}

/// Read the `characterId` column of a token table, dropping non-character tokens
pub fn parse_character_ids(tokens_tsv: &str) -> Result<Vec<String>> {
    let mut lines = tokens_tsv.lines();
    let Some(header) = lines.next() else {
        bail!("Token table is empty");
    };

    let Some(column) = header
        .split('\t')
        .position(|name| name.trim() == CHARACTER_ID_COLUMN)
    else {
        bail!("Token table has no '{}' column", CHARACTER_ID_COLUMN);
    };

    let mut ids = Vec::new();
    for (line_number, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(value) = line.split('\t').nth(column) else {
            bail!(
                "Token table row {} has no '{}' value",
                line_number + 2,
                CHARACTER_ID_COLUMN
            );
        };
        let value = value.trim();
        if value != NON_CHARACTER_TOKEN {
            ids.push(value.to_string());
        }
    }

    Ok(ids)
}

/// Turn token character ids into a stream of canonical character mentions
///
/// `-1` and ids missing from the book keep their position as the no-character placeholder.
pub fn mention_stream(ids: &[String], book: &BookFile, bins: &CharacterBins) -> Vec<String> {
    let names = book.names_by_id();
    let mut canonical_cache: HashMap<&str, String> = HashMap::new();
    let mut unknown = 0usize;

    let stream: Vec<String> = ids
        .iter()
        .map(|id| {
            if id == NO_CHARACTER {
                return NO_CHARACTER.to_string();
            }
            match names.get(id) {
                Some(name) => canonical_cache
                    .entry(name.as_str())
                    .or_insert_with(|| bins.canonical_name(name))
                    .clone(),
                None => {
                    unknown += 1;
                    NO_CHARACTER.to_string()
                }
            }
        })
        .collect();

    if unknown > 0 {
        warn!("{} character mentions reference ids missing from the book", unknown);
    }

    stream
}
