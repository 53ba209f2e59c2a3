// WHY: Fan-fiction comes as scraped archive records; stories are the co-occurrence unit
// The corpus filter trims crossovers, non-prose works and length outliers before analysis

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::characters::CharacterBins;
use crate::network::{story_network, Network};

/// One scraped fan-fiction work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub fandoms: Vec<String>,
    #[serde(default)]
    pub additional_tags: Vec<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub words: u64,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub text: String,
}

impl Story {
    /// Chapters joined with newlines
    pub fn full_text(&self) -> String {
        self.chapters
            .iter()
            .map(|chapter| chapter.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse a JSON array of stories
pub fn parse_stories(json: &str) -> Result<Vec<Story>> {
    serde_json::from_str(json).context("Fan-fiction data is not a JSON array of stories")
}

pub async fn load_stories(path: impl AsRef<Path>) -> Result<Vec<Story>> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read fan-fiction data {}", path.display()))?;
    parse_stories(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write stories back out as a pretty-printed JSON array
pub async fn save_stories(stories: &[Story], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(stories)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Corpus-cleaning rules for scraped stories
#[derive(Debug, Clone)]
pub struct StoryFilter {
    /// Keep only stories whose first listed fandom is this one
    pub primary_fandom: Option<String>,
    /// Drop stories tagged with any of these
    pub excluded_tags: Vec<String>,
    /// Word counts must lie strictly between these quantiles
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for StoryFilter {
    fn default() -> Self {
        Self {
            primary_fandom: Some("Hannibal (TV)".to_string()),
            excluded_tags: vec!["Fanart".to_string(), "Podfic".to_string()],
            lower_quantile: 0.05,
            upper_quantile: 0.95,
        }
    }
}

/// Apply fandom, tag and word-count filters in that order
pub fn filter_stories(stories: Vec<Story>, filter: &StoryFilter) -> Vec<Story> {
    let total = stories.len();

    let kept: Vec<Story> = stories
        .into_iter()
        .filter(|story| match &filter.primary_fandom {
            Some(fandom) => story.fandoms.first() == Some(fandom),
            None => true,
        })
        .filter(|story| {
            !story
                .additional_tags
                .iter()
                .any(|tag| filter.excluded_tags.contains(tag))
        })
        .collect();

    let mut counts: Vec<f64> = kept.iter().map(|story| story.words as f64).collect();
    counts.sort_by(f64::total_cmp);

    let (Some(low), Some(high)) = (
        quantile(&counts, filter.lower_quantile),
        quantile(&counts, filter.upper_quantile),
    ) else {
        return kept;
    };

    let kept: Vec<Story> = kept
        .into_iter()
        .filter(|story| {
            let words = story.words as f64;
            low < words && words < high
        })
        .collect();

    info!("Kept {} of {} stories after filtering", kept.len(), total);
    kept
}

/// Quantile of sorted values with linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Network with one unit per story, members taken from the story's character tags
pub fn fandom_network(stories: &[Story], bins: &CharacterBins) -> Network {
    story_network(stories.iter().map(|story| {
        story
            .characters
            .iter()
            .map(|tag| bins.canonical_name(tag))
            .collect::<Vec<_>>()
    }))
}
