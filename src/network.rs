// WHY: Social networks are built from "who appears together" units: scenes, windows, stories
// All three modes share one accumulator so the pairing rule cannot drift between them

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Default number of adjacent mentions in one sliding window
pub const DEFAULT_WINDOW_SIZE: usize = 15;

/// Placeholder for a mention that resolves to no character
pub const NO_CHARACTER: &str = "-1";

/// Column header for network tables
pub const NETWORK_TSV_HEADER: &str = "source\ttarget\ttype\tweight";

/// Undirected weighted edge between two canonical characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooccurrenceEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// All edges built from one corpus unit, sorted by `(source, target)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    edges: Vec<CooccurrenceEdge>,
}

impl Network {
    pub fn edges(&self) -> &[CooccurrenceEdge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<CooccurrenceEdge> {
        self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Weight of the unordered pair, 0 when the pair never co-occurred
    pub fn weight(&self, a: &str, b: &str) -> u32 {
        let (source, target) = pair_key(a, b);
        self.edges
            .binary_search_by(|edge| {
                (edge.source.as_str(), edge.target.as_str()).cmp(&(source, target))
            })
            .map(|index| self.edges[index].weight)
            .unwrap_or(0)
    }

    /// Render as a tab-separated table with `source`, `target`, `type`, `weight` columns
    pub fn to_tsv(&self) -> Result<String> {
        let mut writer = crate::dialog_table::tsv_writer();
        writer.write_record(NETWORK_TSV_HEADER.split('\t'))?;
        for edge in &self.edges {
            let weight = edge.weight.to_string();
            writer.write_record([edge.source.as_str(), edge.target.as_str(), "undirected", weight.as_str()])?;
        }
        crate::dialog_table::finish_tsv(writer)
    }
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Accumulates pairwise co-occurrence counts over units of togetherness
#[derive(Debug, Clone)]
pub struct CooccurrenceAccumulator {
    weights: BTreeMap<(String, String), u32>,
    excluded: HashSet<String>,
    units: usize,
}

impl Default for CooccurrenceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CooccurrenceAccumulator {
    /// Accumulator excluding only the no-character placeholder
    pub fn new() -> Self {
        Self::with_excluded([NO_CHARACTER])
    }

    /// Accumulator excluding the given placeholder names from pairing
    pub fn with_excluded<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            weights: BTreeMap::new(),
            excluded: excluded.into_iter().map(Into::into).collect(),
            units: 0,
        }
    }

    /// Record one unit: every unordered pair of distinct members gains weight 1
    pub fn add_unit<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = members
            .into_iter()
            .map(|member| member.as_ref().trim().to_string())
            .filter(|member| !member.is_empty() && !self.excluded.contains(member))
            .collect();

        self.units += 1;

        // BTreeSet iteration is sorted, so (first, second) is already the canonical key
        let members: Vec<&String> = distinct.iter().collect();
        for (i, first) in members.iter().enumerate() {
            for second in &members[i + 1..] {
                *self
                    .weights
                    .entry(((*first).clone(), (*second).clone()))
                    .or_insert(0) += 1;
            }
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Freeze the accumulated weights into a network
    pub fn finish(self) -> Network {
        let edges: Vec<CooccurrenceEdge> = self
            .weights
            .into_iter()
            .filter(|(_, weight)| *weight > 0)
            .map(|((source, target), weight)| CooccurrenceEdge {
                source,
                target,
                weight,
            })
            .collect();

        debug!("Built network with {} edges from {} units", edges.len(), self.units);

        Network { edges }
    }
}

/// One unit per scene; members are the characters present in that scene
pub fn scene_network<I, M, S>(scenes: I) -> Network
where
    I: IntoIterator<Item = M>,
    M: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut accumulator = CooccurrenceAccumulator::new();
    for scene in scenes {
        accumulator.add_unit(scene);
    }
    accumulator.finish()
}

/// One unit per story; members are the story's character list
pub fn story_network<I, M, S>(stories: I) -> Network
where
    I: IntoIterator<Item = M>,
    M: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    scene_network(stories)
}

/// Sliding windows of `window_size` adjacent mentions with stride 1
///
/// Overlapping windows count a pair once per window that contains both characters,
/// so close proximity weighs more than scene-level co-occurrence. A stream shorter
/// than the window forms a single window.
pub fn window_network<S: AsRef<str>>(mentions: &[S], window_size: usize) -> Result<Network> {
    ensure!(window_size > 0, "Window size must be at least 1");

    let mut accumulator = CooccurrenceAccumulator::new();
    if mentions.is_empty() {
        return Ok(accumulator.finish());
    }

    if mentions.len() <= window_size {
        accumulator.add_unit(mentions);
    } else {
        for window in mentions.windows(window_size) {
            accumulator.add_unit(window);
        }
    }

    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_speakers_three_edges() {
        let network = scene_network([vec!["A", "B", "C"]]);
        assert_eq!(network.len(), 3);
        assert!(network.edges().iter().all(|edge| edge.weight == 1));
        assert_eq!(network.weight("A", "B"), 1);
        assert_eq!(network.weight("C", "A"), 1);
    }

    #[test]
    fn test_repeated_scene_doubles_weight_not_edges() {
        let network = scene_network([vec!["A", "B", "C"], vec!["C", "B", "A"]]);
        assert_eq!(network.len(), 3);
        assert!(network.edges().iter().all(|edge| edge.weight == 2));
    }

    #[test]
    fn test_duplicates_and_placeholder_ignored() {
        let network = scene_network([vec!["A", "A", "-1", "B", ""]]);
        assert_eq!(network.len(), 1);
        assert_eq!(network.weight("A", "B"), 1);
        assert_eq!(network.weight("A", "-1"), 0);
        assert_eq!(network.weight("A", "A"), 0);
    }

    #[test]
    fn test_single_member_unit_has_no_edges() {
        let network = scene_network([vec!["A"], vec![]]);
        assert!(network.is_empty());
    }

    #[test]
    fn test_window_overlap_counts_proximity() {
        let mentions = ["A", "B", "-1", "-1", "C"];
        let network = window_network(&mentions, 2).unwrap();
        assert_eq!(network.weight("A", "B"), 1);
        assert_eq!(network.weight("B", "C"), 0);

        let network = window_network(&mentions, 3).unwrap();
        // windows: [A B -1], [B -1 -1], [-1 -1 C]
        assert_eq!(network.weight("A", "B"), 1);
        assert_eq!(network.len(), 1);

        let network = window_network(&["A", "B", "A", "B"], 2).unwrap();
        assert_eq!(network.weight("A", "B"), 3);
    }

    #[test]
    fn test_short_stream_is_one_window() {
        let network = window_network(&["A", "B", "C"], DEFAULT_WINDOW_SIZE).unwrap();
        assert_eq!(network.len(), 3);
        let empty: [&str; 0] = [];
        assert!(window_network(&empty, 4).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(window_network(&["A", "B"], 0).is_err());
    }

    #[test]
    fn test_custom_exclusions() {
        let mut accumulator = CooccurrenceAccumulator::with_excluded(["Narrator", "-1"]);
        accumulator.add_unit(["Narrator", "A", "B"]);
        assert_eq!(accumulator.units(), 1);
        let network = accumulator.finish();
        assert_eq!(network.len(), 1);
    }

    #[test]
    fn test_tsv_columns() {
        let network = scene_network([vec!["Will Graham", "Hannibal"]]);
        assert_eq!(
            network.to_tsv().unwrap(),
            "source\ttarget\ttype\tweight\nHannibal\tWill Graham\tundirected\t1\n"
        );
    }

    #[test]
    fn test_into_edges_sorted_by_pair() {
        let network = scene_network([vec!["Will Graham", "Jack Crawford", "Hannibal"]]);
        let pairs: Vec<(String, String)> = network
            .into_edges()
            .into_iter()
            .map(|edge| (edge.source, edge.target))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Hannibal".to_string(), "Jack Crawford".to_string()),
                ("Hannibal".to_string(), "Will Graham".to_string()),
                ("Jack Crawford".to_string(), "Will Graham".to_string()),
            ]
        );
    }

    #[test]
    fn test_tsv_quotes_names_with_separators() {
        let network = scene_network([vec!["Abel \"Chesapeake\" Gideon", "Hannibal"]]);
        assert_eq!(
            network.to_tsv().unwrap(),
            "source\ttarget\ttype\tweight\n\"Abel \"\"Chesapeake\"\" Gideon\"\tHannibal\tundirected\t1\n"
        );
    }
}
