// WHY: Screenplay entry point bundling cleanup, dialog and scene segmentation
// Each stage stays usable on its own; the parser wires them in corpus order

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod normalizer;
pub mod dialog_segmenter;
pub mod scene_segmenter;

pub use normalizer::{normalize_text, NormalizerConfig};
pub use dialog_segmenter::{
    continuation_base, merge_continuations, strip_continuation, DialogSegmenter, LineClass,
    SegmenterConfig, CONTINUATION_SUFFIXES,
};
pub use scene_segmenter::{SceneGrammar, SceneSegmenter, SceneSplit};

/// One continuous speech turn, already merged across continuation cues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    /// Position in story order, strictly increasing within one source document
    pub order_index: usize,
}

/// Speakers of one scene, in the order they first speak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSpeakers {
    pub scene_index: usize,
    pub speakers: Vec<String>,
}

/// Full screenplay parser: normalizer, dialog segmenter and scene segmenter
pub struct ScreenplayParser {
    normalizer: NormalizerConfig,
    dialog: DialogSegmenter,
    scenes: SceneSegmenter,
}

impl ScreenplayParser {
    pub fn new(normalizer: NormalizerConfig, segmenter: SegmenterConfig) -> Result<Self> {
        Ok(Self {
            normalizer,
            dialog: DialogSegmenter::new(segmenter)?,
            scenes: SceneSegmenter::new()?,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(NormalizerConfig::default(), SegmenterConfig::default())
    }

    pub fn dialog_segmenter(&self) -> &DialogSegmenter {
        &self.dialog
    }

    pub fn scene_segmenter(&self) -> &SceneSegmenter {
        &self.scenes
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_text(raw, &self.normalizer)
    }

    /// Raw screenplay text to ordered utterances
    pub fn utterances(&self, raw: &str) -> Vec<Utterance> {
        let cleaned = self.normalize(raw);
        self.dialog.segment(&cleaned)
    }

    /// Raw screenplay text to the raw speaker labels of each scene
    pub fn scene_speakers(&self, raw: &str) -> (SceneGrammar, Vec<SceneSpeakers>) {
        let cleaned = self.normalize(raw);
        let split = self.scenes.split_scenes(&cleaned);

        let scenes = split
            .scenes
            .iter()
            .enumerate()
            .map(|(scene_index, scene)| {
                let mut speakers: Vec<String> = Vec::new();
                for utterance in self.dialog.segment(scene) {
                    if !speakers.contains(&utterance.speaker) {
                        speakers.push(utterance.speaker);
                    }
                }
                SceneSpeakers {
                    scene_index,
                    speakers,
                }
            })
            .collect();

        (split.grammar, scenes)
    }
}
