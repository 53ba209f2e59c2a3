// WHY: Scene boundaries define the co-occurrence unit for screenplay networks
// Two heading conventions appear in the corpus; one document never mixes them

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::{debug, warn};

/// Which scene-marker convention split a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneGrammar {
    /// `12   INT. OFFICE - NIGHT   12`: numbered heading, number repeated at line end
    NumberedHeading,
    /// `INT. OFFICE - NIGHT`: bare interior/exterior slugline
    Slugline,
    /// No marker found anywhere; the document is a single scene
    WholeDocument,
}

/// Scenes of one document, borrowed from the source text
#[derive(Debug, Clone)]
pub struct SceneSplit<'a> {
    pub grammar: SceneGrammar,
    pub scenes: Vec<&'a str>,
}

/// Byte range of a marker line, `end` includes its newline
#[derive(Debug, Clone, Copy)]
struct MarkerLine {
    start: usize,
    end: usize,
}

pub struct SceneSegmenter {
    numbered_heading: Regex,
    slugline: Regex,
}

impl SceneSegmenter {
    pub fn new() -> Result<Self> {
        let scene_number = r"[A-Z]{0,2}[0-9]+[A-Z]?";
        let numbered_pattern =
            format!(r"^[ \t]*({scene_number})[ \t]+[A-Z][^a-z]*?[ \t]+({scene_number})[ \t]*$");
        let slugline_pattern = r"^[ \t]*(?:INT|EXT)\.[^a-z]*$";

        Ok(Self {
            numbered_heading: Regex::new(&numbered_pattern)?,
            slugline: Regex::new(slugline_pattern)?,
        })
    }

    /// Line is a numbered heading whose leading and trailing scene numbers agree
    pub fn is_numbered_heading(&self, line: &str) -> bool {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut caps = self.numbered_heading.create_captures();
        self.numbered_heading.captures(line, &mut caps);

        match (caps.get_group(1), caps.get_group(2)) {
            (Some(lead), Some(trail)) => {
                line[lead.start..lead.end] == line[trail.start..trail.end]
            }
            _ => false,
        }
    }

    pub fn is_slugline(&self, line: &str) -> bool {
        self.slugline.is_match(line.trim_end_matches(['\n', '\r']))
    }

    /// Split cleaned screenplay text into scene spans
    ///
    /// Numbered headings are tried first; the scenes are the spans after each heading,
    /// with the heading lines and any preamble before the first heading dropped.
    /// Sluglines are tried next; every span is kept, each scene starting at its own
    /// slugline and a non-blank preamble kept as the first scene. Without either,
    /// the whole document is returned as one scene.
    pub fn split_scenes<'a>(&self, text: &'a str) -> SceneSplit<'a> {
        let numbered = self.find_markers(text, |line| self.is_numbered_heading(line));
        if !numbered.is_empty() {
            let scenes = numbered
                .iter()
                .enumerate()
                .map(|(i, marker)| {
                    let end = numbered.get(i + 1).map_or(text.len(), |next| next.start);
                    &text[marker.end..end]
                })
                .collect::<Vec<_>>();
            debug!("Split {} numbered scenes", scenes.len());
            return SceneSplit {
                grammar: SceneGrammar::NumberedHeading,
                scenes,
            };
        }

        let sluglines = self.find_markers(text, |line| self.is_slugline(line));
        if !sluglines.is_empty() {
            let mut scenes = Vec::with_capacity(sluglines.len() + 1);
            let preamble = &text[..sluglines[0].start];
            if !preamble.trim().is_empty() {
                scenes.push(preamble);
            }
            for (i, marker) in sluglines.iter().enumerate() {
                let end = sluglines.get(i + 1).map_or(text.len(), |next| next.start);
                scenes.push(&text[marker.start..end]);
            }
            debug!("Split {} slugline scenes", scenes.len());
            return SceneSplit {
                grammar: SceneGrammar::Slugline,
                scenes,
            };
        }

        warn!("No scene markers found; treating document as a single scene");
        SceneSplit {
            grammar: SceneGrammar::WholeDocument,
            scenes: vec![text],
        }
    }

    fn find_markers(&self, text: &str, is_marker: impl Fn(&str) -> bool) -> Vec<MarkerLine> {
        let mut markers = Vec::new();
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let start = offset;
            offset += line.len();
            if is_marker(line) {
                markers.push(MarkerLine { start, end: offset });
            }
        }

        markers
    }
}
