// WHY: Screenplay dialog has no markup, only indentation bands and all-caps speaker cues
// Line classifier + small state machine keeps every threshold visible and testable on its own

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

use super::Utterance;

/// Continuation markers appended to a speaker cue when a speech resumes after action
pub const CONTINUATION_SUFFIXES: [&str; 2] = [" (CONT'D)", " (CONT\u{2019}D)"];

/// Indentation thresholds for the screenplay layout
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum leading spaces before a speaker cue
    pub speaker_min_indent: usize,
    /// Minimum leading spaces before a line of dialog
    pub dialog_min_indent: usize,
    /// An all-caps line inside a speech is only a new cue if it sits within this
    /// many columns of the current cue's indentation; otherwise it is dialog
    pub speaker_indent_slack: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            speaker_min_indent: 10,
            dialog_min_indent: 5,
            speaker_indent_slack: 3,
        }
    }
}

/// Classification of a single screenplay line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// All-caps speaker cue, label trimmed of indentation (continuation suffix kept)
    Speaker { label: &'a str, indent: usize },
    /// Indented dialog text with its indentation stripped
    Dialog { text: &'a str, indent: usize },
    /// Whole-line parenthetical such as `(to her father)`
    StageDirection,
    /// Blank lines, action lines, headings, anything else
    Other,
}

#[derive(Debug)]
enum ScanState<'a> {
    SeekingSpeaker,
    AwaitingDialog { label: &'a str, indent: usize },
    InDialog { label: &'a str, indent: usize, lines: Vec<&'a str> },
}

/// Strip a continuation marker from a speaker label, if present
pub fn strip_continuation(label: &str) -> &str {
    continuation_base(label).unwrap_or(label)
}

/// Base label of a continuation cue, `None` when the label carries no marker
pub fn continuation_base(label: &str) -> Option<&str> {
    CONTINUATION_SUFFIXES.iter().find_map(|suffix| {
        let split = label.len().checked_sub(suffix.len())?;
        if !label.is_char_boundary(split) {
            return None;
        }
        let (base, tail) = label.split_at(split);
        tail.eq_ignore_ascii_case(suffix).then_some(base)
    })
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

fn is_speaker_cue(content: &str) -> bool {
    let base = strip_continuation(content);
    let mut chars = base.chars();
    let starts_upper = chars.next().is_some_and(|ch| ch.is_ascii_uppercase());
    starts_upper
        && base.len() >= 2
        && chars.all(|ch| ch.is_ascii_uppercase() || ch == ' ' || ch == '.')
}

/// Screenplay dialog segmenter
pub struct DialogSegmenter {
    config: SegmenterConfig,
    dialog_line: Regex,
    stage_direction: Regex,
}

impl DialogSegmenter {
    /// Create a segmenter with custom indentation thresholds
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        let dialog_pattern = format!(
            r"^ {{{},}}\w[\w .!?,'\x22\u{{2019}}\u{{201C}}\u{{201D}}]+$",
            config.dialog_min_indent
        );
        let stage_pattern = r"^ +\([\w .!?,'\u{2019}]+\)$";

        Ok(Self {
            dialog_line: Regex::new(&dialog_pattern)?,
            stage_direction: Regex::new(stage_pattern)?,
            config,
        })
    }

    /// Create a segmenter with the thresholds tuned for the source corpus
    pub fn with_default_config() -> Result<Self> {
        Self::new(SegmenterConfig::default())
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Classify one line (without its trailing newline)
    pub fn classify_line<'a>(&self, line: &'a str) -> LineClass<'a> {
        let line = line.trim_end_matches('\r');
        let indent = leading_spaces(line);
        let content = &line[indent..];

        if self.stage_direction.is_match(line) {
            return LineClass::StageDirection;
        }

        let label = content.trim_end();
        if indent >= self.config.speaker_min_indent && is_speaker_cue(label) {
            return LineClass::Speaker { label, indent };
        }

        if self.dialog_line.is_match(line) {
            return LineClass::Dialog { text: content, indent };
        }

        LineClass::Other
    }

    /// Segment cleaned screenplay text into ordered utterances, merging continued speech
    pub fn segment(&self, text: &str) -> Vec<Utterance> {
        let blocks = self.scan_blocks(text);
        let block_count = blocks.len();
        let utterances = merge_continuations(blocks);

        debug!(
            "Segmented {} dialog blocks into {} utterances",
            block_count,
            utterances.len()
        );

        utterances
    }

    /// Scan for raw `(speaker label, joined dialog)` blocks in source order
    pub fn scan_blocks(&self, text: &str) -> Vec<(String, String)> {
        let mut blocks = Vec::new();
        let mut state = ScanState::SeekingSpeaker;

        for line in text.lines() {
            let class = self.classify_line(line);
            if class == LineClass::StageDirection {
                continue;
            }
            state = self.step(state, class, &mut blocks);
        }

        if let ScanState::InDialog { label, lines, .. } = state {
            blocks.push(finish_block(label, &lines));
        }

        blocks
    }

    fn step<'a>(
        &self,
        state: ScanState<'a>,
        class: LineClass<'a>,
        blocks: &mut Vec<(String, String)>,
    ) -> ScanState<'a> {
        match state {
            ScanState::SeekingSpeaker => start_from(class),

            ScanState::AwaitingDialog { label, indent } => match self.reinterpret(class, indent) {
                LineClass::Dialog { text, .. } => ScanState::InDialog {
                    label,
                    indent,
                    lines: vec![text],
                },
                // Cue without dialog underneath: the block is dropped
                other => start_from(other),
            },

            ScanState::InDialog {
                label,
                indent,
                mut lines,
            } => match self.reinterpret(class, indent) {
                LineClass::Dialog { text, .. } => {
                    lines.push(text);
                    ScanState::InDialog {
                        label,
                        indent,
                        lines,
                    }
                }
                other => {
                    blocks.push(finish_block(label, &lines));
                    start_from(other)
                }
            },
        }
    }

    /// Inside a speech, an all-caps line indented well inside the cue's band is dialog
    fn reinterpret<'a>(&self, class: LineClass<'a>, cue_indent: usize) -> LineClass<'a> {
        match class {
            LineClass::Speaker { label, indent }
                if indent + self.config.speaker_indent_slack < cue_indent
                    && indent >= self.config.dialog_min_indent =>
            {
                LineClass::Dialog {
                    text: label,
                    indent,
                }
            }
            other => other,
        }
    }
}

fn start_from(class: LineClass<'_>) -> ScanState<'_> {
    match class {
        LineClass::Speaker { label, indent } => ScanState::AwaitingDialog { label, indent },
        _ => ScanState::SeekingSpeaker,
    }
}

fn finish_block(label: &str, lines: &[&str]) -> (String, String) {
    (label.to_string(), lines.join(" "))
}

/// Fold continuation cues into the speech they continue
///
/// A block labelled `X (CONT'D)` directly following a speech by `X` is appended to it
/// with a single space; chains of continuations fold transitively. A continuation cue
/// with no matching predecessor stands alone and keeps its full label.
pub fn merge_continuations(blocks: Vec<(String, String)>) -> Vec<Utterance> {
    let mut merged: Vec<Utterance> = Vec::with_capacity(blocks.len());

    for (label, text) in blocks {
        if let Some(previous) = merged.last_mut() {
            if continuation_base(&label) == Some(previous.speaker.as_str()) {
                previous.text.push(' ');
                previous.text.push_str(&text);
                continue;
            }
        }

        let order_index = merged.len();
        merged.push(Utterance {
            speaker: label,
            text,
            order_index,
        });
    }

    merged
}
