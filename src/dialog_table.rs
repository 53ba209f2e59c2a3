// WHY: Dialog tables are the hand-off format to the external statistics tooling
// Rows keep source order exactly; nothing is filtered here

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::characters::CharacterBins;
use crate::screenplay::Utterance;

/// Optional metadata attached to every row of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMetadata {
    pub corpus_name: Option<String>,
    pub frame_number: Option<usize>,
}

/// One row of a dialog table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRow {
    pub speaker: String,
    pub dialog: String,
    pub order_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_number: Option<usize>,
}

/// Convert utterances into rows, preserving order
pub fn assemble(utterances: &[Utterance], metadata: &TableMetadata) -> Vec<DialogRow> {
    utterances
        .iter()
        .map(|utterance| DialogRow {
            speaker: utterance.speaker.clone(),
            dialog: utterance.text.clone(),
            order_index: utterance.order_index,
            corpus_name: metadata.corpus_name.clone(),
            frame_number: metadata.frame_number,
        })
        .collect()
}

/// Convert utterances into rows with speakers mapped to canonical character names
pub fn assemble_normalized(
    utterances: &[Utterance],
    bins: &CharacterBins,
    metadata: &TableMetadata,
) -> Vec<DialogRow> {
    let mut rows = assemble(utterances, metadata);
    for row in &mut rows {
        row.speaker = bins.canonical_name(&row.speaker);
    }
    rows
}

/// Tab-separated writer for tables handed to the statistics tooling
///
/// Cells holding a tab, line break or quote are wrapped in double quotes with
/// inner quotes doubled, so multi-line text survives a round trip.
pub fn tsv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

/// Finish a table started with [`tsv_writer`] and return its text
pub fn finish_tsv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush table: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render rows as a tab-separated table
///
/// Columns are `speaker` and `dialog`, followed by `corpus_name` and `frame_number`
/// only when the first row carries them. `order_index` is implied by row order.
pub fn to_tsv(rows: &[DialogRow]) -> Result<String> {
    let with_corpus = rows.first().is_some_and(|row| row.corpus_name.is_some());
    let with_frame = rows.first().is_some_and(|row| row.frame_number.is_some());

    let mut header = vec!["speaker", "dialog"];
    if with_corpus {
        header.push("corpus_name");
    }
    if with_frame {
        header.push("frame_number");
    }

    let mut writer = tsv_writer();
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.speaker.clone(), row.dialog.clone()];
        if with_corpus {
            record.push(row.corpus_name.clone().unwrap_or_default());
        }
        if with_frame {
            record.push(row.frame_number.map(|frame| frame.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    finish_tsv(writer)
}
