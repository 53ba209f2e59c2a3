// WHY: pdf-to-text output carries page-break and control artifacts plus running page headers
// Cleaning is line-preserving so the indentation the segmenter depends on survives untouched

/// Settings for screenplay text cleanup
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Production title printed at the start of each running page header
    pub production_title: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            production_title: "HANNIBAL".to_string(),
        }
    }
}

/// Separators that follow the production title in a running header
const HEADER_SEPARATORS: [&str; 2] = ["- PROD.", "Ep."];

/// Remove non-printable characters and running page headers from raw screenplay text
///
/// Form feeds are always dropped even though some encodings consider them printable.
/// Header lines are removed together with their trailing newline; every other line
/// is passed through byte-for-byte.
pub fn normalize_text(raw: &str, config: &NormalizerConfig) -> String {
    let printable = strip_non_printable(raw);
    let mut cleaned = String::with_capacity(printable.len());

    for line in printable.split_inclusive('\n') {
        if is_running_header(line, &config.production_title) {
            continue;
        }
        cleaned.push_str(line);
    }

    cleaned
}

/// Drop control characters except the line-structure ones (`\n`, `\r`, `\t`)
pub fn strip_non_printable(raw: &str) -> String {
    raw.chars().filter(|&ch| is_printable(ch)).collect()
}

fn is_printable(ch: char) -> bool {
    match ch {
        '\u{000C}' => false,
        '\n' | '\r' | '\t' => true,
        _ => !ch.is_control(),
    }
}

/// Check whether a line is a running header: optional leading spaces, the production
/// title, a `- PROD.` or `Ep.` separator, `#` plus an episode number, anything after.
pub fn is_running_header(line: &str, production_title: &str) -> bool {
    let rest = line.trim_start_matches(' ');
    let Some(rest) = rest.strip_prefix(production_title) else {
        return false;
    };

    let rest = rest.trim_start_matches(' ');
    let Some(rest) = HEADER_SEPARATORS
        .iter()
        .find_map(|separator| rest.strip_prefix(separator))
    else {
        return false;
    };

    let rest = rest.trim_start_matches(' ');
    rest.strip_prefix('#')
        .is_some_and(|number| number.starts_with(|ch: char| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        normalize_text(raw, &NormalizerConfig::default())
    }

    #[test]
    fn test_form_feed_removed() {
        assert_eq!(normalize("Page one.\n\u{000C}Page two.\n"), "Page one.\nPage two.\n");
    }

    #[test]
    fn test_control_characters_removed_but_layout_kept() {
        let raw = "   WILL\u{0007} GRAHAM\r\n\tIndented\n";
        assert_eq!(normalize(raw), "   WILL GRAHAM\r\n\tIndented\n");
    }

    #[test]
    fn test_curly_punctuation_survives() {
        let raw = "                 I feel like I’m dreaming. “Shrike.”\n";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_prod_header_removed_with_newline() {
        let raw = "               Dad. It’s for you.\n\u{000C}      HANNIBAL - PROD. #101 - DBL GREEN Collated   6/26/13         43.\n\n                            JACOB\n";
        let expected = "               Dad. It’s for you.\n\n                            JACOB\n";
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_episode_header_removed() {
        let raw = "Before.\nHANNIBAL Ep. #209 \"Shiizakana\" FINAL   12.\nAfter.\n";
        assert_eq!(normalize(raw), "Before.\nAfter.\n");
    }

    #[test]
    fn test_header_on_last_line_without_newline() {
        let raw = "Before.\n  HANNIBAL - PROD. #305";
        assert_eq!(normalize(raw), "Before.\n");
    }

    #[test]
    fn test_title_mention_in_dialog_untouched() {
        let raw = "                 HANNIBAL is here - PROD. #1\n     HANNIBAL - PROD.\n";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_custom_production_title() {
        let config = NormalizerConfig {
            production_title: "CLARICE".to_string(),
        };
        let raw = "CLARICE - PROD. #102 BLUE\nHANNIBAL - PROD. #102\n";
        assert_eq!(normalize_text(raw, &config), "HANNIBAL - PROD. #102\n");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "\u{000C}  HANNIBAL - PROD. #101 - WHITE\n                           WILL GRAHAM\n\u{0001}                 I feel like dreaming.\n\n";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }
}
