//! Regex segmentation of conversation text into speaker-attributed turns.
//!
//! Shared by the folder, columnar, and source-target connectors. The
//! boundary rule is exact: an utterance is the text strictly between the end
//! of one speaker tag and the start of the next, and the last tag's
//! utterance always extends to end-of-string.

use regex::Regex;

use crate::types::{SpeakerLabel, Utterance};

/// Split `text` into `(speaker, utterance)` pairs on a speaker-tag pattern.
///
/// Matches are taken non-overlapping, left to right. The speaker label is
/// the tag's first capture group when the pattern has one, otherwise the
/// whole match with its non-word delimiter characters stripped (`#P1#` →
/// `P1`). Utterances are whitespace-trimmed. A text with zero matches
/// yields zero pairs; callers filter pairs with empty utterances.
pub fn split_conversation(text: &str, tag: &Regex) -> Vec<(SpeakerLabel, Utterance)> {
    let matches: Vec<(usize, usize, SpeakerLabel)> = tag
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let speaker = match caps.get(1) {
                Some(group) => group.as_str().to_string(),
                None => whole
                    .as_str()
                    .trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
                    .to_string(),
            };
            Some((whole.start(), whole.end(), speaker))
        })
        .collect();

    let mut pairs = Vec::with_capacity(matches.len());
    for (idx, (_, end, speaker)) in matches.iter().enumerate() {
        let utterance_end = matches
            .get(idx + 1)
            .map(|(start, _, _)| *start)
            .unwrap_or(text.len());
        let utterance = text[*end..utterance_end].trim().to_string();
        pairs.push((speaker.clone(), utterance));
    }
    pairs
}
