//! Maps flagged keywords back onto the text they were taken from.

use regex::RegexBuilder;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::contract::StressfulKeyword;

/// Display bucket for a keyword's intensity. Tier 5 is the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(into = "u8")]
pub enum IntensityTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
}

impl IntensityTier {
    pub fn from_intensity(intensity: i64) -> Self {
        match intensity {
            i if i >= 9 => IntensityTier::Tier5,
            i if i >= 7 => IntensityTier::Tier4,
            i if i >= 5 => IntensityTier::Tier3,
            i if i >= 3 => IntensityTier::Tier2,
            _ => IntensityTier::Tier1,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            IntensityTier::Tier1 => 1,
            IntensityTier::Tier2 => 2,
            IntensityTier::Tier3 => 3,
            IntensityTier::Tier4 => 4,
            IntensityTier::Tier5 => 5,
        }
    }
}

impl From<IntensityTier> for u8 {
    fn from(tier: IntensityTier) -> Self {
        tier.level()
    }
}

/// A slice of the source text, tagged with the keyword it matched, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment<'a> {
    pub text: &'a str,
    pub keyword: Option<&'a StressfulKeyword>,
}

impl HighlightSegment<'_> {
    pub fn tier(&self) -> Option<IntensityTier> {
        self.keyword
            .map(|keyword| IntensityTier::from_intensity(keyword.intensity))
    }

    pub fn is_match(&self) -> bool {
        self.keyword.is_some()
    }
}

impl Serialize for HighlightSegment<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HighlightSegment", 3)?;
        state.serialize_field("text", self.text)?;
        state.serialize_field("keyword", &self.keyword)?;
        state.serialize_field("tier", &self.tier())?;
        state.end()
    }
}

/// Split `text` into segments, tagging the spans that match a keyword phrase.
///
/// Matching is literal and case-insensitive over all phrases at once, scanning left to
/// right without overlaps. When several phrases start at the same position the longest
/// wins. Phrases that never occur in the text are skipped.
pub fn highlight<'a>(text: &'a str, keywords: &'a [StressfulKeyword]) -> Vec<HighlightSegment<'a>> {
    let whole = || {
        vec![HighlightSegment {
            text,
            keyword: None,
        }]
    };

    let mut phrases: Vec<&str> = keywords
        .iter()
        .map(|k| k.phrase.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return whole();
    }
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    phrases.dedup();

    // One capture group per phrase, so a match names its phrase under the same case
    // folding the regex used to find it.
    let pattern = phrases
        .iter()
        .map(|p| format!("({})", regex::escape(p)))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(err) => {
            // Escaped literals only fail on size limits.
            tracing::warn!("keyword pattern rejected, highlighting skipped: {}", err);
            return whole();
        }
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for caps in matcher.captures_iter(text) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        if found.start() > cursor {
            segments.push(HighlightSegment {
                text: &text[cursor..found.start()],
                keyword: None,
            });
        }
        let phrase = (1..caps.len())
            .find(|&group| caps.get(group).is_some())
            .map(|group| phrases[group - 1]);
        segments.push(HighlightSegment {
            text: found.as_str(),
            keyword: phrase.and_then(|p| keywords.iter().find(|k| k.phrase == p)),
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(HighlightSegment {
            text: &text[cursor..],
            keyword: None,
        });
    }
    if segments.is_empty() {
        return whole();
    }
    segments
}
