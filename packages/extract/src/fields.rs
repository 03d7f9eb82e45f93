//! Single-value fields: date, shift, seized drug mass and occurrence line.

use std::sync::LazyLock;

use patrol_report_models::{
    ELLIPSIS, Grams, MAX_COUNT, NO_OCCURRENCE, OCCURRENCE_MAX_CHARS, Shift,
};
use regex::Regex;

const DAY_START: &str = "07:30";
const NIGHT_START: &str = "19:30";

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{2}/[0-9]{2}/[0-9]{4}").unwrap_or_else(|_| unreachable!())
});

static OCCURRENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)OCORR[ÊE]NCIAS?[^:\n]*:[ \t]*([^\n]+)").unwrap_or_else(|_| unreachable!())
});

/// Drug mass patterns with the milligram multiplier applied to the parsed
/// number of grams.
static DRUG_REGEXES: LazyLock<Vec<(Regex, u64)>> = LazyLock::new(|| {
    [
        (
            r"(?i)\b(?:DROGAS?|ENTORPECENTES?)(?:\s+APREENDID[AO]S?)?\s*:\s*([0-9]+(?:[.,][0-9]{3})*(?:[.,][0-9]+)?)",
            1,
        ),
        (
            r"(?i)\b([0-9]+(?:[.,][0-9]{3})*(?:[.,][0-9]+)?)[ \t]*(?:KG|QUILOS?)\b[ \t]+DE[ \t]+(?:MACONHA|COCA[ÍI]NA|CRACK|DROGAS?|ENTORPECENTES?)",
            1000,
        ),
        (
            r"(?i)\b([0-9]+(?:[.,][0-9]{3})*(?:[.,][0-9]+)?)[ \t]*(?:G|GR|GRAMAS?)\b[ \t]+DE[ \t]+(?:MACONHA|COCA[ÍI]NA|CRACK|DROGAS?|ENTORPECENTES?)",
            1,
        ),
    ]
    .into_iter()
    .map(|(pattern, scale)| {
        (
            Regex::new(pattern).unwrap_or_else(|_| unreachable!()),
            scale,
        )
    })
    .collect()
});

/// First `DD/MM/YYYY` substring, unvalidated.
#[must_use]
pub fn extract_date(raw_text: &str) -> Option<String> {
    DATE_REGEX
        .find(raw_text)
        .map(|m| m.as_str().to_string())
}

/// Classifies the shift by which of the two boundary times appears first.
///
/// Both `07:30` and `19:30` must be present. `07:30` first means a day
/// shift; `19:30` first means a night shift.
#[must_use]
pub fn classify_shift(upper: &str) -> Shift {
    match (upper.find(DAY_START), upper.find(NIGHT_START)) {
        (Some(day), Some(night)) if day < night => Shift::Day,
        (Some(_), Some(_)) => Shift::Night,
        _ => Shift::Unknown,
    }
}

/// Seized drug mass in grams, zero when no pattern matches.
#[must_use]
pub fn extract_drugs(upper: &str) -> Grams {
    for (regex, scale) in DRUG_REGEXES.iter() {
        let Some(caps) = regex.captures(upper) else {
            continue;
        };
        if let Some(grams) = Grams::parse_decimal(&caps[1]) {
            return Grams::from_milligrams(
                grams.milligrams().saturating_mul(*scale).min(MAX_COUNT),
            );
        }
    }

    Grams::ZERO
}

/// The text after the first `OCCURRENCE...:` label up to the end of that
/// line, trimmed and capped at [`OCCURRENCE_MAX_CHARS`] characters.
///
/// A label with nothing after it on its own line yields the sentinel; the
/// following line is never taken as the occurrence.
#[must_use]
pub fn extract_occurrence(raw_text: &str) -> String {
    let Some(caps) = OCCURRENCE_REGEX.captures(raw_text) else {
        return NO_OCCURRENCE.to_string();
    };

    let line = caps[1].trim();
    if line.is_empty() {
        return NO_OCCURRENCE.to_string();
    }

    truncate_occurrence(line)
}

fn truncate_occurrence(line: &str) -> String {
    match line.char_indices().nth(OCCURRENCE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &line[..cut]),
        None => line.to_string(),
    }
}
