#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Patrol report record, counter category and running totals types.
//!
//! This crate defines the shapes shared by every other package: the
//! [`ReportRecord`] produced by the field extractor, the per-category
//! [`CategoryCounts`], and the [`AccumulatedTotals`] the aggregator folds
//! records into. The display strings (location names, shift labels and
//! sentinels) are part of the operator-facing contract and are kept here
//! so the server, the client and the CLI all render the same text.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Display text used when a report carries no `DD/MM/YYYY` date.
pub const DATE_NOT_FOUND: &str = "Não encontrada";

/// Occurrence text used when a report has no `OCORRÊNCIA:` line.
pub const NO_OCCURRENCE: &str = "Sem ocorrência relevante";

/// Maximum number of characters kept from an occurrence line.
pub const OCCURRENCE_MAX_CHARS: usize = 200;

/// Marker appended to an occurrence line that was cut at
/// [`OCCURRENCE_MAX_CHARS`].
pub const ELLIPSIS: &str = "...";

/// Largest value a single report counter or drug mass (in milligrams) may
/// hold. Every per-report value fits a signed 64-bit `INTEGER` column.
pub const MAX_COUNT: u64 = i64::MAX.unsigned_abs();

/// Patrol site a report refers to.
///
/// Resolved from the gazetteer in the extractor. The serialized form is the
/// upper-case site name as operators write it in reports.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Location {
    /// Muaná.
    #[serde(rename = "MUANÁ")]
    #[strum(serialize = "MUANÁ")]
    Muana,
    /// Ponta de Pedras.
    #[serde(rename = "PONTA DE PEDRAS")]
    #[strum(serialize = "PONTA DE PEDRAS")]
    PontaDePedras,
    /// No gazetteer entry matched.
    #[default]
    #[serde(rename = "NÃO IDENTIFICADO")]
    #[strum(serialize = "NÃO IDENTIFICADO")]
    Unknown,
}

impl Location {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Muana, Self::PontaDePedras, Self::Unknown]
    }
}

/// Patrol shift a report covers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Shift {
    /// 07:30 to 19:30.
    #[serde(rename = "Diurno (07:30 às 19:30)")]
    #[strum(serialize = "Diurno (07:30 às 19:30)")]
    Day,
    /// 19:30 to 07:30.
    #[serde(rename = "Noturno (19:30 às 07:30)")]
    #[strum(serialize = "Noturno (19:30 às 07:30)")]
    Night,
    /// Shift tokens missing or incomplete.
    #[default]
    #[serde(rename = "Não identificado")]
    #[strum(serialize = "Não identificado")]
    Unknown,
}

impl Shift {
    /// Short badge label shown next to the location.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Day => "Diurno",
            Self::Night => "Noturno",
            Self::Unknown => "Turno Desconhecido",
        }
    }
}

/// Counter categories extracted from a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// People stopped on foot.
    Pedestrians,
    /// Motorcycles stopped.
    Motorcycles,
    /// Cars stopped.
    Cars,
    /// Bicycles stopped.
    Bicycles,
    /// Arrests, including people taken to the station.
    Arrests,
    /// Motorcycles seized.
    SeizedMotorcycles,
    /// Fugitives recaptured.
    Fugitives,
    /// Knives, machetes, daggers and other bladed weapons seized.
    BladedWeapons,
    /// Pistols, revolvers, shotguns and rifles seized.
    Firearms,
}

impl Category {
    /// Returns all variants of this enum, in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pedestrians,
            Self::Motorcycles,
            Self::Cars,
            Self::Bicycles,
            Self::Arrests,
            Self::SeizedMotorcycles,
            Self::Fugitives,
            Self::BladedWeapons,
            Self::Firearms,
        ]
    }

    /// Whether this category counts towards the inspection total.
    ///
    /// Only stops (people and vehicles) are inspections. Arrests, seizures
    /// and weapons are never part of the total.
    #[must_use]
    pub const fn is_inspection(self) -> bool {
        matches!(
            self,
            Self::Pedestrians | Self::Motorcycles | Self::Cars | Self::Bicycles
        )
    }

    /// Operator-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pedestrians => "Pessoas a pé",
            Self::Motorcycles => "Motos",
            Self::Cars => "Carros",
            Self::Bicycles => "Bicicletas",
            Self::Arrests => "Prisões",
            Self::SeizedMotorcycles => "Motos apreendidas",
            Self::Fugitives => "Foragidos",
            Self::BladedWeapons => "Armas brancas",
            Self::Firearms => "Armas de fogo",
        }
    }
}

/// One non-negative counter per [`Category`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    /// People stopped on foot.
    #[serde(rename = "people")]
    pub pedestrians: u64,
    /// Motorcycles stopped.
    pub motorcycles: u64,
    /// Cars stopped.
    pub cars: u64,
    /// Bicycles stopped.
    pub bicycles: u64,
    /// Arrests.
    pub arrests: u64,
    /// Motorcycles seized.
    pub seized_motorcycles: u64,
    /// Fugitives recaptured.
    pub fugitives: u64,
    /// Bladed weapons seized.
    pub bladed_weapons: u64,
    /// Firearms seized.
    pub firearms: u64,
}

impl CategoryCounts {
    /// Returns the counter for `category`.
    #[must_use]
    pub const fn get(&self, category: Category) -> u64 {
        match category {
            Category::Pedestrians => self.pedestrians,
            Category::Motorcycles => self.motorcycles,
            Category::Cars => self.cars,
            Category::Bicycles => self.bicycles,
            Category::Arrests => self.arrests,
            Category::SeizedMotorcycles => self.seized_motorcycles,
            Category::Fugitives => self.fugitives,
            Category::BladedWeapons => self.bladed_weapons,
            Category::Firearms => self.firearms,
        }
    }

    /// Returns a mutable reference to the counter for `category`.
    pub fn get_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Pedestrians => &mut self.pedestrians,
            Category::Motorcycles => &mut self.motorcycles,
            Category::Cars => &mut self.cars,
            Category::Bicycles => &mut self.bicycles,
            Category::Arrests => &mut self.arrests,
            Category::SeizedMotorcycles => &mut self.seized_motorcycles,
            Category::Fugitives => &mut self.fugitives,
            Category::BladedWeapons => &mut self.bladed_weapons,
            Category::Firearms => &mut self.firearms,
        }
    }

    /// Sum of the inspection categories (people and vehicles stopped).
    #[must_use]
    pub fn inspections(&self) -> u64 {
        Category::all()
            .iter()
            .filter(|c| c.is_inspection())
            .fold(0u64, |acc, c| acc.saturating_add(self.get(*c)))
    }
}

/// A non-negative mass of seized drugs, held as whole milligrams.
///
/// Integer storage keeps sums exact regardless of folding order. On the
/// wire the value is a JSON number of grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grams {
    milligrams: u64,
}

impl Grams {
    /// Zero grams.
    pub const ZERO: Self = Self { milligrams: 0 };

    /// Creates a mass from whole milligrams.
    #[must_use]
    pub const fn from_milligrams(milligrams: u64) -> Self {
        Self { milligrams }
    }

    /// Returns the mass in whole milligrams.
    #[must_use]
    pub const fn milligrams(self) -> u64 {
        self.milligrams
    }

    /// Creates a mass from a floating-point number of grams, rounded to the
    /// nearest milligram and capped at [`MAX_COUNT`] milligrams. Negative,
    /// NaN and infinite inputs become zero.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_grams_f64(grams: f64) -> Self {
        if !grams.is_finite() || grams <= 0.0 {
            return Self::ZERO;
        }
        let mg = (grams * 1000.0).round();
        if mg >= MAX_COUNT as f64 {
            return Self::from_milligrams(MAX_COUNT);
        }
        Self::from_milligrams(mg as u64)
    }

    /// Returns the mass in grams.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_grams_f64(self) -> f64 {
        self.milligrams as f64 / 1000.0
    }

    /// Parses a decimal number of grams written with either `,` or `.` as
    /// the decimal separator (`"12"`, `"12,5"`, `"0.125"`).
    ///
    /// When both separators appear the last one is the decimal separator
    /// and the other groups thousands (`"1.250,5"`, `"1,250.5"`). Digits
    /// past the third decimal place are dropped and the result is capped at
    /// [`MAX_COUNT`] milligrams. Returns `None` if the text is not an ASCII
    /// decimal number.
    #[must_use]
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (whole, fraction) = match text.rfind([',', '.']) {
            Some(idx) => (&text[..idx], &text[idx + 1..]),
            None => (text, ""),
        };
        let grouping = match text[whole.len()..].chars().next() {
            Some(',') => Some('.'),
            Some('.') => Some(','),
            _ => None,
        };
        let whole: String = whole.chars().filter(|c| Some(*c) != grouping).collect();

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole_mg = whole
            .parse::<u64>()
            .unwrap_or(u64::MAX)
            .saturating_mul(1000);

        let mut fraction_mg = 0u64;
        let mut scale = 100u64;
        for digit in fraction.bytes().take(3) {
            fraction_mg += u64::from(digit - b'0') * scale;
            scale /= 10;
        }

        Some(Self::from_milligrams(
            whole_mg.saturating_add(fraction_mg).min(MAX_COUNT),
        ))
    }

    /// Adds two masses, saturating at the maximum representable value.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self::from_milligrams(self.milligrams.saturating_add(other.milligrams))
    }
}

impl fmt::Display for Grams {
    /// Grams with one decimal place, rounded half up.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = self.milligrams.saturating_add(50) / 100;
        write!(f, "{}.{}", tenths / 10, tenths % 10)
    }
}

impl Serialize for Grams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_grams_f64())
    }
}

impl<'de> Deserialize<'de> for Grams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let grams = f64::deserialize(deserializer)?;
        Ok(Self::from_grams_f64(grams))
    }
}

/// One parsed patrol report.
///
/// Produced by the field extractor and never mutated afterwards. Fields
/// that could not be found in the text hold their documented defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Patrol site.
    pub location: Location,
    /// First `DD/MM/YYYY` substring of the report, if any.
    pub date: Option<String>,
    /// Patrol shift.
    pub shift: Shift,
    /// Counter per category.
    #[serde(flatten)]
    pub counts: CategoryCounts,
    /// Mass of drugs seized.
    #[serde(rename = "drugsSeized")]
    pub drugs_seized: Grams,
    /// Occurrence summary, trimmed and capped at [`OCCURRENCE_MAX_CHARS`].
    pub occurrence: String,
}

impl Default for ReportRecord {
    fn default() -> Self {
        Self {
            location: Location::default(),
            date: None,
            shift: Shift::default(),
            counts: CategoryCounts::default(),
            drugs_seized: Grams::ZERO,
            occurrence: NO_OCCURRENCE.to_string(),
        }
    }
}

impl ReportRecord {
    /// People and vehicles stopped. Arrests, seizures, weapons and drugs are
    /// never included.
    #[must_use]
    pub fn total_inspections(&self) -> u64 {
        self.counts.inspections()
    }

    /// The date as shown to operators, [`DATE_NOT_FOUND`] when absent.
    #[must_use]
    pub fn date_display(&self) -> &str {
        self.date.as_deref().unwrap_or(DATE_NOT_FOUND)
    }
}

/// Running sum of every [`ReportRecord`] in an accumulation scope.
///
/// Only the aggregator builds new values of this type; every other
/// component treats it as an immutable snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedTotals {
    /// Summed counters.
    #[serde(flatten)]
    pub counts: CategoryCounts,
    /// Summed drug mass.
    #[serde(rename = "drugsSeized")]
    pub drugs_seized: Grams,
    /// Number of records folded in.
    pub reports_count: u64,
}

impl AccumulatedTotals {
    /// The empty totals every scope starts from.
    pub const ZERO: Self = Self {
        counts: CategoryCounts {
            pedestrians: 0,
            motorcycles: 0,
            cars: 0,
            bicycles: 0,
            arrests: 0,
            seized_motorcycles: 0,
            fugitives: 0,
            bladed_weapons: 0,
            firearms: 0,
        },
        drugs_seized: Grams::ZERO,
        reports_count: 0,
    };

    /// Summed inspections across every folded record.
    #[must_use]
    pub fn total_inspections(&self) -> u64 {
        self.counts.inspections()
    }

    /// Whether no record has been folded in yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reports_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspections_only_sum_stop_categories() {
        let counts = CategoryCounts {
            pedestrians: 5,
            motorcycles: 2,
            cars: 1,
            bicycles: 0,
            arrests: 7,
            seized_motorcycles: 3,
            fugitives: 1,
            bladed_weapons: 4,
            firearms: 2,
        };
        assert_eq!(counts.inspections(), 8);
    }

    #[test]
    fn get_mut_and_get_address_the_same_field() {
        let mut counts = CategoryCounts::default();
        for (i, category) in Category::all().iter().enumerate() {
            *counts.get_mut(*category) = i as u64 + 1;
        }
        for (i, category) in Category::all().iter().enumerate() {
            assert_eq!(counts.get(*category), i as u64 + 1, "{category:?}");
        }
    }

    #[test]
    fn location_strings_round_trip() {
        for location in Location::all() {
            let parsed: Location = location.as_ref().parse().unwrap();
            assert_eq!(parsed, *location);
        }
        assert_eq!(Location::Muana.to_string(), "MUANÁ");
        assert_eq!(Location::Unknown.to_string(), "NÃO IDENTIFICADO");
    }

    #[test]
    fn shift_badges() {
        assert_eq!(Shift::Day.badge(), "Diurno");
        assert_eq!(Shift::Night.badge(), "Noturno");
        assert_eq!(Shift::Unknown.badge(), "Turno Desconhecido");
        assert_eq!(Shift::Day.to_string(), "Diurno (07:30 às 19:30)");
    }

    #[test]
    fn parses_decimal_grams() {
        assert_eq!(Grams::parse_decimal("12").unwrap().milligrams(), 12_000);
        assert_eq!(Grams::parse_decimal("12,5").unwrap().milligrams(), 12_500);
        assert_eq!(Grams::parse_decimal("0.125").unwrap().milligrams(), 125);
        assert_eq!(Grams::parse_decimal("3,14159").unwrap().milligrams(), 3_141);
        assert!(Grams::parse_decimal("abc").is_none());
        assert!(Grams::parse_decimal(",5").is_none());
    }

    #[test]
    fn parses_grouped_thousands() {
        assert_eq!(Grams::parse_decimal("1.250,5").unwrap().milligrams(), 1_250_500);
        assert_eq!(Grams::parse_decimal("1,250.5").unwrap().milligrams(), 1_250_500);
        assert_eq!(Grams::parse_decimal("12.345.678,9").unwrap().milligrams(), 12_345_678_900);
        assert!(Grams::parse_decimal("1.250.5").is_none());
    }

    #[test]
    fn masses_are_capped_at_max_count() {
        let huge = "9".repeat(40);
        assert_eq!(Grams::parse_decimal(&huge).unwrap().milligrams(), MAX_COUNT);
        assert_eq!(Grams::from_grams_f64(1e30).milligrams(), MAX_COUNT);
        assert!(i64::try_from(MAX_COUNT).is_ok());
    }

    #[test]
    fn default_record_carries_sentinels() {
        let record = ReportRecord::default();
        assert_eq!(record.occurrence, NO_OCCURRENCE);
        assert_eq!(record.date_display(), DATE_NOT_FOUND);
        assert_eq!(record.location, Location::Unknown);
        assert_eq!(record.shift, Shift::Unknown);
        assert_eq!(record.total_inspections(), 0);
    }

    #[test]
    fn grams_display_one_decimal() {
        assert_eq!(Grams::ZERO.to_string(), "0.0");
        assert_eq!(Grams::from_milligrams(12_500).to_string(), "12.5");
        assert_eq!(Grams::from_milligrams(12_549).to_string(), "12.5");
        assert_eq!(Grams::from_milligrams(12_550).to_string(), "12.6");
    }

    #[test]
    fn record_serializes_with_flat_counts() {
        let record = ReportRecord {
            location: Location::PontaDePedras,
            date: Some("02/03/2025".to_string()),
            shift: Shift::Night,
            counts: CategoryCounts {
                pedestrians: 3,
                seized_motorcycles: 1,
                ..CategoryCounts::default()
            },
            drugs_seized: Grams::from_milligrams(2_500),
            occurrence: NO_OCCURRENCE.to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["location"], "PONTA DE PEDRAS");
        assert_eq!(value["shift"], "Noturno (19:30 às 07:30)");
        assert_eq!(value["people"], 3);
        assert_eq!(value["seizedMotorcycles"], 1);
        assert_eq!(value["drugsSeized"], 2.5);

        let back: ReportRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn zero_totals_are_default() {
        assert_eq!(AccumulatedTotals::ZERO, AccumulatedTotals::default());
        assert!(AccumulatedTotals::ZERO.is_empty());
    }
}
