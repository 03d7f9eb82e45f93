//! Ordered counter extraction rules.
//!
//! Each [`CountRule`] pairs a [`Category`] with one pattern. Rules are
//! evaluated against the upper-cased report text in table order; for each
//! category the first rule that matches supplies the value and a category
//! with no matching rule defaults to zero.
//!
//! Two rule shapes exist:
//!
//! - [`RuleShape::Labeled`]: `<label> : <digits>` (e.g. `CARROS: 3`)
//! - [`RuleShape::Quantity`]: `<digits> <noun>` on one line
//!   (e.g. `2 FACAS`, `1 ARMA DE FOGO`)

use std::sync::LazyLock;

use patrol_report_models::{Category, CategoryCounts, MAX_COUNT};
use regex::Regex;

/// How a rule's pattern is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleShape {
    /// Label, optional whitespace, colon, digits.
    Labeled,
    /// Digits followed by a noun on the same line.
    Quantity,
}

/// A single counter extraction rule.
#[derive(Debug)]
pub struct CountRule {
    /// Category this rule fills.
    pub category: Category,
    /// Pattern layout.
    pub shape: RuleShape,
    regex: Regex,
}

impl CountRule {
    fn new(category: Category, shape: RuleShape, pattern: &str) -> Self {
        Self {
            category,
            shape,
            regex: Regex::new(pattern).unwrap_or_else(|_| unreachable!()),
        }
    }

    /// The pattern source, for diagnostics.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Applies the rule to upper-cased report text, returning the captured
    /// count of the first match.
    ///
    /// Counts larger than [`MAX_COUNT`] are capped at it.
    #[must_use]
    pub fn apply(&self, upper: &str) -> Option<u64> {
        let caps = self.regex.captures(upper)?;
        Some(parse_count(&caps[1]))
    }
}

/// Labeled rule template: `<label>\s*:\s*(digits)`.
macro_rules! labeled {
    ($category:expr, $label:literal) => {
        CountRule::new(
            $category,
            RuleShape::Labeled,
            concat!(r"(?i)\b", $label, r"\s*:\s*([0-9]+)"),
        )
    };
}

/// Quantity rule template: `(digits)[ \t]*<noun>\b`.
macro_rules! quantity {
    ($category:expr, $nouns:literal) => {
        CountRule::new(
            $category,
            RuleShape::Quantity,
            concat!(r"(?i)\b([0-9]+)[ \t]*(?:", $nouns, r")\b"),
        )
    };
}

static COUNT_RULES: LazyLock<Vec<CountRule>> = LazyLock::new(|| {
    vec![
        labeled!(Category::Pedestrians, r"PESSOAS?\s+A\s+P[ÉE]"),
        labeled!(Category::Motorcycles, r"MOTO(?:S|CICLETAS?)?"),
        labeled!(Category::Cars, r"CARROS?"),
        labeled!(Category::Bicycles, r"BICICLETAS?"),
        labeled!(Category::Arrests, r"(?:PRIS(?:ÃO|ÕES|AO|OES)|PRESOS?)"),
        labeled!(
            Category::SeizedMotorcycles,
            r"MOTO(?:S|CICLETAS?)?\s+APREENDIDAS?"
        ),
        labeled!(
            Category::Fugitives,
            r"FORAGIDOS?(?:\s+(?:RE)?CAPTURADOS?)?"
        ),
        quantity!(
            Category::BladedWeapons,
            r"ARMAS?[ \t]+BRANCAS?|FAC(?:AS?|ÃO|ÕES|AO|OES)|CANIVETES?|PUNHA(?:L|IS)|ESTILETES?"
        ),
        quantity!(
            Category::Firearms,
            r"ARMAS?[ \t]+DE[ \t]+FOGO|PISTOLAS?|REV[ÓO]LVER(?:ES)?|ESPINGARDAS?|FUZIS|FUZIL|RIFLES?"
        ),
    ]
});

/// Returns the rule table in evaluation order.
#[must_use]
pub fn count_rules() -> &'static [CountRule] {
    &COUNT_RULES
}

/// Fills every category from the rule table.
#[must_use]
pub fn extract_counts(upper: &str) -> CategoryCounts {
    let rules = count_rules();
    let mut counts = CategoryCounts::default();

    for category in Category::all() {
        let value = rules
            .iter()
            .filter(|rule| rule.category == *category)
            .find_map(|rule| rule.apply(upper));

        if let Some(value) = value {
            *counts.get_mut(*category) = value;
        } else {
            log::debug!("No match for {category}, defaulting to 0");
        }
    }

    counts
}

fn parse_count(digits: &str) -> u64 {
    digits.parse::<u64>().map_or(MAX_COUNT, |n| n.min(MAX_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(category: Category) -> &'static CountRule {
        count_rules()
            .iter()
            .find(|r| r.category == category)
            .unwrap()
    }

    #[test]
    fn every_category_has_a_rule() {
        for category in Category::all() {
            assert!(
                count_rules().iter().any(|r| r.category == *category),
                "{category:?} has no rule"
            );
        }
    }

    #[test]
    fn labeled_rules_accept_plural_and_spacing_variants() {
        let cars = rule_for(Category::Cars);
        assert_eq!(cars.shape, RuleShape::Labeled);
        assert_eq!(cars.apply("CARROS: 3"), Some(3));
        assert_eq!(cars.apply("CARRO:3"), Some(3));
        assert_eq!(cars.apply("CARROS   :   12"), Some(12));
        assert_eq!(cars.apply("CARROS 3"), None);

        let people = rule_for(Category::Pedestrians);
        assert_eq!(people.apply("PESSOAS A PÉ: 5"), Some(5));
        assert_eq!(people.apply("PESSOAS A PE: 5"), Some(5));
    }

    #[test]
    fn stopped_motorcycles_do_not_read_seized_line() {
        let upper = "MOTOS APREENDIDAS: 2\nMOTOS: 7";
        assert_eq!(rule_for(Category::Motorcycles).apply(upper), Some(7));
        assert_eq!(rule_for(Category::SeizedMotorcycles).apply(upper), Some(2));

        let only_seized = "MOTOS APREENDIDAS: 2";
        assert_eq!(rule_for(Category::Motorcycles).apply(only_seized), None);
    }

    #[test]
    fn arrest_label_variants() {
        let arrests = rule_for(Category::Arrests);
        assert_eq!(arrests.apply("PRISÕES: 2"), Some(2));
        assert_eq!(arrests.apply("PRISAO: 1"), Some(1));
        assert_eq!(arrests.apply("PRESOS: 4"), Some(4));
    }

    #[test]
    fn bladed_weapon_nouns() {
        let bladed = rule_for(Category::BladedWeapons);
        assert_eq!(bladed.shape, RuleShape::Quantity);
        assert_eq!(bladed.apply("APREENSÃO DE 2 FACAS"), Some(2));
        assert_eq!(bladed.apply("1 FACÃO"), Some(1));
        assert_eq!(bladed.apply("3 FACÕES"), Some(3));
        assert_eq!(bladed.apply("1 CANIVETE"), Some(1));
        assert_eq!(bladed.apply("2 PUNHAIS"), Some(2));
        assert_eq!(bladed.apply("4 ARMAS BRANCAS"), Some(4));
        assert_eq!(bladed.apply("1 ESTILETE"), Some(1));
    }

    #[test]
    fn bladed_weapons_skip_look_alike_words() {
        let bladed = rule_for(Category::BladedWeapons);
        assert_eq!(bladed.apply("VÍTIMA COM 2 FACADAS"), None);
        assert_eq!(bladed.apply("BICICLETAS: 2\nFACA ENCONTRADA"), None);
    }

    #[test]
    fn firearm_nouns() {
        let firearms = rule_for(Category::Firearms);
        assert_eq!(firearms.apply("1 PISTOLA"), Some(1));
        assert_eq!(firearms.apply("2 REVÓLVERES"), Some(2));
        assert_eq!(firearms.apply("1 REVOLVER CALIBRE 38"), Some(1));
        assert_eq!(firearms.apply("1 ESPINGARDA"), Some(1));
        assert_eq!(firearms.apply("2 FUZIS"), Some(2));
        assert_eq!(firearms.apply("3 ARMAS DE FOGO"), Some(3));
        assert_eq!(firearms.apply("2 ARMAS BRANCAS"), None);
    }

    #[test]
    fn first_match_wins() {
        let firearms = rule_for(Category::Firearms);
        assert_eq!(firearms.apply("1 PISTOLA E 2 REVÓLVERES"), Some(1));
    }

    #[test]
    fn oversized_counts_saturate() {
        let cars = rule_for(Category::Cars);
        assert_eq!(cars.apply("CARROS: 99999999999999999999999"), Some(MAX_COUNT));
        assert_eq!(cars.apply("CARROS: 9223372036854775808"), Some(MAX_COUNT));
        assert_eq!(
            cars.apply("CARROS: 9223372036854775807"),
            Some(9_223_372_036_854_775_807)
        );
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        let cars = rule_for(Category::Cars);
        assert_eq!(cars.apply("CARROS: ٣"), None);
    }

    #[test]
    fn missing_categories_default_to_zero() {
        let counts = extract_counts("CARROS: 3");
        assert_eq!(counts.cars, 3);
        assert_eq!(counts.pedestrians, 0);
        assert_eq!(counts.firearms, 0);
    }
}
