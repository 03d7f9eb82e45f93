//! Known patrol sites and the spellings operators use for them.

use patrol_report_models::Location;

/// One patrol site and the upper-cased spellings that identify it.
#[derive(Debug, Clone, Copy)]
pub struct GazetteerEntry {
    pub location: Location,
    pub aliases: &'static [&'static str],
}

/// Known sites in precedence order. A report naming more than one site
/// resolves to the first entry listed here.
pub const GAZETTEER: &[GazetteerEntry] = &[
    GazetteerEntry {
        location: Location::Muana,
        aliases: &["MUANÁ", "MUANA"],
    },
    GazetteerEntry {
        location: Location::PontaDePedras,
        aliases: &["PONTA DE PEDRAS"],
    },
];

/// Resolves the patrol site named anywhere in `upper`.
#[must_use]
pub fn resolve_location(upper: &str) -> Location {
    GAZETTEER
        .iter()
        .find(|entry| entry.aliases.iter().any(|alias| upper.contains(alias)))
        .map_or_else(
            || {
                log::debug!("No known location in report");
                Location::Unknown
            },
            |entry| entry.location,
        )
}
