//! Dutch prompt text for the summarizer.

use std::fmt::Display;

use vastgoed_core::{AreaSubject, IndividualSubject};
use vastgoed_providers::{AreaListing, EnergyLabelData, ProviderResult};

use crate::area::AreaFacts;
use crate::single::PropertyFacts;

pub const SYSTEM_PROMPT: &str = r#"Je bent een Nederlandse vastgoedexpert die alleen antwoordt in JSON formaat.

KRITIEKE INSTRUCTIES:
- Geef ALLEEN een JSON object terug
- Geen tekst voor of na de JSON
- Geen uitleg buiten de JSON
- Gebruik PRECIES deze structuur:

{
  "geschat_verkoopbedrag": "€XXX.XXX",
  "zekerheid": "XX%",
  "argumentatie": [
    "Korte reden 1",
    "Korte reden 2",
    "Korte reden 3"
  ]
}

REGELS:
- geschat_verkoopbedrag: Een bedrag in euro's (bijv. "€425.000")
- zekerheid: Percentage tussen 30% en 95% (bijv. "75%")
- argumentatie: Array van 3-5 korte zinnen over locatie, oppervlakte, staat, vergelijkbare verkopen

BELANGRIJK: Geef alleen de JSON terug, geen andere tekst!"#;

const NA: &str = "N/A";

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NA.to_owned(), |v| v.to_string())
}

/// Header line for a provider section that produced no data.
fn unavailable<T>(title: &str, result: &ProviderResult<T>) -> Option<String> {
    match result {
        ProviderResult::Success(_) => None,
        ProviderResult::Absent => Some(format!("{title}: niet beschikbaar")),
        ProviderResult::Failure(message) => {
            Some(format!("{title}: niet beschikbaar ({message})"))
        }
    }
}

#[must_use]
pub fn individual_prompt(subject: &IndividualSubject, facts: &PropertyFacts) -> String {
    let mut lines = vec![
        format!("VASTGOED ANALYSE DATA voor {}:", subject.display_address()),
        String::new(),
    ];

    if let Some(loc) = facts.location.success() {
        lines.extend([
            "LOCATIE DATA:".to_owned(),
            format!("- Type: {}", or_na(loc.house_type.as_deref())),
            format!("- Bouwjaar: {}", or_na(loc.build_year)),
            format!("- Oppervlakte binnen: {} m²", or_na(loc.inner_surface_area)),
            format!("- Volume: {} m³", or_na(loc.volume)),
            format!("- Kamers: {}", or_na(loc.rooms)),
            format!("- Energielabel: {}", or_na(loc.energy_label.as_deref())),
        ]);
    } else {
        lines.extend(unavailable("LOCATIE DATA", &facts.location));
    }
    lines.push(String::new());

    if let Some(reference) = facts.reference.success() {
        lines.extend([
            "REFERENTIE DATA:".to_owned(),
            format!("- Vergelijkbare woningen: {}", reference.summary.count),
            format!(
                "- Prijsrange vergelijkingen: {}",
                or_na(reference.price_mean.as_deref())
            ),
            format!(
                "- Gemiddelde afstand: {} m",
                reference.summary.mean_distance_m
            ),
        ]);
    } else {
        lines.extend(unavailable("REFERENTIE DATA", &facts.reference));
    }
    lines.push(String::new());

    if let Some(woz) = facts.valuation.success() {
        lines.push("WOZ DATA:".to_owned());
        match woz.latest() {
            Some(latest) => lines.push(format!(
                "- Laatste WOZ waarde: €{} ({})",
                latest.value, latest.year
            )),
            None => lines.push(format!("- Laatste WOZ waarde: {NA}")),
        }
        if let Some(growth) = &woz.growth {
            lines.push(format!(
                "- Groei {}-{}: {}%",
                growth.from_year, growth.to_year, growth.percentage
            ));
        }
    } else {
        lines.extend(unavailable("WOZ DATA", &facts.valuation));
    }
    lines.push(String::new());

    match &facts.energy_label {
        ProviderResult::Success(label) => {
            lines.extend([
                "ENERGIELABEL:".to_owned(),
                format!("- Label: {}", or_na(label.energy_class.as_deref())),
                format!("- Oppervlakte: {} m²", or_na(label.floor_area)),
                format!("- Geldig tot: {}", or_na(label.valid_until)),
            ]);
        }
        ProviderResult::Absent => lines.push("ENERGIELABEL: Niet gevonden".to_owned()),
        ProviderResult::Failure(message) => {
            lines.push(format!("ENERGIELABEL: niet beschikbaar ({message})"));
        }
    }

    lines.push(String::new());
    lines.push("Geef een JSON analyse van deze woning.".to_owned());
    lines.join("\n")
}

fn listing_label(result: Option<&ProviderResult<EnergyLabelData>>) -> String {
    match result {
        Some(ProviderResult::Success(label)) => or_na(label.energy_class.as_deref()),
        Some(ProviderResult::Absent) => "niet gevonden".to_owned(),
        Some(ProviderResult::Failure(_)) | None => "onbekend".to_owned(),
    }
}

fn listing_line(listing: &AreaListing, facts: &AreaFacts) -> String {
    format!(
        "- {}: vraagprijs {}, status {}, energielabel {}",
        listing.address,
        listing
            .asking_price
            .map_or_else(|| NA.to_owned(), |p| format!("€{p}")),
        or_na(listing.status.as_deref()),
        listing_label(facts.label_for(listing)),
    )
}

#[must_use]
pub fn area_prompt(subject: &AreaSubject, facts: &AreaFacts) -> String {
    let stats = &facts.statistics;
    let mut lines = vec![
        format!("GEBIED ANALYSE DATA voor postcode {}:", subject.postal_code),
        String::new(),
        "STATISTIEKEN:".to_owned(),
        format!("- Totaal panden: {}", stats.total),
        format!("- Panden met prijs: {}", stats.with_price),
        format!("- Beschikbaar: {}", stats.available),
        format!("- Verkocht: {}", stats.sold),
        format!(
            "- Gemiddelde vraagprijs: {}",
            stats
                .average_price
                .map_or_else(|| NA.to_owned(), |p| format!("€{p}"))
        ),
        format!(
            "- Prijsrange: {}",
            stats
                .price_range
                .map_or_else(|| NA.to_owned(), |r| format!("€{} - €{}", r.low, r.high))
        ),
    ];
    if !stats.streets.is_empty() {
        let streets: Vec<&str> = stats.streets.iter().map(String::as_str).collect();
        lines.push(format!("- Straten: {}", streets.join(", ")));
    }

    lines.push(String::new());
    lines.push("PANDEN:".to_owned());
    lines.extend(facts.listings.iter().map(|l| listing_line(l, facts)));

    lines.push(String::new());
    lines.push("Geef een JSON analyse van dit gebied.".to_owned());
    lines.join("\n")
}
