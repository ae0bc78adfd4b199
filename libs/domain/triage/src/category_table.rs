// [libs/domain/triage/src/category_table.rs]
/*!
 * Tablas de datos estáticas que alimentan el motor de reglas.
 * Deliberadamente planas y cerradas — igual que los motores con
 * nombre fijo (`sequential_engine`, `dictionary_engine`, ...) con los
 * que el repositorio de referencia despacha sobre un conjunto
 * pequeño de estrategias por nombre: aquí el "motor" es un bucket de
 * palabras clave en lugar de un algoritmo, pero la forma —
 * despachar sobre una lista ordenada de entradas con nombre, primera
 * coincidencia gana — es la misma.
 */

/// `(bucket name, keywords, category)`. Order is significant: first
/// match wins, ties broken by declaration order.
pub const KEYWORD_BUCKETS: &[(&str, &[&str], &str)] = &[
    ("flood", &["flood", "water", "rising"], "Flood Rescue"),
    ("fire", &["fire", "smoke", "burn"], "Fire Response"),
    ("medical", &["medical", "unconscious", "bleeding"], "Medical Emergency"),
    ("structural", &["trapped", "collapse"], "Rescue"),
];

pub const DEFAULT_CATEGORY: &str = "General Emergency";

/// Base priority per category, before headcount/phrase bumps.
pub fn base_priority(category: &str) -> u8 {
    match category {
        "Flood Rescue" => 4,
        "Fire Response" => 4,
        "Medical Emergency" => 4,
        "Rescue" => 4,
        _ => 2,
    }
}

/// Fixed category -> required division type mapping.
pub fn required_division_type(category: &str) -> &'static str {
    match category {
        "Flood Rescue" => "Rescue",
        "Fire Response" => "Emergency Response",
        "Medical Emergency" => "Medical",
        "Rescue" => "Rescue",
        _ => "Emergency Response",
    }
}

/// Per-category skill seeds; deduplicated union is taken
/// by the caller since a single category here maps to one seed set.
pub fn skill_seeds(category: &str) -> &'static [&'static str] {
    match category {
        "Flood Rescue" => &["water_rescue", "swift_water", "first_aid"],
        "Fire Response" => &["fire_suppression", "hazmat", "evacuation"],
        "Medical Emergency" => &["trauma_care", "first_aid", "triage"],
        "Rescue" => &["urban_search_rescue", "structural_collapse", "first_aid"],
        _ => &["first_aid"],
    }
}

/// Canonical organisation category that the Assignment Engine's
/// `category_match` term compares an organisation's own
/// `category` field against.
pub fn canonical_org_category(category: &str) -> &'static str {
    match category {
        "Flood Rescue" => "rescue",
        "Fire Response" => "emergency_response",
        "Medical Emergency" => "medical",
        "Rescue" => "rescue",
        _ => "emergency_response",
    }
}

/// The phrases that each contribute +1 to priority, up to +2 total.
pub const PHRASE_BUMP_WORDS: &[&str] = &["urgent", "trapped", "children", "elderly"];

pub fn headcount_bump(headcount: u32) -> u8 {
    match headcount {
        0..=2 => 0,
        3..=9 => 1,
        10..=29 => 2,
        _ => 3,
    }
}

pub fn phrase_bump(text: &str) -> u8 {
    let lowered = text.to_lowercase();
    let hits = PHRASE_BUMP_WORDS.iter().filter(|word| lowered.contains(*word)).count();
    hits.min(2) as u8
}
