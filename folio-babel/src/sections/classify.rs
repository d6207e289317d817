//! Heading text → section type.
//!
//! Rules are checked in table order and the first hit wins, so more specific
//! kinds (pros/cons, pricing, specs, comparison) sit above the broad ones.
//! Words match whole tokens of the lowercased heading; marks (emoji, currency
//! signs) and phrases match as substrings.

use super::SectionType;

struct Rule {
    kind: SectionType,
    words: &'static [&'static str],
    marks: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        kind: SectionType::ProsCons,
        words: &["pros", "cons", "advantages", "disadvantages", "likes", "dislikes"],
        marks: &["✅", "❌", "👍", "👎", "the good", "the bad"],
    },
    Rule {
        kind: SectionType::Pricing,
        words: &["price", "prices", "pricing", "cost", "costs", "variant", "variants", "availability"],
        marks: &["💰", "💵", "💸", "₹", "$", "€", "£", "¥", "value for money"],
    },
    Rule {
        kind: SectionType::SpecsTable,
        words: &["specs", "spec", "specifications", "specification"],
        marks: &["📋", "spec sheet"],
    },
    Rule {
        kind: SectionType::Comparison,
        words: &["vs", "versus", "comparison", "compared", "compare", "alternatives", "rivals"],
        marks: &["🆚", "⚔"],
    },
    Rule {
        kind: SectionType::Camera,
        words: &["camera", "cameras", "photography", "photo", "photos", "video", "lens", "selfie"],
        marks: &["📸", "📷", "🎥"],
    },
    Rule {
        kind: SectionType::Battery,
        words: &["battery", "charging", "charger", "endurance"],
        marks: &["🔋", "🔌"],
    },
    Rule {
        kind: SectionType::Display,
        words: &["display", "screen", "panel", "brightness"],
        marks: &["📱", "🖥", "refresh rate"],
    },
    Rule {
        kind: SectionType::Performance,
        words: &[
            "performance", "processor", "chipset", "benchmark", "benchmarks", "gaming", "speed",
            "cpu", "gpu", "software",
        ],
        marks: &["🚀", "🎮", "⚡"],
    },
    Rule {
        kind: SectionType::Design,
        words: &["design", "build", "materials", "ergonomics", "aesthetics", "looks"],
        marks: &["🎨", "look and feel"],
    },
    Rule {
        kind: SectionType::Verdict,
        words: &["verdict", "conclusion", "conclusions", "recommendation", "summary"],
        marks: &["🏆", "final thoughts", "should you buy", "bottom line"],
    },
    Rule {
        kind: SectionType::Highlights,
        words: &["highlights", "highlight", "features"],
        marks: &["🌟", "✨", "at a glance", "key features"],
    },
    Rule {
        kind: SectionType::Overview,
        words: &["overview", "introduction", "intro", "about"],
        marks: &["📝", "first impressions"],
    },
];

/// Classify a heading, or `None` when no rule matches.
pub fn match_heading(text: &str) -> Option<SectionType> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| {
            rule.words.iter().any(|keyword| words.contains(keyword))
                || rule.marks.iter().any(|mark| lower.contains(mark))
        })
        .map(|rule| rule.kind)
}

/// Classify a heading, falling back to [`SectionType::Custom`].
pub fn classify_heading(text: &str) -> SectionType {
    match match_heading(text) {
        Some(kind) => kind,
        None => {
            tracing::debug!(heading = text, "no section keyword matched; using custom");
            SectionType::Custom
        }
    }
}
