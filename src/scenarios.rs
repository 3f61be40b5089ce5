//! The fixed, ordered list of advertising scenarios a batch walks through.

use serde::{Deserialize, Serialize};

/// Default scenario prompt templates, in attempt order.
pub const AD_SCENARIOS: [&str; 16] = [
    "Place this product on a massive digital billboard in Times Square at night, with vibrant, glowing city lights reflecting on it.",
    "Integrate this product into a full-page, glossy magazine advertisement. The style should be minimalist and luxurious.",
    "Show this product on a bus stop ad shelter in a rainy, cinematic city like London. The ad should be backlit and glowing.",
    "Create a vintage-style newspaper ad for this product, with a classic serif font and a slightly aged, textured paper background.",
    "Feature this product in a social media ad post, displayed on a smartphone held by a person. The background should be a trendy, bustling cafe.",
    "Design a subway car interior ad featuring this product. The ad should be long and horizontal, placed above the windows.",
    "Place this product on the side of a modern, clean-looking city bus, as a large vinyl wrap ad.",
    "Create an in-store promotional display for this product, placed at the end of an aisle in a bright, modern supermarket.",
    "Generate a web banner ad featuring this product, with a clear call-to-action button like 'Shop Now'. The style should be clean and corporate.",
    "Imagine this product being unboxed by an influencer in a well-lit, professional studio setting for a YouTube video thumbnail.",
    "Display this product on a sleek, modern airport luggage carousel advertisement screen, with travelers in the blurred background.",
    "Create a movie poster featuring this product as the central hero item, with dramatic lighting and a blockbuster movie title.",
    "Show this product on the screen of a jumbotron at a packed sports stadium during a game, with the crowd cheering.",
    "Create a gritty, thought-provoking piece of street art featuring this product, in the iconic stencil style of Banksy, on a weathered urban brick wall.",
    "Integrate this product into a beautiful, artistic mural painted on a brick wall in a trendy urban alleyway.",
    "Design an ad for this product to be placed on a ski lift chair, with a snowy mountain landscape in the background.",
];

/// A single scenario prompt template and its position in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub index: usize,
    pub prompt_template: String,
}

/// Immutable, ordered collection of scenarios.
///
/// Order determines both the attempt order of a batch and the display order
/// of results. Entries are re-indexed on construction so `index` always
/// matches the entry's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    entries: Vec<ScenarioEntry>,
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::from_templates(AD_SCENARIOS)
    }
}

impl ScenarioCatalog {
    /// Build a catalog from templates in the given order.
    pub fn from_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = templates
            .into_iter()
            .enumerate()
            .map(|(index, template)| ScenarioEntry {
                index,
                prompt_template: template.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScenarioEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ScenarioCatalog {
    type Item = &'a ScenarioEntry;
    type IntoIter = std::slice::Iter<'a, ScenarioEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
