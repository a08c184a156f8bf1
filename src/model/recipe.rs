use std::num::NonZeroU32;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ingredient name → required quantity. Zero quantities are rejected when
/// a document is parsed. Order is the document order.
pub type Ingredients = IndexMap<String, NonZeroU32>;

/// Recipe name → recipe, in document order.
pub type RecipeBook = IndexMap<String, Recipe>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub level: u32,
    #[serde(default)]
    pub ingredients: Ingredients,
}

impl Recipe {
    pub fn new<'a>(level: u32, ingredients: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let ingredients = ingredients
            .into_iter()
            .filter_map(|(name, qty)| NonZeroU32::new(qty).map(|q| (name.to_string(), q)))
            .collect();

        Self { level, ingredients }
    }

    /// One `name: quantity` line per ingredient.
    pub fn needs_lines(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(|(name, qty)| format!("{name}: {qty}"))
            .collect()
    }
}

/// Built-in set written on first launch.
pub fn default_recipes() -> RecipeBook {
    let mut book = RecipeBook::new();
    book.insert(
        "Anneau Agile".into(),
        Recipe::new(10, [("Cuir de Bouftou", 2), ("Bois de Châtaigner", 3)]),
    );
    book.insert(
        "Anneau Chanceux".into(),
        Recipe::new(60, [("Cuir du Tofu Maléfique", 4), ("Or", 1)]),
    );
    book
}
