use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::StoreError;
use crate::model::recipe::{default_recipes, Recipe, RecipeBook};
use crate::store::json_file::{read_json, write_json};

/// The recipe document plus its in-memory copy.
///
/// The two are only ever replaced together: every mutation writes the
/// document first and swaps the in-memory book only once the write went
/// through.
pub struct RecipeStore {
    path: PathBuf,
    recipes: RecipeBook,
}

impl RecipeStore {
    /// Load the store, writing the built-in recipes first if no document
    /// exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let recipes = load_recipes(&path)?;
        Ok(Self { path, recipes })
    }

    /// A store whose in-memory book does not come from its document. Used
    /// when the document is unreadable and must not be overwritten.
    pub fn detached(path: impl Into<PathBuf>, recipes: RecipeBook) -> Self {
        Self {
            path: path.into(),
            recipes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    /// Re-read the document from disk.
    pub fn load(&mut self) -> Result<&RecipeBook, StoreError> {
        self.recipes = load_recipes(&self.path)?;
        Ok(&self.recipes)
    }

    pub fn save(&mut self, recipes: RecipeBook) -> Result<(), StoreError> {
        validate(&recipes)?;
        write_json(&self.path, &recipes)?;
        self.recipes = recipes;
        info!("{} recipes saved to {}", self.recipes.len(), self.path.display());
        Ok(())
    }

    /// Replace the whole recipe set with the document at `source`.
    ///
    /// On any read, parse or write error the store is left exactly as it
    /// was, on disk and in memory.
    pub fn import(&mut self, source: &Path) -> Result<usize, StoreError> {
        let recipes: RecipeBook = read_json(source).inspect_err(|e| {
            warn!("recipe import from {} failed: {e}", source.display());
        })?;
        let count = recipes.len();

        self.save(recipes)?;
        info!("imported {count} recipes from {}", source.display());
        Ok(count)
    }
}

fn load_recipes(path: &Path) -> Result<RecipeBook, StoreError> {
    if !path.exists() {
        let defaults = default_recipes();
        write_json(path, &defaults)?;
        info!("wrote default recipes to {}", path.display());
    }

    let recipes: RecipeBook = read_json(path)?;
    validate(&recipes)?;
    Ok(recipes)
}

fn validate(recipes: &RecipeBook) -> Result<(), StoreError> {
    for name in recipes.keys() {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidRecipe {
                name: name.clone(),
                reason: "recipe name is empty".into(),
            });
        }
    }
    Ok(())
}
