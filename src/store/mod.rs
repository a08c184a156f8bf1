pub mod json_file;
pub mod profile_store;
pub mod recipe_store;

pub use profile_store::ProfileStore;
pub use recipe_store::RecipeStore;
