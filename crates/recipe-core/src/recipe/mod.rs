//! Recipe domain.
//!
//! This module contains the recipe resource as exchanged with the API:
//! full entities, create/update payloads, listing pages and bulk import
//! receipts.

pub mod model;

pub use model::{BulkImportReceipt, Difficulty, Recipe, RecipeId, RecipeInput, RecipePage, RecipePatch};
