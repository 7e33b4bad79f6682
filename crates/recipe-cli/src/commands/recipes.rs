use anyhow::{Context, Result};
use recipe_core::recipe::{Recipe, RecipeInput, RecipePatch};
use recipe_core::transport::UploadFile;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::context::CliContext;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub async fn get(ctx: &CliContext, id: i64) -> Result<()> {
    let recipe = ctx.app.client().recipe(id).await?;
    print_recipe(&recipe);
    Ok(())
}

pub async fn create(ctx: &CliContext, file: &Path) -> Result<()> {
    let input: RecipeInput = read_json(file)?;
    let recipe = ctx.app.mutator().create(input).await?;
    println!("id: {}", recipe.id);
    Ok(())
}

pub async fn update(ctx: &CliContext, id: i64, file: &Path) -> Result<()> {
    let patch: RecipePatch = read_json(file)?;
    let recipe = ctx.app.mutator().update(id, patch).await?;
    print_recipe(&recipe);
    Ok(())
}

pub async fn delete(ctx: &CliContext, id: i64) -> Result<()> {
    ctx.app.mutator().delete(id).await?;
    Ok(())
}

pub async fn import(ctx: &CliContext, file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    ctx.app
        .mutator()
        .bulk_import(UploadFile::new(file_name, bytes))
        .await?;
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("{} (#{})", recipe.title, recipe.id);
    if let Some(description) = &recipe.description {
        println!("{}", description);
    }
    let mut facts = Vec::new();
    if let Some(cuisine) = &recipe.cuisine {
        facts.push(cuisine.clone());
    }
    if let Some(difficulty) = recipe.difficulty {
        facts.push(difficulty.to_string());
    }
    if let Some(minutes) = recipe.total_time() {
        facts.push(format!("{} min", minutes));
    }
    if let Some(servings) = recipe.servings {
        facts.push(format!("serves {}", servings));
    }
    if !recipe.diet_types.is_empty() {
        facts.push(recipe.diet_types.join(", "));
    }
    if !facts.is_empty() {
        println!("{}", facts.join(" · "));
    }

    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient);
    }
    println!("\nInstructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", step + 1, instruction);
    }
}
