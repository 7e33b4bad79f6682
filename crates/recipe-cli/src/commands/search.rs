use anyhow::Result;
use clap::Args;
use recipe_core::filter::{FilterPatch, RangeFilter};
use recipe_core::location::Location;
use recipe_core::recipe::{Difficulty, RecipePage};

use recipe_infrastructure::UrlLocation;

use crate::context::{CliContext, SEARCH_URL};

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free-text query
    pub query: Option<String>,

    /// Start from the query string of a shared search link
    #[arg(long, value_name = "QUERY_STRING")]
    pub from: Option<String>,

    #[arg(long)]
    pub cuisine: Option<String>,

    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    /// Diet type; repeat for several
    #[arg(long = "diet")]
    pub diets: Vec<String>,

    #[arg(long)]
    pub min_prep: Option<u32>,
    #[arg(long)]
    pub max_prep: Option<u32>,
    #[arg(long)]
    pub min_cook: Option<u32>,
    #[arg(long)]
    pub max_cook: Option<u32>,
    #[arg(long)]
    pub min_servings: Option<u32>,
    #[arg(long)]
    pub max_servings: Option<u32>,

    #[arg(long)]
    pub page: Option<u32>,

    /// Print the raw page as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn filter_patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::new();
        if let Some(cuisine) = &self.cuisine {
            patch = patch.cuisine(Some(cuisine.as_str()));
        }
        if self.difficulty.is_some() {
            patch = patch.difficulty(self.difficulty);
        }
        if !self.diets.is_empty() {
            patch = patch.diet_types(self.diets.iter().cloned());
        }
        let prep = RangeFilter::new(self.min_prep, self.max_prep);
        if prep.is_active() {
            patch = patch.prep_time(prep);
        }
        let cook = RangeFilter::new(self.min_cook, self.max_cook);
        if cook.is_active() {
            patch = patch.cook_time(cook);
        }
        let servings = RangeFilter::new(self.min_servings, self.max_servings);
        if servings.is_active() {
            patch = patch.servings(servings);
        }
        patch
    }
}

pub async fn run(ctx: &CliContext, args: SearchArgs) -> Result<()> {
    let search = ctx.app.search();

    if let Some(from) = &args.from {
        let pairs = parse_query_string(from)?;
        ctx.location.replace_query_pairs(&pairs);
        search.on_navigate();
    }

    let patch = args.filter_patch();
    if !patch.is_empty() {
        search.update_filters(patch);
    }
    if let Some(query) = &args.query {
        search.submit_query(query);
    }
    if let Some(page) = args.page {
        search.set_page(page);
    }

    let page = search.results().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&page);
        if let Some(query) = ctx.location.url().query() {
            println!("\nlink: ?{}", query);
        }
    }
    Ok(())
}

/// Decoded pairs of a full link or a bare query string.
fn parse_query_string(raw: &str) -> Result<Vec<(String, String)>> {
    let query = raw.rsplit_once('?').map_or(raw, |(_, query)| query);
    let location = UrlLocation::parse(&format!("{}?{}", SEARCH_URL, query))?;
    Ok(location.query_pairs())
}

fn print_page(page: &RecipePage) {
    if page.items.is_empty() {
        println!("No recipes found.");
        return;
    }
    for recipe in &page.items {
        let minutes = recipe
            .total_time()
            .map(|t| format!("{} min", t))
            .unwrap_or_else(|| "-".to_string());
        let difficulty = recipe.difficulty.map(|d| d.to_string()).unwrap_or_default();
        println!(
            "{:>6}  {:<40}  {:<12}  {:<8}  {}",
            recipe.id,
            recipe.title,
            recipe.cuisine.as_deref().unwrap_or("-"),
            difficulty,
            minutes
        );
    }
    println!(
        "\npage {} of {} ({} recipes)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}
