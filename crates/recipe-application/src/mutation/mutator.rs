use recipe_core::error::{RecipeError, Result};
use recipe_core::notification::{NotificationKind, Notifier};
use recipe_core::recipe::{BulkImportReceipt, Recipe, RecipeId, RecipeInput, RecipePatch};
use recipe_core::transport::UploadFile;
use std::sync::Arc;
use tokio::sync::watch;

use super::tracker::{MutationFlight, MutationKind, MutationSnapshot, MutationState, MutationTracker};
use crate::cache::CacheTarget;
use crate::client::{CachedData, RECIPES_PATH, RecipeClient, decode, detail_path};

const BULK_IMPORT_PATH: &str = "/recipes/bulk-import";

/// Create, update, delete and bulk import for recipes.
///
/// Every operation validates its input before dispatch, tracks its own
/// in-progress state, and on completion sends exactly one notification.
/// Failures are notified as `Failed to <verb> recipe: <message>` and the
/// underlying error is still returned to the caller.
pub struct RecipeMutator {
    client: Arc<RecipeClient>,
    notifier: Arc<dyn Notifier>,
    tracker: MutationTracker,
}

impl RecipeMutator {
    pub fn new(client: Arc<RecipeClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            tracker: MutationTracker::new(),
        }
    }

    /// Creates a recipe and marks every cached listing stale.
    pub async fn create(&self, input: RecipeInput) -> Result<Recipe> {
        input.validate()?;
        let body = serde_json::to_value(&input)?;

        let flight = self.tracker.start(MutationKind::Create);
        let result = async {
            let value = self.client.transport().post(RECIPES_PATH, body).await?;
            decode::<Recipe>(value)
        }
        .await;

        match result {
            Ok(recipe) => {
                let cache = self.client.cache();
                cache.invalidate(&self.client.keys().lists()).await;
                flight.succeed();
                tracing::info!("[RecipeMutator] Created recipe id={}", recipe.id);
                self.notifier
                    .notify(NotificationKind::Success, "Recipe created successfully");
                Ok(recipe)
            }
            Err(err) => Err(self.failed(flight, "create", err)),
        }
    }

    /// Updates a recipe. The returned entity is written straight into the
    /// recipe's detail entry so readers see it without a refetch; listings
    /// are marked stale.
    pub async fn update(&self, id: RecipeId, patch: RecipePatch) -> Result<Recipe> {
        validate_id(id)?;
        patch.validate()?;
        let body = serde_json::to_value(&patch)?;

        let flight = self.tracker.start(MutationKind::Update);
        let result = async {
            let value = self.client.transport().put(&detail_path(id), body).await?;
            decode::<Recipe>(value)
        }
        .await;

        match result {
            Ok(recipe) => {
                let keys = self.client.keys();
                let cache = self.client.cache();
                cache
                    .set(keys.detail(id), CachedData::Recipe(Box::new(recipe.clone())))
                    .await;
                cache.invalidate(&keys.lists()).await;
                flight.succeed();
                tracing::info!("[RecipeMutator] Updated recipe id={}", id);
                self.notifier
                    .notify(NotificationKind::Success, "Recipe updated successfully");
                Ok(recipe)
            }
            Err(err) => Err(self.failed(flight, "update", err)),
        }
    }

    /// Deletes a recipe, marking its detail entry and every listing stale.
    pub async fn delete(&self, id: RecipeId) -> Result<()> {
        validate_id(id)?;
        let flight = self.tracker.start(MutationKind::Delete);
        match self.client.transport().delete(&detail_path(id)).await {
            Ok(()) => {
                let keys = self.client.keys();
                let cache = self.client.cache();
                cache.invalidate(&CacheTarget::Exact(keys.detail(id))).await;
                cache.invalidate(&keys.lists()).await;
                flight.succeed();
                tracing::info!("[RecipeMutator] Deleted recipe id={}", id);
                self.notifier
                    .notify(NotificationKind::Success, "Recipe deleted successfully");
                Ok(())
            }
            Err(err) => Err(self.failed(flight, "delete", err)),
        }
    }

    /// Queues a server-side import. The cache is left alone: results arrive
    /// later under the returned job id.
    pub async fn bulk_import(&self, file: UploadFile) -> Result<BulkImportReceipt> {
        validate_import_file(&file)?;

        let flight = self.tracker.start(MutationKind::BulkImport);
        let result = async {
            let value = self.client.transport().upload(BULK_IMPORT_PATH, file).await?;
            decode::<BulkImportReceipt>(value)
        }
        .await;

        match result {
            Ok(receipt) => {
                flight.succeed();
                tracing::info!(
                    "[RecipeMutator] Bulk import queued: job_id={}, total_items={}",
                    receipt.job_id,
                    receipt.total_items
                );
                self.notifier.notify(
                    NotificationKind::Success,
                    &format!(
                        "Import started (job {}): {} recipes queued",
                        receipt.job_id, receipt.total_items
                    ),
                );
                Ok(receipt)
            }
            Err(err) => {
                flight.fail();
                tracing::error!("[RecipeMutator] Bulk import failed: {}", err);
                self.notifier.notify(
                    NotificationKind::Error,
                    &format!("Failed to import recipes: {}", err),
                );
                Err(err)
            }
        }
    }

    pub fn state(&self, kind: MutationKind) -> MutationState {
        self.tracker.snapshot().state(kind)
    }

    /// True while any mutation is awaiting its response.
    pub fn is_mutating(&self) -> bool {
        self.tracker.snapshot().is_any_pending()
    }

    pub fn snapshot(&self) -> MutationSnapshot {
        self.tracker.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationSnapshot> {
        self.tracker.subscribe()
    }

    /// Returns a settled operation kind to Idle.
    pub fn reset(&self, kind: MutationKind) {
        self.tracker.reset(kind);
    }

    fn failed(&self, flight: MutationFlight, verb: &str, err: RecipeError) -> RecipeError {
        flight.fail();
        tracing::error!("[RecipeMutator] Failed to {} recipe: {}", verb, err);
        self.notifier.notify(
            NotificationKind::Error,
            &format!("Failed to {} recipe: {}", verb, err),
        );
        err
    }
}

fn validate_id(id: RecipeId) -> Result<()> {
    if id <= 0 {
        return Err(RecipeError::validation(format!("invalid recipe id: {}", id)));
    }
    Ok(())
}

fn validate_import_file(file: &UploadFile) -> Result<()> {
    if file.bytes.is_empty() {
        return Err(RecipeError::validation("import file is empty"));
    }
    match file.extension().as_deref() {
        Some("json") | Some("csv") => Ok(()),
        _ => Err(RecipeError::validation(format!(
            "unsupported import file '{}': expected .json or .csv",
            file.file_name
        ))),
    }
}
