use anyhow::{Context, Result};
use recipe_application::RecipeApp;
use recipe_core::notification::NotificationKind;
use recipe_infrastructure::{
    ChannelNotifier, ConfigService, FileKeyValueStore, HttpTransport, Notification, UrlLocation,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedReceiver;

/// Base of the location used for terminal sessions. Only its query string
/// carries meaning.
pub const SEARCH_URL: &str = "recipe://search";

/// Everything a command needs: the wired session plus the notification
/// feed to print once the command finishes.
pub struct CliContext {
    pub app: RecipeApp,
    pub location: Arc<UrlLocation>,
    notifications: Mutex<UnboundedReceiver<Notification>>,
}

impl CliContext {
    pub fn load(api_url: Option<String>) -> Result<Self> {
        let mut config = ConfigService::new()?
            .get_config()
            .context("Failed to load configuration")?;
        if let Some(url) = api_url {
            config.api_base_url = url;
        }

        tracing::debug!("[CliContext] Using API at {}", config.api_base_url);
        let transport = HttpTransport::from_config(&config)?;
        let storage = FileKeyValueStore::default_location()?;
        let (notifier, notifications) = ChannelNotifier::new();
        let location = Arc::new(UrlLocation::parse(SEARCH_URL)?);

        let app = RecipeApp::new(
            config,
            Arc::new(transport),
            Arc::new(storage),
            Arc::new(notifier),
            location.clone(),
        )?;

        Ok(Self {
            app,
            location,
            notifications: Mutex::new(notifications),
        })
    }

    /// Prints queued notifications: successes and info to stdout, the rest
    /// to stderr.
    pub fn flush_notifications(&self) {
        let mut receiver = self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while let Ok(notification) = receiver.try_recv() {
            match notification.kind {
                NotificationKind::Success | NotificationKind::Info => {
                    println!("{}", notification.message)
                }
                NotificationKind::Warning | NotificationKind::Error => {
                    eprintln!("{}: {}", notification.kind, notification.message)
                }
            }
        }
    }
}
