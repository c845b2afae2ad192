//! Shared application state handed to every module.

use std::sync::Arc;

use anyhow::Context;

use folio_assets::AssetStore;
use folio_auth::SessionStore;
use folio_db::Database;
use folio_kernel::settings::Settings;

use crate::modules::auth::store::UserStore;
use crate::modules::books::catalog::BookCatalog;
use crate::modules::books::store::MemoryBookStore;

/// Every store the modules share, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Database,
    pub assets: AssetStore,
    pub sessions: SessionStore,
    pub users: UserStore,
    pub catalog: BookCatalog,
}

impl AppState {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::open();

        let assets = AssetStore::open(settings.assets.upload_dir.as_str())
            .await
            .with_context(|| {
                format!(
                    "failed to open asset store at '{}'",
                    settings.assets.upload_dir
                )
            })?;

        let sessions = SessionStore::new(time::Duration::seconds(
            settings.auth.session_ttl_secs as i64,
        ));

        let users = UserStore::new(&db);
        let books = MemoryBookStore::new(&db);
        let catalog = BookCatalog::new(Arc::new(books), assets.clone());

        Ok(Self {
            settings: Arc::new(settings),
            db,
            assets,
            sessions,
            users,
            catalog,
        })
    }
}
