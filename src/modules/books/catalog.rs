//! The book lifecycle core.
//!
//! Every mutating operation sequences one store commit against at most one
//! asset-store side effect. Cover cleanup is best-effort: its failure is
//! logged and never changes the primary outcome. There is no transaction
//! spanning the two stores; the orderings below bound, but do not
//! eliminate, the inconsistency windows.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use folio_assets::{AssetRef, AssetStore};
use folio_db::DbError;

use super::models::{Book, BookPage, BookPatch, NewBook, Pagination};
use super::store::BookStore;

/// Failures the catalog reports to the request surface.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("book not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Owner of book records and their cover-image references.
#[derive(Clone)]
pub struct BookCatalog {
    store: Arc<dyn BookStore>,
    assets: AssetStore,
}

impl BookCatalog {
    pub fn new(store: Arc<dyn BookStore>, assets: AssetStore) -> Self {
        Self { store, assets }
    }

    /// A newest-first page of books with pagination metadata.
    pub async fn list(&self, page: u64, per_page: u64) -> Result<BookPage, CatalogError> {
        let per_page = per_page.max(1);
        let offset = page.saturating_sub(1).saturating_mul(per_page);

        let (books, total) = self.store.page(offset as usize, per_page as usize).await?;
        let total = total as u64;

        Ok(BookPage {
            books,
            pagination: Pagination {
                current_page: page,
                total_pages: total.div_ceil(per_page),
                total_items: total,
                items_per_page: per_page,
            },
        })
    }

    /// Fetch a single book.
    pub async fn get(&self, id: Uuid) -> Result<Book, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Insert a new book. The cover, when present, was already written to
    /// the asset store; a failed commit must not leave it orphaned.
    pub async fn create(&self, fields: NewBook) -> Result<Book, CatalogError> {
        let image = fields.image.clone();

        match self.store.insert(fields).await {
            Ok(book) => Ok(book),
            Err(err) => {
                if let Some(asset) = &image {
                    self.discard(asset).await;
                }
                Err(err.into())
            }
        }
    }

    /// Apply a sparse update, optionally replacing the cover image.
    ///
    /// Any failure after the new cover was written removes it again; the
    /// missing-record case included, since there is nothing to attach it to.
    pub async fn update(
        &self,
        id: Uuid,
        patch: BookPatch,
        new_image: Option<AssetRef>,
    ) -> Result<Book, CatalogError> {
        match self.apply_update(id, patch, new_image.clone()).await {
            Ok(book) => Ok(book),
            Err(err) => {
                if let Some(asset) = &new_image {
                    self.discard(asset).await;
                }
                Err(err)
            }
        }
    }

    async fn apply_update(
        &self,
        id: Uuid,
        patch: BookPatch,
        new_image: Option<AssetRef>,
    ) -> Result<Book, CatalogError> {
        let mut book = self.store.get(id).await?.ok_or(CatalogError::NotFound)?;

        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(author) = patch.author {
            book.author = author;
        }
        if let Some(description) = patch.description {
            book.description = description;
        }

        if let Some(asset) = new_image {
            // The replaced cover goes away before the commit, matching the
            // delete ordering below.
            if let Some(old) = book.image.take() {
                self.discard(&old).await;
            }
            book.image = Some(asset);
        }

        let replaced = self.store.replace(book.clone()).await?;
        if !replaced {
            return Err(CatalogError::NotFound);
        }

        Ok(book)
    }

    /// Remove a book and its cover.
    ///
    /// The cover is removed before the record commit; a failed record
    /// delete leaves the record pointing at a missing file (accepted).
    pub async fn delete(&self, id: Uuid) -> Result<(), CatalogError> {
        let book = self.store.get(id).await?.ok_or(CatalogError::NotFound)?;

        if let Some(asset) = &book.image {
            self.discard(asset).await;
        }

        self.store.remove(id).await?;
        Ok(())
    }

    /// Best-effort asset removal; failure is logged, never surfaced.
    async fn discard(&self, asset: &AssetRef) {
        if let Err(err) = self.assets.remove(asset).await {
            tracing::warn!(asset = %asset, error = %err, "failed to remove cover image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::MemoryBookStore;
    use async_trait::async_trait;
    use folio_db::Database;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose write commits can be forced to fail.
    struct FlakyStore {
        inner: MemoryBookStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn new(db: &Database) -> Self {
            Self {
                inner: MemoryBookStore::new(db),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), DbError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(DbError::Unavailable("injected write failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl BookStore for FlakyStore {
        async fn insert(&self, fields: NewBook) -> Result<Book, DbError> {
            self.check()?;
            self.inner.insert(fields).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Book>, DbError> {
            self.inner.get(id).await
        }

        async fn replace(&self, book: Book) -> Result<bool, DbError> {
            self.check()?;
            self.inner.replace(book).await
        }

        async fn remove(&self, id: Uuid) -> Result<bool, DbError> {
            self.check()?;
            self.inner.remove(id).await
        }

        async fn page(&self, offset: usize, limit: usize) -> Result<(Vec<Book>, usize), DbError> {
            self.inner.page(offset, limit).await
        }
    }

    struct Fixture {
        catalog: BookCatalog,
        assets: AssetStore,
        flaky: Arc<FlakyStore>,
        _db: Database,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetStore::open(dir.path()).await.unwrap();
        let db = Database::open();
        let flaky = Arc::new(FlakyStore::new(&db));
        let catalog = BookCatalog::new(flaky.clone(), assets.clone());

        Fixture {
            catalog,
            assets,
            flaky,
            _db: db,
            _dir: dir,
        }
    }

    fn fields(title: &str, image: Option<AssetRef>) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Some Author".to_string(),
            description: "A description long enough to pass".to_string(),
            image,
        }
    }

    #[tokio::test]
    async fn create_without_cover_stores_none() {
        let fx = fixture().await;

        let book = fx.catalog.create(fields("Plain", None)).await.unwrap();

        assert!(book.image.is_none());
        assert_eq!(fx.catalog.get(book.id).await.unwrap().title, "Plain");
    }

    #[tokio::test]
    async fn create_with_cover_keeps_the_file() {
        let fx = fixture().await;
        let asset = fx.assets.save("cover.png", b"cover").await.unwrap();

        let book = fx
            .catalog
            .create(fields("Covered", Some(asset.clone())))
            .await
            .unwrap();

        assert_eq!(book.image, Some(asset.clone()));
        assert!(fx.assets.exists(&asset).await);
    }

    #[tokio::test]
    async fn failed_create_commit_removes_the_stored_cover() {
        let fx = fixture().await;
        let asset = fx.assets.save("cover.png", b"cover").await.unwrap();

        fx.flaky.fail_writes(true);
        let result = fx.catalog.create(fields("Doomed", Some(asset.clone()))).await;

        assert!(matches!(result, Err(CatalogError::Store(_))));
        assert!(!fx.assets.exists(&asset).await);
    }

    #[tokio::test]
    async fn update_is_sparse() {
        let fx = fixture().await;
        let book = fx
            .catalog
            .create(fields("Original title", None))
            .await
            .unwrap();

        let patch = BookPatch {
            title: Some("New title".to_string()),
            ..BookPatch::default()
        };
        let updated = fx.catalog.update(book.id, patch, None).await.unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.author, book.author);
        assert_eq!(updated.description, book.description);
        assert_eq!(updated.image, book.image);
    }

    #[tokio::test]
    async fn update_with_new_cover_replaces_the_old_one() {
        let fx = fixture().await;
        let old = fx.assets.save("old.png", b"old").await.unwrap();
        let book = fx
            .catalog
            .create(fields("Covered", Some(old.clone())))
            .await
            .unwrap();

        let new = fx.assets.save("new.png", b"new").await.unwrap();
        let updated = fx
            .catalog
            .update(book.id, BookPatch::default(), Some(new.clone()))
            .await
            .unwrap();

        assert_eq!(updated.image, Some(new.clone()));
        assert!(!fx.assets.exists(&old).await);
        assert!(fx.assets.exists(&new).await);
    }

    #[tokio::test]
    async fn update_of_missing_book_discards_the_uploaded_cover() {
        let fx = fixture().await;
        let asset = fx.assets.save("cover.png", b"cover").await.unwrap();

        let result = fx
            .catalog
            .update(Uuid::now_v7(), BookPatch::default(), Some(asset.clone()))
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound)));
        assert!(!fx.assets.exists(&asset).await);
    }

    #[tokio::test]
    async fn failed_update_commit_discards_the_new_cover() {
        let fx = fixture().await;
        let book = fx.catalog.create(fields("Stable", None)).await.unwrap();

        let new = fx.assets.save("new.png", b"new").await.unwrap();
        fx.flaky.fail_writes(true);
        let result = fx
            .catalog
            .update(book.id, BookPatch::default(), Some(new.clone()))
            .await;

        assert!(matches!(result, Err(CatalogError::Store(_))));
        assert!(!fx.assets.exists(&new).await);
    }

    #[tokio::test]
    async fn delete_removes_record_and_cover() {
        let fx = fixture().await;
        let asset = fx.assets.save("cover.png", b"cover").await.unwrap();
        let book = fx
            .catalog
            .create(fields("Goner", Some(asset.clone())))
            .await
            .unwrap();

        fx.catalog.delete(book.id).await.unwrap();

        assert!(!fx.assets.exists(&asset).await);
        assert!(matches!(
            fx.catalog.get(book.id).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_of_missing_book_reports_not_found() {
        let fx = fixture().await;

        assert!(matches!(
            fx.catalog.delete(Uuid::now_v7()).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn cover_cleanup_failure_does_not_change_the_outcome() {
        let fx = fixture().await;
        let asset = fx.assets.save("cover.png", b"cover").await.unwrap();
        let book = fx
            .catalog
            .create(fields("Orphan", Some(asset.clone())))
            .await
            .unwrap();

        // Make the later removal fail by deleting the file out from under
        // the catalog.
        fx.assets.remove(&asset).await.unwrap();

        fx.catalog.delete(book.id).await.unwrap();
        assert!(matches!(
            fx.catalog.get(book.id).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_paginates_newest_first() {
        let fx = fixture().await;
        for n in 1..=15 {
            fx.catalog
                .create(fields(&format!("Book {n:02}"), None))
                .await
                .unwrap();
        }

        let page = fx.catalog.list(2, 10).await.unwrap();

        assert_eq!(page.books.len(), 5);
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 2,
                total_pages: 2,
                total_items: 15,
                items_per_page: 10,
            }
        );
        // Second page of a newest-first listing holds the oldest five.
        assert_eq!(page.books[0].title, "Book 05");
        assert_eq!(page.books[4].title, "Book 01");
    }

    #[tokio::test]
    async fn list_of_empty_catalog_has_zero_pages() {
        let fx = fixture().await;

        let page = fx.catalog.list(1, 10).await.unwrap();

        assert!(page.books.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
        assert_eq!(page.pagination.total_items, 0);
    }
}
