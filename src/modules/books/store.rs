//! Persistence seam for the catalog.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use folio_db::{Collection, Database, DbError};

use super::models::{Book, NewBook};

/// Storage the catalog commits to. The seam exists so the lifecycle core can
/// be exercised against a store whose commits fail.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book, assigning its id and creation time.
    async fn insert(&self, fields: NewBook) -> Result<Book, DbError>;

    /// Fetch a book by id.
    async fn get(&self, id: Uuid) -> Result<Option<Book>, DbError>;

    /// Commit a full replacement of an existing book. `false` when absent.
    async fn replace(&self, book: Book) -> Result<bool, DbError>;

    /// Remove a book record. `false` when absent.
    async fn remove(&self, id: Uuid) -> Result<bool, DbError>;

    /// A newest-first page plus the total number of books.
    async fn page(&self, offset: usize, limit: usize) -> Result<(Vec<Book>, usize), DbError>;
}

/// Document-store-backed book storage.
#[derive(Debug, Clone)]
pub struct MemoryBookStore {
    books: Collection<Book>,
}

impl MemoryBookStore {
    pub fn new(db: &Database) -> Self {
        Self {
            books: db.collection(),
        }
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, fields: NewBook) -> Result<Book, DbError> {
        self.books.insert_with(|id| Book {
            id,
            title: fields.title,
            author: fields.author,
            description: fields.description,
            image: fields.image,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>, DbError> {
        self.books.get(&id)
    }

    async fn replace(&self, book: Book) -> Result<bool, DbError> {
        let id = book.id;
        self.books.replace(&id, book)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, DbError> {
        self.books.remove(&id)
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<(Vec<Book>, usize), DbError> {
        let books = self.books.page_desc(offset, limit)?;
        let total = self.books.count()?;
        Ok((books, total))
    }
}
