use folio_assets::AssetRef;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    /// Unique identifier, assigned by the store on creation
    pub id: Uuid,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Description of the book
    pub description: String,
    /// Cover image handle; `None` means no cover
    pub image: Option<AssetRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields for a new catalog entry.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub image: Option<AssetRef>,
}

/// Sparse field changes for an existing entry. Absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// Pagination metadata; key names are part of the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

/// One newest-first page of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_serializes_with_camel_case_keys() {
        let pagination = Pagination {
            current_page: 2,
            total_pages: 2,
            total_items: 15,
            items_per_page: 10,
        };

        let json = serde_json::to_value(&pagination).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalItems"], 15);
        assert_eq!(json["itemsPerPage"], 10);
    }
}
