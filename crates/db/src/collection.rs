//! Generic keyed document collections.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::timestamp::context::ContextV7;
use uuid::{Timestamp, Uuid};

use crate::{Database, DbError};

/// A keyed collection of documents of one type.
///
/// Keys are UUIDv7 minted from a per-collection monotonic clock, so the
/// map's ascending order is creation order and reverse iteration yields
/// newest-first, including for inserts within the same millisecond.
#[derive(Clone)]
pub struct Collection<T> {
    db: Database,
    clock: Arc<Mutex<ContextV7>>,
    items: Arc<RwLock<BTreeMap<Uuid, T>>>,
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("len", &self.items.read().len())
            .finish()
    }
}

impl<T: Clone> Collection<T> {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            clock: Arc::new(Mutex::new(ContextV7::new())),
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Insert a document built from a store-assigned id.
    pub fn insert_with(&self, build: impl FnOnce(Uuid) -> T) -> Result<T, DbError> {
        self.db.ensure_open()?;
        let id = Uuid::new_v7(Timestamp::now(&*self.clock.lock()));
        let doc = build(id);
        self.items.write().insert(id, doc.clone());
        Ok(doc)
    }

    /// Fetch a document by id.
    pub fn get(&self, id: &Uuid) -> Result<Option<T>, DbError> {
        self.db.ensure_open()?;
        Ok(self.items.read().get(id).cloned())
    }

    /// Replace the document stored under `id`. Returns `false` when absent.
    pub fn replace(&self, id: &Uuid, doc: T) -> Result<bool, DbError> {
        self.db.ensure_open()?;
        let mut items = self.items.write();
        if let Some(slot) = items.get_mut(id) {
            *slot = doc;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove the document stored under `id`. Returns `false` when absent.
    pub fn remove(&self, id: &Uuid) -> Result<bool, DbError> {
        self.db.ensure_open()?;
        Ok(self.items.write().remove(id).is_some())
    }

    /// Number of stored documents.
    pub fn count(&self) -> Result<usize, DbError> {
        self.db.ensure_open()?;
        Ok(self.items.read().len())
    }

    /// A newest-first page of documents.
    pub fn page_desc(&self, offset: usize, limit: usize) -> Result<Vec<T>, DbError> {
        self.db.ensure_open()?;
        Ok(self
            .items
            .read()
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    /// First document matching the predicate, in creation order.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Result<Option<T>, DbError> {
        self.db.ensure_open()?;
        Ok(self.items.read().values().find(|doc| pred(doc)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        id: Uuid,
        label: String,
    }

    fn collection() -> (Database, Collection<Doc>) {
        let db = Database::open();
        let coll = db.collection::<Doc>();
        (db, coll)
    }

    #[test]
    fn insert_assigns_unique_ids() {
        let (_db, coll) = collection();

        let a = coll
            .insert_with(|id| Doc {
                id,
                label: "a".into(),
            })
            .unwrap();
        let b = coll
            .insert_with(|id| Doc {
                id,
                label: "b".into(),
            })
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(coll.count().unwrap(), 2);
    }

    #[test]
    fn get_replace_remove_roundtrip() {
        let (_db, coll) = collection();

        let doc = coll
            .insert_with(|id| Doc {
                id,
                label: "original".into(),
            })
            .unwrap();

        let mut updated = doc.clone();
        updated.label = "updated".into();
        assert!(coll.replace(&doc.id, updated.clone()).unwrap());
        assert_eq!(coll.get(&doc.id).unwrap(), Some(updated));

        assert!(coll.remove(&doc.id).unwrap());
        assert_eq!(coll.get(&doc.id).unwrap(), None);
        assert!(!coll.remove(&doc.id).unwrap());
    }

    #[test]
    fn replace_missing_returns_false() {
        let (_db, coll) = collection();
        let absent = Uuid::now_v7();

        assert!(!coll
            .replace(
                &absent,
                Doc {
                    id: absent,
                    label: "ghost".into(),
                },
            )
            .unwrap());
    }

    #[test]
    fn page_desc_is_newest_first() {
        let (_db, coll) = collection();

        for n in 0..5 {
            coll.insert_with(|id| Doc {
                id,
                label: format!("doc-{n}"),
            })
            .unwrap();
        }

        let first_page = coll.page_desc(0, 2).unwrap();
        let labels: Vec<_> = first_page.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["doc-4", "doc-3"]);

        let last_page = coll.page_desc(4, 2).unwrap();
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].label, "doc-0");
    }

    #[test]
    fn find_matches_on_predicate() {
        let (_db, coll) = collection();

        coll.insert_with(|id| Doc {
            id,
            label: "needle".into(),
        })
        .unwrap();

        assert!(coll.find(|d| d.label == "needle").unwrap().is_some());
        assert!(coll.find(|d| d.label == "haystack").unwrap().is_none());
    }

    #[test]
    fn operations_fail_after_close() {
        let (db, coll) = collection();
        db.close();

        assert!(matches!(
            coll.insert_with(|id| Doc {
                id,
                label: "late".into(),
            }),
            Err(DbError::Unavailable(_))
        ));
    }
}
