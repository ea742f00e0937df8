//! User-defined category labels.
//!
//! Names are unique by exact, case-sensitive match. The reserved
//! [`NO_CATEGORY`] label is never stored and never deletable; it is only
//! prepended to the pick list.

use crate::book::TaskBook;
use crate::error::{CategoryError, Result};
use crate::task::NO_CATEGORY;

#[derive(Debug, Clone, Copy)]
pub struct CategoryStore<'a> {
    book: &'a TaskBook,
}

impl<'a> CategoryStore<'a> {
    pub(crate) fn new(book: &'a TaskBook) -> Self {
        Self { book }
    }

    fn key(&self) -> &'a str {
        &self.book.keys().categories_key
    }

    /// Stored categories in insertion order, without the reserved label.
    pub fn list(&self) -> Result<Vec<String>> {
        let raw = self.book.kv().get(self.key())?;
        Ok(decode_categories(self.key(), raw.as_deref()))
    }

    /// Sorted categories with the reserved label first, for choosing one.
    pub fn pick_list(&self) -> Result<Vec<String>> {
        let mut names = self.list()?;
        names.sort();
        names.insert(0, NO_CATEGORY.to_string());
        Ok(names)
    }

    /// Add a category. The name is trimmed first.
    pub fn create(&self, name: &str) -> Result<Vec<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::EmptyName.into());
        }
        if name == NO_CATEGORY {
            return Err(CategoryError::ReservedName(name.to_string()).into());
        }

        self.book.exclusive(|| {
            let mut names = self.list()?;
            if names.iter().any(|existing| existing == name) {
                return Err(CategoryError::DuplicateName(name.to_string()).into());
            }
            names.push(name.to_string());
            self.store(&names)?;
            Ok(names)
        })
    }

    /// Remove a category. Tasks already using it keep the label.
    pub fn delete(&self, name: &str) -> Result<Vec<String>> {
        if name == NO_CATEGORY {
            return Err(CategoryError::ReservedName(name.to_string()).into());
        }

        self.book.exclusive(|| {
            let mut names = self.list()?;
            let Some(pos) = names.iter().position(|existing| existing == name) else {
                return Err(CategoryError::NotFound(name.to_string()).into());
            };
            names.remove(pos);
            self.store(&names)?;
            Ok(names)
        })
    }

    fn store(&self, names: &[String]) -> Result<()> {
        let json = serde_json::to_string(names)?;
        self.book.kv().set(self.key(), &json)?;
        tracing::debug!(key = self.key(), count = names.len(), "persisted categories");
        Ok(())
    }
}

/// Parse stored category names, dropping non-strings and the reserved label.
fn decode_categories(key: &str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Vec::new();
    };
    let values = match serde_json::from_str::<Option<Vec<serde_json::Value>>>(raw) {
        Ok(values) => values.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                key,
                error = %err,
                "stored categories are unreadable; treating as empty"
            );
            return Vec::new();
        }
    };
    values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(name) if name != NO_CATEGORY => Some(name),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::storage::{KeyValueStore, MemoryStorage};

    fn book() -> (TaskBook, MemoryStorage) {
        let storage = MemoryStorage::new();
        (TaskBook::new(storage.clone(), Config::default()), storage)
    }

    fn category_err(result: Result<Vec<String>>) -> CategoryError {
        match result {
            Err(Error::Category(err)) => err,
            other => panic!("expected category error, got {other:?}"),
        }
    }

    #[test]
    fn create_trims_and_rejects_duplicates() {
        let (book, _) = book();
        let store = book.categories();

        assert_eq!(store.create("  Work ").unwrap(), vec!["Work".to_string()]);
        assert_eq!(
            category_err(store.create("Work")),
            CategoryError::DuplicateName("Work".to_string())
        );
        assert_eq!(store.create("work").unwrap(), vec!["Work", "work"]);
    }

    #[test]
    fn create_rejects_empty_and_reserved() {
        let (book, _) = book();
        let store = book.categories();

        assert_eq!(category_err(store.create("   ")), CategoryError::EmptyName);
        assert!(matches!(
            category_err(store.create(NO_CATEGORY)),
            CategoryError::ReservedName(_)
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn delete_rules() {
        let (book, _) = book();
        let store = book.categories();
        store.create("Home").unwrap();

        assert!(matches!(
            category_err(store.delete(NO_CATEGORY)),
            CategoryError::ReservedName(_)
        ));
        assert_eq!(
            category_err(store.delete("Gym")),
            CategoryError::NotFound("Gym".to_string())
        );
        assert!(store.delete("Home").unwrap().is_empty());
    }

    #[test]
    fn pick_list_sorts_and_prepends_reserved() {
        let (book, _) = book();
        let store = book.categories();
        for name in ["Study", "Home", "Work"] {
            store.create(name).unwrap();
        }

        assert_eq!(store.list().unwrap(), vec!["Study", "Home", "Work"]);
        assert_eq!(
            store.pick_list().unwrap(),
            vec![NO_CATEGORY, "Home", "Study", "Work"]
        );
    }

    #[test]
    fn stored_junk_is_filtered() {
        let (book, storage) = book();
        storage
            .set(
                "@logs_category",
                r#"["Work", 3, null, "Nenhuma Selecionada", {"x": 1}, "Home"]"#,
            )
            .unwrap();
        assert_eq!(book.categories().list().unwrap(), vec!["Work", "Home"]);

        storage.set("@logs_category", "not json").unwrap();
        assert!(book.categories().list().unwrap().is_empty());
    }
}
