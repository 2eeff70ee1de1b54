use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};

use super::{decode, encode, next_id, Store};
use crate::database::{TABLE_CATEGORIES, TABLE_CATEGORY_NAMES};
use crate::error::{AppError, Result};
use crate::model::Category;
use crate::validation::validate_category_name;

impl Store {
    /// Creates a category; names are unique
    pub fn create_category(&self, name: &str, description: &str) -> Result<Category> {
        let name = validate_category_name(name)?;
        let write_txn = self.db.begin_write()?;

        let category = {
            let mut names = write_txn.open_table(TABLE_CATEGORY_NAMES)?;
            if names.get(name.as_str())?.is_some() {
                return Err(AppError::DuplicateCategory(name));
            }

            let category = Category {
                id: next_id(&write_txn, "category")?,
                name,
                description: description.trim().to_string(),
                created_at: Utc::now(),
            };

            names.insert(category.name.as_str(), category.id)?;
            let mut table = write_txn.open_table(TABLE_CATEGORIES)?;
            table.insert(category.id, encode(&category)?.as_str())?;

            category
        };

        write_txn.commit()?;
        Ok(category)
    }

    pub fn category(&self, id: u64) -> Result<Option<Category>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_CATEGORIES)?;
        let category: Option<Category> = decode(table.get(id)?)?;
        Ok(category)
    }

    /// All categories ordered by name
    pub fn categories(&self) -> Result<Vec<Category>> {
        let read_txn = self.db.begin_read()?;
        let names = read_txn.open_table(TABLE_CATEGORY_NAMES)?;
        let table = read_txn.open_table(TABLE_CATEGORIES)?;

        let mut categories = Vec::new();
        for entry in names.iter()? {
            let (_, id) = entry?;
            let category: Option<Category> = decode(table.get(id.value())?)?;
            categories.extend(category);
        }
        Ok(categories)
    }
}
