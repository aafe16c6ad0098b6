//! Menu catalog repository.
//!
//! Categories are keyed by their human-assigned id, items by
//! `(categoryId, id)`. Saving the catalog upserts every row by natural
//! key and prunes rows that are no longer part of it.
//!
//! The writes are not transactional, since a standalone server has no
//! multi-document transactions. Upserts run before prunes, so a save that
//! fails partway leaves every new row in place next to some old ones. The
//! next successful save converges the catalog.

use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{FindOptions, UpdateOptions};
use mongodb::Collection;
use tracing::debug;

use crate::database::models::menu::{assemble_menu, split_menu};
use crate::database::models::{Category, CategoryDocument, ItemDocument};
use crate::database::Database;

/// Repository for the menu catalog.
pub struct MenuRepository {
    categories: Collection<CategoryDocument>,
    items: Collection<ItemDocument>,
}

impl MenuRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection("menu_categories"),
            items: db.collection("menu_items"),
        }
    }

    /// Load the full ordered catalog. An empty catalog is a valid result.
    pub async fn get(&self) -> mongodb::error::Result<Vec<Category>> {
        let by_position = FindOptions::builder().sort(doc! { "position": 1 }).build();

        let categories: Vec<CategoryDocument> = self
            .categories
            .find(doc! {})
            .with_options(by_position.clone())
            .await?
            .try_collect()
            .await?;

        let items: Vec<ItemDocument> = self
            .items
            .find(doc! {})
            .with_options(by_position)
            .await?
            .try_collect()
            .await?;

        Ok(assemble_menu(categories, items))
    }

    /// Replace the catalog with `menu`.
    ///
    /// On error the stored catalog may hold a mix of old and new rows;
    /// callers keep their previous copy and retry.
    pub async fn save(&self, menu: &[Category]) -> mongodb::error::Result<()> {
        let (categories, items) = split_menu(menu);
        let upsert = UpdateOptions::builder().upsert(true).build();

        for category in &categories {
            self.categories
                .update_one(
                    doc! { "id": category.id.as_str() },
                    doc! { "$set": bson::to_document(category)? },
                )
                .with_options(upsert.clone())
                .await?;
        }

        for item in &items {
            self.items
                .update_one(
                    doc! { "categoryId": item.category_id.as_str(), "id": item.id.as_str() },
                    doc! { "$set": bson::to_document(item)? },
                )
                .with_options(upsert.clone())
                .await?;
        }

        let (category_filter, item_filters) = prune_filters(menu);

        let removed_categories = self.categories.delete_many(category_filter).await?;

        let mut removed_items = 0;
        for filter in item_filters {
            removed_items += self.items.delete_many(filter).await?.deleted_count;
        }

        debug!(
            "Saved menu: {} categories, {} items ({} categories and {} items removed)",
            categories.len(),
            items.len(),
            removed_categories.deleted_count,
            removed_items
        );

        Ok(())
    }
}

/// Filters matching rows that are no longer part of `menu`: one for
/// categories, then one per item sweep (orphans of removed categories
/// first, then items dropped from each kept category).
fn prune_filters(menu: &[Category]) -> (Document, Vec<Document>) {
    let category_ids: Vec<&str> = menu.iter().map(|c| c.id.as_str()).collect();

    let mut item_filters = vec![doc! { "categoryId": { "$nin": category_ids.clone() } }];
    for category in menu {
        let item_ids: Vec<&str> = category.items.iter().map(|i| i.id.as_str()).collect();
        item_filters.push(doc! { "categoryId": category.id.as_str(), "id": { "$nin": item_ids } });
    }

    (doc! { "id": { "$nin": category_ids } }, item_filters)
}
