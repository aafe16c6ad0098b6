//! Menu catalog models.

use serde::{Deserialize, Serialize};

/// A menu category with its ordered items.
///
/// `id` is human-assigned (e.g. `"bebidas"`) and is the category's
/// natural key in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Icon name or emoji
    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A single orderable item. Its id is unique within its category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub price: f64,

    /// Image reference (URL or storage path)
    #[serde(default)]
    pub image: String,
}

/// Category row in `menu_categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub position: i32,
}

/// Item row in `menu_items`, keyed by `(category_id, id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    pub category_id: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub position: i32,
}

impl Category {
    /// Create an empty category.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find an item by id.
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            ..Default::default()
        }
    }
}

/// Rebuild the ordered catalog from stored rows.
///
/// Items whose category no longer exists are dropped.
pub fn assemble_menu(
    mut categories: Vec<CategoryDocument>,
    mut items: Vec<ItemDocument>,
) -> Vec<Category> {
    categories.sort_by_key(|c| c.position);
    items.sort_by_key(|i| i.position);

    let mut menu: Vec<Category> = categories
        .into_iter()
        .map(|c| Category {
            id: c.id,
            name: c.name,
            icon: c.icon,
            items: Vec::new(),
        })
        .collect();

    for item in items {
        if let Some(category) = menu.iter_mut().find(|c| c.id == item.category_id) {
            category.items.push(MenuItem {
                id: item.id,
                name: item.name,
                description: item.description,
                price: item.price,
                image: item.image,
            });
        }
    }

    menu
}

/// Flatten a catalog into rows, assigning positions from list order.
pub fn split_menu(menu: &[Category]) -> (Vec<CategoryDocument>, Vec<ItemDocument>) {
    let mut categories = Vec::with_capacity(menu.len());
    let mut items = Vec::new();

    for (position, category) in menu.iter().enumerate() {
        categories.push(CategoryDocument {
            id: category.id.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            position: position as i32,
        });

        for (item_position, item) in category.items.iter().enumerate() {
            items.push(ItemDocument {
                category_id: category.id.clone(),
                id: item.id.clone(),
                name: item.name.clone(),
                description: item.description.clone(),
                price: item.price,
                image: item.image.clone(),
                position: item_position as i32,
            });
        }
    }

    (categories, items)
}
