//! Category management for the finance tracker.
//!
//! Categories are seeded with a fixed default set at first startup and are
//! read-only afterwards.

mod core;
mod list_endpoint;

pub use core::{
    Category, CategoryId, DEFAULT_CATEGORIES, count_categories, create_category_table,
    get_category_kind, map_category_row, seed_default_categories,
};
pub use list_endpoint::list_categories_endpoint;
