//! Catalog record types and the contract every persisted collection follows.

use crate::domain::validate::InvalidInput;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub mod category;
pub mod product;

pub use category::{Category, CategoryDraft, CategoryPatch};
pub use product::{Product, ProductDraft, ProductPatch};

/// Trait that defines the contract for a catalog collection.
///
/// Stores work with any entity through this trait without knowing its fields.
/// Each implementation provides:
/// - Table name and writable column typing (used by the remote backends)
/// - Request parsing for create and update bodies
/// - How a draft becomes a record and how a patch is applied
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Validated create payload (no id).
    type Draft: Serialize + Send + Sync + 'static;
    /// Validated sparse update. Serializes only the fields that change.
    type Patch: Serialize + Send + Sync + 'static;

    /// Table (and file stem) holding this collection.
    const TABLE: &'static str;
    /// Human readable singular name used in messages.
    const LABEL: &'static str;
    /// Writable columns with their SQL types. `id` is always assigned by the store.
    const COLUMNS: &'static [(&'static str, &'static str)];

    fn id(&self) -> i64;

    fn name(&self) -> &str;

    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn draft_name(draft: &Self::Draft) -> &str;

    /// Applies the supplied fields of `patch`, leaving the rest untouched.
    fn apply(&mut self, patch: Self::Patch);

    /// Returns true when the patch carries no field at all.
    fn patch_is_empty(patch: &Self::Patch) -> bool;

    /// Validates a create body.
    fn parse_draft(body: &JsonValue) -> Result<Self::Draft, InvalidInput>;

    /// Validates an update body, returning the target id and the patch.
    fn parse_update(body: &JsonValue) -> Result<(i64, Self::Patch), InvalidInput>;

    fn column_type(column: &str) -> Option<&'static str> {
        Self::COLUMNS
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, sql_type)| *sql_type)
    }
}
