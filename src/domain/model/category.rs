use super::Entity;
use crate::domain::validate::{as_object, required_integer, required_name, InvalidInput};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryDraft {
    pub name: String,
}

/// A category has a single mutable field, so its patch always carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryPatch {
    pub name: String,
}

impl Entity for Category {
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;

    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "category";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[("name", "text")];

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn from_draft(id: i64, draft: CategoryDraft) -> Self {
        Category {
            id,
            name: draft.name,
        }
    }

    fn draft_name(draft: &CategoryDraft) -> &str {
        &draft.name
    }

    fn apply(&mut self, patch: CategoryPatch) {
        self.name = patch.name;
    }

    fn patch_is_empty(_patch: &CategoryPatch) -> bool {
        false
    }

    fn parse_draft(body: &JsonValue) -> Result<CategoryDraft, InvalidInput> {
        let obj = as_object(body, Self::LABEL)?;
        Ok(CategoryDraft {
            name: required_name(obj, "name", Self::LABEL)?,
        })
    }

    fn parse_update(body: &JsonValue) -> Result<(i64, CategoryPatch), InvalidInput> {
        let obj = as_object(body, Self::LABEL)?;
        let id = required_integer(obj, "id")?;
        let name = required_name(obj, "name", Self::LABEL)?;
        Ok((id, CategoryPatch { name }))
    }
}
