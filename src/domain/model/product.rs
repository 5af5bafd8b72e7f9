use super::Entity;
use crate::domain::validate::{
    as_object, optional_integer, optional_name, optional_price, required_integer, required_name,
    required_price, InvalidInput,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// A catalog product. `categoryid` is not checked against existing categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(alias = "categoryId")]
    pub categoryid: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDraft {
    pub name: String,
    pub categoryid: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoryid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Entity for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const TABLE: &'static str = "products";
    const LABEL: &'static str = "product";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("name", "text"),
        ("categoryid", "bigint"),
        ("price", "double precision"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn from_draft(id: i64, draft: ProductDraft) -> Self {
        Product {
            id,
            name: draft.name,
            categoryid: draft.categoryid,
            price: draft.price,
        }
    }

    fn draft_name(draft: &ProductDraft) -> &str {
        &draft.name
    }

    fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(categoryid) = patch.categoryid {
            self.categoryid = categoryid;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }

    fn patch_is_empty(patch: &ProductPatch) -> bool {
        patch.name.is_none() && patch.categoryid.is_none() && patch.price.is_none()
    }

    fn parse_draft(body: &JsonValue) -> Result<ProductDraft, InvalidInput> {
        let obj = as_object(body, Self::LABEL)?;
        Ok(ProductDraft {
            name: required_name(obj, "name", Self::LABEL)?,
            categoryid: required_integer(obj, "categoryid")?,
            price: required_price(obj, "price")?,
        })
    }

    fn parse_update(body: &JsonValue) -> Result<(i64, ProductPatch), InvalidInput> {
        let obj = as_object(body, Self::LABEL)?;
        let id = required_integer(obj, "id")?;
        let patch = ProductPatch {
            name: optional_name(obj, "name", Self::LABEL)?,
            categoryid: optional_integer(obj, "categoryid")?,
            price: optional_price(obj, "price")?,
        };
        Ok((id, patch))
    }
}
