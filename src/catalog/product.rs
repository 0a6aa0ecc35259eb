use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::coerce::{coerce_flag, is_affirmative, parse_price};
use super::CatalogError;

/// A catalog entry as persisted in `products.json` and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

fn default_in_stock() -> bool {
    true
}

/// Validated input for the create operation, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub video: Option<String>,
}

impl NewProduct {
    /// Build from the text fields of a create form plus the stored media paths.
    ///
    /// `name` and `price` must be present and non-empty. `outOfStock` marks the
    /// product unavailable when it holds one of the affirmative spellings.
    pub fn from_form(
        fields: &HashMap<String, String>,
        images: Vec<String>,
        video: Option<String>,
    ) -> Result<Self, CatalogError> {
        let name = fields.get("name").filter(|s| !s.is_empty());
        let price = fields.get("price").filter(|s| !s.is_empty());

        let (name, price) = match (name, price) {
            (Some(name), Some(price)) => (name, price),
            _ => return Err(CatalogError::Validation("name and price are required".to_string())),
        };

        let price = parse_price(&Value::String(price.clone()))
            .ok_or_else(|| CatalogError::Validation("price must be a non-negative number".to_string()))?;

        let out_of_stock = fields.get("outOfStock").map(|s| is_affirmative(s)).unwrap_or(false);

        Ok(Self {
            name: name.clone(),
            price,
            description: fields.get("description").cloned().unwrap_or_default(),
            in_stock: !out_of_stock,
            images,
            video,
        })
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub in_stock: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl ProductPatch {
    /// Read a loosely typed JSON body.
    ///
    /// `inStock` goes through the flag coercion table. `name` is trimmed and
    /// dropped when blank. `price` is dropped when it does not parse.
    /// Unknown keys and values of the wrong type are ignored.
    pub fn from_json(body: &Map<String, Value>) -> Self {
        let in_stock = body.get("inStock").map(coerce_flag);

        let name = body
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let description = body.get("description").and_then(Value::as_str).map(str::to_string);

        let price = body.get("price").and_then(parse_price);

        Self { in_stock, name, description, price }
    }

    pub fn is_empty(&self) -> bool {
        self.in_stock.is_none() && self.name.is_none() && self.description.is_none() && self.price.is_none()
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}
