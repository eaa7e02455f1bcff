//! Catalog items. Stock of an item is tracked by inventory records.

mod repository;
mod service;

pub use repository::ItemRepository;
#[cfg(test)]
pub use repository::MockItemRepository;
pub use service::ItemService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ids::{CategoryId, ItemId, WorkspaceId};
use crate::patch::double_option;
use crate::validate;

const NAME_MAX: usize = 200;
const SKU_MAX: usize = 64;
const TEXT_MAX: usize = 200;
const LONG_TEXT_MAX: usize = 2000;

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item ID.
    pub id: ItemId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit, unique per workspace.
    pub sku: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Category, if any.
    pub category_id: Option<CategoryId>,
    /// Brand.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Barcode (EAN, UPC, ...).
    pub barcode: Option<String>,
    /// Whether the item is covered by insurance.
    pub is_insured: bool,
    /// Whether the item has a lifetime warranty.
    pub lifetime_warranty: bool,
    /// Warranty notes.
    pub warranty_details: Option<String>,
    /// Reorder threshold for the low-stock report.
    pub min_stock_level: i64,
    /// Short code printed on labels.
    pub short_code: Option<String>,
    /// Archived items are hidden from default listings.
    pub is_archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`ItemService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateItem {
    /// Name.
    pub name: String,
    /// SKU.
    pub sku: String,
    /// Description.
    pub description: Option<String>,
    /// Category id.
    pub category_id: Option<CategoryId>,
    /// Brand.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Barcode.
    pub barcode: Option<String>,
    /// Insured flag.
    #[serde(default)]
    pub is_insured: bool,
    /// Lifetime warranty.
    #[serde(default)]
    pub lifetime_warranty: bool,
    /// Warranty details.
    pub warranty_details: Option<String>,
    /// Reorder threshold.
    #[serde(default)]
    pub min_stock_level: i64,
    /// Short code.
    pub short_code: Option<String>,
}

/// Partial update. Blank strings clear text fields; `category_id: null` clears
/// the category.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateItem {
    /// Name.
    pub name: Option<String>,
    /// SKU.
    pub sku: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Category id.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<CategoryId>>,
    /// Brand.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Barcode.
    pub barcode: Option<String>,
    /// Insured flag.
    pub is_insured: Option<bool>,
    /// Lifetime warranty.
    pub lifetime_warranty: Option<bool>,
    /// Warranty details.
    pub warranty_details: Option<String>,
    /// Reorder threshold.
    pub min_stock_level: Option<i64>,
    /// Short code.
    pub short_code: Option<String>,
}

/// Listing filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring match over name, SKU and brand.
    pub search: Option<String>,
    /// Only items in this category.
    pub category_id: Option<CategoryId>,
    /// Include archived items.
    #[serde(default)]
    pub include_archived: bool,
}

/// Row of the low-stock report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LowStockItem {
    /// The item.
    pub item: Item,
    /// Sum of quantities across the item's non-archived inventory records.
    pub total_quantity: i64,
}

impl Item {
    /// Validate input and build a new item.
    pub fn new(workspace_id: WorkspaceId, params: &CreateItem) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: ItemId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            sku: validate::required("sku", &params.sku, SKU_MAX)?,
            description: validate::optional(
                "description",
                params.description.as_deref(),
                LONG_TEXT_MAX,
            )?,
            category_id: params.category_id.clone(),
            brand: validate::optional("brand", params.brand.as_deref(), TEXT_MAX)?,
            model: validate::optional("model", params.model.as_deref(), TEXT_MAX)?,
            manufacturer: validate::optional(
                "manufacturer",
                params.manufacturer.as_deref(),
                TEXT_MAX,
            )?,
            serial_number: validate::optional(
                "serial_number",
                params.serial_number.as_deref(),
                TEXT_MAX,
            )?,
            barcode: validate::optional("barcode", params.barcode.as_deref(), TEXT_MAX)?,
            is_insured: params.is_insured,
            lifetime_warranty: params.lifetime_warranty,
            warranty_details: validate::optional(
                "warranty_details",
                params.warranty_details.as_deref(),
                LONG_TEXT_MAX,
            )?,
            min_stock_level: validate::non_negative("min_stock_level", params.min_stock_level)?,
            short_code: validate::short_code(params.short_code.as_deref())?,
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Category existence is checked by the service.
    pub fn apply(&mut self, params: &UpdateItem) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if let Some(ref sku) = params.sku {
            self.sku = validate::required("sku", sku, SKU_MAX)?;
        }
        if let Some(ref category_id) = params.category_id {
            self.category_id = category_id.clone();
        }
        let texts = [
            (&mut self.description, "description", &params.description, LONG_TEXT_MAX),
            (&mut self.brand, "brand", &params.brand, TEXT_MAX),
            (&mut self.model, "model", &params.model, TEXT_MAX),
            (&mut self.manufacturer, "manufacturer", &params.manufacturer, TEXT_MAX),
            (&mut self.serial_number, "serial_number", &params.serial_number, TEXT_MAX),
            (&mut self.barcode, "barcode", &params.barcode, TEXT_MAX),
            (
                &mut self.warranty_details,
                "warranty_details",
                &params.warranty_details,
                LONG_TEXT_MAX,
            ),
        ];
        for (target, field, value, max) in texts {
            validate::patch_optional(target, field, value.as_deref(), max)?;
        }
        if let Some(insured) = params.is_insured {
            self.is_insured = insured;
        }
        if let Some(lifetime) = params.lifetime_warranty {
            self.lifetime_warranty = lifetime;
        }
        if let Some(level) = params.min_stock_level {
            self.min_stock_level = validate::non_negative("min_stock_level", level)?;
        }
        if let Some(ref code) = params.short_code {
            self.short_code = validate::short_code(Some(code))?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
