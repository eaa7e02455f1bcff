//! Inventory records: a quantity of one item at one place.

mod repository;
mod service;

pub use repository::InventoryRepository;
#[cfg(test)]
pub use repository::MockInventoryRepository;
pub use service::InventoryService;

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, InventoryId, ItemId, LocationId, WorkspaceId};
use crate::movement::Place;
use crate::patch::double_option;
use crate::validate;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

const NOTES_MAX: usize = 2000;

string_enum! {
    /// Physical condition of the stock.
    #[derive(Default)]
    InventoryCondition {
        /// Unused.
        #[default]
        New => "NEW",
        /// Like new.
        Excellent => "EXCELLENT",
        /// Normal wear.
        Good => "GOOD",
        /// Visible wear.
        Fair => "FAIR",
        /// Heavy wear.
        Poor => "POOR",
        /// Broken.
        Damaged => "DAMAGED",
        /// Waiting for repair.
        ForRepair => "FOR_REPAIR",
    }
}

string_enum! {
    /// Availability of the stock.
    #[derive(Default)]
    InventoryStatus {
        /// Ready to use or lend.
        #[default]
        Available => "AVAILABLE",
        /// Currently in use.
        InUse => "IN_USE",
        /// Set aside.
        Reserved => "RESERVED",
        /// Lent to a borrower. Managed by loans.
        OnLoan => "ON_LOAN",
        /// Being moved.
        InTransit => "IN_TRANSIT",
        /// Thrown away or sold.
        Disposed => "DISPOSED",
        /// Cannot be found.
        Missing => "MISSING",
    }
}

/// Stock of one item at one place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Inventory ID.
    pub id: InventoryId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Stocked item.
    pub item_id: ItemId,
    /// Where the stock is.
    pub location_id: LocationId,
    /// Container at that location, if any.
    pub container_id: Option<ContainerId>,
    /// Units on hand.
    pub quantity: i64,
    /// Physical condition.
    pub condition: InventoryCondition,
    /// Availability.
    pub status: InventoryStatus,
    /// When the stock was acquired.
    pub date_acquired: Option<NaiveDate>,
    /// Purchase price in minor currency units.
    pub purchase_price: Option<i64>,
    /// ISO 4217 currency of `purchase_price`.
    pub currency_code: Option<String>,
    /// Warranty end date.
    pub warranty_expires: Option<NaiveDate>,
    /// Best-before or expiry date.
    pub expiration_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Archived records are hidden from default listings.
    pub is_archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`InventoryService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateInventory {
    /// Stocked item.
    pub item_id: ItemId,
    /// Location.
    pub location_id: LocationId,
    /// Container at the location.
    pub container_id: Option<ContainerId>,
    /// Units on hand.
    #[serde(default)]
    pub quantity: i64,
    /// Condition, defaults to `NEW`.
    #[serde(default)]
    pub condition: InventoryCondition,
    /// Status, defaults to `AVAILABLE`.
    #[serde(default)]
    pub status: InventoryStatus,
    /// Acquisition date.
    pub date_acquired: Option<NaiveDate>,
    /// Purchase price in minor units.
    pub purchase_price: Option<i64>,
    /// Currency code.
    pub currency_code: Option<String>,
    /// Warranty end date.
    pub warranty_expires: Option<NaiveDate>,
    /// Expiry date.
    pub expiration_date: Option<NaiveDate>,
    /// Notes.
    pub notes: Option<String>,
}

/// Partial update of descriptive fields. Quantity, status and place have
/// dedicated operations.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateInventory {
    /// Condition.
    pub condition: Option<InventoryCondition>,
    /// Acquisition date (`null` clears).
    #[serde(default, deserialize_with = "double_option")]
    pub date_acquired: Option<Option<NaiveDate>>,
    /// Purchase price (`null` clears).
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_price: Option<Option<i64>>,
    /// Currency code (blank clears).
    pub currency_code: Option<String>,
    /// Warranty end date (`null` clears).
    #[serde(default, deserialize_with = "double_option")]
    pub warranty_expires: Option<Option<NaiveDate>>,
    /// Expiry date (`null` clears).
    #[serde(default, deserialize_with = "double_option")]
    pub expiration_date: Option<Option<NaiveDate>>,
    /// Notes (blank clears).
    pub notes: Option<String>,
}

/// Input for [`InventoryService::move_to`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoveInventory {
    /// Destination location.
    pub location_id: LocationId,
    /// Destination container, which must be at `location_id`.
    pub container_id: Option<ContainerId>,
    /// Who moved it.
    pub moved_by: Option<String>,
    /// Why.
    pub reason: Option<String>,
}

/// Listing filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryFilter {
    /// Only records of this item.
    pub item_id: Option<ItemId>,
    /// Only records at this location.
    pub location_id: Option<LocationId>,
    /// Only records in this container.
    pub container_id: Option<ContainerId>,
    /// Include archived records.
    #[serde(default)]
    pub include_archived: bool,
}

fn validate_price(price: Option<i64>) -> Result<Option<i64>> {
    price
        .map(|p| validate::non_negative("purchase_price", p))
        .transpose()
}

fn validate_currency(code: Option<&str>) -> Result<Option<String>> {
    let Some(code) = validate::optional("currency_code", code, 3)? else {
        return Ok(None);
    };
    if !CURRENCY_RE.is_match(&code) {
        return Err(DomainError::validation(
            "currency_code",
            "must be three uppercase letters",
        ));
    }
    Ok(Some(code))
}

impl Inventory {
    /// Validate input and build a new inventory record.
    pub fn new(workspace_id: WorkspaceId, params: &CreateInventory) -> Result<Self> {
        if params.status == InventoryStatus::OnLoan {
            return Err(DomainError::validation(
                "status",
                "ON_LOAN is set by creating a loan",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: InventoryId::new(),
            workspace_id,
            item_id: params.item_id.clone(),
            location_id: params.location_id.clone(),
            container_id: params.container_id.clone(),
            quantity: validate::non_negative("quantity", params.quantity)?,
            condition: params.condition,
            status: params.status,
            date_acquired: params.date_acquired,
            purchase_price: validate_price(params.purchase_price)?,
            currency_code: validate_currency(params.currency_code.as_deref())?,
            warranty_expires: params.warranty_expires,
            expiration_date: params.expiration_date,
            notes: validate::optional("notes", params.notes.as_deref(), NOTES_MAX)?,
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update of descriptive fields.
    pub fn apply(&mut self, params: &UpdateInventory) -> Result<()> {
        if let Some(condition) = params.condition {
            self.condition = condition;
        }
        if let Some(date) = params.date_acquired {
            self.date_acquired = date;
        }
        if let Some(price) = params.purchase_price {
            self.purchase_price = validate_price(price)?;
        }
        if params.currency_code.is_some() {
            self.currency_code = validate_currency(params.currency_code.as_deref())?;
        }
        if let Some(date) = params.warranty_expires {
            self.warranty_expires = date;
        }
        if let Some(date) = params.expiration_date {
            self.expiration_date = date;
        }
        validate::patch_optional(&mut self.notes, "notes", params.notes.as_deref(), NOTES_MAX)?;
        self.touch();
        Ok(())
    }

    /// Where the stock currently is.
    pub fn place(&self) -> Place {
        Place {
            location_id: Some(self.location_id.clone()),
            container_id: self.container_id.clone(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
