//! Catalogue records - services, service categories and their lifecycle
//!
//! Both entities share the same lifecycle:
//! - created `Active`
//! - retired by soft delete (`Active` -> `Inactive`), never physically removed
//! - optionally brought back by reactivation (`Inactive` -> `Active`)

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a catalogue row.
///
/// Persisted as the `active` column (1 = active, 0 = inactive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Visible to list/get operations
    Active,
    /// Soft-deleted
    Inactive,
}

impl EntityStatus {
    /// Get the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
        }
    }

    /// Value stored in the `active` column
    pub fn as_flag(&self) -> i64 {
        match self {
            EntityStatus::Active => 1,
            EntityStatus::Inactive => 0,
        }
    }

    pub fn from_flag(flag: i64) -> Result<Self> {
        match flag {
            1 => Ok(EntityStatus::Active),
            0 => Ok(EntityStatus::Inactive),
            other => Err(Error::InvalidStatus(other)),
        }
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A grouping of services shown with a color and an icon in the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
    /// Display hint, e.g. `#3b82f6`
    pub color: String,
    /// Display hint, e.g. `wrench`
    pub icon: String,
    pub description: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category display fields carried along with every service read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// A billable shop service (oil change, brake inspection, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_minutes: u32,
    pub category: CategorySummary,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a service, used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_minutes: u32,
    pub category_id: i64,
}

impl ServiceFields {
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        duration_minutes: u32,
        category_id: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            duration_minutes,
            category_id,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("service name must not be empty".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(Error::Validation(format!(
                "service price must not be negative (got {})",
                self.price
            )));
        }
        if self.duration_minutes == 0 {
            return Err(Error::Validation(
                "service duration must be at least one minute".into(),
            ));
        }
        Ok(())
    }
}

/// Mutable fields of a category, used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFields {
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryFields {
    pub fn new(name: impl Into<String>, color: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("category name must not be empty".into()));
        }
        Ok(())
    }
}

/// Timestamps are stored as microseconds since the Unix epoch.
pub(crate) fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::InvalidValue(format!("timestamp out of range: {}", micros)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flag_mapping() {
        assert_eq!(EntityStatus::from_flag(1).unwrap(), EntityStatus::Active);
        assert_eq!(EntityStatus::from_flag(0).unwrap(), EntityStatus::Inactive);
        assert!(matches!(EntityStatus::from_flag(7), Err(Error::InvalidStatus(7))));
        assert_eq!(EntityStatus::Inactive.as_flag(), 0);
    }

    #[test]
    fn test_service_fields_validation() {
        let ok = ServiceFields::new("Oil change", Decimal::new(4999, 2), 30, 1);
        assert!(ok.validate().is_ok());

        let blank = ServiceFields::new("  ", Decimal::new(4999, 2), 30, 1);
        assert!(matches!(blank.validate(), Err(Error::Validation(_))));

        let negative = ServiceFields::new("Refund", Decimal::new(-100, 2), 30, 1);
        assert!(matches!(negative.validate(), Err(Error::Validation(_))));

        let instant = ServiceFields::new("Nothing", Decimal::ZERO, 0, 1);
        assert!(matches!(instant.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_micros_roundtrip_keeps_precision() {
        let now = Utc::now();
        let back = from_micros(to_micros(now)).unwrap();
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }
}
