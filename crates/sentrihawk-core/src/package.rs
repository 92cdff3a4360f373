//! Package deliveries held at the front desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, error::require};

/// Hand-over details recorded when a package leaves the desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
  /// The employee who signed for it.
  pub collected_by: String,
  /// The tenant the employee works for.
  pub tenant:       String,
  pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
  pub package_id:  Uuid,
  pub courier:     String,
  pub details:     String,
  /// The tenant the package is addressed to.
  pub destination: String,
  pub logged_at:   DateTime<Utc>,
  /// `None` while the package is awaiting pickup.
  pub collection:  Option<Collection>,
}

impl Package {
  pub fn is_collected(&self) -> bool { self.collection.is_some() }
}

/// Input to [`crate::store::PackageStore::log_package`].
#[derive(Debug, Clone, Default)]
pub struct NewPackage {
  pub courier:     String,
  pub details:     String,
  pub destination: String,
}

impl NewPackage {
  pub fn validate(&self) -> Result<()> {
    require("courier", &self.courier)?;
    require("details", &self.details)?;
    require("destination", &self.destination)
  }
}

/// Input to [`crate::store::PackageStore::mark_collected`].
#[derive(Debug, Clone, Default)]
pub struct CollectPackage {
  pub collected_by: String,
  pub tenant:       String,
}

impl CollectPackage {
  pub fn validate(&self) -> Result<()> {
    require("collected_by", &self.collected_by)?;
    require("tenant", &self.tenant)
  }
}
