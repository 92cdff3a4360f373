//! Dashboard projections over a snapshot of the visitor ledger.
//!
//! Two parameterisations share one row shape:
//!
//! | Projection | Scope | Order | Filters |
//! |------------|-------|-------|---------|
//! | guard  | whole ledger | reverse creation order | `all` (last 8), `expected`, `on_site`, `incidents` |
//! | tenant | `destination == session.tenant_id` | latest visit first | `all`, `expected`, `on_site`, `vip`, `blacklist` |
//!
//! Counts always cover the unfiltered scope, so summary tiles do not change
//! with the selected filter.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Result,
  session::Session,
  visitor::{Audience, StatusBadge, Visitor},
};

/// How many rows the guard's unfiltered "recent activity" table shows.
pub const RECENT_ACTIVITY_LIMIT: usize = 8;

// ─── Filters ─────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GuardFilter {
  #[default]
  All,
  Expected,
  OnSite,
  Incidents,
}

impl GuardFilter {
  pub fn title(self) -> &'static str {
    match self {
      Self::All => "Recent Activity",
      Self::Expected => "Expected Arrivals",
      Self::OnSite => "Currently On Site",
      Self::Incidents => "Flagged Entities",
    }
  }

  fn admits(self, visitor: &Visitor) -> bool {
    match self {
      Self::All => true,
      Self::Expected => visitor.badge() == StatusBadge::Expected,
      Self::OnSite => visitor.badge() == StatusBadge::OnSite,
      Self::Incidents => visitor.is_restricted(),
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TenantFilter {
  #[default]
  All,
  Expected,
  OnSite,
  Vip,
  Blacklist,
}

impl TenantFilter {
  pub fn title(self) -> &'static str {
    match self {
      Self::All => "Recent Activity",
      Self::Expected => "Expected Visitors",
      Self::OnSite => "Currently In Building",
      Self::Vip => "VIPs Arriving",
      Self::Blacklist => "Blacklist Alerts",
    }
  }

  fn admits(self, visitor: &Visitor) -> bool {
    match self {
      Self::All => true,
      Self::Expected => visitor.badge() == StatusBadge::Expected,
      Self::OnSite => visitor.badge() == StatusBadge::OnSite,
      Self::Vip => visitor.is_vip,
      Self::Blacklist => visitor.is_restricted(),
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One table row, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
  pub visitor_id:   Uuid,
  pub display_name: String,
  /// Destination of the current visit, or the owning tenant.
  pub destination:  Option<String>,
  pub badge:        StatusBadge,
  pub is_vip:       bool,
  pub time_in:      Option<NaiveTime>,
  pub time_out:     Option<NaiveTime>,
}

impl DashboardRow {
  fn new(visitor: &Visitor, audience: Audience) -> Self {
    let current = visitor.current_visit();
    Self {
      visitor_id:   visitor.visitor_id,
      display_name: visitor.display_name(audience).to_owned(),
      destination:  visitor.current_destination().map(str::to_owned),
      badge:        visitor.badge(),
      is_vip:       visitor.is_vip,
      time_in:      current.and_then(|v| v.time_in),
      time_out:     current.and_then(|v| v.time_out),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardCounts {
  pub expected:  usize,
  pub on_site:   usize,
  pub incidents: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCounts {
  pub expected:  usize,
  pub on_site:   usize,
  pub vip:       usize,
  pub blacklist: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardDashboard {
  pub filter: GuardFilter,
  pub counts: GuardCounts,
  pub rows:   Vec<DashboardRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantDashboard {
  pub tenant_id: String,
  pub filter:    TenantFilter,
  pub counts:    TenantCounts,
  pub rows:      Vec<DashboardRow>,
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// Building-wide view. `visitors` must be in creation order, as returned by
/// [`crate::store::VisitorStore::list`].
pub fn guard_dashboard(visitors: &[Visitor], filter: GuardFilter) -> GuardDashboard {
  let mut counts = GuardCounts::default();
  for v in visitors {
    match v.badge() {
      StatusBadge::Expected => counts.expected += 1,
      StatusBadge::OnSite => counts.on_site += 1,
      StatusBadge::Restricted => counts.incidents += 1,
      StatusBadge::SignedOut | StatusBadge::Unknown => {}
    }
  }

  let newest_first = visitors.iter().rev().filter(|v| filter.admits(v));
  let rows = if filter == GuardFilter::All {
    newest_first
      .take(RECENT_ACTIVITY_LIMIT)
      .map(|v| DashboardRow::new(v, Audience::Guard))
      .collect()
  } else {
    newest_first
      .map(|v| DashboardRow::new(v, Audience::Guard))
      .collect()
  };

  GuardDashboard { filter, counts, rows }
}

/// Sort key for "most recently active": the current visit's date, then its
/// `time_in`. Visitors without visits sort last.
fn activity_key(visitor: &Visitor) -> (Option<NaiveDate>, Option<NaiveTime>) {
  visitor
    .current_visit()
    .map(|v| (Some(v.date), v.time_in))
    .unwrap_or((None, None))
}

/// The slice of the ledger belonging to one tenant.
///
/// Fails with [`crate::Error::IsolationViolation`] rather than returning
/// anything when the session carries no tenant identity.
pub fn tenant_scope<'a>(
  visitors: &'a [Visitor],
  session: &Session,
) -> Result<Vec<&'a Visitor>> {
  let tenant_id = session.tenant_scope()?;
  Ok(
    visitors
      .iter()
      .filter(|v| v.destination.as_deref() == Some(tenant_id))
      .collect(),
  )
}

/// Tenant view, isolated to the session's tenant.
pub fn tenant_dashboard(
  visitors: &[Visitor],
  session: &Session,
  filter: TenantFilter,
) -> Result<TenantDashboard> {
  let tenant_id = session.tenant_scope()?.to_owned();
  let scoped = tenant_scope(visitors, session)?;

  let mut counts = TenantCounts::default();
  for v in &scoped {
    match v.badge() {
      StatusBadge::Expected => counts.expected += 1,
      StatusBadge::OnSite => counts.on_site += 1,
      StatusBadge::Restricted => counts.blacklist += 1,
      StatusBadge::SignedOut | StatusBadge::Unknown => {}
    }
    if v.is_vip {
      counts.vip += 1;
    }
  }

  // Reverse first so ties keep newest-created first under the stable sort.
  let mut selected: Vec<&Visitor> = scoped
    .into_iter()
    .rev()
    .filter(|v| filter.admits(v))
    .collect();
  selected.sort_by(|a, b| activity_key(b).cmp(&activity_key(a)));

  let rows = selected
    .into_iter()
    .map(|v| DashboardRow::new(v, Audience::Tenant))
    .collect();

  Ok(TenantDashboard { tenant_id, filter, counts, rows })
}
