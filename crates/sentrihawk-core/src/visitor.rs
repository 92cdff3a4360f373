//! Visitor types: the people tracked by the ledger and their dated visits.
//!
//! A visitor is never deleted. Arrivals and sign-outs only append to or close
//! entries in [`Visitor::visits`], so the full history stays available for
//! audit and date-range queries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Placeholder shown to guards in place of a ghost visitor's real name.
pub const GHOST_DISPLAY_NAME: &str = "VIP GUEST";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a visitor currently stands in the admission lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum VisitorStatus {
  #[strum(to_string = "EXPECTED")]
  Expected,
  #[strum(to_string = "ON_SITE")]
  OnSite,
  #[strum(to_string = "CHECKED_OUT", serialize = "SIGNED_OUT")]
  CheckedOut,
  #[strum(to_string = "RESTRICTED", serialize = "FLAGGED")]
  Restricted,
}

impl VisitorStatus {
  /// Normalise a free-form status label such as `"ON SITE"`, `"on-site"` or
  /// `"Checked Out"`. Returns `None` for anything unrecognised.
  pub fn from_label(label: &str) -> Option<Self> {
    let canonical: String = label
      .trim()
      .chars()
      .map(|c| if c == ' ' || c == '-' { '_' } else { c })
      .collect();
    canonical.parse().ok()
  }

  /// The status assumed for a record that carries none.
  pub fn derived(is_blacklisted: bool) -> Self {
    if is_blacklisted { Self::Restricted } else { Self::Expected }
  }
}

// ─── Badge ───────────────────────────────────────────────────────────────────

/// The status tag a dashboard shows next to a visitor.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
  #[strum(to_string = "Expected")]
  Expected,
  #[strum(to_string = "On Site")]
  OnSite,
  #[strum(to_string = "Signed Out")]
  SignedOut,
  #[strum(to_string = "Restricted")]
  Restricted,
  #[strum(to_string = "Unknown")]
  Unknown,
}

impl StatusBadge {
  /// Classify a raw status label. Blacklisting wins over any label; a missing
  /// label falls back to the derived default; an unrecognised one is
  /// [`StatusBadge::Unknown`].
  pub fn classify(label: Option<&str>, is_blacklisted: bool) -> Self {
    if is_blacklisted {
      return Self::Restricted;
    }
    match label {
      None => VisitorStatus::derived(false).into(),
      Some(raw) => VisitorStatus::from_label(raw)
        .map(Self::from)
        .unwrap_or(Self::Unknown),
    }
  }

  /// Classify an already-normalised status.
  pub fn of(status: VisitorStatus, is_blacklisted: bool) -> Self {
    if is_blacklisted { Self::Restricted } else { status.into() }
  }
}

impl From<VisitorStatus> for StatusBadge {
  fn from(status: VisitorStatus) -> Self {
    match status {
      VisitorStatus::Expected => Self::Expected,
      VisitorStatus::OnSite => Self::OnSite,
      VisitorStatus::CheckedOut => Self::SignedOut,
      VisitorStatus::Restricted => Self::Restricted,
    }
  }
}

// ─── VisitRecord ─────────────────────────────────────────────────────────────

/// One dated visit. Open while `time_out` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
  pub date:        NaiveDate,
  /// The tenant visited.
  pub destination: String,
  pub time_in:     Option<NaiveTime>,
  pub time_out:    Option<NaiveTime>,
}

impl VisitRecord {
  pub fn is_open(&self) -> bool { self.time_out.is_none() }

  /// Issued ahead of time (ghost pass) and not yet stamped at the door.
  pub fn is_pending(&self) -> bool {
    self.is_open() && self.time_in.is_none()
  }
}

// ─── Visitor ─────────────────────────────────────────────────────────────────

/// Who is looking at a visitor record; decides whether ghost names show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
  Guard,
  Tenant,
}

/// A person tracked across zero or more visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
  pub visitor_id:     Uuid,
  pub created_at:     DateTime<Utc>,
  /// The real name. Guard-facing views substitute [`GHOST_DISPLAY_NAME`] for
  /// ghost visitors.
  pub name:           String,
  pub document_id:    Option<String>,
  pub phone:          Option<String>,
  pub company:        Option<String>,
  /// Vehicle registration number.
  pub vrn:            Option<String>,
  /// The tenant this visitor belongs to; the tenant isolation key.
  pub destination:    Option<String>,
  pub status:         VisitorStatus,
  pub is_blacklisted: bool,
  pub is_ghost:       bool,
  pub is_vip:         bool,
  /// Chronological; the last entry is the current visit.
  pub visits:         Vec<VisitRecord>,
}

impl Visitor {
  pub fn current_visit(&self) -> Option<&VisitRecord> { self.visits.last() }

  /// The most recent visit still missing a `time_out`.
  pub fn open_visit(&self) -> Option<&VisitRecord> {
    self.visits.iter().rev().find(|v| v.is_open())
  }

  pub(crate) fn open_visit_mut(&mut self) -> Option<&mut VisitRecord> {
    self.visits.iter_mut().rev().find(|v| v.is_open())
  }

  pub fn badge(&self) -> StatusBadge {
    StatusBadge::of(self.status, self.is_blacklisted)
  }

  /// Blacklisted, or explicitly restricted.
  pub fn is_restricted(&self) -> bool {
    self.badge() == StatusBadge::Restricted
  }

  pub fn display_name(&self, audience: Audience) -> &str {
    match audience {
      Audience::Guard if self.is_ghost => GHOST_DISPLAY_NAME,
      _ => &self.name,
    }
  }

  /// The record as `audience` may see it. Guards get ghosts with the real
  /// name replaced and contact details removed.
  pub fn redacted(&self, audience: Audience) -> Visitor {
    let mut visible = self.clone();
    if audience == Audience::Guard && self.is_ghost {
      visible.name = GHOST_DISPLAY_NAME.to_owned();
      visible.document_id = None;
      visible.phone = None;
    }
    visible
  }

  /// Destination of the current visit, falling back to the owning tenant.
  pub fn current_destination(&self) -> Option<&str> {
    self
      .current_visit()
      .map(|v| v.destination.as_str())
      .or(self.destination.as_deref())
  }
}
