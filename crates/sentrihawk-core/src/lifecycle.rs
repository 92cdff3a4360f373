//! Lifecycle transitions: registration, ghost passes, arrival and sign-out.
//!
//! Every transition here is a pure function over a [`Visitor`] and an
//! explicit `now`. Storage backends load the record, apply the transition and
//! write the result back inside one transaction, so a caller never observes a
//! visit appended without the matching status change.

use chrono::{DateTime, Local, NaiveTime, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::require,
  visitor::{VisitRecord, Visitor, VisitorStatus},
};

/// Company recorded for ghost passes issued without one.
pub const GHOST_COMPANY: &str = "Confidential";

/// Destination recorded when neither the visit nor the visitor names one.
pub const UNKNOWN_DESTINATION: &str = "Unknown";

// ─── Screening ───────────────────────────────────────────────────────────────

/// Crude name-based screening applied before any registration.
///
/// Stands in for a real ACL lookup: a name is refused if it contains any of
/// the configured terms, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyList {
  terms: Vec<String>,
}

impl Default for DenyList {
  fn default() -> Self { Self::new(["bad", "restricted"]) }
}

impl DenyList {
  pub fn new<I, S>(terms: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let terms = terms
      .into_iter()
      .map(|t| t.as_ref().trim().to_lowercase())
      .filter(|t| !t.is_empty())
      .collect();
    Self { terms }
  }

  pub fn terms(&self) -> &[String] { &self.terms }

  /// The first deny-list term contained in `name`, if any.
  pub fn matched_term(&self, name: &str) -> Option<&str> {
    let lowered = name.to_lowercase();
    self
      .terms
      .iter()
      .find(|t| lowered.contains(t.as_str()))
      .map(String::as_str)
  }

  pub fn screen(&self, name: &str) -> Result<()> {
    match self.matched_term(name) {
      Some(term) => Err(Error::AccessDenied {
        reason: format!("name matches deny-list term {term:?}"),
      }),
      None => Ok(()),
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Details captured at the front desk for a walk-in visitor.
#[derive(Debug, Clone, Default)]
pub struct Registration {
  pub name:        String,
  pub document_id: Option<String>,
  pub phone:       Option<String>,
  pub company:     Option<String>,
  pub vrn:         Option<String>,
  /// The tenant being visited.
  pub destination: String,
}

impl Registration {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>, destination: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      destination: destination.into(),
      ..Default::default()
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("destination", &self.destination)
  }

  /// The document id, if one was actually supplied.
  pub fn document_id(&self) -> Option<&str> {
    self
      .document_id
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
  }
}

/// A pre-registered VIP pass whose holder stays anonymous to guards.
#[derive(Debug, Clone, Default)]
pub struct GhostPass {
  pub real_name:   String,
  pub company:     Option<String>,
  /// The issuing tenant. Left unset, the pass belongs to no tenant dashboard.
  pub destination: Option<String>,
}

impl GhostPass {
  pub fn validate(&self) -> Result<()> { require("real_name", &self.real_name) }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What [`Visitor::mark_arrived`] did to the visit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalOutcome {
  /// No visit was open; a new one was started.
  Opened,
  /// A pending (ghost) visit received its `time_in`.
  Stamped,
  /// Already on site; the open visit was left untouched.
  AlreadyOnSite,
}

/// What [`Visitor::sign_out`] did to the visit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutOutcome {
  /// The open visit was closed.
  Closed,
  /// No visit was open; a closed-only record was appended.
  Synthesized,
}

/// The action a profile view should offer for a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
  MarkArrived,
  SignOut,
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// De-duplication lookup used by registration.
///
/// A non-empty `document_id` equal to a stored one wins; otherwise the first
/// visitor whose name matches exactly, ignoring case.
pub fn find_by_identity<'a>(
  visitors: &'a [Visitor],
  document_id: Option<&str>,
  name: &str,
) -> Option<&'a Visitor> {
  let document_id = document_id.map(str::trim).filter(|d| !d.is_empty());
  if let Some(doc) = document_id
    && let Some(hit) = visitors
      .iter()
      .find(|v| v.document_id.as_deref() == Some(doc))
  {
    return Some(hit);
  }

  let name = name.trim().to_lowercase();
  if name.is_empty() {
    return None;
  }
  visitors.iter().find(|v| v.name.to_lowercase() == name)
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// Wall-clock time as recorded on a visit, to the whole second.
fn clock(now: DateTime<Local>) -> NaiveTime { now.time().trunc_subsecs(0) }

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

impl Visitor {
  /// A first-time walk-in, admitted immediately with one open visit.
  ///
  /// Screening is the caller's job; see [`DenyList::screen`].
  pub fn walk_in(registration: Registration, now: DateTime<Local>) -> Self {
    let destination = registration.destination.trim().to_owned();
    let visit = VisitRecord {
      date:        now.date_naive(),
      destination: destination.clone(),
      time_in:     Some(clock(now)),
      time_out:    None,
    };
    Self {
      visitor_id:     Uuid::new_v4(),
      created_at:     now.with_timezone(&Utc),
      name:           registration.name.trim().to_owned(),
      document_id:    registration.document_id().map(str::to_owned),
      phone:          non_blank(registration.phone),
      company:        non_blank(registration.company),
      vrn:            non_blank(registration.vrn),
      destination:    Some(destination),
      status:         VisitorStatus::OnSite,
      is_blacklisted: false,
      is_ghost:       false,
      is_vip:         false,
      visits:         vec![visit],
    }
  }

  /// An expected VIP with a single pending visit.
  pub fn ghost(pass: GhostPass, now: DateTime<Local>) -> Self {
    let destination = non_blank(pass.destination).map(|d| d.trim().to_owned());
    let visit = VisitRecord {
      date:        now.date_naive(),
      destination: destination
        .clone()
        .unwrap_or_else(|| GHOST_COMPANY.to_owned()),
      time_in:     None,
      time_out:    None,
    };
    Self {
      visitor_id: Uuid::new_v4(),
      created_at: now.with_timezone(&Utc),
      name: pass.real_name.trim().to_owned(),
      document_id: None,
      phone: None,
      company: Some(
        non_blank(pass.company).unwrap_or_else(|| GHOST_COMPANY.to_owned()),
      ),
      vrn: None,
      destination,
      status: VisitorStatus::Expected,
      is_blacklisted: false,
      is_ghost: true,
      is_vip: true,
      visits: vec![visit],
    }
  }

  /// A returning visitor checking in again.
  ///
  /// A pending visit is stamped in place; a visit left open from an earlier
  /// check-in is closed at `now` before the new one is appended.
  pub fn readmit(
    &mut self,
    registration: Registration,
    now: DateTime<Local>,
  ) -> Result<()> {
    self.ensure_admissible()?;

    if let Some(doc) = registration.document_id() {
      self.document_id = Some(doc.to_owned());
    }
    if let Some(phone) = non_blank(registration.phone) {
      self.phone = Some(phone);
    }
    if let Some(vrn) = non_blank(registration.vrn) {
      self.vrn = Some(vrn);
    }
    let destination = registration.destination.trim().to_owned();
    self.destination = Some(destination.clone());

    match self.open_visit_mut() {
      Some(open) if open.time_in.is_none() => {
        open.date = now.date_naive();
        open.destination = destination;
        open.time_in = Some(clock(now));
      }
      open => {
        if let Some(stale) = open {
          stale.time_out = Some(clock(now));
        }
        self.visits.push(VisitRecord {
          date:        now.date_naive(),
          destination,
          time_in:     Some(clock(now)),
          time_out:    None,
        });
      }
    }

    self.status = VisitorStatus::OnSite;
    Ok(())
  }

  /// Blacklisted and restricted visitors are never admitted.
  fn ensure_admissible(&self) -> Result<()> {
    if self.is_restricted() {
      return Err(Error::AccessDenied {
        reason: format!("visitor {} is restricted", self.visitor_id),
      });
    }
    Ok(())
  }

  fn fallback_destination(&self) -> String {
    self
      .destination
      .clone()
      .or_else(|| self.company.clone())
      .unwrap_or_else(|| UNKNOWN_DESTINATION.to_owned())
  }

  /// Admit the visitor. Calling this on a visitor who is already on site is a
  /// no-op: the open visit keeps its original `time_in`.
  pub fn mark_arrived(&mut self, now: DateTime<Local>) -> Result<ArrivalOutcome> {
    self.ensure_admissible()?;

    let outcome = match self.open_visit_mut() {
      Some(open) if open.time_in.is_none() => {
        open.date = now.date_naive();
        open.time_in = Some(clock(now));
        ArrivalOutcome::Stamped
      }
      Some(_) => ArrivalOutcome::AlreadyOnSite,
      None => {
        let destination = self.fallback_destination();
        self.visits.push(VisitRecord {
          date: now.date_naive(),
          destination,
          time_in: Some(clock(now)),
          time_out: None,
        });
        ArrivalOutcome::Opened
      }
    };

    self.status = VisitorStatus::OnSite;
    Ok(outcome)
  }

  /// Close the open visit, or append a closed-only record if there is none.
  pub fn sign_out(&mut self, now: DateTime<Local>) -> SignOutOutcome {
    self.status = VisitorStatus::CheckedOut;

    if let Some(open) = self.open_visit_mut() {
      open.time_out = Some(clock(now));
      return SignOutOutcome::Closed;
    }

    let destination = self.fallback_destination();
    self.visits.push(VisitRecord {
      date: now.date_naive(),
      destination,
      time_in: None,
      time_out: Some(clock(now)),
    });
    SignOutOutcome::Synthesized
  }

  /// The action a guard's profile view should offer, if any.
  pub fn available_action(&self) -> Option<ProfileAction> {
    if self.is_blacklisted {
      return None;
    }
    match self.status {
      VisitorStatus::Expected => Some(ProfileAction::MarkArrived),
      VisitorStatus::OnSite => Some(ProfileAction::SignOut),
      VisitorStatus::CheckedOut | VisitorStatus::Restricted => None,
    }
  }
}
