//! Import of visitor records exported by the browser console.
//!
//! The console stored visitors as loosely-typed JSON: status labels with
//! inconsistent casing and spacing (`"ON SITE"`, `"ON_SITE"`, `"SIGNED_OUT"`),
//! clock times as display strings (`"09:42"`, `"9:42 AM"`, `"--:--"`) and
//! sometimes several visits left open. Everything is normalised here, at the
//! persistence boundary, so the rest of the crate only sees well-formed
//! [`Visitor`] values.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::require,
  lifecycle::UNKNOWN_DESTINATION,
  visitor::{VisitRecord, Visitor, VisitorStatus},
};

/// The dataset a fresh console starts with.
pub const DEFAULT_DATASET: &str = include_str!("../data/default_visitors.json");

const CLOCK_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

// ─── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyVisit {
  pub date:        String,
  pub destination: Option<String>,
  pub time_in:     Option<String>,
  pub time_out:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyVisitor {
  pub id:             Option<String>,
  /// `"VIP GUEST"` for ghosts; the real name then lives in `real_name`.
  pub name:           String,
  pub real_name:      Option<String>,
  pub document_id:    Option<String>,
  pub phone:          Option<String>,
  pub company:        Option<String>,
  pub vrn:            Option<String>,
  pub destination:    Option<String>,
  pub status:         Option<String>,
  /// `"standard"`, `"vip"` or `"restricted"`.
  #[serde(rename = "type")]
  pub kind:           Option<String>,
  #[serde(rename = "isBlacklisted", default)]
  pub is_blacklisted: bool,
  #[serde(rename = "isGhost", default)]
  pub is_ghost:       bool,
  #[serde(rename = "isVIP", default)]
  pub is_vip:         bool,
  #[serde(default)]
  pub visits:         Vec<LegacyVisit>,
  // Tenant-side records kept one flat visit on the visitor itself.
  pub date:           Option<String>,
  #[serde(rename = "timeIn")]
  pub time_in:        Option<String>,
  #[serde(rename = "timeOut")]
  pub time_out:       Option<String>,
}

// ─── Field parsing ───────────────────────────────────────────────────────────

fn parse_date(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
    .map_err(|e| Error::InvalidInput(format!("bad visit date {raw:?}: {e}")))
}

/// Parse a display clock time. Blank and placeholder values (`"--:--"`,
/// `"-"`) mean "not recorded".
fn parse_clock(raw: Option<&str>) -> Result<Option<NaiveTime>> {
  let Some(raw) = raw.map(str::trim) else {
    return Ok(None);
  };
  if raw.chars().all(|c| c == '-' || c == ':') {
    return Ok(None);
  }
  CLOCK_FORMATS
    .iter()
    .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
    .map(Some)
    .ok_or_else(|| Error::InvalidInput(format!("bad clock time {raw:?}")))
}

/// Stable id for a legacy record, so re-importing the same export is
/// detected as a duplicate rather than creating a second visitor.
pub fn legacy_uuid(legacy_id: &str) -> Uuid {
  Uuid::new_v5(
    &Uuid::NAMESPACE_OID,
    format!("sentrihawk:{legacy_id}").as_bytes(),
  )
}

// ─── Conversion ──────────────────────────────────────────────────────────────

impl LegacyVisitor {
  pub fn into_visitor(self, now: DateTime<Local>) -> Result<Visitor> {
    let name = match (self.is_ghost, self.real_name) {
      (true, Some(real)) if !real.trim().is_empty() => real,
      _ => self.name,
    };
    require("name", &name)?;

    let kind = self.kind.as_deref().map(str::to_lowercase);
    let is_blacklisted =
      self.is_blacklisted || kind.as_deref() == Some("restricted");
    let is_vip = self.is_vip || kind.as_deref() == Some("vip");

    let status = match self.status.as_deref() {
      None => VisitorStatus::derived(is_blacklisted),
      Some(label) => VisitorStatus::from_label(label)
        .ok_or_else(|| Error::UnknownStatus(label.to_owned()))?,
    };

    let fallback_destination = self
      .destination
      .clone()
      .or_else(|| self.company.clone())
      .unwrap_or_else(|| UNKNOWN_DESTINATION.to_owned());

    let mut visits = self
      .visits
      .into_iter()
      .map(|v| {
        Ok(VisitRecord {
          date:        parse_date(&v.date)?,
          destination: v
            .destination
            .unwrap_or_else(|| fallback_destination.clone()),
          time_in:     parse_clock(v.time_in.as_deref())?,
          time_out:    parse_clock(v.time_out.as_deref())?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    if visits.is_empty()
      && let Some(date) = self.date.as_deref()
    {
      visits.push(VisitRecord {
        date:        parse_date(date)?,
        destination: fallback_destination.clone(),
        time_in:     parse_clock(self.time_in.as_deref())?,
        time_out:    parse_clock(self.time_out.as_deref())?,
      });
    }

    // Only the most recent open visit may stay open; earlier ones were left
    // dangling by repeat check-ins and are closed where they started.
    if let Some(last_open) = visits.iter().rposition(VisitRecord::is_open) {
      for visit in &mut visits[..last_open] {
        if visit.is_open() {
          visit.time_out = Some(visit.time_in.unwrap_or(NaiveTime::MIN));
        }
      }
    }

    if status == VisitorStatus::OnSite && !visits.iter().any(VisitRecord::is_open)
    {
      visits.push(VisitRecord {
        date:        now.date_naive(),
        destination: fallback_destination,
        time_in:     None,
        time_out:    None,
      });
    }

    Ok(Visitor {
      visitor_id: self
        .id
        .as_deref()
        .map(legacy_uuid)
        .unwrap_or_else(Uuid::new_v4),
      created_at: now.with_timezone(&Utc),
      name: name.trim().to_owned(),
      document_id: self.document_id.filter(|d| !d.trim().is_empty()),
      phone: self.phone.filter(|p| !p.trim().is_empty()),
      company: self.company,
      vrn: self.vrn.filter(|v| !v.trim().is_empty() && v != "N/A"),
      destination: self.destination,
      status,
      is_blacklisted,
      is_ghost: self.is_ghost,
      is_vip,
      visits,
    })
  }
}

/// Parse a JSON array of exported visitors, preserving their order.
pub fn parse_export(json: &str, now: DateTime<Local>) -> Result<Vec<Visitor>> {
  let raw: Vec<LegacyVisitor> = serde_json::from_str(json)?;
  raw.into_iter().map(|v| v.into_visitor(now)).collect()
}

/// The built-in starter dataset.
pub fn default_visitors(now: DateTime<Local>) -> Result<Vec<Visitor>> {
  parse_export(DEFAULT_DATASET, now)
}
