//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, visit dates `YYYY-MM-DD` and clock times
//! `HH:MM:SS`. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sentrihawk_core::{
  package::{Collection, Package},
  visitor::{VisitRecord, Visitor, VisitorStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates & times ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(status: VisitorStatus) -> String { status.to_string() }

pub fn decode_status(s: &str) -> Result<VisitorStatus> {
  VisitorStatus::from_label(s)
    .ok_or_else(|| sentrihawk_core::Error::UnknownStatus(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawVisitor`].
pub const VISITOR_COLUMNS: &str = "visitor_id, created_at, name, document_id, \
                                   phone, company, vrn, destination, status, \
                                   is_blacklisted, is_ghost, is_vip";

/// Raw strings read directly from a `visitors` row.
pub struct RawVisitor {
  pub visitor_id:     String,
  pub created_at:     String,
  pub name:           String,
  pub document_id:    Option<String>,
  pub phone:          Option<String>,
  pub company:        Option<String>,
  pub vrn:            Option<String>,
  pub destination:    Option<String>,
  pub status:         String,
  pub is_blacklisted: bool,
  pub is_ghost:       bool,
  pub is_vip:         bool,
}

impl RawVisitor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:     row.get(0)?,
      created_at:     row.get(1)?,
      name:           row.get(2)?,
      document_id:    row.get(3)?,
      phone:          row.get(4)?,
      company:        row.get(5)?,
      vrn:            row.get(6)?,
      destination:    row.get(7)?,
      status:         row.get(8)?,
      is_blacklisted: row.get(9)?,
      is_ghost:       row.get(10)?,
      is_vip:         row.get(11)?,
    })
  }

  pub fn into_visitor(self, visits: Vec<RawVisit>) -> Result<Visitor> {
    Ok(Visitor {
      visitor_id:     decode_uuid(&self.visitor_id)?,
      created_at:     decode_dt(&self.created_at)?,
      name:           self.name,
      document_id:    self.document_id,
      phone:          self.phone,
      company:        self.company,
      vrn:            self.vrn,
      destination:    self.destination,
      status:         decode_status(&self.status)?,
      is_blacklisted: self.is_blacklisted,
      is_ghost:       self.is_ghost,
      is_vip:         self.is_vip,
      visits:         visits
        .into_iter()
        .map(RawVisit::into_record)
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw strings read from a `visits` row, plus the owning visitor's id.
pub struct RawVisit {
  pub visitor_id:  String,
  pub date:        String,
  pub destination: String,
  pub time_in:     Option<String>,
  pub time_out:    Option<String>,
}

impl RawVisit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:  row.get(0)?,
      date:        row.get(1)?,
      destination: row.get(2)?,
      time_in:     row.get(3)?,
      time_out:    row.get(4)?,
    })
  }

  fn into_record(self) -> Result<VisitRecord> {
    Ok(VisitRecord {
      date:        decode_date(&self.date)?,
      destination: self.destination,
      time_in:     self.time_in.as_deref().map(decode_time).transpose()?,
      time_out:    self.time_out.as_deref().map(decode_time).transpose()?,
    })
  }
}

/// Column list matching the field order of [`RawPackage`].
pub const PACKAGE_COLUMNS: &str = "package_id, courier, details, destination, \
                                   logged_at, collected_by, collected_tenant, \
                                   collected_at";

/// Raw strings read directly from a `packages` row.
pub struct RawPackage {
  pub package_id:       String,
  pub courier:          String,
  pub details:          String,
  pub destination:      String,
  pub logged_at:        String,
  pub collected_by:     Option<String>,
  pub collected_tenant: Option<String>,
  pub collected_at:     Option<String>,
}

impl RawPackage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      package_id:       row.get(0)?,
      courier:          row.get(1)?,
      details:          row.get(2)?,
      destination:      row.get(3)?,
      logged_at:        row.get(4)?,
      collected_by:     row.get(5)?,
      collected_tenant: row.get(6)?,
      collected_at:     row.get(7)?,
    })
  }

  pub fn into_package(self) -> Result<Package> {
    let collection = match (self.collected_by, self.collected_tenant, self.collected_at) {
      (Some(collected_by), Some(tenant), Some(at)) => Some(Collection {
        collected_by,
        tenant,
        collected_at: decode_dt(&at)?,
      }),
      _ => None,
    };
    Ok(Package {
      package_id: decode_uuid(&self.package_id)?,
      courier: self.courier,
      details: self.details,
      destination: self.destination,
      logged_at: decode_dt(&self.logged_at)?,
      collection,
    })
  }
}
