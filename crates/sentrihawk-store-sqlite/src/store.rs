//! [`SqliteStore`], the SQLite implementation of [`VisitorStore`].
//!
//! Every mutation loads the visitor, applies the pure transition from
//! [`sentrihawk_core::lifecycle`] and writes the result back inside one
//! transaction. A failed transition drops the transaction, so nothing is
//! written.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension as _};
use sentrihawk_core::{
  Error as CoreError,
  lifecycle::{
    ArrivalOutcome, DenyList, GhostPass, Registration, SignOutOutcome,
    find_by_identity,
  },
  store::VisitorStore,
  visitor::Visitor,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawVisit, RawVisitor, VISITOR_COLUMNS, encode_date, encode_dt,
    encode_status, encode_time, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SentriHawk ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  deny:            DenyList,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, deny: DenyList::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, deny: DenyList::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the default deny list used to screen registrations.
  pub fn with_deny_list(mut self, deny: DenyList) -> Self {
    self.deny = deny;
    self
  }

  pub fn deny_list(&self) -> &DenyList { &self.deny }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a lifecycle transition against one visitor inside a transaction.
  async fn transition<T, F>(&self, id: Uuid, apply: F) -> Result<(Visitor, T)>
  where
    T: Send + 'static,
    F: FnOnce(&mut Visitor, DateTime<Local>) -> Result<T> + Send + 'static,
  {
    let now = Local::now();
    self
      .conn
      .call(move |conn| Ok(transition_in_tx(conn, id, now, apply)))
      .await?
  }

  async fn insert(&self, visitor: Visitor) -> Result<Visitor> {
    self
      .conn
      .call(move |conn| Ok(insert_in_tx(conn, visitor)))
      .await?
  }
}

// ─── Row access ──────────────────────────────────────────────────────────────
//
// Plain synchronous helpers; callers run them on the connection thread, usually
// inside a transaction.

fn load_visits(
  conn: &Connection,
  visitor_id: Option<&str>,
) -> rusqlite::Result<Vec<RawVisit>> {
  let select = "SELECT visitor_id, date, destination, time_in, time_out FROM visits";
  match visitor_id {
    Some(id) => {
      let mut stmt = conn.prepare(&format!(
        "{select} WHERE visitor_id = ?1 ORDER BY position"
      ))?;
      let rows = stmt
        .query_map(rusqlite::params![id], RawVisit::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>();
      rows
    }
    None => {
      let mut stmt =
        conn.prepare(&format!("{select} ORDER BY visitor_id, position"))?;
      let rows = stmt
        .query_map([], RawVisit::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>();
      rows
    }
  }
}

fn load_visitor(conn: &Connection, id: Uuid) -> Result<Option<Visitor>> {
  let id_str = encode_uuid(id);
  let raw = conn
    .query_row(
      &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_id = ?1"),
      rusqlite::params![id_str],
      RawVisitor::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let visits = load_visits(conn, Some(&id_str))?;
      Ok(Some(raw.into_visitor(visits)?))
    }
    None => Ok(None),
  }
}

/// Every visitor, in creation order.
fn load_all(conn: &Connection) -> Result<Vec<Visitor>> {
  let raws = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {VISITOR_COLUMNS} FROM visitors ORDER BY seq"
    ))?;
    stmt
      .query_map([], RawVisitor::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut visits: HashMap<String, Vec<RawVisit>> = HashMap::new();
  for visit in load_visits(conn, None)? {
    visits.entry(visit.visitor_id.clone()).or_default().push(visit);
  }

  raws
    .into_iter()
    .map(|raw| {
      let own = visits.remove(&raw.visitor_id).unwrap_or_default();
      raw.into_visitor(own)
    })
    .collect()
}

fn write_visits(conn: &Connection, visitor: &Visitor) -> Result<()> {
  let id_str = encode_uuid(visitor.visitor_id);
  conn.execute(
    "DELETE FROM visits WHERE visitor_id = ?1",
    rusqlite::params![id_str],
  )?;

  let mut stmt = conn.prepare(
    "INSERT INTO visits (visitor_id, position, date, destination, time_in, time_out)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for (position, visit) in visitor.visits.iter().enumerate() {
    stmt.execute(rusqlite::params![
      id_str,
      position as i64,
      encode_date(visit.date),
      visit.destination,
      visit.time_in.map(encode_time),
      visit.time_out.map(encode_time),
    ])?;
  }
  Ok(())
}

fn insert_visitor(conn: &Connection, visitor: &Visitor) -> Result<()> {
  let id_str = encode_uuid(visitor.visitor_id);
  let taken = conn
    .query_row(
      "SELECT 1 FROM visitors WHERE visitor_id = ?1",
      rusqlite::params![id_str],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if taken {
    return Err(CoreError::DuplicateVisitor(visitor.visitor_id).into());
  }

  conn.execute(
    &format!(
      "INSERT INTO visitors ({VISITOR_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
    ),
    rusqlite::params![
      id_str,
      encode_dt(visitor.created_at),
      visitor.name,
      visitor.document_id,
      visitor.phone,
      visitor.company,
      visitor.vrn,
      visitor.destination,
      encode_status(visitor.status),
      visitor.is_blacklisted,
      visitor.is_ghost,
      visitor.is_vip,
    ],
  )?;
  write_visits(conn, visitor)
}

fn save_visitor(conn: &Connection, visitor: &Visitor) -> Result<()> {
  conn.execute(
    "UPDATE visitors SET
       name = ?2, document_id = ?3, phone = ?4, company = ?5, vrn = ?6,
       destination = ?7, status = ?8, is_blacklisted = ?9, is_ghost = ?10,
       is_vip = ?11
     WHERE visitor_id = ?1",
    rusqlite::params![
      encode_uuid(visitor.visitor_id),
      visitor.name,
      visitor.document_id,
      visitor.phone,
      visitor.company,
      visitor.vrn,
      visitor.destination,
      encode_status(visitor.status),
      visitor.is_blacklisted,
      visitor.is_ghost,
      visitor.is_vip,
    ],
  )?;
  write_visits(conn, visitor)
}

fn transition_in_tx<T>(
  conn: &mut Connection,
  id: Uuid,
  now: DateTime<Local>,
  apply: impl FnOnce(&mut Visitor, DateTime<Local>) -> Result<T>,
) -> Result<(Visitor, T)> {
  let tx = conn.transaction()?;
  let mut visitor =
    load_visitor(&tx, id)?.ok_or(CoreError::VisitorNotFound(id))?;
  let outcome = apply(&mut visitor, now)?;
  save_visitor(&tx, &visitor)?;
  tx.commit()?;
  Ok((visitor, outcome))
}

fn insert_in_tx(conn: &mut Connection, visitor: Visitor) -> Result<Visitor> {
  let tx = conn.transaction()?;
  insert_visitor(&tx, &visitor)?;
  tx.commit()?;
  Ok(visitor)
}

fn register_in_tx(
  conn: &mut Connection,
  registration: Registration,
  now: DateTime<Local>,
) -> Result<(Visitor, bool)> {
  let tx = conn.transaction()?;
  let existing = {
    let all = load_all(&tx)?;
    find_by_identity(&all, registration.document_id(), &registration.name)
      .cloned()
  };

  let returning = existing.is_some();
  let visitor = match existing {
    Some(mut visitor) => {
      visitor.readmit(registration, now)?;
      save_visitor(&tx, &visitor)?;
      visitor
    }
    None => {
      let visitor = Visitor::walk_in(registration, now);
      insert_visitor(&tx, &visitor)?;
      visitor
    }
  };
  tx.commit()?;
  Ok((visitor, returning))
}

// ─── VisitorStore impl ───────────────────────────────────────────────────────

impl VisitorStore for SqliteStore {
  type Error = Error;

  async fn list(&self) -> Result<Vec<Visitor>> {
    self.conn.call(|conn| Ok(load_all(conn))).await?
  }

  async fn find(&self, id: Uuid) -> Result<Visitor> {
    let found = self.conn.call(move |conn| Ok(load_visitor(conn, id))).await??;
    found.ok_or_else(|| CoreError::VisitorNotFound(id).into())
  }

  async fn find_by_identity<'a>(
    &'a self,
    document_id: Option<&'a str>,
    name: &'a str,
  ) -> Result<Option<Visitor>> {
    let document_id = document_id.map(str::to_owned);
    let name = name.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(load_all(conn).map(|all| {
          find_by_identity(&all, document_id.as_deref(), &name).cloned()
        }))
      })
      .await?
  }

  async fn register(&self, registration: Registration) -> Result<Visitor> {
    registration.validate()?;
    if let Err(denied) = self.deny.screen(&registration.name) {
      tracing::warn!(name = %registration.name, "registration refused by deny list");
      return Err(denied.into());
    }

    let now = Local::now();
    let result = self
      .conn
      .call(move |conn| Ok(register_in_tx(conn, registration, now)))
      .await?;

    match result {
      Ok((visitor, returning)) => {
        tracing::info!(
          visitor_id = %visitor.visitor_id,
          returning,
          "visitor checked in"
        );
        Ok(visitor)
      }
      Err(e) => {
        if e.is_access_denied() {
          tracing::warn!("blacklisted visitor attempted to check in: {e}");
        }
        Err(e)
      }
    }
  }

  async fn mark_arrived(&self, id: Uuid) -> Result<Visitor> {
    let (visitor, outcome) = self
      .transition(id, |v, now| Ok(v.mark_arrived(now)?))
      .await
      .inspect_err(|e| {
        if e.is_access_denied() {
          tracing::warn!(visitor_id = %id, "admission refused: {e}");
        }
      })?;

    match outcome {
      ArrivalOutcome::AlreadyOnSite => {
        tracing::debug!(visitor_id = %id, "visitor already on site")
      }
      ArrivalOutcome::Opened | ArrivalOutcome::Stamped => {
        tracing::info!(visitor_id = %id, ?outcome, "visitor arrived")
      }
    }
    Ok(visitor)
  }

  async fn sign_out(&self, id: Uuid) -> Result<Visitor> {
    let (visitor, outcome) = self
      .transition(id, |v, now| Ok(v.sign_out(now)))
      .await?;

    if outcome == SignOutOutcome::Synthesized {
      tracing::warn!(
        visitor_id = %id,
        "signed out with no open visit; recorded a closed-only visit"
      );
    } else {
      tracing::info!(visitor_id = %id, "visitor signed out");
    }
    Ok(visitor)
  }

  async fn issue_ghost_pass(&self, pass: GhostPass) -> Result<Visitor> {
    pass.validate()?;
    let visitor = self.insert(Visitor::ghost(pass, Local::now())).await?;
    tracing::info!(visitor_id = %visitor.visitor_id, "ghost pass issued");
    Ok(visitor)
  }

  async fn import_visitor(&self, visitor: Visitor) -> Result<Visitor> {
    let visitor = self.insert(visitor).await?;
    tracing::debug!(visitor_id = %visitor.visitor_id, "visitor imported");
    Ok(visitor)
  }
}
