//! [`PackageStore`] for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use sentrihawk_core::{
  Error as CoreError,
  package::{CollectPackage, Collection, NewPackage, Package},
  store::PackageStore,
};
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{PACKAGE_COLUMNS, RawPackage, encode_dt, encode_uuid},
};

fn list_where(conn: &Connection, clause: &str) -> Result<Vec<Package>> {
  let mut stmt =
    conn.prepare(&format!("SELECT {PACKAGE_COLUMNS} FROM packages {clause}"))?;
  let raws = stmt
    .query_map([], RawPackage::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPackage::into_package).collect()
}

fn collect_in_tx(
  conn: &mut Connection,
  id: Uuid,
  collection: Collection,
) -> Result<Package> {
  let tx = conn.transaction()?;
  let raw = tx
    .query_row(
      &format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE package_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawPackage::from_row,
    )
    .optional()?
    .ok_or(CoreError::PackageNotFound(id))?;

  let mut package = raw.into_package()?;
  if package.is_collected() {
    return Err(CoreError::AlreadyCollected(id).into());
  }

  tx.execute(
    "UPDATE packages
     SET collected_by = ?2, collected_tenant = ?3, collected_at = ?4
     WHERE package_id = ?1",
    rusqlite::params![
      encode_uuid(id),
      collection.collected_by,
      collection.tenant,
      encode_dt(collection.collected_at),
    ],
  )?;
  tx.commit()?;

  package.collection = Some(collection);
  Ok(package)
}

impl PackageStore for SqliteStore {
  type Error = Error;

  async fn log_package(&self, input: NewPackage) -> Result<Package> {
    input.validate()?;
    let package = Package {
      package_id:  Uuid::new_v4(),
      courier:     input.courier.trim().to_owned(),
      details:     input.details.trim().to_owned(),
      destination: input.destination.trim().to_owned(),
      logged_at:   Utc::now(),
      collection:  None,
    };

    let id_str = encode_uuid(package.package_id);
    let at_str = encode_dt(package.logged_at);
    let courier = package.courier.clone();
    let details = package.details.clone();
    let destination = package.destination.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO packages (package_id, courier, details, destination, logged_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, courier, details, destination, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(
      package_id = %package.package_id,
      destination = %package.destination,
      "package logged"
    );
    Ok(package)
  }

  async fn list_awaiting(&self) -> Result<Vec<Package>> {
    self
      .conn
      .call(|conn| {
        Ok(list_where(conn, "WHERE collected_at IS NULL ORDER BY seq"))
      })
      .await?
  }

  async fn list_collected(&self) -> Result<Vec<Package>> {
    self
      .conn
      .call(|conn| {
        Ok(list_where(
          conn,
          "WHERE collected_at IS NOT NULL ORDER BY collected_at, seq",
        ))
      })
      .await?
  }

  async fn mark_collected(
    &self,
    id: Uuid,
    input: CollectPackage,
  ) -> Result<Package> {
    input.validate()?;
    let collection = Collection {
      collected_by: input.collected_by.trim().to_owned(),
      tenant:       input.tenant.trim().to_owned(),
      collected_at: Utc::now(),
    };

    let package = self
      .conn
      .call(move |conn| Ok(collect_in_tx(conn, id, collection)))
      .await??;

    tracing::info!(package_id = %id, "package collected");
    Ok(package)
  }
}
