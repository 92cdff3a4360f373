//! The `VisitorStore` and `PackageStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `sentrihawk-store-sqlite`). The presentation layer depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  lifecycle::{GhostPass, Registration},
  package::{CollectPackage, NewPackage, Package},
  visitor::Visitor,
};

// ─── Visitors ────────────────────────────────────────────────────────────────

/// Abstraction over a visitor ledger backend.
///
/// Visitors are never deleted. Each mutating method is all-or-nothing: a read
/// issued after it returns observes either the whole change or none of it.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait VisitorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All known visitors in creation order.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + '_;

  /// Look a visitor up by id. Fails with a not-found error if absent.
  fn find(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// De-duplication lookup; see [`crate::lifecycle::find_by_identity`].
  fn find_by_identity<'a>(
    &'a self,
    document_id: Option<&'a str>,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + 'a;

  /// Check a visitor in at the front desk.
  ///
  /// Names caught by the deny list, and returning visitors who are
  /// blacklisted, are refused with an access-denied error and nothing is
  /// written. A returning visitor gets a new visit appended; anyone else is
  /// created with one open visit. Either way the visitor ends up on site.
  fn register(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Admit a visitor; see [`Visitor::mark_arrived`].
  fn mark_arrived(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Sign a visitor out; see [`Visitor::sign_out`].
  fn sign_out(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Create an expected, anonymised VIP visitor.
  fn issue_ghost_pass(
    &self,
    pass: GhostPass,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Persist a fully-formed visitor as-is, keeping its id.
  ///
  /// Used for seeding and legacy imports. Returns an error if the id is
  /// already taken.
  fn import_visitor(
    &self,
    visitor: Visitor,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;
}

// ─── Packages ────────────────────────────────────────────────────────────────

/// Abstraction over the front-desk package ledger.
pub trait PackageStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record a package arriving at the desk.
  fn log_package(
    &self,
    input: NewPackage,
  ) -> impl Future<Output = Result<Package, Self::Error>> + Send + '_;

  /// Packages still at the desk, oldest first.
  fn list_awaiting(
    &self,
  ) -> impl Future<Output = Result<Vec<Package>, Self::Error>> + Send + '_;

  /// Packages already handed over, in collection order.
  fn list_collected(
    &self,
  ) -> impl Future<Output = Result<Vec<Package>, Self::Error>> + Send + '_;

  /// Hand a package over. Fails if it is unknown or already collected.
  fn mark_collected(
    &self,
    id: Uuid,
    input: CollectPackage,
  ) -> impl Future<Output = Result<Package, Self::Error>> + Send + '_;
}
