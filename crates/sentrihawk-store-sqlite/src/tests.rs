//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Local;
use sentrihawk_core::{
  Error as CoreError,
  dashboard::{GuardFilter, TenantCounts, TenantFilter, guard_dashboard, tenant_dashboard},
  legacy::{default_visitors, parse_export},
  lifecycle::{DenyList, GhostPass, Registration},
  package::{CollectPackage, NewPackage},
  session::Session,
  store::{PackageStore, VisitorStore},
  visitor::{Audience, GHOST_DISPLAY_NAME, VisitorStatus},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn with_doc(name: &str, doc: &str, destination: &str) -> Registration {
  Registration {
    document_id: Some(doc.into()),
    ..Registration::new(name, destination)
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_find_has_open_visit_at_destination() {
  let s = store().await;

  let v = s.register(Registration::new("Alice", "tenant1")).await.unwrap();
  let fetched = s.find(v.visitor_id).await.unwrap();

  assert_eq!(fetched, v);
  assert_eq!(fetched.status, VisitorStatus::OnSite);
  let latest = fetched.current_visit().unwrap();
  assert_eq!(latest.destination, "tenant1");
  assert!(latest.is_open());
  assert!(latest.time_in.is_some());
}

#[tokio::test]
async fn denied_name_is_not_written() {
  let s = store().await;
  s.register(Registration::new("Alice", "tenant1")).await.unwrap();

  let err = s
    .register(Registration::new("Known Restricted Person", "tenant1"))
    .await
    .unwrap_err();
  assert!(err.is_access_denied());
  assert_eq!(s.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn custom_deny_list_replaces_defaults() {
  let s = store().await.with_deny_list(DenyList::new(["mallory"]));

  assert!(
    s.register(Registration::new("Mallory Smith", "t"))
      .await
      .unwrap_err()
      .is_access_denied()
  );
  s.register(Registration::new("Bad Wolf", "t")).await.unwrap();
  assert_eq!(s.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_registration_is_invalid() {
  let s = store().await;
  let err = s.register(Registration::new("  ", "t")).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn returning_visitor_by_document_gets_new_visit() {
  let s = store().await;
  let first = s.register(with_doc("Alice", "P-1", "tenant1")).await.unwrap();
  let again = s
    .register(with_doc("Alice L.", "P-1", "tenant2"))
    .await
    .unwrap();

  assert_eq!(again.visitor_id, first.visitor_id);
  assert_eq!(again.visits.len(), 2);
  assert!(!again.visits[0].is_open());
  assert_eq!(again.open_visit().unwrap().destination, "tenant2");
  assert_eq!(s.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn returning_visitor_by_name_ignores_case() {
  let s = store().await;
  let first = s.register(Registration::new("Alice", "t")).await.unwrap();
  s.sign_out(first.visitor_id).await.unwrap();

  let again = s.register(Registration::new("ALICE", "t")).await.unwrap();
  assert_eq!(again.visitor_id, first.visitor_id);
  assert_eq!(again.status, VisitorStatus::OnSite);
  assert_eq!(again.visits.len(), 2);
}

#[tokio::test]
async fn blacklisted_returning_visitor_is_refused_untouched() {
  let s = store().await;
  let seeded = default_visitors(Local::now()).unwrap();
  for v in seeded {
    s.import_visitor(v).await.unwrap();
  }
  let lazlo = s
    .find_by_identity(None, "lazlo panaflex")
    .await
    .unwrap()
    .unwrap();

  let err = s
    .register(Registration::new("Lazlo Panaflex", "tenant1"))
    .await
    .unwrap_err();
  assert!(err.is_access_denied());
  assert_eq!(s.find(lazlo.visitor_id).await.unwrap(), lazlo);

  assert!(s.mark_arrived(lazlo.visitor_id).await.unwrap_err().is_access_denied());
  assert_eq!(s.find(lazlo.visitor_id).await.unwrap(), lazlo);
}

#[tokio::test]
async fn flagged_visitor_is_refused_untouched() {
  let s = store().await;
  let json = r#"[{ "id": "r1", "name": "Lazlo Panaflex", "status": "FLAGGED",
    "destination": "tenant1" }]"#;
  let lazlo = parse_export(json, Local::now()).unwrap().remove(0);
  assert_eq!(lazlo.status, VisitorStatus::Restricted);
  assert!(!lazlo.is_blacklisted);
  s.import_visitor(lazlo.clone()).await.unwrap();

  let err = s
    .register(Registration::new("Lazlo Panaflex", "tenant1"))
    .await
    .unwrap_err();
  assert!(err.is_access_denied());
  assert!(s.mark_arrived(lazlo.visitor_id).await.unwrap_err().is_access_denied());

  let after = s.find(lazlo.visitor_id).await.unwrap();
  assert_eq!(after, lazlo);
  assert_eq!(after.status, VisitorStatus::Restricted);
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_missing_is_not_found() {
  let s = store().await;
  let err = s.find(Uuid::new_v4()).await.unwrap_err();
  assert!(err.is_not_found());
  assert!(s.mark_arrived(Uuid::new_v4()).await.unwrap_err().is_not_found());
  assert!(s.sign_out(Uuid::new_v4()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn find_by_identity_prefers_document() {
  let s = store().await;
  let alice = s.register(Registration::new("Alice", "t")).await.unwrap();
  let doc = s.register(with_doc("Bob", "P-9", "t")).await.unwrap();

  let hit = s.find_by_identity(Some("P-9"), "Alice").await.unwrap().unwrap();
  assert_eq!(hit.visitor_id, doc.visitor_id);
  let hit = s.find_by_identity(None, "alice").await.unwrap().unwrap();
  assert_eq!(hit.visitor_id, alice.visitor_id);
  assert!(s.find_by_identity(Some("P-0"), "Carol").await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_in_creation_order() {
  let s = store().await;
  for name in ["A", "B", "C"] {
    s.register(Registration::new(name, "t")).await.unwrap();
  }
  // Mutating an early visitor must not move it.
  let a = s.find_by_identity(None, "A").await.unwrap().unwrap();
  s.sign_out(a.visitor_id).await.unwrap();

  let names: Vec<_> = s
    .list()
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.name)
    .collect();
  assert_eq!(names, ["A", "B", "C"]);
}

// ─── Arrival & sign-out ──────────────────────────────────────────────────────

#[tokio::test]
async fn arrival_then_sign_out_round() {
  let s = store().await;
  let v = s.register(Registration::new("Alice", "t")).await.unwrap();

  let out = s.sign_out(v.visitor_id).await.unwrap();
  assert_eq!(out.status, VisitorStatus::CheckedOut);
  assert_eq!(out.visits.len(), 1);
  assert!(out.visits[0].time_out.is_some());

  let back = s.mark_arrived(v.visitor_id).await.unwrap();
  assert_eq!(back.status, VisitorStatus::OnSite);
  assert_eq!(back.visits.len(), 2);
  assert!(back.open_visit().is_some());

  // Already on site: nothing changes.
  let again = s.mark_arrived(v.visitor_id).await.unwrap();
  assert_eq!(again, back);
}

#[tokio::test]
async fn sign_out_without_open_visit_adds_one_closed_record() {
  let s = store().await;
  let v = s.register(Registration::new("Alice", "t")).await.unwrap();
  s.sign_out(v.visitor_id).await.unwrap();

  let twice = s.sign_out(v.visitor_id).await.unwrap();
  assert_eq!(twice.visits.len(), 2);
  assert!(twice.visits[1].time_in.is_none());
  assert!(twice.visits[1].time_out.is_some());
  assert_eq!(s.find(v.visitor_id).await.unwrap(), twice);
}

#[tokio::test]
async fn ghost_pass_is_stamped_on_arrival() {
  let s = store().await;
  let ghost = s
    .issue_ghost_pass(GhostPass {
      real_name:   "Senator Armstrong".into(),
      company:     None,
      destination: Some("tenant5".into()),
    })
    .await
    .unwrap();
  assert_eq!(ghost.status, VisitorStatus::Expected);
  assert_eq!(ghost.display_name(Audience::Guard), GHOST_DISPLAY_NAME);
  assert!(ghost.visits[0].is_pending());

  let arrived = s.mark_arrived(ghost.visitor_id).await.unwrap();
  assert_eq!(arrived.visits.len(), 1);
  assert!(arrived.visits[0].time_in.is_some());
  assert!(arrived.visits[0].is_open());
}

#[tokio::test]
async fn ghost_pass_requires_a_name() {
  let s = store().await;
  let err = s.issue_ghost_pass(GhostPass::default()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_rejects_duplicate_ids() {
  let s = store().await;
  let seeded = default_visitors(Local::now()).unwrap();
  let first = seeded[0].clone();
  for v in seeded {
    s.import_visitor(v).await.unwrap();
  }

  let err = s.import_visitor(first.clone()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateVisitor(id)) if id == first.visitor_id
  ));
  assert_eq!(s.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn imported_visitor_round_trips() {
  let s = store().await;
  let json = r#"[{
    "id": "vis_77",
    "name": "Rita",
    "phone": "+44 20 7946 0000",
    "status": "ON SITE",
    "destination": "tenant1",
    "isVIP": true,
    "visits": [
      { "date": "2026-03-01", "destination": "tenant1", "time_in": "09:00", "time_out": "10:30" },
      { "date": "2026-03-02", "destination": "tenant1", "time_in": "11:15:20", "time_out": null }
    ]
  }]"#;
  let rita = parse_export(json, Local::now()).unwrap().remove(0);
  s.import_visitor(rita.clone()).await.unwrap();

  let fetched = s.find(rita.visitor_id).await.unwrap();
  assert_eq!(fetched, rita);
}

// ─── Dashboards over the store ───────────────────────────────────────────────

#[tokio::test]
async fn tenant_scenario_from_store() {
  let s = store().await;
  let json = r#"[
    { "id": "t1_exp",  "name": "Eve",   "status": "EXPECTED", "destination": "tenant1" },
    { "id": "t2_exp",  "name": "Xena",  "status": "EXPECTED", "destination": "tenant2" },
    { "id": "t1_on",   "name": "Oscar", "status": "ON_SITE",  "destination": "tenant1",
      "visits": [{ "date": "2026-03-10", "destination": "tenant1", "time_in": "09:00" }] },
    { "id": "t1_flag", "name": "Frank", "status": "FLAGGED",  "destination": "tenant1" },
    { "id": "t2_on",   "name": "Yuri",  "status": "ON_SITE",  "destination": "tenant2" }
  ]"#;
  for v in parse_export(json, Local::now()).unwrap() {
    s.import_visitor(v).await.unwrap();
  }
  let ledger = s.list().await.unwrap();

  let dash =
    tenant_dashboard(&ledger, &Session::tenant("tenant1"), TenantFilter::All)
      .unwrap();
  assert_eq!(dash.counts, TenantCounts {
    expected:  1,
    on_site:   1,
    vip:       0,
    blacklist: 1,
  });
  let mut names: Vec<_> = dash.rows.iter().map(|r| r.display_name.as_str()).collect();
  names.sort_unstable();
  assert_eq!(names, ["Eve", "Frank", "Oscar"]);

  let guard = guard_dashboard(&ledger, GuardFilter::All);
  assert_eq!(guard.rows[0].display_name, "Yuri");
  assert_eq!(guard.counts.on_site, 2);
  assert_eq!(guard.counts.incidents, 1);
}

// ─── Packages ────────────────────────────────────────────────────────────────

fn parcel(destination: &str) -> NewPackage {
  NewPackage {
    courier:     "DHL".into(),
    details:     "Small box".into(),
    destination: destination.into(),
  }
}

fn pickup() -> CollectPackage {
  CollectPackage {
    collected_by: "Jane Smith".into(),
    tenant:       "tenant1".into(),
  }
}

#[tokio::test]
async fn package_moves_from_awaiting_to_collected() {
  let s = store().await;
  let first = s.log_package(parcel("tenant1")).await.unwrap();
  let second = s.log_package(parcel("tenant2")).await.unwrap();

  let awaiting = s.list_awaiting().await.unwrap();
  assert_eq!(
    awaiting.iter().map(|p| p.package_id).collect::<Vec<_>>(),
    [first.package_id, second.package_id]
  );
  assert!(s.list_collected().await.unwrap().is_empty());

  let collected = s.mark_collected(first.package_id, pickup()).await.unwrap();
  let collection = collected.collection.as_ref().unwrap();
  assert_eq!(collection.collected_by, "Jane Smith");
  assert_eq!(collection.tenant, "tenant1");

  let awaiting = s.list_awaiting().await.unwrap();
  assert_eq!(awaiting.len(), 1);
  assert_eq!(awaiting[0].package_id, second.package_id);
  assert_eq!(s.list_collected().await.unwrap(), vec![collected]);
}

#[tokio::test]
async fn package_collection_errors() {
  let s = store().await;
  let p = s.log_package(parcel("tenant1")).await.unwrap();
  s.mark_collected(p.package_id, pickup()).await.unwrap();

  let err = s.mark_collected(p.package_id, pickup()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadyCollected(_))));

  let err = s.mark_collected(Uuid::new_v4(), pickup()).await.unwrap_err();
  assert!(err.is_not_found());

  let err = s
    .mark_collected(p.package_id, CollectPackage::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn package_requires_all_fields() {
  let s = store().await;
  let err = s
    .log_package(NewPackage { courier: String::new(), ..parcel("tenant1") })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
  assert!(s.list_awaiting().await.unwrap().is_empty());
}
