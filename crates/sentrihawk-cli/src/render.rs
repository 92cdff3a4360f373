//! Plain-text rendering of dashboards, profiles and ledgers.

use std::fmt::Write as _;

use chrono::NaiveTime;
use sentrihawk_core::{
  dashboard::{DashboardRow, GuardDashboard, TenantDashboard},
  history::{HistoryEntry, visit_log},
  lifecycle::ProfileAction,
  package::Package,
  visitor::{Audience, Visitor},
};

const PLACEHOLDER: &str = "--:--";

fn clock(t: Option<NaiveTime>) -> String {
  t.map(|t| t.format("%H:%M").to_string())
    .unwrap_or_else(|| PLACEHOLDER.to_owned())
}

fn or_dash(value: Option<&str>) -> &str { value.unwrap_or("-") }

fn rows_table(out: &mut String, rows: &[DashboardRow]) {
  if rows.is_empty() {
    let _ = writeln!(out, "  (no records)");
    return;
  }
  let _ = writeln!(
    out,
    "  {:<36}  {:<24}  {:<16}  {:<10}  {:>5}  {:>5}",
    "ID", "NAME", "DESTINATION", "STATUS", "IN", "OUT"
  );
  for row in rows {
    let name = if row.is_vip {
      format!("{} *", row.display_name)
    } else {
      row.display_name.clone()
    };
    let _ = writeln!(
      out,
      "  {:<36}  {:<24}  {:<16}  {:<10}  {:>5}  {:>5}",
      row.visitor_id,
      name,
      or_dash(row.destination.as_deref()),
      row.badge.to_string(),
      clock(row.time_in),
      clock(row.time_out),
    );
  }
}

pub fn guard_dashboard(dash: &GuardDashboard) -> String {
  let mut out = String::new();
  let c = dash.counts;
  let _ = writeln!(
    out,
    "Expected: {}   On Site: {}   Incidents: {}",
    c.expected, c.on_site, c.incidents
  );
  let _ = writeln!(out, "\n{}", dash.filter.title());
  rows_table(&mut out, &dash.rows);
  out
}

pub fn tenant_dashboard(dash: &TenantDashboard) -> String {
  let mut out = String::new();
  let c = dash.counts;
  let _ = writeln!(out, "Tenant: {}", dash.tenant_id);
  let _ = writeln!(
    out,
    "Expected: {}   On Site: {}   VIP: {}   Blacklist: {}",
    c.expected, c.on_site, c.vip, c.blacklist
  );
  let _ = writeln!(out, "\n{}", dash.filter.title());
  rows_table(&mut out, &dash.rows);
  out
}

/// One line per visitor, named as `audience` sees them.
pub fn visitor_list(visitors: &[Visitor], audience: Audience) -> String {
  let rows: Vec<DashboardRow> = visitors
    .iter()
    .map(|v| DashboardRow {
      visitor_id:   v.visitor_id,
      display_name: v.display_name(audience).to_owned(),
      destination:  v.current_destination().map(str::to_owned),
      badge:        v.badge(),
      is_vip:       v.is_vip,
      time_in:      v.current_visit().and_then(|r| r.time_in),
      time_out:     v.current_visit().and_then(|r| r.time_out),
    })
    .collect();
  let mut out = String::new();
  rows_table(&mut out, &rows);
  out
}

pub fn profile(visitor: &Visitor, audience: Audience) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", visitor.display_name(audience));
  let _ = writeln!(out, "  id:          {}", visitor.visitor_id);
  let _ = writeln!(out, "  status:      {}", visitor.badge());
  let _ = writeln!(out, "  company:     {}", or_dash(visitor.company.as_deref()));
  if !visitor.is_ghost || audience == Audience::Tenant {
    let _ = writeln!(out, "  document id: {}", or_dash(visitor.document_id.as_deref()));
    let _ = writeln!(out, "  phone:       {}", or_dash(visitor.phone.as_deref()));
  }
  let _ = writeln!(out, "  vehicle:     {}", or_dash(visitor.vrn.as_deref()));
  let _ = writeln!(out, "  tenant:      {}", or_dash(visitor.destination.as_deref()));

  let mut flags = Vec::new();
  if visitor.is_vip {
    flags.push("VIP");
  }
  if visitor.is_ghost {
    flags.push("ghost");
  }
  if visitor.is_blacklisted {
    flags.push("BLACKLISTED");
  }
  if !flags.is_empty() {
    let _ = writeln!(out, "  flags:       {}", flags.join(", "));
  }

  let action = match visitor.available_action() {
    Some(ProfileAction::MarkArrived) => "arrive",
    Some(ProfileAction::SignOut) => "sign-out",
    None => "none",
  };
  let _ = writeln!(out, "  action:      {action}");

  let _ = writeln!(out, "\nVisits");
  let log = visit_log(visitor);
  if log.is_empty() {
    let _ = writeln!(out, "  (no visits)");
  }
  for visit in log {
    let _ = writeln!(
      out,
      "  {}  {:>5} - {:<5}  {}",
      visit.date,
      clock(visit.time_in),
      clock(visit.time_out),
      visit.destination
    );
  }
  out
}

pub fn history(entries: &[HistoryEntry]) -> String {
  let mut out = String::new();
  if entries.is_empty() {
    let _ = writeln!(out, "  (no visitors)");
    return out;
  }
  for e in entries {
    let _ = writeln!(
      out,
      "  {}  {:<24}  {:<16}  {}",
      e.date,
      e.display_name,
      or_dash(e.company.as_deref()),
      or_dash(e.document_id.as_deref()),
    );
  }
  out
}

pub fn packages(packages: &[Package]) -> String {
  let mut out = String::new();
  if packages.is_empty() {
    let _ = writeln!(out, "  (no packages)");
    return out;
  }
  for p in packages {
    let _ = write!(
      out,
      "  {}  {:<12}  {:<20}  {:<16}  logged {}",
      p.package_id,
      p.courier,
      p.details,
      p.destination,
      p.logged_at.format("%Y-%m-%d %H:%M"),
    );
    if let Some(c) = &p.collection {
      let _ = write!(
        out,
        "  collected by {} ({}) {}",
        c.collected_by,
        c.tenant,
        c.collected_at.format("%Y-%m-%d %H:%M"),
      );
    }
    out.push('\n');
  }
  out
}

/// The line printed when screening refuses entry.
pub fn silent_alarm(reason: &str) -> String {
  format!("SILENT ALARM TRIGGERED: access denied ({reason}). Security notified.")
}
