//! Visit history lookups for the guard's history tab.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::visitor::{Audience, VisitRecord, Visitor};

/// A visitor who came in on the requested day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub visitor_id:   Uuid,
  pub display_name: String,
  pub document_id:  Option<String>,
  pub company:      Option<String>,
  pub date:         NaiveDate,
}

fn matches_search(visitor: &Visitor, term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  // Ghosts are searchable by their placeholder only, never their real name.
  visitor
    .display_name(Audience::Guard)
    .to_lowercase()
    .contains(term)
    || visitor.phone.as_deref().is_some_and(|p| p.contains(term))
    || visitor
      .company
      .as_deref()
      .is_some_and(|c| c.to_lowercase().contains(term))
}

/// Visitors with at least one visit on `date` whose name, phone or company
/// contains `search` (case-insensitive). Creation order.
pub fn visitors_on(
  visitors: &[Visitor],
  date: NaiveDate,
  search: &str,
) -> Vec<HistoryEntry> {
  let term = search.trim().to_lowercase();
  visitors
    .iter()
    .filter(|v| v.visits.iter().any(|visit| visit.date == date))
    .filter(|v| matches_search(v, &term))
    .map(|v| HistoryEntry {
      visitor_id:   v.visitor_id,
      display_name: v.display_name(Audience::Guard).to_owned(),
      document_id:  v.document_id.clone(),
      company:      v.company.clone(),
      date,
    })
    .collect()
}

/// Every visit for `visitor`, newest first.
pub fn visit_log(visitor: &Visitor) -> Vec<&VisitRecord> {
  visitor.visits.iter().rev().collect()
}
