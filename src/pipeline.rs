//! Lead pipeline board: leads grouped into one column per [`LeadStatus`].

use crate::leads::{Lead, LeadStatus};
use crate::types::LeadId;

/// One column of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: LeadStatus,
    pub leads: Vec<Lead>,
}

/// Leads grouped by status, columns in board order.
///
/// Every status has a column, empty or not. Within a column leads keep the
/// order they were given in (the backend's sort order).
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    columns: Vec<Column>,
}

impl Pipeline {
    #[must_use]
    pub fn from_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        let mut columns: Vec<Column> = LeadStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                leads: Vec::new(),
            })
            .collect();
        for lead in leads {
            columns[lead.status.index()].leads.push(lead);
        }
        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, status: LeadStatus) -> &[Lead] {
        &self.columns[status.index()].leads
    }

    /// Lead count per status, in board order.
    #[must_use]
    pub fn counts(&self) -> Vec<(LeadStatus, usize)> {
        self.columns
            .iter()
            .map(|c| (c.status, c.leads.len()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.leads.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leads not yet closed or lost.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| !c.status.is_terminal())
            .map(|c| c.leads.len())
            .sum()
    }

    #[must_use]
    pub fn find(&self, id: &LeadId) -> Option<&Lead> {
        self.columns
            .iter()
            .flat_map(|c| c.leads.iter())
            .find(|lead| &lead.id == id)
    }

    /// Move a lead to `status`, appending it to the target column.
    ///
    /// Returns the lead's previous status, or `None` if no lead has this id.
    /// Used for optimistic drag-and-drop before the backend confirms; call
    /// again with the returned status to roll back.
    pub fn move_lead(&mut self, id: &LeadId, status: LeadStatus) -> Option<LeadStatus> {
        let (from, position) = self.columns.iter().find_map(|c| {
            c.leads
                .iter()
                .position(|lead| &lead.id == id)
                .map(|pos| (c.status, pos))
        })?;

        if from == status {
            return Some(from);
        }

        let mut lead = self.columns[from.index()].leads.remove(position);
        lead.status = status;
        self.columns[status.index()].leads.push(lead);
        Some(from)
    }

    /// Case-insensitive substring match on name, email and phone.
    ///
    /// A blank query keeps every lead.
    #[must_use]
    pub fn search(&self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        let is_match = |lead: &Lead| {
            let field_matches =
                |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&needle));
            field_matches(Some(lead.name.as_str()))
                || field_matches(lead.email.as_deref())
                || field_matches(lead.phone.as_deref())
        };
        Self::from_leads(
            self.columns
                .iter()
                .flat_map(|c| c.leads.iter())
                .filter(|&lead| is_match(lead))
                .cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn lead(id: &str, name: &str, status: LeadStatus) -> Lead {
        Lead::new(id, name, status, datetime!(2026-01-15 12:00 UTC))
    }

    fn sample() -> Pipeline {
        Pipeline::from_leads(vec![
            lead("1", "Ada Lovelace", LeadStatus::New).with_email("ada@example.com"),
            lead("2", "Alan Turing", LeadStatus::Showing).with_phone("555-0100"),
            lead("3", "Grace Hopper", LeadStatus::New),
            lead("4", "Edsger Dijkstra", LeadStatus::Lost),
        ])
    }

    fn ids(leads: &[Lead]) -> Vec<&str> {
        leads.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_groups_by_status_preserving_order() {
        let pipeline = sample();
        assert_eq!(ids(pipeline.column(LeadStatus::New)), vec!["1", "3"]);
        assert_eq!(ids(pipeline.column(LeadStatus::Showing)), vec!["2"]);
        assert_eq!(pipeline.len(), 4);
    }

    #[test]
    fn test_every_status_has_a_column() {
        let pipeline = Pipeline::from_leads(Vec::new());
        assert!(pipeline.is_empty());
        let statuses: Vec<_> = pipeline.columns().iter().map(|c| c.status).collect();
        assert_eq!(statuses, LeadStatus::ALL.to_vec());
    }

    #[test]
    fn test_counts_and_active() {
        let pipeline = sample();
        let counts = pipeline.counts();
        assert_eq!(counts[0], (LeadStatus::New, 2));
        assert_eq!(counts[6], (LeadStatus::Lost, 1));
        assert_eq!(pipeline.active_count(), 3);
    }

    #[test]
    fn test_move_lead() {
        let mut pipeline = sample();
        let previous = pipeline.move_lead(&LeadId::from("1"), LeadStatus::Contacted);

        assert_eq!(previous, Some(LeadStatus::New));
        assert_eq!(ids(pipeline.column(LeadStatus::New)), vec!["3"]);
        assert_eq!(ids(pipeline.column(LeadStatus::Contacted)), vec!["1"]);
        assert_eq!(
            pipeline.find(&LeadId::from("1")).map(|l| l.status),
            Some(LeadStatus::Contacted)
        );
    }

    #[test]
    fn test_move_lead_rollback() {
        let original = sample();
        let mut pipeline = original.clone();
        let id = LeadId::from("2");
        let previous = pipeline.move_lead(&id, LeadStatus::Closed).unwrap();
        pipeline.move_lead(&id, previous);
        assert_eq!(pipeline, original);
    }

    #[test]
    fn test_move_to_same_status_is_noop() {
        let mut pipeline = sample();
        let before = pipeline.clone();
        assert_eq!(
            pipeline.move_lead(&LeadId::from("1"), LeadStatus::New),
            Some(LeadStatus::New)
        );
        assert_eq!(pipeline, before);
    }

    #[test]
    fn test_move_unknown_lead() {
        let mut pipeline = sample();
        assert_eq!(pipeline.move_lead(&LeadId::from("99"), LeadStatus::Lost), None);
    }

    #[test]
    fn test_search_matches_name_email_phone() {
        let pipeline = sample();
        assert_eq!(pipeline.search("GRACE").len(), 1);
        assert_eq!(ids(pipeline.search("example.com").column(LeadStatus::New)), vec!["1"]);
        assert_eq!(ids(pipeline.search("0100").column(LeadStatus::Showing)), vec!["2"]);
        assert!(pipeline.search("nobody").is_empty());
        assert_eq!(pipeline.search("  ").len(), 4);
    }
}
