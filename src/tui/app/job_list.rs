//! The ordered job sequence and everything that reshapes it
//!
//! `JobList` is the single source of truth for the jobs table. It owns the
//! records in display order, with the children of an expanded array job
//! stored directly after their parent. Visible rows are derived on demand
//! by running the filter over this sequence.
//!
//! Nothing here talks to the remote service: remote work happens on
//! background tasks and its results are applied through `push_job` and
//! `splice_children` on the UI task.

use std::collections::BTreeMap;

use thiserror::Error;

use super::filter::FilterSettings;
use super::types::{DisplayRow, JobRecord, JobSortColumn, SortState};
use crate::models::{Job, JobStatus};
use crate::utils::natural_cmp;

/// Contract violations when addressing the sequence
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobListError {
    #[error("job {job_id} is no longer in the list")]
    NotFound { job_id: String },

    #[error("row {index} is out of range")]
    OutOfRange { index: usize },

    #[error("job {job_id} is not an array job")]
    NotAnArrayParent { job_id: String },
}

/// What a toggle-expand request resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum ExpandAction {
    /// Children of `parent` must be fetched and spliced in
    Expand { parent: Job },
    /// The group of `parent_id` was collapsed in place
    Collapsed { parent_id: String },
    /// The row is not an array job; nothing changed
    NotArrayJob,
}

#[derive(Debug, Default)]
pub struct JobList {
    records: Vec<JobRecord>,
    sort: SortState,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&JobRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    #[must_use]
    pub fn index_of(&self, job_id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == job_id)
    }

    fn record(&self, index: usize) -> Result<&JobRecord, JobListError> {
        self.records
            .get(index)
            .ok_or(JobListError::OutOfRange { index })
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Drop the whole sequence; expansions and selections go with it
    pub fn begin_refresh(&mut self) {
        self.records.clear();
    }

    /// Append one freshly listed top-level job
    pub fn push_job(&mut self, job: Job) {
        self.records.push(JobRecord::new(job));
    }

    /// Re-apply the active sort once the listing is complete
    pub fn finish_refresh(&mut self) {
        self.apply_sort();
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    /// Sequence indices of the rows that pass `filter`, in display order
    #[must_use]
    pub fn visible_indices(&self, filter: &FilterSettings) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(&r.job))
            .map(|(i, _)| i)
            .collect()
    }

    #[must_use]
    pub fn display_rows(&self, filter: &FilterSettings, name_max_len: usize) -> Vec<DisplayRow> {
        self.records
            .iter()
            .filter(|r| filter.matches(&r.job))
            .map(|r| DisplayRow::from_record(r, name_max_len))
            .collect()
    }

    /// Number of top-level jobs per status
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<JobStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.iter().filter(|r| !r.is_child()) {
            *counts.entry(record.job.status).or_insert(0) += 1;
        }
        counts
    }

    // ------------------------------------------------------------------
    // Expand / collapse
    // ------------------------------------------------------------------

    /// Resolve an expand/collapse request on row `index`.
    ///
    /// A child collapses its parent's group, an expanded parent collapses,
    /// an unexpanded parent asks the caller to fetch its children.
    pub fn toggle_expand(&mut self, index: usize) -> Result<ExpandAction, JobListError> {
        let record = self.record(index)?;

        if let Some(parent_id) = record.parent_id.clone() {
            let parent_index = self
                .index_of(&parent_id)
                .ok_or_else(|| JobListError::NotFound {
                    job_id: parent_id.clone(),
                })?;
            self.collapse(parent_index)?;
            return Ok(ExpandAction::Collapsed { parent_id });
        }

        if !record.is_array_parent() {
            return Ok(ExpandAction::NotArrayJob);
        }

        if record.is_expanded {
            let parent_id = record.id().to_string();
            self.collapse(index)?;
            Ok(ExpandAction::Collapsed { parent_id })
        } else {
            Ok(ExpandAction::Expand {
                parent: record.job.clone(),
            })
        }
    }

    /// Insert the children of `parent_id` right after it, in natural id order.
    ///
    /// Returns the number of rows inserted. A parent that is already
    /// expanded is left alone and 0 is returned.
    pub fn splice_children(
        &mut self,
        parent_id: &str,
        mut children: Vec<Job>,
    ) -> Result<usize, JobListError> {
        let index = self
            .index_of(parent_id)
            .ok_or_else(|| JobListError::NotFound {
                job_id: parent_id.to_string(),
            })?;

        let parent = &mut self.records[index];
        if !parent.is_array_parent() {
            return Err(JobListError::NotAnArrayParent {
                job_id: parent_id.to_string(),
            });
        }
        if parent.is_expanded {
            return Ok(0);
        }
        parent.is_expanded = true;

        children.sort_by(|a, b| natural_cmp(&a.job_id, &b.job_id));
        let count = children.len();
        let records = children
            .into_iter()
            .map(|job| JobRecord::child_of(parent_id, job));
        self.records.splice(index + 1..index + 1, records);

        tracing::debug!("Spliced {} children under {}", count, parent_id);
        Ok(count)
    }

    /// Remove the inlined children of the array job at `index`.
    ///
    /// Returns the number of rows removed.
    pub fn collapse(&mut self, index: usize) -> Result<usize, JobListError> {
        let record = self.record(index)?;
        if !record.is_array_parent() {
            return Err(JobListError::NotAnArrayParent {
                job_id: record.id().to_string(),
            });
        }

        let parent_id = record.id().to_string();
        let before = self.records.len();
        self.records
            .retain(|r| r.parent_id.as_deref() != Some(parent_id.as_str()));
        self.records[index].is_expanded = false;

        Ok(before - self.records.len())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Flip the selection of row `index`, returning the new state
    pub fn toggle_selected(&mut self, index: usize) -> Result<bool, JobListError> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(JobListError::OutOfRange { index })?;
        record.selected = !record.selected;
        Ok(record.selected)
    }

    /// Select every row that passes `filter`; hidden rows are untouched
    pub fn select_all(&mut self, filter: &FilterSettings) -> usize {
        let mut count = 0;
        for record in self.records.iter_mut().filter(|r| filter.matches(&r.job)) {
            record.selected = true;
            count += 1;
        }
        count
    }

    /// Deselect everything, visible or not
    pub fn clear_selection(&mut self) {
        for record in &mut self.records {
            record.selected = false;
        }
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.records.iter().filter(|r| r.selected).count()
    }

    /// Visible selected jobs.
    ///
    /// With nothing selected, the `highlighted` row (if any) is marked
    /// selected and returned on its own.
    pub fn take_selection(&mut self, filter: &FilterSettings, highlighted: Option<usize>) -> Vec<Job> {
        let selected: Vec<Job> = self
            .records
            .iter()
            .filter(|r| r.selected && filter.matches(&r.job))
            .map(|r| r.job.clone())
            .collect();
        if !selected.is_empty() {
            return selected;
        }

        match highlighted.and_then(|i| self.records.get_mut(i)) {
            Some(record) => {
                record.selected = true;
                vec![record.job.clone()]
            }
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Sort by table column `index`. Returns false for unsortable columns.
    pub fn sort_by_column(&mut self, index: usize) -> bool {
        match JobSortColumn::from_index(index) {
            Some(column) => {
                self.sort_by(column);
                true
            }
            None => false,
        }
    }

    /// Same column flips direction, a new column sorts ascending
    pub fn sort_by(&mut self, column: JobSortColumn) {
        self.sort.toggle(column);
        self.apply_sort();
    }

    /// Reorder top-level groups by the active sort.
    ///
    /// Children stay directly below their parent in natural id order.
    fn apply_sort(&mut self) {
        let Some(column) = self.sort.column else {
            return;
        };
        let ascending = self.sort.ascending;

        let mut groups: Vec<Vec<JobRecord>> = Vec::new();
        for record in self.records.drain(..) {
            match groups.last_mut() {
                Some(group) if record.is_child() => group.push(record),
                _ => groups.push(vec![record]),
            }
        }

        groups.sort_by(|a, b| {
            let ord = column.compare(&a[0].job, &b[0].job);
            if ascending { ord } else { ord.reverse() }
        });

        self.records = groups.into_iter().flatten().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{array_job, child_job, job};

    fn list_of(jobs: Vec<Job>) -> JobList {
        let mut list = JobList::new();
        list.begin_refresh();
        for job in jobs {
            list.push_job(job);
        }
        list.finish_refresh();
        list
    }

    fn ids(list: &JobList) -> Vec<&str> {
        list.records().iter().map(JobRecord::id).collect()
    }

    fn parent_with_children() -> JobList {
        let mut list = list_of(vec![
            job("a", "alpha", JobStatus::Running, 1000),
            array_job("job", "sweep", 3),
            job("z", "zeta", JobStatus::Failed, 3000),
        ]);
        list.splice_children(
            "job",
            vec![
                child_job("job", 10, JobStatus::Running),
                child_job("job", 1, JobStatus::Succeeded),
                child_job("job", 2, JobStatus::Failed),
            ],
        )
        .unwrap();
        list
    }

    #[test]
    fn test_children_inserted_in_natural_order() {
        let list = parent_with_children();
        assert_eq!(ids(&list), vec!["a", "job", "job:1", "job:2", "job:10", "z"]);
        assert!(list.get(1).unwrap().is_expanded);
        assert!(
            list.records()[2..5]
                .iter()
                .all(|r| r.parent_id.as_deref() == Some("job"))
        );
    }

    #[test]
    fn test_expand_then_collapse_restores_sequence() {
        let mut list = list_of(vec![
            job("a", "alpha", JobStatus::Running, 1000),
            array_job("job", "sweep", 2),
            job("z", "zeta", JobStatus::Failed, 3000),
        ]);
        let before = list.records().to_vec();

        let action = list.toggle_expand(1).unwrap();
        let ExpandAction::Expand { parent } = action else {
            panic!("expected an expand request, got {:?}", action);
        };
        list.splice_children(
            &parent.job_id,
            vec![
                child_job("job", 1, JobStatus::Running),
                child_job("job", 0, JobStatus::Running),
            ],
        )
        .unwrap();
        assert_eq!(list.len(), 5);

        let action = list.toggle_expand(1).unwrap();
        assert_eq!(
            action,
            ExpandAction::Collapsed {
                parent_id: "job".to_string()
            }
        );
        assert_eq!(list.records(), before.as_slice());
    }

    #[test]
    fn test_toggle_on_child_collapses_whole_group() {
        let mut list = parent_with_children();
        let action = list.toggle_expand(3).unwrap();

        assert_eq!(
            action,
            ExpandAction::Collapsed {
                parent_id: "job".to_string()
            }
        );
        assert_eq!(ids(&list), vec!["a", "job", "z"]);
        assert!(!list.get(1).unwrap().is_expanded);
    }

    #[test]
    fn test_toggle_on_plain_job_is_rejected() {
        let mut list = list_of(vec![job("a", "alpha", JobStatus::Running, 1000)]);
        assert_eq!(list.toggle_expand(0).unwrap(), ExpandAction::NotArrayJob);
        assert_eq!(
            list.toggle_expand(7),
            Err(JobListError::OutOfRange { index: 7 })
        );
    }

    #[test]
    fn test_splice_into_expanded_parent_is_a_no_op() {
        let mut list = parent_with_children();
        let inserted = list
            .splice_children("job", vec![child_job("job", 4, JobStatus::Running)])
            .unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn test_splice_into_missing_parent_fails() {
        let mut list = list_of(vec![job("a", "alpha", JobStatus::Running, 1000)]);
        assert_eq!(
            list.splice_children("gone", vec![]),
            Err(JobListError::NotFound {
                job_id: "gone".to_string()
            })
        );
        assert_eq!(
            list.splice_children("a", vec![]),
            Err(JobListError::NotAnArrayParent {
                job_id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_select_all_respects_filter() {
        let mut list = list_of(vec![
            job("A", "A", JobStatus::Running, 1),
            job("B", "B", JobStatus::Failed, 2),
            job("C", "C", JobStatus::Running, 3),
        ]);
        let filter = FilterSettings::new("", [JobStatus::Running]);

        assert_eq!(list.select_all(&filter), 2);
        let selected: Vec<bool> = list.records().iter().map(|r| r.selected).collect();
        assert_eq!(selected, vec![true, false, true]);

        list.toggle_selected(1).unwrap();
        list.clear_selection();
        assert_eq!(list.selected_count(), 0);
    }

    #[test]
    fn test_take_selection_falls_back_to_highlighted() {
        let mut list = list_of(vec![
            job("a", "a", JobStatus::Running, 1),
            job("b", "b", JobStatus::Running, 2),
        ]);
        let filter = FilterSettings::default();

        let taken = list.take_selection(&filter, Some(1));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].job_id, "b");
        assert!(list.get(1).unwrap().selected);

        assert!(JobList::new().take_selection(&filter, None).is_empty());
    }

    #[test]
    fn test_take_selection_skips_hidden_rows() {
        let mut list = list_of(vec![
            job("a", "a", JobStatus::Running, 1),
            job("b", "b", JobStatus::Failed, 2),
        ]);
        list.toggle_selected(0).unwrap();
        list.toggle_selected(1).unwrap();

        let filter = FilterSettings::new("", [JobStatus::Failed]);
        let taken: Vec<String> = list
            .take_selection(&filter, Some(0))
            .into_iter()
            .map(|j| j.job_id)
            .collect();
        assert_eq!(taken, vec!["b"]);
    }

    #[test]
    fn test_filter_then_sort_by_created_descending() {
        let mut list = list_of(vec![
            job("a", "a", JobStatus::Running, 1000),
            job("b", "b", JobStatus::Failed, 2000),
        ]);

        let failed = FilterSettings::new("", [JobStatus::Failed]);
        assert_eq!(list.visible_indices(&failed), vec![1]);

        assert!(list.sort_by_column(3));
        assert!(list.sort_by_column(3));
        assert!(!list.sort_state().ascending);
        assert_eq!(ids(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_moves_children_with_parent() {
        let mut list = parent_with_children();
        list.sort_by(JobSortColumn::Name);
        assert_eq!(ids(&list), vec!["a", "job", "job:1", "job:2", "job:10", "z"]);

        list.sort_by(JobSortColumn::Name);
        assert_eq!(ids(&list), vec!["z", "job", "job:1", "job:2", "job:10", "a"]);
    }

    #[test]
    fn test_selection_column_is_not_sortable() {
        let mut list = list_of(vec![job("b", "b", JobStatus::Running, 1), job("a", "a", JobStatus::Running, 2)]);
        assert!(!list.sort_by_column(0));
        assert_eq!(ids(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_refresh_discards_expansion_and_reapplies_sort() {
        let mut list = parent_with_children();
        list.sort_by(JobSortColumn::Id);
        list.toggle_selected(0).unwrap();

        list.begin_refresh();
        assert!(list.is_empty());
        list.push_job(job("y", "y", JobStatus::Running, 1));
        list.push_job(job("x", "x", JobStatus::Running, 2));
        list.finish_refresh();

        assert_eq!(ids(&list), vec!["x", "y"]);
        assert_eq!(list.selected_count(), 0);
    }

    #[test]
    fn test_status_counts_ignore_children() {
        let list = parent_with_children();
        let counts = list.status_counts();
        assert_eq!(counts.get(&JobStatus::Running), Some(&2));
        assert_eq!(counts.get(&JobStatus::Failed), Some(&1));
        assert_eq!(counts.get(&JobStatus::Succeeded), None);
    }
}
