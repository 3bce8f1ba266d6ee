//! Core data types for the job list
//!
//! - `JobRecord`: one job plus its UI state (selection, expansion, parent link)
//! - `JobSortColumn` / `SortState`: table column sorting
//! - `DisplayRow`: the formatted tuple handed to the table widget

use std::cmp::Ordering;

use ratatui::layout::{Constraint, Layout, Rect};

use crate::formatting::{format_epoch_millis, truncate_string};
use crate::models::Job;

/// One entry of the ordered job sequence.
///
/// Children of an expanded array job carry their parent's job id in
/// `parent_id`; the hierarchy is never deeper than one level.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job: Job,
    pub selected: bool,
    pub is_expanded: bool,
    pub parent_id: Option<String>,
}

impl JobRecord {
    /// A fresh top-level record
    pub fn new(job: Job) -> Self {
        Self {
            job,
            selected: false,
            is_expanded: false,
            parent_id: None,
        }
    }

    /// An inlined child of the array job `parent_id`
    pub fn child_of(parent_id: &str, job: Job) -> Self {
        Self {
            job,
            selected: false,
            is_expanded: false,
            parent_id: Some(parent_id.to_string()),
        }
    }

    /// Children always count as array jobs, parents when they carry array metadata
    #[must_use]
    pub fn is_array_job(&self) -> bool {
        self.parent_id.is_some() || self.job.has_array_properties()
    }

    #[must_use]
    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }

    /// True for a top-level array job that can be expanded
    #[must_use]
    pub fn is_array_parent(&self) -> bool {
        self.parent_id.is_none() && self.job.has_array_properties()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.job.job_id
    }

    /// Job name with the array-job decoration used in the table
    #[must_use]
    pub fn decorated_name(&self, max_len: usize) -> String {
        let name = truncate_string(&self.job.job_name, max_len);
        if self.is_child() {
            format!("  | {}", name)
        } else if self.is_array_parent() {
            let marker = if self.is_expanded { '-' } else { '+' };
            match self.job.array_size() {
                Some(size) => format!("{} {} ({} tasks)", marker, name, size),
                None => format!("{} {}", marker, name),
            }
        } else {
            name
        }
    }
}

/// Widths of the job table columns: marker, name, id, created, status
pub const JOB_TABLE_WIDTHS: [Constraint; 5] = [
    Constraint::Length(3),
    Constraint::Min(20),
    Constraint::Length(38), // UUID plus array index
    Constraint::Length(19),
    Constraint::Length(10),
];

pub const JOB_TABLE_COLUMN_SPACING: u16 = 1;

/// Index of the table column under offset `x` of a table `width` cells wide
#[must_use]
pub fn job_table_column_at(width: u16, x: u16) -> Option<usize> {
    let cells = Layout::horizontal(JOB_TABLE_WIDTHS)
        .spacing(JOB_TABLE_COLUMN_SPACING)
        .split(Rect::new(0, 0, width, 1));
    cells
        .iter()
        .position(|cell| x >= cell.x && x < cell.x + cell.width)
}

/// Sortable table columns.
///
/// Table column 0 holds the selection marker and cannot be sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSortColumn {
    Name,
    Id,
    CreatedAt,
    Status,
}

impl JobSortColumn {
    pub const ALL: [JobSortColumn; 4] = [
        JobSortColumn::Name,
        JobSortColumn::Id,
        JobSortColumn::CreatedAt,
        JobSortColumn::Status,
    ];

    /// Map a table column index to a sortable column
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(JobSortColumn::Name),
            2 => Some(JobSortColumn::Id),
            3 => Some(JobSortColumn::CreatedAt),
            4 => Some(JobSortColumn::Status),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            JobSortColumn::Name => "Job Name",
            JobSortColumn::Id => "Job ID",
            JobSortColumn::CreatedAt => "Created At",
            JobSortColumn::Status => "Status",
        }
    }

    /// Compare two jobs on this column (ascending)
    #[must_use]
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        match self {
            JobSortColumn::Name => a.job_name.cmp(&b.job_name),
            JobSortColumn::Id => a.job_id.cmp(&b.job_id),
            JobSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            JobSortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    }
}

/// Active sort: no column until the user picks one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<JobSortColumn>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

impl SortState {
    /// Same column flips direction, a new column starts ascending
    pub fn toggle(&mut self, column: JobSortColumn) {
        if self.column == Some(column) {
            self.ascending = !self.ascending;
        } else {
            self.column = Some(column);
            self.ascending = true;
        }
    }

    /// Header arrow for `column`, if it is the active one
    #[must_use]
    pub fn indicator(&self, column: JobSortColumn) -> Option<char> {
        (self.column == Some(column)).then_some(if self.ascending { '▲' } else { '▼' })
    }
}

/// Formatted row for the jobs table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub marker: &'static str,
    pub name: String,
    pub job_id: String,
    pub created: String,
    pub status: String,
}

impl DisplayRow {
    pub fn from_record(record: &JobRecord, name_max_len: usize) -> Self {
        Self {
            marker: if record.selected { "X" } else { " " },
            name: record.decorated_name(name_max_len),
            job_id: record.job.job_id.clone(),
            created: format_epoch_millis(record.job.created_at),
            status: record.job.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use crate::models::test_support::{array_job, child_job, job};

    #[test]
    fn test_array_classification() {
        let plain = JobRecord::new(job("a", "a", JobStatus::Running, 0));
        assert!(!plain.is_array_job());
        assert!(!plain.is_array_parent());

        let parent = JobRecord::new(array_job("p", "sweep", 3));
        assert!(parent.is_array_job());
        assert!(parent.is_array_parent());

        let child = JobRecord::child_of("p", child_job("p", 0, JobStatus::Failed));
        assert!(child.is_array_job());
        assert!(child.is_child());
        assert!(!child.is_array_parent());
    }

    #[test]
    fn test_decorated_name() {
        let mut parent = JobRecord::new(array_job("p", "sweep", 3));
        assert_eq!(parent.decorated_name(48), "+ sweep (3 tasks)");
        parent.is_expanded = true;
        assert_eq!(parent.decorated_name(48), "- sweep (3 tasks)");

        let child = JobRecord::child_of("p", child_job("p", 0, JobStatus::Failed));
        assert_eq!(child.decorated_name(48), "  | child");

        let plain = JobRecord::new(job("a", "train", JobStatus::Running, 0));
        assert_eq!(plain.decorated_name(48), "train");
    }

    #[test]
    fn test_job_table_column_at() {
        assert_eq!(job_table_column_at(120, 0), Some(0));
        assert_eq!(job_table_column_at(120, 2), Some(0));
        // Spacing between the marker and the name
        assert_eq!(job_table_column_at(120, 3), None);
        assert_eq!(job_table_column_at(120, 4), Some(1));
        assert_eq!(job_table_column_at(120, 500), None);
    }

    #[test]
    fn test_sort_column_from_index() {
        assert_eq!(JobSortColumn::from_index(0), None);
        assert_eq!(JobSortColumn::from_index(3), Some(JobSortColumn::CreatedAt));
        assert_eq!(JobSortColumn::from_index(5), None);
    }

    #[test]
    fn test_sort_state_toggle() {
        let mut sort = SortState::default();
        sort.toggle(JobSortColumn::Name);
        assert_eq!(sort.column, Some(JobSortColumn::Name));
        assert!(sort.ascending);

        sort.toggle(JobSortColumn::Name);
        assert!(!sort.ascending);
        assert_eq!(sort.indicator(JobSortColumn::Name), Some('▼'));

        sort.toggle(JobSortColumn::Status);
        assert_eq!(sort.column, Some(JobSortColumn::Status));
        assert!(sort.ascending);
        assert_eq!(sort.indicator(JobSortColumn::Name), None);
    }

    #[test]
    fn test_display_row_marker() {
        let mut record = JobRecord::new(job("a", "train", JobStatus::Running, 0));
        assert_eq!(DisplayRow::from_record(&record, 48).marker, " ");
        record.selected = true;
        let row = DisplayRow::from_record(&record, 48);
        assert_eq!(row.marker, "X");
        assert_eq!(row.status, "RUNNING");
        assert_eq!(row.job_id, "a");
    }
}
