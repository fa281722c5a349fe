use std::cmp::Ordering;

use tracing::{debug, info};

use crate::error::{Error, Result, REQUIRED_FIELDS_MESSAGE};
use crate::storage::TaskStore;
use crate::task::{parse_due, EditBuffer, Field, IdGenerator, Status, Task, TaskId};

/// Values of the creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: Status,
}

impl TaskForm {
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::DueDate => &self.due_date,
            Field::Status => self.status.as_str(),
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::DueDate => Some(&mut self.due_date),
            Field::Status => None,
        }
    }

    /// Title and description are present and the due date is a real calendar date
    fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty() && parse_due(&self.due_date).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn next(&self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Only(Status::Pending),
            StatusFilter::Only(Status::Completed) => StatusFilter::All,
            StatusFilter::Only(status) => StatusFilter::Only(status.next()),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == *status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::None => "None",
            SortOrder::Asc => "Ascending",
            SortOrder::Desc => "Descending",
        }
    }

    pub fn next(&self) -> SortOrder {
        match self {
            SortOrder::None => SortOrder::Asc,
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::None,
        }
    }
}

/// Orders two tasks by due date; unparseable dates go last in either direction
fn compare_due(a: &Task, b: &Task, order: SortOrder) -> Ordering {
    match (a.due(), b.due()) {
        (Some(x), Some(y)) => match order {
            SortOrder::Desc => y.cmp(&x),
            _ => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Owns the task collection and the editor state around it.
///
/// Every operation that changes the collection writes the whole resulting
/// collection to the store before returning.
#[derive(Debug)]
pub struct TaskManager<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    ids: IdGenerator,
    form: TaskForm,
    error: Option<&'static str>,
    editing: Option<TaskId>,
    edit_buffer: EditBuffer,
    filter: StatusFilter,
    sort: SortOrder,
}

impl<S: TaskStore> TaskManager<S> {
    /// Create a manager and load the persisted collection from `store`
    pub fn new(store: S) -> Self {
        let tasks = store.load();
        info!("TaskManager loaded {} tasks", tasks.len());
        Self {
            ids: IdGenerator::seeded(&tasks),
            store,
            tasks,
            form: TaskForm::default(),
            error: None,
            editing: None,
            edit_buffer: EditBuffer::default(),
            filter: StatusFilter::default(),
            sort: SortOrder::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit_buffer
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        debug!(?filter, "set_filter: called");
        self.filter = filter;
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        debug!(?sort, "set_sort: called");
        self.sort = sort;
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.tasks)
    }

    /// Create a task from the form values.
    ///
    /// A missing title or description, or a due date that is not a valid
    /// `YYYY-MM-DD` calendar date, sets the error message and
    /// returns [`Error::Validation`] without touching the collection.
    pub fn create_task(&mut self) -> Result<TaskId> {
        if !self.form.is_complete() {
            debug!(form = ?self.form, "create_task: missing required field");
            self.error = Some(REQUIRED_FIELDS_MESSAGE);
            return Err(Error::Validation(REQUIRED_FIELDS_MESSAGE));
        }

        let form = std::mem::take(&mut self.form);
        let task = Task {
            id: self.ids.next_id(),
            title: form.title,
            description: form.description,
            due_date: form.due_date,
            status: form.status,
        };
        let id = task.id;
        info!(id, title = %task.title, "create_task: created");
        self.tasks.push(task);
        self.error = None;
        self.persist()?;
        Ok(id)
    }

    /// Set the status of a task; an unknown id still rewrites the unchanged collection
    pub fn change_status(&mut self, id: TaskId, status: Status) -> Result<()> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                debug!(id, from = %task.status, to = %status, "change_status: updated");
                task.status = status;
            }
            None => debug!(id, "change_status: no such task"),
        }
        self.persist()
    }

    /// Remove a task; deleting the task under edit also ends the edit
    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        debug!(id, removed = before - self.tasks.len(), "delete_task: called");
        if self.editing == Some(id) {
            debug!(id, "delete_task: clearing edit state of deleted task");
            self.clear_edit();
        }
        self.persist()
    }

    /// Make `id` the edit target; an unknown id gets an empty buffer
    pub fn start_editing(&mut self, id: TaskId) {
        self.edit_buffer = self.task(id).map(EditBuffer::from_task).unwrap_or_default();
        self.editing = Some(id);
        debug!(id, empty = self.edit_buffer.is_empty(), "start_editing: called");
    }

    /// Write a value into the edit buffer; ignored when nothing is being edited.
    ///
    /// Status values must be one of `pending`, `in-progress`, `completed`.
    pub fn edit_field(&mut self, field: Field, value: impl Into<String>) {
        if self.editing.is_none() {
            debug!(?field, "edit_field: no active edit");
            return;
        }
        let value = value.into();
        match field {
            Field::Title => self.edit_buffer.title = Some(value),
            Field::Description => self.edit_buffer.description = Some(value),
            Field::DueDate => self.edit_buffer.due_date = Some(value),
            Field::Status => match value.parse::<Status>() {
                Ok(status) => self.edit_buffer.status = Some(status),
                Err(e) => debug!("edit_field: {}", e),
            },
        }
    }

    /// Merge the edit buffer over the edit target, persist, and end the edit.
    ///
    /// Edited fields are not checked for presence.
    pub fn save_edit(&mut self) -> Result<()> {
        let Some(id) = self.editing else {
            debug!("save_edit: no active edit");
            return Ok(());
        };
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            self.edit_buffer.apply_to(task);
            info!(id, "save_edit: saved");
        }
        self.clear_edit();
        self.persist()
    }

    pub fn cancel_edit(&mut self) {
        debug!(editing = ?self.editing, "cancel_edit: called");
        self.clear_edit();
    }

    fn clear_edit(&mut self) {
        self.editing = None;
        self.edit_buffer = EditBuffer::default();
    }

    /// Tasks matching the status filter, ordered by the sort selection
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let mut visible: Vec<&Task> = self.tasks.iter().filter(|t| self.filter.matches(t)).collect();
        if self.sort != SortOrder::None {
            visible.sort_by(|a, b| compare_due(a, b, self.sort));
        }
        visible
    }
}
