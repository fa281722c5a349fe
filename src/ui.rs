//! Terminal front end
//!
//! Draws the header, the creation form, the filter/sort bar and the task table,
//! and turns key presses into [`TaskManager`] operations. Everything runs on
//! one thread: read a key, apply it, redraw.

use std::io::{self, Stdout};

use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::error::Error;
use crate::storage::TaskStore;
use crate::task::{Field, Status, Task, TaskId};
use crate::task_manager::TaskManager;

const DUE_DATE_LEN: usize = 10;

/// Which part of the screen receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form(Field),
    Table,
    Editing(Field),
}

pub struct App<S: TaskStore> {
    manager: TaskManager<S>,
    focus: Focus,
    table_state: TableState,
    status_line: Option<String>,
    should_quit: bool,
}

impl<S: TaskStore> App<S> {
    pub fn new(manager: TaskManager<S>) -> Self {
        Self {
            manager,
            focus: Focus::Form(Field::Title),
            table_state: TableState::default(),
            status_line: None,
            should_quit: false,
        }
    }

    pub fn manager(&self) -> &TaskManager<S> {
        &self.manager
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Id of the highlighted row in the visible table
    pub fn selected_id(&self) -> Option<TaskId> {
        let index = self.table_state.selected()?;
        self.manager.visible_tasks().get(index).map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.manager.visible_tasks().len();
        let selected = match (len, self.table_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.table_state.select(selected);
    }

    fn select_offset(&mut self, delta: isize) {
        let len = self.manager.visible_tasks().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn report(&mut self, result: crate::Result<()>, done: &str) {
        match result {
            Ok(()) => self.status_line = Some(done.to_string()),
            Err(e) => {
                warn!("Failed to save tasks: {}", e);
                self.status_line = Some(format!("Save failed: {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        debug!(?key, focus = ?self.focus, "handle_key: called");
        match self.focus {
            Focus::Form(field) => self.handle_form_key(field, key),
            Focus::Table => self.handle_table_key(key),
            Focus::Editing(field) => self.handle_edit_key(field, key),
        }
    }

    fn handle_form_key(&mut self, field: Field, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Table;
                self.clamp_selection();
            }
            KeyCode::Tab | KeyCode::Down => self.focus = Focus::Form(field.next()),
            KeyCode::BackTab | KeyCode::Up => self.focus = Focus::Form(field.prev()),
            KeyCode::Enter if inserts_newline(field, &key) => self.manager.form_mut().description.push('\n'),
            KeyCode::Enter => match self.manager.create_task() {
                Ok(id) => {
                    self.status_line = Some("Task created".to_string());
                    self.focus = Focus::Form(Field::Title);
                    self.clamp_selection();
                    debug!(id, "handle_form_key: task created");
                }
                // the form shows the message
                Err(Error::Validation(_)) => self.status_line = None,
                Err(e) => self.report(Err(e), ""),
            },
            KeyCode::Left if field == Field::Status => {
                let form = self.manager.form_mut();
                form.status = form.status.prev();
            }
            KeyCode::Right if field == Field::Status => {
                let form = self.manager.form_mut();
                form.status = form.status.next();
            }
            KeyCode::Backspace => {
                if let Some(text) = self.manager.form_mut().text_mut(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.manager.form_mut().text_mut(field) {
                    if accepts(field, text, c) {
                        text.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('n') => self.focus = Focus::Form(Field::Title),
            KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
            KeyCode::Char('f') => {
                self.manager.set_filter(self.manager.filter().next());
                self.clamp_selection();
            }
            KeyCode::Char('o') => {
                self.manager.set_sort(self.manager.sort().next());
                self.clamp_selection();
            }
            KeyCode::Left => self.step_status(Status::prev),
            KeyCode::Right | KeyCode::Char('s') => self.step_status(Status::next),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.manager.start_editing(id);
                    self.focus = Focus::Editing(Field::Title);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    let result = self.manager.delete_task(id);
                    self.report(result, "Task deleted");
                    self.clamp_selection();
                }
            }
            _ => {}
        }
    }

    fn step_status(&mut self, step: fn(&Status) -> Status) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(current) = self.manager.task(id).map(|t| t.status) else {
            return;
        };
        let result = self.manager.change_status(id, step(&current));
        self.report(result, "Status updated");
        self.clamp_selection();
    }

    fn handle_edit_key(&mut self, field: Field, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.manager.cancel_edit();
                self.focus = Focus::Table;
            }
            KeyCode::Enter if inserts_newline(field, &key) => {
                let text = format!("{}\n", self.manager.edit_buffer().text(field));
                self.manager.edit_field(field, text);
            }
            KeyCode::Enter => {
                let result = self.manager.save_edit();
                self.report(result, "Task saved");
                self.focus = Focus::Table;
                self.clamp_selection();
            }
            KeyCode::Tab => self.focus = Focus::Editing(field.next()),
            KeyCode::BackTab => self.focus = Focus::Editing(field.prev()),
            KeyCode::Left | KeyCode::Right if field == Field::Status => {
                let current = self.manager.edit_buffer().status.unwrap_or_default();
                let status = if key.code == KeyCode::Left { current.prev() } else { current.next() };
                self.manager.edit_field(Field::Status, status.as_str());
            }
            KeyCode::Backspace if field != Field::Status => {
                let mut text = self.manager.edit_buffer().text(field).to_string();
                text.pop();
                self.manager.edit_field(field, text);
            }
            KeyCode::Char(c) if field != Field::Status => {
                let mut text = self.manager.edit_buffer().text(field).to_string();
                if accepts(field, &text, c) {
                    text.push(c);
                    self.manager.edit_field(field, text);
                }
            }
            _ => {}
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(1),
                Constraint::Length(7),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        f.render_widget(header(), chunks[0]);
        self.draw_form(f, chunks[1]);
        self.draw_filters(f, chunks[2]);
        self.draw_table(f, chunks[3]);
        f.render_widget(Paragraph::new(self.footer()), chunks[4]);
    }

    fn draw_form(&self, f: &mut Frame, area: Rect) {
        let form = self.manager.form();
        let mut lines: Vec<Line> = Field::ALL
            .iter()
            .map(|&field| {
                let focused = self.focus == Focus::Form(field);
                let label_style = if focused {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let value = match field {
                    Field::Status => Span::raw(format!("< {} >", form.status.label())),
                    _ if form.text(field).is_empty() => {
                        Span::styled(placeholder(field), Style::default().fg(Color::DarkGray))
                    }
                    _ => Span::styled(one_line(form.text(field)), Style::default().fg(Color::White)),
                };
                Line::from(vec![Span::styled(format!("{:<13}", field.label()), label_style), value])
            })
            .collect();
        if let Some(error) = self.manager.error() {
            lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
        }

        let block = Block::default()
            .title("Create Task")
            .borders(Borders::ALL)
            .border_style(focus_style(matches!(self.focus, Focus::Form(_))));
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_filters(&self, f: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("Status Filter: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.manager.filter().label()),
            Span::raw("   "),
            Span::styled("Sort by Due Date: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.manager.sort().label()),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        let visible = self.manager.visible_tasks();
        let rows: Vec<Row> = if visible.is_empty() {
            vec![Row::new(vec![Cell::from("No tasks available")])]
        } else {
            visible.iter().map(|task| self.task_row(task)).collect()
        };
        let has_rows = !visible.is_empty();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(45),
                Constraint::Length(12),
                Constraint::Length(13),
            ],
        )
        .header(
            Row::new(vec!["Title", "Description", "Due Date", "Status"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title("My Tasks")
                .borders(Borders::ALL)
                .border_style(focus_style(!matches!(self.focus, Focus::Form(_)))),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        if has_rows {
            f.render_stateful_widget(table, area, &mut self.table_state);
        } else {
            f.render_widget(table, area);
        }
    }

    fn task_row(&self, task: &Task) -> Row<'static> {
        if self.manager.editing() != Some(task.id) {
            return Row::new(vec![
                Cell::from(task.title.clone()),
                Cell::from(one_line(&task.description)),
                Cell::from(task.due_date.clone()),
                Cell::from(task.status.label()),
            ]);
        }

        let buffer = self.manager.edit_buffer();
        let cells = Field::ALL.iter().map(|&field| {
            let text = match field {
                Field::Status => buffer.status.unwrap_or_default().label().to_string(),
                _ => one_line(buffer.text(field)),
            };
            let style = if self.focus == Focus::Editing(field) {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Cell::from(text).style(style)
        });
        Row::new(cells.collect::<Vec<_>>())
    }

    fn footer(&self) -> Line<'static> {
        let hints = match self.focus {
            Focus::Form(_) => "Enter create  Alt-Enter newline  Tab next field  ←/→ status  Esc task list  Ctrl-C quit",
            Focus::Table => "↑/↓ select  ←/→ status  e edit  d delete  f filter  o sort  n new  q quit",
            Focus::Editing(_) => "Enter save  Alt-Enter newline  Esc cancel  Tab next field  ←/→ status",
        };
        match &self.status_line {
            Some(status) => Line::from(vec![
                Span::styled(format!("{}  ", status), Style::default().fg(Color::Green)),
                Span::styled(hints, Style::default().fg(Color::DarkGray)),
            ]),
            None => Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        }
    }
}

/// Title bar drawn above the form
fn header() -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![Span::styled(
        " Task Manager ",
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    )]))
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::Title => "Enter task title",
        Field::Description => "Enter task description",
        Field::DueDate => "YYYY-MM-DD",
        Field::Status => "",
    }
}

/// Alt-Enter breaks the line in the multi-line description field
fn inserts_newline(field: Field, key: &KeyEvent) -> bool {
    field == Field::Description && key.modifiers.contains(KeyModifiers::ALT)
}

/// Single-row rendering of possibly multi-line text
fn one_line(text: &str) -> String {
    text.replace('\n', " ⏎ ")
}

/// The due date field only takes date characters, up to `YYYY-MM-DD`
fn accepts(field: Field, current: &str, c: char) -> bool {
    match field {
        Field::DueDate => (c.is_ascii_digit() || c == '-') && current.len() < DUE_DATE_LEN,
        Field::Status => false,
        _ => !c.is_control(),
    }
}

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen
pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leave raw mode and the alternate screen; safe to call more than once
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;
    Ok(())
}

/// Runs its restore function when dropped, including while unwinding from a panic
pub struct TerminalGuard<F: FnMut() -> io::Result<()>> {
    restore: F,
}

impl<F: FnMut() -> io::Result<()>> TerminalGuard<F> {
    pub fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut() -> io::Result<()>> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        if let Err(e) = (self.restore)() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

pub fn run_app<B: Backend, S: TaskStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    while !app.should_quit() {
        terminal.draw(|f| app.draw(f))?;
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}
