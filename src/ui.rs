use agroflow::dashboard::{self, DashboardSummary};
use agroflow::schema::describe;
use agroflow::{
    Animal, AnimalStatus, CollectionKind, EntryType, FarmError, FarmStore, NewAnimal,
    NewFinancialEntry, NewHealthRecord, NewLaborRecord, ValidationError,
};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Animals,
    Health,
    Finance,
    Labor,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::Animals,
        Page::Health,
        Page::Finance,
        Page::Labor,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Animals,
            Page::Animals => Page::Health,
            Page::Health => Page::Finance,
            Page::Finance => Page::Labor,
            Page::Labor => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Labor,
            Page::Animals => Page::Dashboard,
            Page::Health => Page::Animals,
            Page::Finance => Page::Health,
            Page::Labor => Page::Finance,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Animals => "Animals",
            Page::Health => "Health",
            Page::Finance => "Finance",
            Page::Labor => "Labor",
        }
    }

    /// Collection shown on this page; the dashboard has none.
    pub fn collection(&self) -> Option<CollectionKind> {
        match self {
            Page::Dashboard => None,
            Page::Animals => Some(CollectionKind::Animals),
            Page::Health => Some(CollectionKind::HealthRecords),
            Page::Finance => Some(CollectionKind::Finances),
            Page::Labor => Some(CollectionKind::Labor),
        }
    }
}

// ============================================================================
// ADD FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Shown next to the field, e.g. accepted values
    pub hint: &'static str,
}

impl FormField {
    fn new(label: &'static str, hint: &'static str) -> Self {
        FormField {
            label,
            value: String::new(),
            hint,
        }
    }

    fn prefilled(label: &'static str, hint: &'static str, value: &str) -> Self {
        FormField {
            value: value.to_string(),
            ..FormField::new(label, hint)
        }
    }
}

/// Text input for one new record. Values stay as typed until submit, where
/// they are parsed into the page's draft type.
#[derive(Debug, Clone, PartialEq)]
pub struct AddForm {
    pub page: Page,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

const DATE_HINT: &str = "YYYY-MM-DD, blank = today";

impl AddForm {
    pub fn for_page(page: Page) -> Option<Self> {
        let fields = match page {
            Page::Dashboard => return None,
            Page::Animals => vec![
                FormField::new("Name", ""),
                FormField::new("Species", "Cow, Goat, ..."),
                FormField::prefilled("Status", "Healthy|Sick|Recovering|Sold", "Healthy"),
                FormField::new("Entry date", DATE_HINT),
            ],
            Page::Health => vec![
                FormField::new("Animal", "name or id"),
                FormField::new("Symptoms", ""),
                FormField::new("Treatment", "optional"),
                FormField::new("Cost", ""),
                FormField::new("Date", DATE_HINT),
            ],
            Page::Finance => vec![
                FormField::prefilled("Type", "INCOME|EXPENSE", "EXPENSE"),
                FormField::new("Category", "Feed, Milk sales, ..."),
                FormField::new("Amount", ""),
                FormField::new("Description", "optional"),
                FormField::new("Date", DATE_HINT),
            ],
            Page::Labor => vec![
                FormField::new("Worker", ""),
                FormField::new("Task", ""),
                FormField::new("Hours", ""),
                FormField::new("Rate/h", "wage per hour"),
                FormField::new("Date", DATE_HINT),
            ],
        };

        Some(AddForm {
            page,
            fields,
            focus: 0,
        })
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push(&mut self, c: char) {
        self.fields[self.focus].value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].value.pop();
    }

    fn value(&self, index: usize) -> &str {
        self.fields[index].value.trim()
    }

    fn animal_draft(&self) -> agroflow::Result<NewAnimal> {
        let mut errors = Vec::new();
        let status = parse_enum::<AnimalStatus>(&mut errors, "Animal", "status", self.value(2));
        let entry_date = parse_date(&mut errors, "Animal", "entryDate", self.value(3));
        finish(errors)?;

        let mut draft = NewAnimal::new(self.value(0), self.value(1)).with_status(status.unwrap_or_default());
        draft.entry_date = entry_date;
        Ok(draft)
    }

    /// The animal field accepts an id or a name; unknown values are kept as
    /// typed since the link is advisory.
    fn health_draft(&self, animals: &[Animal]) -> agroflow::Result<NewHealthRecord> {
        let mut errors = Vec::new();
        let cost = parse_number(&mut errors, "HealthRecord", "cost", self.value(3));
        let date = parse_date(&mut errors, "HealthRecord", "date", self.value(4));
        finish(errors)?;

        let typed = self.value(0);
        let animal_id = animals
            .iter()
            .find(|a| a.id == typed)
            .or_else(|| animals.iter().find(|a| a.name.eq_ignore_ascii_case(typed)))
            .map(|a| a.id.as_str())
            .unwrap_or(typed);

        let mut draft = NewHealthRecord::new(animal_id, self.value(1), cost).with_treatment(self.value(2));
        draft.date = date;
        Ok(draft)
    }

    fn finance_draft(&self) -> agroflow::Result<NewFinancialEntry> {
        let mut errors = Vec::new();
        let entry_type = parse_enum::<EntryType>(&mut errors, "FinancialEntry", "type", self.value(0));
        let amount = parse_number(&mut errors, "FinancialEntry", "amount", self.value(2));
        let date = parse_date(&mut errors, "FinancialEntry", "date", self.value(4));
        finish(errors)?;

        let entry_type = entry_type.unwrap_or(EntryType::Expense);
        let mut draft = NewFinancialEntry::new(entry_type, self.value(1), amount).with_description(self.value(3));
        draft.date = date;
        Ok(draft)
    }

    fn labor_draft(&self) -> agroflow::Result<NewLaborRecord> {
        let mut errors = Vec::new();
        let hours = parse_number(&mut errors, "LaborRecord", "hours", self.value(2));
        let wage = parse_number(&mut errors, "LaborRecord", "wage", self.value(3));
        let date = parse_date(&mut errors, "LaborRecord", "date", self.value(4));
        finish(errors)?;

        let mut draft = NewLaborRecord::new(self.value(0), self.value(1), hours, wage);
        draft.date = date;
        Ok(draft)
    }
}

fn finish(errors: Vec<ValidationError>) -> agroflow::Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FarmError::Validation(errors))
    }
}

fn parse_number(errors: &mut Vec<ValidationError>, context: &str, field: &str, raw: &str) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            errors.push(ValidationError::new(context, field, format!("Not a number: '{}'", raw)));
            0.0
        }
    }
}

fn parse_date(errors: &mut Vec<ValidationError>, context: &str, field: &str, raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(ValidationError::new(context, field, format!("Not a date (YYYY-MM-DD): '{}'", raw)));
            None
        }
    }
}

fn parse_enum<T>(errors: &mut Vec<ValidationError>, context: &str, field: &str, raw: &str) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(ValidationError::new(context, field, message));
            None
        }
    }
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub store: FarmStore,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    /// Id awaiting a `y` to confirm deletion
    pub pending_delete: Option<String>,
    /// Open add form, if any; it captures all keys while open
    pub form: Option<AddForm>,
    pub message: Option<String>,
}

impl App {
    pub fn new(store: FarmStore) -> Self {
        Self {
            store,
            state: TableState::default(),
            current_page: Page::Dashboard,
            show_detail: false,
            pending_delete: None,
            form: None,
            message: None,
        }
    }

    pub fn row_count(&self) -> usize {
        let data = self.store.data();
        match self.current_page {
            Page::Dashboard => 0,
            Page::Animals => data.animals.len(),
            Page::Health => data.health_records.len(),
            Page::Finance => data.finances.len(),
            Page::Labor => data.labor.len(),
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        let i = self.state.selected()?;
        let data = self.store.data();
        match self.current_page {
            Page::Dashboard => None,
            Page::Animals => data.animals.get(i).map(|a| a.id.clone()),
            Page::Health => data.health_records.get(i).map(|h| h.id.clone()),
            Page::Finance => data.finances.get(i).map(|f| f.id.clone()),
            Page::Labor => data.labor.get(i).map(|l| l.id.clone()),
        }
    }

    fn go_to(&mut self, page: Page) {
        self.current_page = page;
        self.pending_delete = None;
        self.form = None;
        self.show_detail = false;
        self.reset_selection();
    }

    pub fn next_page(&mut self) {
        self.go_to(self.current_page.next());
    }

    pub fn previous_page(&mut self) {
        self.go_to(self.current_page.previous());
    }

    /// Keep the selection inside the table after the row count changed.
    fn reset_selection(&mut self) {
        let len = self.row_count();
        let selected = match (self.state.selected(), len) {
            (_, 0) => None,
            (Some(i), len) if i < len => Some(i),
            (Some(_), len) => Some(len - 1),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }

    fn reset_selection_to(&mut self, i: usize) {
        if self.row_count() > 0 {
            self.state.select(Some(i));
        }
    }

    pub fn toggle_detail(&mut self) {
        if self.current_page == Page::Animals {
            self.show_detail = !self.show_detail;
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_id() {
            self.message = Some("Delete selected record? (y/n)".to_string());
            self.pending_delete = Some(id);
        }
    }

    pub fn confirm_delete(&mut self) {
        let (Some(id), Some(kind)) = (self.pending_delete.take(), self.current_page.collection()) else {
            return;
        };

        self.message = Some(match self.store.delete_in(kind, &id) {
            Ok(true) => "Record deleted".to_string(),
            Ok(false) => "Record was already gone".to_string(),
            Err(e) => format!("Delete failed: {}", e),
        });
        self.reset_selection();
    }

    pub fn open_form(&mut self) {
        self.form = AddForm::for_page(self.current_page);
        if self.form.is_some() {
            self.pending_delete = None;
            self.show_detail = false;
            self.message = None;
        }
    }

    pub fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.cancel_form(),
            KeyCode::Enter => self.submit_form(),
            _ => {
                let Some(form) = self.form.as_mut() else {
                    return;
                };
                match code {
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                    KeyCode::Backspace => form.backspace(),
                    KeyCode::Char(c) => form.push(c),
                    _ => {}
                }
            }
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.message = None;
    }

    /// Parse and add the form's record. On success the form closes and the
    /// new row is selected; on rejection the form stays open with the
    /// failing fields in the status bar.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };

        let result = match form.page {
            Page::Dashboard => return,
            Page::Animals => form.animal_draft().and_then(|draft| self.store.add(draft)),
            Page::Health => form
                .health_draft(self.store.animals())
                .and_then(|draft| self.store.add(draft)),
            Page::Finance => form.finance_draft().and_then(|draft| self.store.add(draft)),
            Page::Labor => form.labor_draft().and_then(|draft| self.store.add(draft)),
        };

        match result {
            Ok(_) => {
                self.form = None;
                self.message = Some("Record added".to_string());
                let len = self.row_count();
                if len > 0 {
                    self.reset_selection_to(len - 1);
                }
            }
            Err(FarmError::Validation(errors)) => {
                self.message = Some(format!("Rejected: {}", describe(&errors)));
            }
            Err(e) => {
                self.message = Some(format!("Save failed: {}", e));
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.message = None;
        }
    }

    /// Advance the selected animal to the next status.
    pub fn cycle_status(&mut self) {
        if self.current_page != Page::Animals {
            return;
        }
        let Some(animal) = self.state.selected().and_then(|i| self.store.animals().get(i)) else {
            return;
        };

        let id = animal.id.clone();
        let status = animal.status.next();
        self.message = Some(match self.store.set_animal_status(&id, status) {
            Ok(_) => format!("Status set to {}", status),
            Err(e) => format!("Status change failed: {}", e),
        });
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn summary(&self) -> DashboardSummary {
        dashboard::summarize(self.store.data())
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.form.is_some() {
                app.handle_form_key(key.code);
                continue;
            }

            if app.pending_delete.is_some() {
                match key.code {
                    KeyCode::Char('y') => app.confirm_delete(),
                    _ => app.cancel_delete(),
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    app.go_to(Page::ALL[index]);
                }
                KeyCode::Char('a') => app.open_form(),
                KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                KeyCode::Char('s') => app.cycle_status(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.reset_selection_to(0),
                KeyCode::End => {
                    let len = app.row_count();
                    if len > 0 {
                        app.reset_selection_to(len - 1);
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if let Some(form) = app.form.clone() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_page(f, content_chunks[0], app);
        render_form(f, content_chunks[1], &form);
    } else if app.show_detail && app.current_page == Page::Animals {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_animals(f, content_chunks[0], app);
        render_animal_detail(f, content_chunks[1], app);
    } else {
        render_page(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_page(f: &mut Frame, area: Rect, app: &mut App) {
    match app.current_page {
        Page::Dashboard => render_dashboard(f, area, app),
        Page::Animals => render_animals(f, area, app),
        Page::Health => render_health(f, area, app),
        Page::Finance => render_finance(f, area, app),
        Page::Labor => render_labor(f, area, app),
    }
}

fn render_form(f: &mut Frame, area: Rect, form: &AddForm) {
    let mut lines = vec![Line::from("")];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };

        lines.push(Line::from(vec![
            Span::raw(if focused { "→ " } else { "  " }),
            Span::styled(format!("{:<12}", field.label), label_style),
            Span::raw(format!("{}{}", field.value, cursor)),
        ]));
        if !field.hint.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {:<12}{}", "", field.hint),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let title = format!(" New {} ", form.page.title());
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );
    f.render_widget(panel, area);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();

    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Animals: {}", summary.total_animals),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Balance: {:.2}", summary.balance),
        Style::default().fg(money_color(summary.balance)),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_rows<'a>(
    f: &mut Frame,
    area: Rect,
    state: &mut TableState,
    title: &'a str,
    header: Row<'a>,
    rows: Vec<Row<'a>>,
    widths: &[Constraint],
) {
    let table = Table::new(rows, widths.to_vec())
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn status_color(status: AnimalStatus) -> Color {
    match status {
        AnimalStatus::Healthy => Color::Green,
        AnimalStatus::Sick => Color::Red,
        AnimalStatus::Recovering => Color::Yellow,
        AnimalStatus::Sold => Color::DarkGray,
    }
}

fn money_color(value: f64) -> Color {
    if value < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn render_animals(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app
        .store
        .animals()
        .iter()
        .map(|animal| {
            Row::new(vec![
                Cell::from(truncate(&animal.name, 24)),
                Cell::from(truncate(&animal.species, 16)),
                Cell::from(animal.status.as_str())
                    .style(Style::default().fg(status_color(animal.status))),
                Cell::from(animal.entry_date.to_string()),
            ])
        })
        .collect();

    render_rows(
        f,
        area,
        &mut app.state,
        " Animal Inventory ",
        header_row(&["Name", "Species", "Status", "Entry Date"]),
        rows,
        &[
            Constraint::Length(26),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    );
}

fn render_health(f: &mut Frame, area: Rect, app: &mut App) {
    let data = app.store.data();
    let rows = data
        .health_records
        .iter()
        .map(|record| {
            let animal = data
                .find_animal(&record.animal_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "(removed)".to_string());
            Row::new(vec![
                Cell::from(record.date.to_string()),
                Cell::from(truncate(&animal, 18)),
                Cell::from(truncate(&record.symptoms, 24)),
                Cell::from(truncate(&record.treatment, 24)),
                Cell::from(format!("{:.2}", record.cost)).style(Style::default().fg(Color::Red)),
            ])
        })
        .collect();

    render_rows(
        f,
        area,
        &mut app.state,
        " Health Records ",
        header_row(&["Date", "Animal", "Symptoms", "Treatment", "Cost"]),
        rows,
        &[
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Length(26),
            Constraint::Length(26),
            Constraint::Length(12),
        ],
    );
}

fn render_finance(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app
        .store
        .finances()
        .iter()
        .map(|entry| {
            let color = match entry.entry_type {
                EntryType::Income => Color::Green,
                EntryType::Expense => Color::Red,
            };
            Row::new(vec![
                Cell::from(entry.date.to_string()),
                Cell::from(entry.entry_type.as_str()).style(Style::default().fg(color)),
                Cell::from(truncate(&entry.category, 18)),
                Cell::from(format!("{:.2}", entry.signed_amount())).style(Style::default().fg(color)),
                Cell::from(truncate(&entry.description, 30)),
            ])
        })
        .collect();

    render_rows(
        f,
        area,
        &mut app.state,
        " Financial Ledger ",
        header_row(&["Date", "Type", "Category", "Amount", "Description"]),
        rows,
        &[
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Length(32),
        ],
    );
}

fn render_labor(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app
        .store
        .labor()
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(record.date.to_string()),
                Cell::from(truncate(&record.worker_name, 20)),
                Cell::from(truncate(&record.task, 22)),
                Cell::from(format!("{:.1}", record.hours)),
                Cell::from(format!("{:.2}", record.wage)),
                Cell::from(format!("{:.2}", record.cost())).style(Style::default().fg(Color::Red)),
            ])
        })
        .collect();

    render_rows(
        f,
        area,
        &mut app.state,
        " Labor ",
        header_row(&["Date", "Worker", "Task", "Hours", "Rate/h", "Cost"]),
        rows,
        &[
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    );
}

fn metric_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<24}", label)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut herd = vec![
        Line::from(""),
        metric_line("Total animals", summary.total_animals.to_string(), Color::White),
        Line::from(""),
    ];
    for status in AnimalStatus::ALL {
        herd.push(metric_line(
            status.as_str(),
            summary.status_counts.get(status).to_string(),
            status_color(status),
        ));
    }
    herd.push(Line::from(""));
    herd.push(metric_line(
        "Health records",
        summary.health_record_count.to_string(),
        Color::White,
    ));
    herd.push(metric_line(
        "Health spend",
        format!("{:.2}", summary.health_spend),
        Color::Red,
    ));
    if summary.orphaned_health_records > 0 {
        herd.push(metric_line(
            "  for removed animals",
            summary.orphaned_health_records.to_string(),
            Color::DarkGray,
        ));
    }

    let mut money = vec![
        Line::from(""),
        metric_line("Income", format!("{:.2}", summary.total_income), Color::Green),
        metric_line("Expense", format!("{:.2}", summary.total_expense), Color::Red),
        metric_line("Balance", format!("{:.2}", summary.balance), money_color(summary.balance)),
        Line::from(""),
        metric_line("Labor hours", format!("{:.1}", summary.labor_hours), Color::White),
        metric_line("Labor cost", format!("{:.2}", summary.labor_cost), Color::Red),
    ];
    if !summary.expenses_by_category.is_empty() {
        money.push(Line::from(""));
        money.push(Line::from(Span::styled(
            "  Expenses by category",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for category in &summary.expenses_by_category {
            money.push(metric_line(
                &truncate(&category.category, 22),
                format!("{:.2} ({})", category.total, category.count),
                Color::White,
            ));
        }
    }

    let block = |title: &'static str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title)
    };

    f.render_widget(Paragraph::new(herd).block(block(" Herd & Health ")), columns[0]);
    f.render_widget(Paragraph::new(money).block(block(" Money & Labor ")), columns[1]);
}

fn render_animal_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(animal) = app.state.selected().and_then(|i| app.store.animals().get(i)) else {
        let empty = Paragraph::new("No animal selected")
            .block(Block::default().borders(Borders::ALL).title(" Detail "));
        f.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            animal.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Species:    {}", animal.species)),
        Line::from(vec![
            Span::raw("Status:     "),
            Span::styled(animal.status.as_str(), Style::default().fg(status_color(animal.status))),
        ]),
        Line::from(format!("Entry date: {}", animal.entry_date)),
        Line::from(format!("Id:         {}", animal.id)),
        Line::from(""),
        Line::from(Span::styled(
            "Health history",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];

    let history = app.store.health_records_for(&animal.id);
    if history.is_empty() {
        lines.push(Line::from("  (none)"));
    }
    let mut total = 0.0;
    for record in &history {
        total += record.cost;
        lines.push(Line::from(format!(
            "  {}  {}  {:.2}",
            record.date,
            truncate(&record.symptoms, 20),
            record.cost
        )));
    }
    if !history.is_empty() {
        lines.push(Line::from(format!("  Total: {:.2}", total)));
    }

    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Detail "),
    );
    f.render_widget(detail, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.current_page != Page::Dashboard {
        let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected, app.row_count()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw(" | "));
    }

    if let Some(message) = &app.message {
        let color = if message.starts_with("Rejected") || message.contains("failed") {
            Color::Red
        } else {
            Color::Green
        };
        status_spans.push(Span::styled(message.clone(), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    if app.form.is_some() {
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Save | "));
        status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Next field | "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Cancel"));

        let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );
        f.render_widget(status_bar, area);
        return;
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    if app.current_page != Page::Dashboard {
        status_spans.push(Span::styled("a", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Add | "));
    }
    status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Delete | "));
    if app.current_page == Page::Animals {
        status_spans.push(Span::styled("s", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Status | "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Details | "));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Truncate on character boundaries; names are often non-ASCII.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
