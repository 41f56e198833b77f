use std::path::Path;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rusqlite::Connection;

use crate::chart::{ChartWidget, LegendState, MonthlyChart};
use crate::db;
use crate::error::{BudgetError, Result};
use crate::form::{EntryForm, FormAction};
use crate::grid::{GridAction, RegisterGrid, SearchAction};
use crate::ledger;
use crate::taxonomy::Taxonomy;
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, MESSAGE_STYLE};

const TITLE: &str = " Budget: income and expenses";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Search,
    Grid,
    Chart,
}

/// The whole interactive session: connection, form, row cache, filter,
/// chart and legend state. Nothing here outlives the process.
pub struct Dashboard {
    conn: Option<Connection>,
    db_error: Option<String>,
    form: EntryForm,
    grid: RegisterGrid,
    chart: MonthlyChart,
    legend: LegendState,
    chart_scroll: usize,
    chart_visible: usize,
    focus: Focus,
    message: Option<String>,
}

impl Dashboard {
    pub fn new(conn: Option<Connection>) -> Self {
        let mut dashboard = Self {
            conn,
            db_error: None,
            form: EntryForm::new(Taxonomy::default()),
            grid: RegisterGrid::new(),
            chart: MonthlyChart::default(),
            legend: LegendState::default(),
            chart_scroll: 0,
            chart_visible: 1,
            focus: Focus::Form,
            message: None,
        };
        dashboard.load_data();
        dashboard
    }

    /// Open the database at `db_path`; on failure the session still starts
    /// and shows the error until it ends.
    pub fn open(db_path: &Path) -> Self {
        match db::open(db_path) {
            Ok(conn) => Self::new(Some(conn)),
            Err(e) => {
                tracing::error!("database connection failed: {e}");
                let mut dashboard = Self::new(None);
                dashboard.db_error = Some(format!("Database unavailable: {e}"));
                dashboard
            }
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn legend(&self) -> LegendState {
        self.legend
    }

    pub fn grid(&self) -> &RegisterGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut RegisterGrid {
        &mut self.grid
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    pub fn chart(&self) -> &MonthlyChart {
        &self.chart
    }

    /// Reload the full row set, then refilter and re-aggregate.
    pub fn load_data(&mut self) {
        let Some(conn) = &self.conn else {
            self.message = Some(BudgetError::NoConnection.to_string());
            return;
        };
        match ledger::fetch_all(conn) {
            Ok(rows) => {
                self.chart = MonthlyChart::from_rows(&rows);
                self.grid.set_rows(rows);
                self.chart_scroll = self.chart_scroll.min(self.last_chart_start());
            }
            Err(e) => {
                tracing::error!("failed to load transactions: {e}");
                self.message = Some(format!("Error loading data: {e}"));
            }
        }
    }

    pub fn submit(&mut self) {
        let Some(conn) = &self.conn else {
            self.message = Some(BudgetError::NoConnection.to_string());
            return;
        };
        let txn = match self.form.build() {
            Ok(txn) => txn,
            Err(e) => {
                tracing::debug!("submit rejected: {e}");
                self.message = Some("Invalid value".to_string());
                return;
            }
        };
        match ledger::insert(conn, &txn) {
            Ok(_) => {
                self.message = Some("Transaction submitted.".to_string());
                self.form.clear_inputs();
                self.load_data();
            }
            Err(e) => {
                tracing::error!("insert failed: {e}");
                self.message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Delete the selected row, which was at `position` of the newest-first
    /// ordering with id `id` when the register was loaded. If the table has
    /// changed underneath, nothing is deleted and the register is reloaded.
    pub fn delete_at(&mut self, position: usize, id: i64) {
        let Some(conn) = &self.conn else {
            self.message = Some(BudgetError::NoConnection.to_string());
            return;
        };
        let current = match ledger::id_at_position(conn, position) {
            Ok(current) => current,
            Err(e) => {
                tracing::error!("delete lookup failed: {e}");
                self.message = Some(format!("Error: {e}"));
                return;
            }
        };
        if current != Some(id) {
            tracing::warn!(position, id, ?current, "register out of date, delete refused");
            self.message = Some("Register changed, reloaded. Nothing deleted.".to_string());
            self.load_data();
            return;
        }
        match ledger::delete_by_id(conn, id) {
            Ok(true) => {
                self.message = Some("Row deleted.".to_string());
                self.load_data();
            }
            Ok(false) => {
                self.message = Some("That row no longer exists.".to_string());
                self.load_data();
            }
            Err(e) => {
                tracing::error!("delete failed: {e}");
                self.message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn toggle_legend(&mut self) {
        self.legend = self.legend.toggled();
    }

    /// First month index that still fills the visible chart width.
    fn last_chart_start(&self) -> usize {
        self.chart.months.len().saturating_sub(self.chart_visible)
    }

    fn scroll_chart(&mut self, forward: bool) {
        self.chart_scroll = if forward {
            (self.chart_scroll + 1).min(self.last_chart_start())
        } else {
            self.chart_scroll.saturating_sub(1)
        };
    }

    /// Returns true when the session should end.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.form.prompt_target().is_none() {
            let jump = match code {
                KeyCode::F(1) => Some(Focus::Form),
                KeyCode::F(2) => Some(Focus::Search),
                KeyCode::F(3) => Some(Focus::Grid),
                KeyCode::F(4) => Some(Focus::Chart),
                _ => None,
            };
            if let Some(focus) = jump {
                self.focus = focus;
                return false;
            }
        }

        match self.focus {
            Focus::Form => {
                self.message = None;
                match self.form.handle_key(code) {
                    FormAction::Submit => self.submit(),
                    FormAction::Leave => self.focus = Focus::Grid,
                    FormAction::Continue => {}
                }
            }
            Focus::Search => {
                if let SearchAction::Leave = self.grid.handle_search_key(code) {
                    self.focus = Focus::Grid;
                }
            }
            Focus::Grid | Focus::Chart => {
                if self.grid.is_confirming() {
                    if let GridAction::Delete { position, id } = self.grid.handle_key(code) {
                        self.delete_at(position, id);
                    }
                    return false;
                }
                self.message = None;
                match code {
                    KeyCode::Char('q') => return true,
                    KeyCode::Char('a') => self.focus = Focus::Form,
                    KeyCode::Char('/') => self.focus = Focus::Search,
                    KeyCode::Char('R') => self.grid.reset_search(),
                    KeyCode::Char('r') => self.load_data(),
                    KeyCode::Tab => {
                        self.focus = if self.focus == Focus::Grid {
                            Focus::Chart
                        } else {
                            Focus::Grid
                        };
                    }
                    _ if self.focus == Focus::Chart => match code {
                        KeyCode::Char('l') => self.toggle_legend(),
                        KeyCode::Left => self.scroll_chart(false),
                        KeyCode::Right => self.scroll_chart(true),
                        KeyCode::Esc => self.focus = Focus::Grid,
                        _ => {}
                    },
                    _ => {
                        if let GridAction::Delete { position, id } = self.grid.handle_key(code) {
                            self.delete_at(position, id);
                        }
                    }
                }
            }
        }
        false
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, form_area, sep2, search_area, grid_area, sep3, chart_area, message_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(Paragraph::new(TITLE).style(HEADER_STYLE), header_area);

        let sep_line = "\u{2501}".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget, sep3);

        self.form.draw(frame, form_area, self.focus == Focus::Form);
        self.grid
            .draw_search(frame, search_area, self.focus == Focus::Search);
        self.grid
            .draw_table(frame, grid_area, self.focus == Focus::Grid);

        self.chart_visible = ChartWidget::months_that_fit(&self.chart, chart_area.width).max(1);
        self.chart_scroll = self.chart_scroll.min(self.last_chart_start());
        frame.render_widget(
            ChartWidget::new(&self.chart, self.legend, self.chart_scroll),
            chart_area,
        );

        // the database error outlives per-action messages
        let message = self.db_error.as_deref().or(self.message.as_deref());
        if let Some(msg) = message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(MESSAGE_STYLE),
                message_area,
            );
        }

        let hints = match self.focus {
            Focus::Form => " Tab=next field  \u{2190}/\u{2192}=choose  Enter=submit  Esc=register  F1-F4=panes",
            Focus::Search => " Tab=next column  type to filter  Del=clear column  Esc=register",
            Focus::Grid => " \u{2191}/\u{2193}=select  x=delete  s=sort  o=order  /=search  R=reset  a=add  Tab=chart  q=quit",
            Focus::Chart => " l=toggle legend  \u{2190}/\u{2192}=scroll months  Tab=register  a=add  q=quit",
        };
        let scroll_hint = if self.focus == Focus::Chart
            && self.chart.content_width() > chart_area.width
        {
            "  (more months off-screen)"
        } else {
            ""
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(hints, FOOTER_STYLE),
                Span::styled(scroll_hint, FOOTER_STYLE),
            ])),
            hints_area,
        );
    }
}

pub fn run(db_path: &Path) -> Result<()> {
    let mut dashboard = Dashboard::open(db_path);
    tracing::info!("session started");

    tui::install_panic_hook();
    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                if dashboard.handle_key(key.code) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    tracing::info!("session ended");
    result
}
