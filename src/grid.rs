use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::filter::{self, Filter, SortKey};
use crate::models::{Transaction, COLUMNS};
use crate::tui::{
    self, total_span, AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE, FOCUS_STYLE, FOOTER_STYLE,
    HEADER_STYLE, MESSAGE_STYLE, SELECTED_STYLE,
};

const PAGE_SIZE: usize = 10;

pub enum GridAction {
    Continue,
    /// Delete the selected row: its position in the newest-first ordering
    /// as loaded, and its id.
    Delete { position: usize, id: i64 },
}

pub enum SearchAction {
    Continue,
    Leave,
}

/// The transaction register: full newest-first cache, the filtered and
/// sorted view over it, and the signed total of that view.
pub struct RegisterGrid {
    rows: Vec<Transaction>,
    /// Indices into `rows`, in display order.
    view: Vec<usize>,
    filter: Filter,
    sort: Option<SortKey>,
    total: f64,
    selected: usize,
    offset: usize,
    visible_count: usize,
    search_column: usize,
    confirm_delete: bool,
    table_state: TableState,
}

impl Default for RegisterGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterGrid {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            view: Vec::new(),
            filter: Filter::default(),
            sort: None,
            total: 0.0,
            selected: 0,
            offset: 0,
            visible_count: PAGE_SIZE,
            search_column: 0,
            confirm_delete: false,
            table_state: TableState::default(),
        }
    }

    /// Replace the cache (expected newest first) and recompute the view.
    pub fn set_rows(&mut self, rows: Vec<Transaction>) {
        self.rows = rows;
        self.refresh();
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Rows in display order.
    pub fn visible(&self) -> impl Iterator<Item = &Transaction> {
        self.view.iter().map(|&i| &self.rows[i])
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, idx: usize) {
        self.selected = idx.min(self.view.len().saturating_sub(1));
        self.ensure_visible();
    }

    pub fn selected_row(&self) -> Option<&Transaction> {
        self.view.get(self.selected).map(|&i| &self.rows[i])
    }

    /// Position of the displayed row `view_idx` in the newest-first cache.
    pub fn backing_position(&self, view_idx: usize) -> Option<usize> {
        self.view.get(view_idx).copied()
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm_delete
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn reset_search(&mut self) {
        self.filter.clear();
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.sort = SortKey::cycle(self.sort);
        self.refresh();
    }

    pub fn reverse_sort(&mut self) {
        if let Some(key) = self.sort {
            self.sort = Some(key.reversed());
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.view = filter::apply(&self.rows, &self.filter);
        if let Some(key) = self.sort {
            filter::sort_view(&self.rows, &mut self.view, key);
        }
        self.total = filter::signed_sum(self.visible());
        if self.view.is_empty() {
            self.selected = 0;
            self.offset = 0;
            self.confirm_delete = false;
        } else {
            self.selected = self.selected.min(self.view.len() - 1);
            self.ensure_visible();
        }
    }

    fn ensure_visible(&mut self) {
        let visible = self.visible_count.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> GridAction {
        if self.confirm_delete {
            self.confirm_delete = false;
            if let KeyCode::Char('y') = code {
                if let Some(position) = self.backing_position(self.selected) {
                    let id = self.rows[position].id;
                    return GridAction::Delete { position, id };
                }
            }
            return GridAction::Continue;
        }

        let last = self.view.len().saturating_sub(1);
        match code {
            KeyCode::Down => self.select((self.selected + 1).min(last)),
            KeyCode::Up => self.select(self.selected.saturating_sub(1)),
            KeyCode::PageDown => self.select((self.selected + self.visible_count).min(last)),
            KeyCode::PageUp => self.select(self.selected.saturating_sub(self.visible_count)),
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(last),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('o') => self.reverse_sort(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if !self.view.is_empty() {
                    self.confirm_delete = true;
                }
            }
            _ => {}
        }
        GridAction::Continue
    }

    pub fn handle_search_key(&mut self, code: KeyCode) -> SearchAction {
        match code {
            KeyCode::Esc | KeyCode::Enter => return SearchAction::Leave,
            KeyCode::Tab | KeyCode::Right => {
                self.search_column = (self.search_column + 1) % COLUMNS.len();
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.search_column = if self.search_column == 0 {
                    COLUMNS.len() - 1
                } else {
                    self.search_column - 1
                };
            }
            KeyCode::Char(c) => {
                self.filter.push_char(self.search_column, c);
                self.refresh();
            }
            KeyCode::Backspace => {
                self.filter.pop_char(self.search_column);
                self.refresh();
            }
            KeyCode::Delete => {
                self.filter.set_term(self.search_column, "");
                self.refresh();
            }
            _ => {}
        }
        SearchAction::Continue
    }

    pub fn draw_search(&self, frame: &mut Frame, area: Rect, has_focus: bool) {
        let boxes = Layout::horizontal([Constraint::Fill(1); COLUMNS.len()]).split(area);
        for (col, name) in COLUMNS.iter().enumerate() {
            let term = self.filter.term(col);
            let is_focused = has_focus && col == self.search_column;
            let width = boxes[col].width as usize;
            let line = if is_focused {
                Line::from(vec![
                    Span::styled(format!(" {name}:"), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("{term}_"), FOCUS_STYLE),
                ])
            } else if term.is_empty() {
                Line::from(Span::styled(
                    tui::truncate(&format!(" search {name}"), width),
                    FOOTER_STYLE,
                ))
            } else {
                Line::from(tui::truncate(&format!(" {name}:{term}"), width))
            };
            frame.render_widget(Paragraph::new(line), boxes[col]);
        }
    }

    pub fn draw_table(&mut self, frame: &mut Frame, area: Rect, has_focus: bool) {
        let [status_area, table_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        // header row + bottom margin
        self.visible_count = (table_area.height.saturating_sub(2) as usize).max(1);
        self.ensure_visible();

        let header_cells: Vec<Cell> = COLUMNS
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let marker = match self.sort {
                    Some(key) if key.column == col && key.descending => " \u{25bc}",
                    Some(key) if key.column == col => " \u{25b2}",
                    _ => "",
                };
                Cell::from(format!("{name}{marker}"))
            })
            .collect();

        let rows: Vec<Row> = self
            .view
            .iter()
            .skip(self.offset)
            .take(self.visible_count)
            .map(|&i| {
                let txn = &self.rows[i];
                let value_style = match txn.amount() {
                    Some(_) if txn.is_credit() => AMOUNT_POS_STYLE,
                    Some(_) => AMOUNT_NEG_STYLE,
                    None => FOOTER_STYLE,
                };
                let cells: Vec<Cell> = (0..COLUMNS.len())
                    .map(|col| {
                        let cell = Cell::from(txn.column(col).to_string());
                        if col == crate::models::VALUE_COL {
                            cell.style(value_style)
                        } else {
                            cell
                        }
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ];

        let selection = if self.view.is_empty() {
            None
        } else {
            Some(self.selected - self.offset)
        };
        self.table_state.select(selection);
        let highlight = if has_focus {
            SELECTED_STYLE
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let table = Table::new(rows, widths)
            .header(Row::new(header_cells).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(highlight);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        let mut status = vec![total_span(self.total)];
        if self.confirm_delete {
            status.push(Span::styled("  Delete selected row? (y/n)", MESSAGE_STYLE));
        } else {
            let shown = if self.view.is_empty() {
                "No rows".to_string()
            } else {
                let end = (self.offset + self.visible_count).min(self.view.len());
                format!("Rows {}-{} of {}", self.offset + 1, end, self.view.len())
            };
            let filtered = if self.filter.is_empty() {
                String::new()
            } else {
                format!(" (filtered from {})", self.rows.len())
            };
            status.push(Span::styled(format!("  {shown}{filtered}"), FOOTER_STYLE));
        }
        let mut line = vec![Span::raw(" ")];
        line.extend(status);
        frame.render_widget(Paragraph::new(Line::from(line)), status_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, value: &str, kind: &str, supplier: &str) -> Transaction {
        Transaction {
            id,
            date: "2024-05-01".into(),
            value: value.into(),
            kind: kind.into(),
            supplier: supplier.into(),
            funds: "Cash".into(),
            category: "Leisure".into(),
            subcategory: "Hobbies".into(),
            subsubcategory: "N/A".into(),
        }
    }

    fn grid() -> RegisterGrid {
        let mut grid = RegisterGrid::new();
        grid.set_rows(vec![
            row(4, "100.00", "Credit", "Employer"),
            row(3, "40.00", "Debit", "Pingo Doce"),
            row(2, "10.00", "Debit", "Metro"),
            row(1, "5.00", "Debit", "Pingo Doce"),
        ]);
        grid
    }

    fn type_search(grid: &mut RegisterGrid, text: &str) {
        for c in text.chars() {
            grid.handle_search_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_unfiltered_view_is_full_set() {
        let g = grid();
        assert_eq!(g.view_len(), 4);
        assert_eq!(g.total(), 45.0);
        assert_eq!(g.total(), filter::signed_sum(g.rows()));
    }

    #[test]
    fn test_search_typing_filters_and_resums() {
        let mut g = grid();
        for _ in 0..3 {
            g.handle_search_key(KeyCode::Tab);
        }
        type_search(&mut g, "pingo");
        assert_eq!(g.view_len(), 2);
        assert_eq!(g.total(), -45.0);
        g.handle_search_key(KeyCode::Backspace);
        assert_eq!(g.filter().term(3), "ping");
        g.reset_search();
        assert_eq!(g.view_len(), 4);
    }

    #[test]
    fn test_backing_position_follows_filter() {
        let mut g = grid();
        let mut f = Filter::default();
        f.set_term(3, "metro");
        g.set_filter(f);
        assert_eq!(g.view_len(), 1);
        assert_eq!(g.backing_position(0), Some(2));
    }

    #[test]
    fn test_backing_position_follows_sort() {
        let mut g = grid();
        g.cycle_sort(); // date
        g.cycle_sort(); // value, ascending
        assert_eq!(g.selected_row().map(|r| r.id), Some(1));
        assert_eq!(g.backing_position(0), Some(3));
        g.reverse_sort();
        assert_eq!(g.backing_position(0), Some(0));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut g = grid();
        g.handle_key(KeyCode::Down);
        assert!(matches!(g.handle_key(KeyCode::Char('x')), GridAction::Continue));
        assert!(g.is_confirming());
        assert!(matches!(
            g.handle_key(KeyCode::Char('y')),
            GridAction::Delete { position: 1, id: 3 }
        ));
        assert!(!g.is_confirming());

        g.handle_key(KeyCode::Char('x'));
        assert!(matches!(g.handle_key(KeyCode::Char('n')), GridAction::Continue));
        assert!(!g.is_confirming());
    }

    #[test]
    fn test_no_delete_on_empty_view() {
        let mut g = RegisterGrid::new();
        g.handle_key(KeyCode::Char('x'));
        assert!(!g.is_confirming());
    }

    #[test]
    fn test_selection_clamped_after_shrink() {
        let mut g = grid();
        g.handle_key(KeyCode::End);
        assert_eq!(g.selected(), 3);
        g.set_rows(vec![row(9, "1", "Debit", "x")]);
        assert_eq!(g.selected(), 0);
    }
}
