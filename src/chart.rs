use std::collections::BTreeMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::fmt::compact;
use crate::models::Transaction;
use crate::taxonomy::{category_color, FALLBACK_COLOR, INCOME_CATEGORY};
use crate::tui::{hex_color, FOOTER_STYLE};

/// Width in cells of a single bar.
pub const BAR_WIDTH: u16 = 4;
/// Width of one month: income bar, expense bar, one blank column.
pub const GROUP_WIDTH: u16 = BAR_WIDTH * 2 + 1;
/// Plot width below which the chart does not shrink.
pub const MIN_PLOT_WIDTH: u16 = 40;
/// Headroom above the tallest bar.
const Y_HEADROOM: f64 = 1.2;

const BAR_SYMBOL: &str = "\u{2588}";
const LEGEND_SYMBOL: &str = "\u{25a0}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendState {
    #[default]
    Hidden,
    Shown,
}

impl LegendState {
    pub fn toggled(self) -> Self {
        match self {
            LegendState::Hidden => LegendState::Shown,
            LegendState::Shown => LegendState::Hidden,
        }
    }

    pub fn is_shown(self) -> bool {
        self == LegendState::Shown
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSeries {
    pub category: String,
    /// One total per month, aligned with [`MonthlyChart::months`].
    pub values: Vec<f64>,
}

impl ExpenseSeries {
    /// Only series with a positive overall total get a segment.
    pub fn is_drawn(&self) -> bool {
        self.values.iter().sum::<f64>() > 0.0
    }
}

/// Per-month sums of the whole transaction set, split into income and
/// one series per expense category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyChart {
    pub months: Vec<String>,
    pub income: Vec<f64>,
    pub expenses: Vec<ExpenseSeries>,
}

impl MonthlyChart {
    pub fn from_rows(rows: &[Transaction]) -> Self {
        let mut by_month: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for row in rows {
            let Some(value) = row.amount() else {
                continue;
            };
            *by_month
                .entry(row.month())
                .or_default()
                .entry(row.category.clone())
                .or_default() += value;
        }

        let months: Vec<String> = by_month.keys().cloned().collect();
        let mut categories: Vec<&String> = by_month
            .values()
            .flat_map(|cats| cats.keys())
            .filter(|c| c.as_str() != INCOME_CATEGORY)
            .collect();
        categories.sort();
        categories.dedup();

        let income = by_month
            .values()
            .map(|cats| cats.get(INCOME_CATEGORY).copied().unwrap_or(0.0))
            .collect();
        let expenses = categories
            .into_iter()
            .map(|cat| ExpenseSeries {
                category: cat.clone(),
                values: by_month
                    .values()
                    .map(|cats| cats.get(cat).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self {
            months,
            income,
            expenses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn income_for(&self, month: &str) -> f64 {
        self.month_index(month)
            .and_then(|i| self.income.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn expense_for(&self, month: &str, category: &str) -> f64 {
        let Some(i) = self.month_index(month) else {
            return 0.0;
        };
        self.expenses
            .iter()
            .find(|s| s.category == category)
            .and_then(|s| s.values.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn drawn_series(&self) -> impl Iterator<Item = &ExpenseSeries> {
        self.expenses.iter().filter(|s| s.is_drawn())
    }

    /// Height of each stacked expense bar.
    pub fn expense_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.months.len()];
        for series in self.drawn_series() {
            for (total, value) in totals.iter_mut().zip(&series.values) {
                *total += value;
            }
        }
        totals
    }

    /// Top of the y axis.
    pub fn y_max(&self) -> f64 {
        let tallest = self
            .income
            .iter()
            .chain(self.expense_totals().iter())
            .copied()
            .fold(0.0_f64, f64::max);
        tallest * Y_HEADROOM
    }

    /// Plot width needed to show every month without scrolling.
    pub fn content_width(&self) -> u16 {
        let months = u16::try_from(self.months.len()).unwrap_or(u16::MAX);
        months.saturating_mul(GROUP_WIDTH).max(MIN_PLOT_WIDTH)
    }

    /// Legend entries in drawing order: income first, then drawn expenses.
    pub fn legend_entries(&self) -> Vec<(&str, Color)> {
        let mut entries = vec![(INCOME_CATEGORY, series_color(INCOME_CATEGORY))];
        entries.extend(
            self.drawn_series()
                .map(|s| (s.category.as_str(), series_color(&s.category))),
        );
        entries
    }

    fn month_index(&self, month: &str) -> Option<usize> {
        self.months.iter().position(|m| m == month)
    }
}

pub fn series_color(category: &str) -> Color {
    hex_color(category_color(category))
        .or_else(|| hex_color(FALLBACK_COLOR))
        .unwrap_or(Color::Gray)
}

/// Renders a [`MonthlyChart`]: income bar beside a stacked expense bar per month.
pub struct ChartWidget<'a> {
    chart: &'a MonthlyChart,
    legend: LegendState,
    /// Index of the first month shown.
    scroll: usize,
}

impl<'a> ChartWidget<'a> {
    pub fn new(chart: &'a MonthlyChart, legend: LegendState, scroll: usize) -> Self {
        Self {
            chart,
            legend,
            scroll,
        }
    }

    /// Number of month groups that fit in `width` cells once the axis is drawn.
    pub fn months_that_fit(chart: &MonthlyChart, width: u16) -> usize {
        let axis = axis_width(chart);
        (width.saturating_sub(axis) / GROUP_WIDTH) as usize
    }
}

fn axis_width(chart: &MonthlyChart) -> u16 {
    compact(chart.y_max()).chars().count() as u16 + 1
}

fn bar_cells(value: f64, y_max: f64, plot_height: u16) -> u16 {
    if value <= 0.0 || y_max <= 0.0 {
        return 0;
    }
    let cells = (value / y_max * f64::from(plot_height)).round() as u16;
    cells.min(plot_height)
}

fn fill_column(buf: &mut Buffer, x: u16, bottom: u16, from: u16, to: u16, color: Color) {
    // rows counted upward from `bottom`, half-open [from, to)
    for level in from..to {
        let Some(y) = bottom.checked_sub(level) else {
            break;
        };
        for dx in 0..BAR_WIDTH {
            if let Some(cell) = buf.cell_mut((x + dx, y)) {
                cell.set_symbol(BAR_SYMBOL).set_fg(color);
            }
        }
    }
}

fn draw_label(buf: &mut Buffer, x: u16, y: u16, value: f64, top: u16) {
    if value <= 0.0 || y < top {
        return;
    }
    let whole = format!("{value:.0}");
    let text = if whole.len() <= BAR_WIDTH as usize {
        whole
    } else {
        compact(value)
    };
    buf.set_stringn(x, y, &text, BAR_WIDTH as usize, Style::default());
}

impl Widget for ChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 4 || area.width < GROUP_WIDTH + 2 {
            return;
        }
        let title_style = Style::default().add_modifier(Modifier::BOLD);
        buf.set_stringn(
            area.x,
            area.y,
            " Income vs Expenses",
            area.width as usize,
            title_style,
        );

        let chart = self.chart;
        if chart.is_empty() {
            buf.set_stringn(
                area.x,
                area.y + 1,
                " No transactions to chart yet.",
                area.width as usize,
                FOOTER_STYLE,
            );
            return;
        }

        let mut top = area.y + 1;
        if self.legend.is_shown() {
            let mut x = area.x + 1;
            for (name, color) in chart.legend_entries() {
                let width = name.chars().count() as u16 + 3;
                if x + width > area.right() {
                    top += 1;
                    x = area.x + 1;
                }
                if top >= area.bottom() {
                    break;
                }
                buf.set_string(x, top, LEGEND_SYMBOL, Style::default().fg(color));
                buf.set_stringn(
                    x + 2,
                    top,
                    name,
                    area.right().saturating_sub(x + 2) as usize,
                    Style::default(),
                );
                x += width;
            }
            top += 1;
        }

        // one row for value labels above the tallest bar, one for month labels
        let label_row = area.bottom() - 1;
        let baseline = label_row.saturating_sub(1);
        let plot_top = top + 1;
        if baseline < plot_top {
            return;
        }
        let plot_height = baseline - plot_top + 1;
        let y_max = chart.y_max();

        let axis = axis_width(chart);
        let top_label = compact(y_max);
        buf.set_string(
            area.x,
            plot_top,
            format!("{top_label:>width$}", width = (axis - 1) as usize),
            FOOTER_STYLE,
        );
        buf.set_string(
            area.x,
            baseline,
            format!("{:>width$}", "0", width = (axis - 1) as usize),
            FOOTER_STYLE,
        );

        let totals = chart.expense_totals();
        let series: Vec<&ExpenseSeries> = chart.drawn_series().collect();
        let income_color = series_color(INCOME_CATEGORY);
        let visible = ChartWidget::months_that_fit(chart, area.width);

        for (slot, month_idx) in (self.scroll..chart.months.len()).take(visible).enumerate() {
            let x = area.x + axis + slot as u16 * GROUP_WIDTH;

            let income = chart.income.get(month_idx).copied().unwrap_or(0.0);
            let income_cells = bar_cells(income, y_max, plot_height);
            fill_column(buf, x, baseline, 0, income_cells, income_color);
            draw_label(buf, x, baseline.saturating_sub(income_cells), income, top);

            let expense_x = x + BAR_WIDTH;
            let mut cumulative = 0.0;
            for s in &series {
                let value = s.values.get(month_idx).copied().unwrap_or(0.0);
                if value <= 0.0 {
                    continue;
                }
                let from = bar_cells(cumulative, y_max, plot_height);
                cumulative += value;
                let to = bar_cells(cumulative, y_max, plot_height);
                fill_column(buf, expense_x, baseline, from, to, series_color(&s.category));
            }
            let expense_total = totals.get(month_idx).copied().unwrap_or(0.0);
            let expense_cells = bar_cells(expense_total, y_max, plot_height);
            draw_label(
                buf,
                expense_x,
                baseline.saturating_sub(expense_cells),
                expense_total,
                top,
            );

            let month = &chart.months[month_idx];
            let label = if month.is_empty() { "?" } else { month.as_str() };
            buf.set_stringn(x, label_row, label, (GROUP_WIDTH - 1) as usize, FOOTER_STYLE);
        }

        let hidden_left = self.scroll > 0;
        let hidden_right = self.scroll + visible < chart.months.len();
        if hidden_left {
            buf.set_string(area.x, label_row, "\u{2039}", FOOTER_STYLE);
        }
        if hidden_right {
            buf.set_string(area.right() - 1, label_row, "\u{203a}", FOOTER_STYLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, value: &str, category: &str) -> Transaction {
        Transaction {
            id: 0,
            date: date.into(),
            value: value.into(),
            kind: if category == INCOME_CATEGORY { "Credit" } else { "Debit" }.into(),
            supplier: String::new(),
            funds: String::new(),
            category: category.into(),
            subcategory: String::new(),
            subsubcategory: String::new(),
        }
    }

    fn sample() -> MonthlyChart {
        MonthlyChart::from_rows(&[
            row("2024-05-02", "1000", INCOME_CATEGORY),
            row("2024-05-10", "300", "Housing"),
            row("2024-06-01", "200", "Housing"),
        ])
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_aggregates_by_month_and_category() {
        let chart = sample();
        assert_eq!(chart.months, vec!["2024-05", "2024-06"]);
        assert_eq!(chart.income_for("2024-05"), 1000.0);
        assert_eq!(chart.expense_for("2024-05", "Housing"), 300.0);
        assert_eq!(chart.income_for("2024-06"), 0.0);
        assert_eq!(chart.expense_for("2024-06", "Housing"), 200.0);
    }

    #[test]
    fn test_income_is_not_an_expense_series() {
        let chart = sample();
        let names: Vec<&str> = chart.expenses.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Housing"]);
    }

    #[test]
    fn test_unparseable_rows_are_skipped() {
        let chart = MonthlyChart::from_rows(&[
            row("2024-05-02", "oops", "Housing"),
            row("2024-05-03", "12", "Housing"),
        ]);
        assert_eq!(chart.expense_for("2024-05", "Housing"), 12.0);
    }

    #[test]
    fn test_non_positive_series_are_not_drawn() {
        let chart = MonthlyChart::from_rows(&[
            row("2024-05-02", "50", "Leisure"),
            row("2024-05-03", "-20", "Refunds"),
        ]);
        let drawn: Vec<&str> = chart.drawn_series().map(|s| s.category.as_str()).collect();
        assert_eq!(drawn, vec!["Leisure"]);
        assert_eq!(chart.expense_totals(), vec![50.0]);
    }

    #[test]
    fn test_y_max_has_headroom() {
        let chart = sample();
        assert!((chart.y_max() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_content_width_scales_with_months() {
        let few = sample();
        assert_eq!(few.content_width(), MIN_PLOT_WIDTH);
        let rows: Vec<Transaction> = (1..=12)
            .map(|m| row(&format!("2023-{m:02}-01"), "10", "Leisure"))
            .collect();
        let many = MonthlyChart::from_rows(&rows);
        assert_eq!(many.content_width(), 12 * GROUP_WIDTH);
    }

    #[test]
    fn test_legend_toggle_twice_restores_state() {
        let start = LegendState::default();
        assert!(!start.is_shown());
        assert!(start.toggled().is_shown());
        assert_eq!(start.toggled().toggled(), start);
    }

    #[test]
    fn test_render_draws_labels_and_months() {
        let chart = sample();
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ChartWidget::new(&chart, LegendState::Hidden, 0).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Income vs Expenses"));
        assert!(text.contains("2024-05"));
        assert!(text.contains("2024-06"));
        assert!(text.contains("1000"));
        assert!(text.contains("300"));
        assert!(text.contains(BAR_SYMBOL));
        assert!(!text.contains(LEGEND_SYMBOL));
    }

    #[test]
    fn test_render_legend_when_shown() {
        let chart = sample();
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ChartWidget::new(&chart, LegendState::Shown, 0).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains(LEGEND_SYMBOL));
        assert!(text.contains("Housing"));
    }

    #[test]
    fn test_render_scrolled_shows_both_markers() {
        let rows: Vec<Transaction> = (1..=12)
            .map(|m| row(&format!("2023-{m:02}-01"), "10", "Leisure"))
            .collect();
        let chart = MonthlyChart::from_rows(&rows);
        let area = Rect::new(0, 0, 40, 12);
        assert_eq!(ChartWidget::months_that_fit(&chart, area.width), 4);

        let mut buf = Buffer::empty(area);
        ChartWidget::new(&chart, LegendState::Hidden, 2).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains('\u{2039}'));
        assert!(text.contains('\u{203a}'));
        assert!(text.contains("2023-03"));
        assert!(text.contains("2023-06"));
        assert!(!text.contains("2023-02"));
        assert!(!text.contains("2023-07"));

        let mut buf = Buffer::empty(area);
        ChartWidget::new(&chart, LegendState::Hidden, 0).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(!text.contains('\u{2039}'));
        assert!(text.contains('\u{203a}'));
    }

    #[test]
    fn test_render_empty_chart() {
        let chart = MonthlyChart::default();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        ChartWidget::new(&chart, LegendState::Hidden, 0).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No transactions"));
    }
}
