use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::error::{BudgetError, Result};
use crate::models::{parse_value, NewTransaction, TransactionType};
use crate::taxonomy::{Taxonomy, INCOME_CATEGORY, OTHER};
use crate::tui::{FOCUS_STYLE, FOOTER_STYLE};

// Field indices, in the order `EntryForm::new` builds them
pub const DATE_IDX: usize = 0;
pub const VALUE_IDX: usize = 1;
pub const TYPE_IDX: usize = 2;
pub const SUPPLIER_IDX: usize = 3;
pub const FUNDS_IDX: usize = 4;
pub const CATEGORY_IDX: usize = 5;
pub const SUBCATEGORY_IDX: usize = 6;
pub const SUBSUB_IDX: usize = 7;

/// Fields shown on the first form line; the rest go on the second.
const FIRST_LINE_FIELDS: usize = 4;

pub enum FormAction {
    Continue,
    Submit,
    Leave,
}

struct FormField {
    label: &'static str,
    value: String,
    kind: FieldKind,
}

enum FieldKind {
    Text { placeholder: &'static str },
    Selector { options: Vec<String>, selected: usize },
}

impl FormField {
    fn text(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            kind: FieldKind::Text { placeholder },
        }
    }

    fn selector(label: &'static str, options: Vec<String>) -> Self {
        let mut field = Self {
            label,
            value: String::new(),
            kind: FieldKind::Selector {
                options: Vec::new(),
                selected: 0,
            },
        };
        field.set_options(options);
        field
    }

    fn set_options(&mut self, options: Vec<String>) {
        self.value = options.first().cloned().unwrap_or_default();
        self.kind = FieldKind::Selector {
            options,
            selected: 0,
        };
    }

    /// Select `value` if it is one of the options.
    fn select(&mut self, value: &str) -> bool {
        if let FieldKind::Selector { options, selected } = &mut self.kind {
            if let Some(i) = options.iter().position(|o| o == value) {
                *selected = i;
                self.value = options[i].clone();
                return true;
            }
        }
        false
    }

    fn step(&mut self, forward: bool) -> bool {
        if let FieldKind::Selector { options, selected } = &mut self.kind {
            if options.is_empty() {
                return false;
            }
            *selected = if forward {
                (*selected + 1) % options.len()
            } else if *selected == 0 {
                options.len() - 1
            } else {
                *selected - 1
            };
            self.value = options[*selected].clone();
            return true;
        }
        false
    }

    fn is_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTarget {
    Category,
    Subcategory,
    Funds,
}

struct Prompt {
    target: PromptTarget,
    input: String,
}

/// The transaction entry form and the taxonomy it draws its choices from.
pub struct EntryForm {
    taxonomy: Taxonomy,
    fields: Vec<FormField>,
    focused: usize,
    category_locked: bool,
    prompt: Option<Prompt>,
}

impl EntryForm {
    pub fn new(taxonomy: Taxonomy) -> Self {
        let type_options = TransactionType::ALL
            .iter()
            .map(|t| t.label().to_string())
            .collect();
        let mut form = Self {
            fields: vec![
                FormField::text("Date", "YYYY-MM-DD"),
                FormField::text("Value", "amount, no currency sign"),
                FormField::selector("Type", type_options),
                FormField::text("Supplier", "e.g. Pingo Doce"),
                FormField::selector("Funds", taxonomy.fund_options()),
                FormField::selector("Category", taxonomy.category_options()),
                FormField::selector("Subcategory", Vec::new()),
                FormField::selector("Sub-sub", Vec::new()),
            ],
            taxonomy,
            focused: 0,
            category_locked: false,
            prompt: None,
        };
        form.refresh_subcategories();
        form
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn value_of(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Current options of a selector field (empty for text fields).
    pub fn options_of(&self, idx: usize) -> &[String] {
        match self.fields.get(idx).map(|f| &f.kind) {
            Some(FieldKind::Selector { options, .. }) => options.as_slice(),
            _ => &[],
        }
    }

    pub fn is_category_locked(&self) -> bool {
        self.category_locked
    }

    pub fn prompt_target(&self) -> Option<PromptTarget> {
        self.prompt.as_ref().map(|p| p.target)
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn set_text(&mut self, idx: usize, value: &str) {
        if let Some(field) = self.fields.get_mut(idx) {
            if field.is_text() {
                field.value = value.to_string();
            }
        }
    }

    pub fn set_type(&mut self, kind: TransactionType) {
        self.fields[TYPE_IDX].select(kind.label());
        self.on_type_changed();
    }

    /// Choose a selector value as if picked by the user, running the cascade.
    /// Returns false when the value is not offered or the field is locked.
    pub fn choose(&mut self, idx: usize, value: &str) -> bool {
        if idx == TYPE_IDX {
            return match TransactionType::from_label(value) {
                Some(kind) => {
                    self.set_type(kind);
                    true
                }
                None => false,
            };
        }
        if idx == CATEGORY_IDX && self.category_locked {
            return false;
        }
        let Some(field) = self.fields.get_mut(idx) else {
            return false;
        };
        if !field.select(value) {
            return false;
        }
        self.on_selection_changed(idx);
        true
    }

    pub fn answer_prompt(&mut self, answer: &str) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return;
        }
        match prompt.target {
            PromptTarget::Category => {
                self.taxonomy.add_category(answer);
                self.fields[CATEGORY_IDX].set_options(self.taxonomy.category_options());
                self.fields[CATEGORY_IDX].select(answer);
                self.refresh_subcategories();
            }
            PromptTarget::Subcategory => {
                let category = self.fields[CATEGORY_IDX].value.clone();
                self.taxonomy.add_subcategory(&category, answer);
                self.fields[SUBCATEGORY_IDX].set_options(self.taxonomy.subcategory_options(&category));
                self.fields[SUBCATEGORY_IDX].select(answer);
                self.refresh_subsubcategories();
            }
            PromptTarget::Funds => {
                self.taxonomy.add_fund(answer);
                self.fields[FUNDS_IDX].set_options(self.taxonomy.fund_options());
                self.fields[FUNDS_IDX].select(answer);
            }
        }
        tracing::debug!(target_field = ?prompt.target, answer, "taxonomy extended for this session");
    }

    /// Leaves "Other" selected.
    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Validate and produce the row to insert. Only the value is checked.
    pub fn build(&self) -> Result<NewTransaction> {
        let raw = self.value_of(VALUE_IDX);
        let value = parse_value(raw).ok_or_else(|| BudgetError::InvalidValue(raw.to_string()))?;
        let kind = TransactionType::from_label(self.value_of(TYPE_IDX))
            .unwrap_or(TransactionType::Debit);
        Ok(NewTransaction {
            date: self.value_of(DATE_IDX).trim().to_string(),
            value,
            kind,
            supplier: self.value_of(SUPPLIER_IDX).trim().to_string(),
            funds: self.value_of(FUNDS_IDX).to_string(),
            category: self.value_of(CATEGORY_IDX).to_string(),
            subcategory: self.value_of(SUBCATEGORY_IDX).to_string(),
            subsubcategory: self.value_of(SUBSUB_IDX).to_string(),
        })
    }

    /// Clear the free-text inputs after a successful submit; selectors keep their values.
    pub fn clear_inputs(&mut self) {
        for idx in [DATE_IDX, VALUE_IDX, SUPPLIER_IDX] {
            self.fields[idx].value.clear();
        }
        self.focused = DATE_IDX;
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormAction {
        if let Some(prompt) = &mut self.prompt {
            match code {
                KeyCode::Enter => {
                    let answer = prompt.input.clone();
                    self.answer_prompt(&answer);
                }
                KeyCode::Esc => self.cancel_prompt(),
                KeyCode::Backspace => {
                    prompt.input.pop();
                }
                KeyCode::Char(c) => prompt.input.push(c),
                _ => {}
            }
            return FormAction::Continue;
        }

        match code {
            KeyCode::Esc => return FormAction::Leave,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focused = (self.focused + 1) % self.fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focused = if self.focused == 0 {
                    self.fields.len() - 1
                } else {
                    self.focused - 1
                };
            }
            KeyCode::Left | KeyCode::Right => {
                let idx = self.focused;
                if idx == CATEGORY_IDX && self.category_locked {
                    return FormAction::Continue;
                }
                if self.fields[idx].step(code == KeyCode::Right) {
                    self.on_selection_changed(idx);
                }
            }
            KeyCode::Char(c) => {
                let field = &mut self.fields[self.focused];
                if field.is_text() {
                    field.value.push(c);
                }
            }
            KeyCode::Backspace => {
                let field = &mut self.fields[self.focused];
                if field.is_text() {
                    field.value.pop();
                }
            }
            _ => {}
        }
        FormAction::Continue
    }

    fn on_selection_changed(&mut self, idx: usize) {
        let picked_other = self.fields[idx].value == OTHER;
        match idx {
            TYPE_IDX => self.on_type_changed(),
            FUNDS_IDX if picked_other => self.open_prompt(PromptTarget::Funds),
            CATEGORY_IDX => {
                self.refresh_subcategories();
                if picked_other {
                    self.open_prompt(PromptTarget::Category);
                }
            }
            SUBCATEGORY_IDX => {
                self.refresh_subsubcategories();
                if picked_other {
                    self.open_prompt(PromptTarget::Subcategory);
                }
            }
            _ => {}
        }
    }

    fn on_type_changed(&mut self) {
        let credit = TransactionType::from_label(self.value_of(TYPE_IDX))
            == Some(TransactionType::Credit);
        if credit {
            if !self.taxonomy.has_category(INCOME_CATEGORY) {
                self.taxonomy.add_category(INCOME_CATEGORY);
                self.fields[CATEGORY_IDX].set_options(self.taxonomy.category_options());
            }
            self.fields[CATEGORY_IDX].select(INCOME_CATEGORY);
            self.refresh_subcategories();
        }
        self.category_locked = credit;
    }

    fn open_prompt(&mut self, target: PromptTarget) {
        self.prompt = Some(Prompt {
            target,
            input: String::new(),
        });
    }

    fn refresh_subcategories(&mut self) {
        let category = self.fields[CATEGORY_IDX].value.clone();
        self.fields[SUBCATEGORY_IDX].set_options(self.taxonomy.subcategory_options(&category));
        self.refresh_subsubcategories();
    }

    fn refresh_subsubcategories(&mut self) {
        let subcategory = self.fields[SUBCATEGORY_IDX].value.clone();
        self.fields[SUBSUB_IDX].set_options(self.taxonomy.subsubcategory_options(&subcategory));
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, has_focus: bool) {
        let mut lines = vec![Line::from(Span::styled(
            " New transaction",
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        let (first, second) = self.fields.split_at(FIRST_LINE_FIELDS);
        lines.push(self.fields_line(first, 0, has_focus));
        lines.push(self.fields_line(second, FIRST_LINE_FIELDS, has_focus));

        if let Some(prompt) = &self.prompt {
            let what = match prompt.target {
                PromptTarget::Category => "New category",
                PromptTarget::Subcategory => "New subcategory",
                PromptTarget::Funds => "New funding source",
            };
            lines.push(Line::from(Span::styled(
                format!(" {what}: {}\u{2588}  (Enter=add, Esc=cancel)", prompt.input),
                FOCUS_STYLE,
            )));
        } else if self.category_locked {
            lines.push(Line::from(Span::styled(
                format!(" Category locked to {INCOME_CATEGORY} for credits"),
                FOOTER_STYLE,
            )));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn fields_line(&self, fields: &[FormField], offset: usize, has_focus: bool) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            let idx = offset + i;
            let is_focused = has_focus && idx == self.focused && self.prompt.is_none();
            let label_style = if is_focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {}: ", field.label), label_style));

            let value_style = if is_focused {
                FOCUS_STYLE
            } else if idx == CATEGORY_IDX && self.category_locked {
                FOOTER_STYLE
            } else {
                Style::default()
            };
            match &field.kind {
                FieldKind::Text { placeholder } => {
                    if field.value.is_empty() && !is_focused {
                        spans.push(Span::styled(placeholder.to_string(), FOOTER_STYLE));
                    } else {
                        let cursor = if is_focused { "_" } else { "" };
                        spans.push(Span::styled(format!("{}{cursor}", field.value), value_style));
                    }
                }
                FieldKind::Selector { .. } => {
                    let arrows = if is_focused { ("< ", " >") } else { ("", "") };
                    spans.push(Span::styled(
                        format!("{}{}{}", arrows.0, field.value, arrows.1),
                        value_style,
                    ));
                }
            }
            spans.push(Span::raw("  "));
        }
        Line::from(spans)
    }
}
