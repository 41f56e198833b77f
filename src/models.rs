/// Label stored in the `type` column for money coming in.
pub const CREDIT_LABEL: &str = "Credit";
/// Label stored in the `type` column for money going out.
pub const DEBIT_LABEL: &str = "Debit";

/// Grid and search columns, in display order.
pub const COLUMNS: [&str; 8] = [
    "date",
    "value",
    "type",
    "supplier",
    "funds",
    "category",
    "subcategory",
    "subsubcategory",
];

pub const VALUE_COL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Debit, TransactionType::Credit];

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Debit => DEBIT_LABEL,
            TransactionType::Credit => CREDIT_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(CREDIT_LABEL) {
            Some(TransactionType::Credit)
        } else if label.eq_ignore_ascii_case(DEBIT_LABEL) {
            Some(TransactionType::Debit)
        } else {
            None
        }
    }
}

/// A row as loaded from the `Transactions` table.
///
/// `value` keeps the stored value as text so that rows with a non-numeric
/// value still load; [`Transaction::amount`] is what arithmetic uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub value: String,
    pub kind: String,
    pub supplier: String,
    pub funds: String,
    pub category: String,
    pub subcategory: String,
    pub subsubcategory: String,
}

impl Transaction {
    pub fn amount(&self) -> Option<f64> {
        parse_value(&self.value)
    }

    pub fn is_credit(&self) -> bool {
        TransactionType::from_label(&self.kind) == Some(TransactionType::Credit)
    }

    /// Text of the column at `idx` (see [`COLUMNS`]).
    pub fn column(&self, idx: usize) -> &str {
        match idx {
            0 => &self.date,
            1 => &self.value,
            2 => &self.kind,
            3 => &self.supplier,
            4 => &self.funds,
            5 => &self.category,
            6 => &self.subcategory,
            7 => &self.subsubcategory,
            _ => "",
        }
    }

    /// Month key used by the chart: the first seven characters of the date.
    pub fn month(&self) -> String {
        self.date.chars().take(7).collect()
    }
}

/// Validated form output, ready for insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: String,
    pub value: f64,
    pub kind: TransactionType,
    pub supplier: String,
    pub funds: String,
    pub category: String,
    pub subcategory: String,
    pub subsubcategory: String,
}

/// Parse an amount typed by the user. Only finite numbers are accepted.
pub fn parse_value(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
