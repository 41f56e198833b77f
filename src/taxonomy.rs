use std::collections::BTreeMap;

/// Category every credit is filed under.
pub const INCOME_CATEGORY: &str = "Income";
/// Synthetic selector entry that asks the user for a new value.
pub const OTHER: &str = "Other";
/// Sub-subcategory used when a subcategory has no children.
pub const NOT_APPLICABLE: &str = "N/A";
/// Bar colour for categories without an assigned one.
pub const FALLBACK_COLOR: &str = "#CCCCCC";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "General Expenses",
        &["Groceries", "School Meals", "Telecommunications", "Clothing", "Taxes", "Bank"],
    ),
    ("Transport", &["Vehicle 1", "Vehicle 2", "Vehicle 3", "Public Transport"]),
    ("Personal Care", &["Hairdresser", "Waxing", "Nails"]),
    (
        "Education",
        &["Extracurricular Activities", "Courses and Workshops", "Learning Materials"],
    ),
    (
        "Housing",
        &[
            "Insurance",
            "Mortgage",
            "Taxes",
            "Maintenance",
            "Energy and Utilities",
            "Condominium",
            "Improvements",
        ],
    ),
    (
        "Leisure",
        &["Restaurants and Cafes", "Holidays", "Hobbies", "Outings", "Celebrations"],
    ),
    (
        "Health and Wellness",
        &["Appointments and Exams", "Insurance", "Pharmacy", "Equipment", "Gym", "Dental"],
    ),
    (
        INCOME_CATEGORY,
        &["Salary", "Commissions", "Insurance", "Investments", "Side Income"],
    ),
];

const VEHICLE_ITEMS: &[&str] = &[
    "Fuel",
    "Insurance",
    "Inspection",
    "Maintenance",
    "Tolls",
    "Taxes",
    "Fines",
    "Parking",
    "Other",
];

const PROPERTIES: &[&str] = &["Home 1", "Home 2"];

// Keyed by subcategory name alone, so a name shared by several categories
// ("Insurance", "Taxes") shares its children too.
const SUBSUBCATEGORIES: &[(&str, &[&str])] = &[
    ("Vehicle 1", VEHICLE_ITEMS),
    ("Vehicle 2", VEHICLE_ITEMS),
    ("Vehicle 3", VEHICLE_ITEMS),
    ("Public Transport", &["Bus", "Train", "Taxi/Ride-hailing", "Metro", "Boat", "Other"]),
    ("Insurance", PROPERTIES),
    ("Mortgage", PROPERTIES),
    ("Taxes", PROPERTIES),
    ("Maintenance", PROPERTIES),
    ("Energy and Utilities", PROPERTIES),
    ("Condominium", PROPERTIES),
    ("Improvements", PROPERTIES),
];

const FUNDS: &[&str] = &[
    "Cash",
    "Bank Account 1",
    "Bank Account 2",
    "Bank Account 3",
    "Bank Account 4",
    "Bank Account 5",
];

const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("General Expenses", "#d399ff"),
    ("Transport", "#66B2FF"),
    ("Personal Care", "#FFCC99"),
    ("Education", "#99FF99"),
    ("Housing", "#c7c9c5"),
    ("Leisure", "#ffc099"),
    ("Health and Wellness", "#99FFFF"),
    (INCOME_CATEGORY, "#5fb83e"),
];

/// Hex colour for a category's chart bars.
pub fn category_color(category: &str) -> &'static str {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, hex)| *hex)
        .unwrap_or(FALLBACK_COLOR)
}

/// Category tree and funding sources used to populate the entry form.
///
/// Starts from the built-in tables; additions made through "Other" live only
/// as long as the value does.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<(String, Vec<String>)>,
    subsubcategories: BTreeMap<String, Vec<String>>,
    funds: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: CATEGORIES
                .iter()
                .map(|(name, subs)| (name.to_string(), to_strings(subs)))
                .collect(),
            subsubcategories: SUBSUBCATEGORIES
                .iter()
                .map(|(name, items)| (name.to_string(), to_strings(items)))
                .collect(),
            funds: to_strings(FUNDS),
        }
    }
}

impl Taxonomy {
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|(name, _)| name == category)
    }

    /// Category selector entries: every known category, then "Other".
    pub fn category_options(&self) -> Vec<String> {
        let mut options = self.category_names();
        options.push(OTHER.to_string());
        options
    }

    /// Subcategories of `category` plus "Other"; empty for an unknown category.
    pub fn subcategory_options(&self, category: &str) -> Vec<String> {
        match self.categories.iter().find(|(name, _)| name == category) {
            Some((_, subs)) => {
                let mut options = subs.clone();
                options.push(OTHER.to_string());
                options
            }
            None => Vec::new(),
        }
    }

    /// Children of `subcategory`, or just "N/A" when it has none.
    pub fn subsubcategory_options(&self, subcategory: &str) -> Vec<String> {
        match self.subsubcategories.get(subcategory) {
            Some(items) if !items.is_empty() => items.clone(),
            _ => vec![NOT_APPLICABLE.to_string()],
        }
    }

    pub fn fund_options(&self) -> Vec<String> {
        let mut options = self.funds.clone();
        options.push(OTHER.to_string());
        options
    }

    /// Returns false if the name is blank or already present.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == OTHER || self.has_category(name) {
            return false;
        }
        self.categories.push((name.to_string(), Vec::new()));
        true
    }

    /// Returns false if the category is unknown, the name is blank, or it
    /// already exists under that category.
    pub fn add_subcategory(&mut self, category: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == OTHER {
            return false;
        }
        match self.categories.iter_mut().find(|(cat, _)| cat == category) {
            Some((_, subs)) if !subs.iter().any(|s| s == name) => {
                subs.push(name.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn add_fund(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == OTHER || self.funds.iter().any(|f| f == name) {
            return false;
        }
        self.funds.push(name.to_string());
        true
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_is_a_builtin_category() {
        let tax = Taxonomy::default();
        assert!(tax.has_category(INCOME_CATEGORY));
        assert_eq!(tax.category_options().last().map(String::as_str), Some(OTHER));
    }

    #[test]
    fn test_subcategory_options_end_with_other() {
        let tax = Taxonomy::default();
        let subs = tax.subcategory_options("Transport");
        assert_eq!(subs.first().map(String::as_str), Some("Vehicle 1"));
        assert_eq!(subs.last().map(String::as_str), Some(OTHER));
        assert!(tax.subcategory_options("Nope").is_empty());
    }

    #[test]
    fn test_subsubcategory_falls_back_to_na() {
        let tax = Taxonomy::default();
        assert_eq!(tax.subsubcategory_options("Groceries"), vec![NOT_APPLICABLE]);
        assert_eq!(tax.subsubcategory_options(OTHER), vec![NOT_APPLICABLE]);
        assert_eq!(tax.subsubcategory_options("Mortgage"), vec!["Home 1", "Home 2"]);
        // shared by name across categories
        assert_eq!(tax.subsubcategory_options("Insurance"), vec!["Home 1", "Home 2"]);
    }

    #[test]
    fn test_session_additions() {
        let mut tax = Taxonomy::default();
        assert!(tax.add_subcategory("Leisure", "  Concerts "));
        assert!(!tax.add_subcategory("Leisure", "Concerts"));
        assert!(!tax.add_subcategory("Missing", "Concerts"));
        assert!(!tax.add_subcategory("Leisure", "   "));
        let subs = tax.subcategory_options("Leisure");
        assert_eq!(subs[subs.len() - 2], "Concerts");

        assert!(tax.add_category("Pets"));
        assert!(!tax.add_category("Pets"));
        assert_eq!(tax.subcategory_options("Pets"), vec![OTHER]);

        assert!(tax.add_fund("Gift Card"));
        assert!(tax.fund_options().contains(&"Gift Card".to_string()));
    }

    #[test]
    fn test_additions_do_not_leak_into_new_taxonomies() {
        let mut tax = Taxonomy::default();
        tax.add_category("Pets");
        assert!(!Taxonomy::default().has_category("Pets"));
    }

    #[test]
    fn test_category_color_fallback() {
        assert_eq!(category_color("Housing"), "#c7c9c5");
        assert_eq!(category_color("Pets"), FALLBACK_COLOR);
    }
}
