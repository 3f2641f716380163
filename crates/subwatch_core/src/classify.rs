/// Severity class of a single job log line, used for display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Success,
    Error,
    Warning,
    SubcategoryInfo,
    Info,
}

impl Category {
    pub fn css_class(self) -> &'static str {
        match self {
            Category::Success => "log-success",
            Category::Error => "log-error",
            Category::Warning => "log-warning",
            Category::SubcategoryInfo => "log-subcat",
            Category::Info => "log-info",
        }
    }

    /// Fixed-width tag for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Category::Success => "OK  ",
            Category::Error => "ERR ",
            Category::Warning => "WARN",
            Category::SubcategoryInfo => "SRC ",
            Category::Info => "INFO",
        }
    }
}

// Checked in order; keywords overlap between categories so the first hit wins.
const RULES: &[(Category, &[&str])] = &[
    (Category::Success, &["success", "saved"]),
    (Category::Error, &["fail", "error"]),
    (Category::Warning, &["warning", "no subtitle"]),
    (
        Category::SubcategoryInfo,
        &["searching", "found subtitle", "source"],
    ),
];

/// Classifies a log line by case-insensitive keyword inspection.
///
/// Total: every input, including the empty string, maps to exactly one
/// category, falling back to [`Category::Info`].
pub fn classify(line: &str) -> Category {
    let lower = line.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Info)
}
