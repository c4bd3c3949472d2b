use api_core::Violation;

use crate::contract::model::Category;

/// Columns the item list can be ordered by. Wire names are the camelCase
/// JSON field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Category,
    Quantity,
    Price,
    Sku,
    LowStockThreshold,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SortField::Name),
            "category" => Some(SortField::Category),
            "quantity" => Some(SortField::Quantity),
            "price" => Some(SortField::Price),
            "sku" => Some(SortField::Sku),
            "lowStockThreshold" => Some(SortField::LowStockThreshold),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }
}

/// One sort key with direction. A leading `-` on the wire means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Sort {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

/// Typed listing query, parsed from the raw query-string parameters once at
/// the REST boundary. The storage layer never sees raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub category: Option<Category>,
    /// Applied after the database query, against each row's own threshold.
    pub low_stock: bool,
    pub sort: Sort,
}

impl ItemQuery {
    /// Parses raw query parameters, collecting every violation instead of
    /// stopping at the first.
    ///
    /// Empty strings and the `All` category sentinel mean "no filter".
    /// `low_stock` is only honored when the parameter is exactly `true`.
    pub fn from_params(
        search: Option<String>,
        category: Option<String>,
        low_stock: Option<String>,
        sort: Option<String>,
    ) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();

        let search = search.filter(|s| !s.is_empty());

        let category = match category.as_deref() {
            None | Some("") | Some("All") => None,
            Some(value) => match value.parse::<Category>() {
                Ok(category) => Some(category),
                Err(err) => {
                    violations.push(Violation {
                        field: "category".into(),
                        message: err.to_string(),
                    });
                    None
                }
            },
        };

        let low_stock = low_stock.as_deref() == Some("true");

        let sort = match sort.as_deref() {
            None | Some("") => Sort::default(),
            Some(raw) => {
                let (name, descending) = match raw.strip_prefix('-') {
                    Some(rest) => (rest, true),
                    None => (raw, false),
                };
                match SortField::parse(name) {
                    Some(field) => Sort { field, descending },
                    None => {
                        violations.push(Violation {
                            field: "sort".into(),
                            message: format!("{raw} is not a valid sort field"),
                        });
                        Sort::default()
                    }
                }
            }
        };

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(ItemQuery {
            search,
            category,
            low_stock,
            sort,
        })
    }
}
