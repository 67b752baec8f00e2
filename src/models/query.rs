//! Listing query construction
//! Normalizes raw page/limit/sort/filter/search parameters into a validated
//! query the repository can execute. Sort and filter fields are allow-listed
//! so request input never reaches the store as anything but a bound value.

use serde::Deserialize;

use super::user::Role;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Raw listing parameters as they arrive on the query string. Numeric
/// fields are accepted as strings so malformed input normalizes to the
/// default instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Field name, `-` prefix for descending
    pub sort: Option<String>,
    /// Equality filter on role
    pub role: Option<String>,
    /// Equality filter on username
    pub username: Option<String>,
    /// Free-text search term
    pub search: Option<String>,
}

/// Sortable attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Username,
    Role,
    CreatedAt,
}

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "username" => Some(SortField::Username),
            "role" => Some(SortField::Role),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    /// Column name interpolated into ORDER BY. Only these fixed strings
    /// ever reach the SQL text.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Username => "username",
            SortField::Role => "role",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Validated listing query
#[derive(Debug, Clone)]
pub struct UserListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub role: Option<Role>,
    pub username: Option<String>,
    pub search: Option<String>,
}

impl UserListQuery {
    /// Normalize raw parameters. Absent or malformed page/limit fall back
    /// to defaults, the page size is clamped to `max_page_size`, and
    /// unknown sort or filter values are dropped rather than forwarded.
    pub fn from_params(params: ListUsersParams, max_page_size: u32) -> Self {
        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let page_size = parse_positive(params.limit.as_deref())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size);

        let (sort_field, sort_direction) = match params.sort.as_deref() {
            Some(raw) => {
                let (name, direction) = match raw.strip_prefix('-') {
                    Some(rest) => (rest, SortDirection::Descending),
                    None => (raw, SortDirection::Ascending),
                };
                match SortField::parse(name) {
                    Some(field) => (field, direction),
                    None => {
                        tracing::debug!(sort = %raw, "Unknown sort field, using default");
                        (SortField::CreatedAt, SortDirection::Ascending)
                    }
                }
            }
            None => (SortField::CreatedAt, SortDirection::Ascending),
        };

        let role = params.role.as_deref().and_then(|r| {
            let parsed = Role::parse(r);
            if parsed.is_none() {
                tracing::debug!(role = %r, "Unknown role filter value, dropping");
            }
            parsed
        });

        let username = params.username.filter(|u| !u.is_empty());
        let search = params.search.filter(|s| !s.is_empty());

        Self {
            page,
            page_size,
            sort_field,
            sort_direction,
            role,
            username,
            search,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    /// Search term as a LIKE pattern with the wildcard metacharacters in
    /// the user's input escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            format!("%{}%", escaped)
        })
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n >= 1)
}

/// Page count for the response envelope
pub fn total_pages(total_items: i64, page_size: u32) -> u32 {
    if total_items <= 0 || page_size == 0 {
        return 0;
    }
    ((total_items + page_size as i64 - 1) / page_size as i64) as u32
}
