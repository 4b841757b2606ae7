//! Typed query descriptors for table reads and writes.
//!
//! A [`Query`] describes one table operation declaratively: the columns to
//! select (with optional relation embeds), an ordered list of conjunctive
//! [`Filter`]s, ordering, pagination and an optional row-count request.
//! [`crate::TableExecutor`] renders the descriptor to backend query
//! parameters; nothing here touches the network.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Comparison operator applied by a [`Filter`].
///
/// Filters combine conjunctively; there is no disjunction. Callers that
/// need OR semantics fetch a superset and narrow it client-side (see
/// `AgendaService::verificar_conflitos`).
///
/// When a descriptor is deserialized from JSON, unknown operator strings
/// fall back to `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Equal
    #[default]
    Eq,
    /// Not equal
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Case-sensitive pattern match (`%` wildcard)
    Like,
    /// Case-insensitive pattern match
    Ilike,
    /// Null / boolean identity test
    Is,
    /// Set membership: column value is one of the listed values
    In,
    /// Column's array/range contains the value
    Contains,
    /// Column's array/range is contained by the value
    ContainedBy,
    /// Range strictly right of the value
    RangeGt,
    /// Range does not extend left of the value
    RangeGte,
    /// Range strictly left of the value
    RangeLt,
    /// Range does not extend right of the value
    RangeLte,
    /// Range is adjacent to the value
    RangeAdjacent,
    /// Range/array overlaps the value
    Overlaps,
    /// Full-text search
    TextSearch,
    /// Exact match on every key of a structured value
    Match,
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_name(&raw))
    }
}

impl FilterOperator {
    /// Parse an operator name; anything unrecognized is `Eq`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "like" => Self::Like,
            "ilike" => Self::Ilike,
            "is" => Self::Is,
            "in" => Self::In,
            "contains" => Self::Contains,
            "containedBy" => Self::ContainedBy,
            "rangeGt" => Self::RangeGt,
            "rangeGte" => Self::RangeGte,
            "rangeLt" => Self::RangeLt,
            "rangeLte" => Self::RangeLte,
            "rangeAdjacent" => Self::RangeAdjacent,
            "overlaps" => Self::Overlaps,
            "textSearch" => Self::TextSearch,
            "match" => Self::Match,
            _ => Self::Eq,
        }
    }

    /// Wire keyword understood by the backend query parser.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Eq | Self::Match => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::Is => "is",
            Self::In => "in",
            Self::Contains => "cs",
            Self::ContainedBy => "cd",
            Self::RangeGt => "sr",
            Self::RangeGte => "nxl",
            Self::RangeLt => "sl",
            Self::RangeLte => "nxr",
            Self::RangeAdjacent => "adj",
            Self::Overlaps => "ov",
            Self::TextSearch => "fts",
        }
    }
}

/// One conjunctive predicate on a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Column the predicate applies to
    pub column: String,

    /// Comparison operator; defaults to equality
    #[serde(default, rename = "operator")]
    pub op: FilterOperator,

    /// Comparison value
    pub value: JsonValue,
}

impl Filter {
    /// Create a filter with an explicit operator
    pub fn new(column: impl Into<String>, op: FilterOperator, value: impl Into<JsonValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Eq, value)
    }

    /// `column != value`
    pub fn neq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Neq, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Gte, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Lte, value)
    }

    /// Case-sensitive pattern match
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Like, pattern.into())
    }

    /// Case-insensitive pattern match
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Ilike, pattern.into())
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Is, JsonValue::Null)
    }

    /// Set membership over the given values
    pub fn in_list(column: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Self::new(column, FilterOperator::In, JsonValue::Array(values))
    }

    /// Column contains the value (array/range columns)
    pub fn contains(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, FilterOperator::Contains, value)
    }

    /// Full-text search
    pub fn text_search(column: impl Into<String>, terms: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::TextSearch, terms.into())
    }

    /// Exact match on every key of `object`; the keys name the columns
    pub fn matches(object: JsonValue) -> Self {
        Self::new("", FilterOperator::Match, object)
    }

    /// Render this filter to backend query parameters.
    ///
    /// All operators produce exactly one parameter except `Match`, which
    /// expands to one equality parameter per key of its object value.
    pub fn to_params(&self) -> Vec<(String, String)> {
        match self.op {
            FilterOperator::Match => match &self.value {
                JsonValue::Object(entries) => entries
                    .iter()
                    .map(|(column, value)| {
                        (column.clone(), format!("eq.{}", render_scalar(value)))
                    })
                    .collect(),
                other => vec![(self.column.clone(), format!("eq.{}", render_scalar(other)))],
            },
            FilterOperator::In => {
                let rendered = match &self.value {
                    JsonValue::Array(values) => render_list(values),
                    single => render_list(std::slice::from_ref(single)),
                };
                vec![(self.column.clone(), format!("in.{}", rendered))]
            }
            FilterOperator::Contains | FilterOperator::ContainedBy | FilterOperator::Overlaps => {
                let rendered = match &self.value {
                    JsonValue::Array(values) => render_array_literal(values),
                    other => render_scalar(other),
                };
                vec![(
                    self.column.clone(),
                    format!("{}.{}", self.op.keyword(), rendered),
                )]
            }
            _ => vec![(
                self.column.clone(),
                format!("{}.{}", self.op.keyword(), render_scalar(&self.value)),
            )],
        }
    }
}

/// One ordering clause; clauses apply left-to-right as tie-breakers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Column to order by
    pub column: String,

    /// Sort direction; defaults to ascending when unspecified
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl Order {
    /// Ascending order on `column`
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on `column`
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Pagination window, resolved to an inclusive row range.
///
/// The two modes are mutually exclusive by construction; a descriptor
/// carries one or the other, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pagination {
    /// 1-based page number with a fixed page size
    Page { page: u64, page_size: u64 },
    /// Explicit offset and row limit
    Offset { offset: u64, limit: u64 },
}

impl Pagination {
    /// Resolve to the inclusive row range `[from, to]` requested from the
    /// backend. `{page: 2, page_size: 10}` and `{offset: 10, limit: 10}`
    /// both resolve to `[10, 19]`.
    pub fn range(&self) -> (u64, u64) {
        match *self {
            Self::Page { page, page_size } => {
                let from = page.saturating_sub(1) * page_size;
                (from, (from + page_size).saturating_sub(1))
            }
            Self::Offset { offset, limit } => (offset, (offset + limit).saturating_sub(1)),
        }
    }
}

/// Row-count mode for `find_all`. Counting is served by a separate
/// head-only request so it never slows down the data fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Exact count (full scan)
    Exact,
    /// Planner estimate
    Planned,
    /// Exact below a threshold, estimated above it
    Estimated,
}

impl CountMode {
    /// Value for the `Prefer` header of the counting request
    pub fn prefer_value(&self) -> &'static str {
        match self {
            Self::Exact => "count=exact",
            Self::Planned => "count=planned",
            Self::Estimated => "count=estimated",
        }
    }
}

/// Declarative description of one table operation.
///
/// # Examples
///
/// ```rust
/// use vizinha_link::{CountMode, Filter, Order, Pagination, Query};
///
/// let query = Query::new()
///     .with_filter(Filter::eq("id_condominio", 7))
///     .with_order(Order::desc("data_criacao"))
///     .with_pagination(Pagination::Page { page: 1, page_size: 20 })
///     .with_count(CountMode::Exact);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    /// Columns to select; supports relation embeds
    /// (e.g. `"*, usuario:usuario(id, nome)"`). Defaults to `*`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,

    /// Conjunctive filters, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,

    /// Ordering clauses, left-to-right
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,

    /// Optional pagination window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    /// Optional row-count request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CountMode>,
}

impl Query {
    /// Create an empty descriptor (select `*`, no filters)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the select clause
    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Append one filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append several filters
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Append one ordering clause
    pub fn with_order(mut self, order: Order) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set the pagination window
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Request a row count alongside the data
    pub fn with_count(mut self, mode: CountMode) -> Self {
        self.count = Some(mode);
        self
    }

    /// The select clause that will be sent (`*` when unset)
    pub fn effective_select(&self) -> &str {
        self.select.as_deref().unwrap_or("*")
    }

    /// Render select, filters and ordering to backend query parameters.
    /// Pagination travels as a `Range` header and counting as a `Prefer`
    /// header, so neither appears here.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.effective_select().to_string())];

        for filter in &self.filters {
            params.extend(filter.to_params());
        }

        if let Some(order) = self.order_param() {
            params.push(("order".to_string(), order));
        }

        params
    }

    /// Render the ordering clauses, e.g. `data_criacao.desc,id.asc`
    pub fn order_param(&self) -> Option<String> {
        if self.order_by.is_empty() {
            return None;
        }
        let rendered: Vec<String> = self
            .order_by
            .iter()
            .map(|order| {
                format!(
                    "{}.{}",
                    order.column,
                    if order.ascending { "asc" } else { "desc" }
                )
            })
            .collect();
        Some(rendered.join(","))
    }
}

/// Render a scalar JSON value as a backend filter literal.
///
/// Strings containing reserved characters are double-quoted so they survive
/// the backend's list/range parsing; structured values render as JSON text.
fn render_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => quote_reserved(s),
        other => other.to_string(),
    }
}

/// Render a value list for `in`, e.g. `(1,2,3)` or `("a","b")`
fn render_list(values: &[JsonValue]) -> String {
    let items: Vec<String> = values.iter().map(render_scalar).collect();
    format!("({})", items.join(","))
}

/// Render an array literal for containment operators, e.g. `{a,b}`
fn render_array_literal(values: &[JsonValue]) -> String {
    let items: Vec<String> = values.iter().map(render_scalar).collect();
    format!("{{{}}}", items.join(","))
}

fn quote_reserved(s: &str) -> String {
    let reserved = s
        .chars()
        .any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\') || c.is_whitespace());
    if reserved {
        let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        s.to_string()
    }
}
