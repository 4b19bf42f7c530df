//! Turns the loosely typed `GET /restaurants` query string into a typed
//! filter, sort and page window.
//!
//! Only the parameters named on [`ListQuery`] are ever looked at, and only
//! the columns named by [`SortField`] can be ordered on. Nothing a client
//! sends is interpolated into SQL; stores bind the values this module
//! produces.

use tracing::debug;

use super::dto::ListQuery;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Exact match for a single value, membership for several.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Exact(String),
    AnyOf(Vec<String>),
}

impl Match {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Match::Exact(v) => v == value,
            Match::AnyOf(vs) => vs.iter().any(|v| v == value),
        }
    }

    /// True when any element of `values` is accepted (array fields).
    pub fn accepts_any(&self, values: &[String]) -> bool {
        values.iter().any(|v| self.accepts(v))
    }
}

/// Inclusive numeric bounds; at least one side is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }
}

/// Predicate over the restaurant collection.
///
/// Every filter is implicitly restricted to active restaurants; stores add
/// that condition themselves so no caller can forget it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestaurantFilter {
    /// Free text searched over name, tags and cuisine.
    pub text: Option<String>,
    pub city: Option<Match>,
    pub cuisine: Option<Match>,
    pub price: Option<Range>,
    pub price_level_max: Option<f64>,
    pub rating_gte: Option<f64>,
    pub open_now: Option<bool>,
}

impl RestaurantFilter {
    /// Search terms, tokenized like the searched text; a row matches when
    /// any one of them does.
    pub fn text_terms(&self) -> Vec<String> {
        self.text.as_deref().map(search_words).unwrap_or_default()
    }
}

/// Splits on anything that is not a letter or digit, lowercases and folds
/// accents. Must agree with `restaurant_search_document` in the migrations.
pub fn search_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase().chars().map(fold_accent).collect())
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Columns a client may order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Rating,
    Price,
    Name,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Rating,
        SortField::Price,
        SortField::Name,
        SortField::CreatedAt,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.param() == s)
    }

    /// Name used in the query string.
    pub fn param(self) -> &'static str {
        match self {
            SortField::Rating => "rating",
            SortField::Price => "price",
            SortField::Name => "name",
            SortField::CreatedAt => "createdAt",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Rating => "rating",
            SortField::Price => "price",
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::desc(SortField::CreatedAt)
    }
}

/// Page window, always within `1..` pages and `1..=MAX_LIMIT` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
}

/// Everything the list endpoint needs from the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSpec {
    pub filter: RestaurantFilter,
    pub sort: SortSpec,
    pub pagination: Pagination,
}

impl ListSpec {
    pub fn from_query(q: &ListQuery) -> Self {
        Self {
            filter: build_filter(q),
            sort: resolve_sort(q.sort.as_deref(), q.order.as_deref()),
            pagination: paginate(q.page.as_deref(), q.limit.as_deref()),
        }
    }
}

pub fn build_filter(q: &ListQuery) -> RestaurantFilter {
    let mut filter = RestaurantFilter::default();

    if let Some(text) = q.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        filter.text = Some(text.to_string());
    }

    if let Some(city) = q.city.as_deref().filter(|c| !c.is_empty()) {
        filter.city = Some(Match::Exact(city.to_string()));
    }

    if let Some(raw) = q.cuisine.as_deref() {
        filter.cuisine = parse_list(raw);
    }

    let price = Range {
        min: q.price_min.as_deref().and_then(|v| parse_number("price_min", v)),
        max: q.price_max.as_deref().and_then(|v| parse_number("price_max", v)),
    };
    if price.min.is_some() || price.max.is_some() {
        filter.price = Some(price);
    }

    filter.rating_gte = q.rating_gte.as_deref().and_then(|v| parse_number("rating_gte", v));

    // only the literal "true" filters; "false" leaves open_now unconstrained
    if q.open_now.as_deref() == Some("true") {
        filter.open_now = Some(true);
    }

    filter
}

/// Splits a comma separated list; `None` when no token survives trimming.
pub fn parse_list(raw: &str) -> Option<Match> {
    let mut items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    match items.len() {
        0 => None,
        1 => items.pop().map(Match::Exact),
        _ => Some(Match::AnyOf(items)),
    }
}

fn parse_number(param: &str, raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!(param, value = raw, "ignoring non-numeric bound");
            None
        }
    }
}

pub fn resolve_sort(sort: Option<&str>, order: Option<&str>) -> SortSpec {
    match sort.and_then(SortField::parse) {
        Some(field) => SortSpec {
            field,
            direction: if order == Some("desc") {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        },
        None => SortSpec::default(),
    }
}

pub fn paginate(page: Option<&str>, limit: Option<&str>) -> Pagination {
    let page = page
        .and_then(parse_leading_int)
        .filter(|p| *p != 0)
        .unwrap_or(DEFAULT_PAGE)
        .max(1);
    let limit = limit
        .and_then(parse_leading_int)
        .filter(|l| *l != 0)
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    Pagination {
        page,
        limit,
        skip: (page - 1).saturating_mul(limit),
    }
}

/// `ceil(total / limit)`, never below one.
pub fn total_pages(total: u64, limit: i64) -> u64 {
    let limit = limit.max(1) as u64;
    total.div_ceil(limit).max(1)
}

/// Reads an optionally signed run of decimal digits at the start of `s`,
/// ignoring whatever follows it ("12abc" is 12, "7.9" is 7).
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod query_tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let mut q = ListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "q" => q.q = v,
                "cuisine" => q.cuisine = v,
                "city" => q.city = v,
                "price_min" => q.price_min = v,
                "price_max" => q.price_max = v,
                "rating_gte" => q.rating_gte = v,
                "open_now" => q.open_now = v,
                "sort" => q.sort = v,
                "order" => q.order = v,
                "page" => q.page = v,
                "limit" => q.limit = v,
                other => panic!("unknown param {other}"),
            }
        }
        q
    }

    #[test]
    fn empty_query_has_no_predicates() {
        assert_eq!(build_filter(&ListQuery::default()), RestaurantFilter::default());
    }

    #[test]
    fn cuisine_list_is_trimmed() {
        let f = build_filter(&query(&[("cuisine", "mexican, thai")]));
        assert_eq!(
            f.cuisine,
            Some(Match::AnyOf(vec!["mexican".into(), "thai".into()]))
        );
    }

    #[test]
    fn single_cuisine_is_exact() {
        let f = build_filter(&query(&[("cuisine", " bbq ,")]));
        assert_eq!(f.cuisine, Some(Match::Exact("bbq".into())));
    }

    #[test]
    fn blank_cuisine_tokens_mean_no_predicate() {
        assert_eq!(build_filter(&query(&[("cuisine", " , ,")])).cuisine, None);
        assert_eq!(build_filter(&query(&[("cuisine", "")])).cuisine, None);
    }

    #[test]
    fn whitespace_only_search_is_dropped() {
        assert_eq!(build_filter(&query(&[("q", "   ")])).text, None);
        let f = build_filter(&query(&[("q", "  Tacos al pastor ")]));
        assert_eq!(f.text.as_deref(), Some("Tacos al pastor"));
        assert_eq!(f.text_terms(), vec!["tacos", "al", "pastor"]);
    }

    #[test]
    fn search_terms_split_on_punctuation_and_fold_accents() {
        let f = build_filter(&query(&[("q", "TAQUERÍA,tacos! año")]));
        assert_eq!(f.text_terms(), vec!["taqueria", "tacos", "ano"]);

        let f = build_filter(&query(&[("q", "!!")]));
        assert_eq!(f.text.as_deref(), Some("!!"));
        assert!(f.text_terms().is_empty());
    }

    #[test]
    fn city_is_exact() {
        let f = build_filter(&query(&[("city", "Monterrey")]));
        assert_eq!(f.city, Some(Match::Exact("Monterrey".into())));
        assert!(f.city.as_ref().unwrap().accepts("Monterrey"));
        assert!(!f.city.unwrap().accepts("monterrey"));
    }

    #[test]
    fn price_bounds_combine_into_one_range() {
        let f = build_filter(&query(&[("price_min", "100"), ("price_max", "350.5")]));
        assert_eq!(
            f.price,
            Some(Range {
                min: Some(100.0),
                max: Some(350.5)
            })
        );

        let f = build_filter(&query(&[("price_max", "200")]));
        assert_eq!(f.price, Some(Range { min: None, max: Some(200.0) }));
    }

    #[test]
    fn invalid_numbers_are_treated_as_absent() {
        let f = build_filter(&query(&[
            ("price_min", "cheap"),
            ("price_max", "NaN"),
            ("rating_gte", "inf"),
        ]));
        assert_eq!(f.price, None);
        assert_eq!(f.rating_gte, None);

        let f = build_filter(&query(&[("price_min", "abc"), ("price_max", "50")]));
        assert_eq!(f.price, Some(Range { min: None, max: Some(50.0) }));
    }

    #[test]
    fn rating_lower_bound() {
        let f = build_filter(&query(&[("rating_gte", "4.5")]));
        assert_eq!(f.rating_gte, Some(4.5));
    }

    #[test]
    fn only_literal_true_filters_open_now() {
        assert_eq!(build_filter(&query(&[("open_now", "true")])).open_now, Some(true));
        for v in ["false", "TRUE", "1", "yes", ""] {
            assert_eq!(build_filter(&query(&[("open_now", v)])).open_now, None, "{v}");
        }
    }

    #[test]
    fn sort_allow_list() {
        assert_eq!(
            resolve_sort(Some("rating"), Some("desc")),
            SortSpec::desc(SortField::Rating)
        );
        assert_eq!(
            resolve_sort(Some("name"), None),
            SortSpec {
                field: SortField::Name,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(
            resolve_sort(Some("price"), Some("DESC")).direction,
            SortDirection::Asc
        );
        assert_eq!(resolve_sort(Some("createdAt"), Some("asc")).field, SortField::CreatedAt);
    }

    #[test]
    fn unknown_sort_field_falls_back_to_newest_first() {
        for s in ["unknownField", "is_active", "$where", "created_at", ""] {
            assert_eq!(resolve_sort(Some(s), Some("asc")), SortSpec::default(), "{s}");
        }
        assert_eq!(resolve_sort(None, Some("asc")), SortSpec::desc(SortField::CreatedAt));
    }

    #[test]
    fn pagination_defaults() {
        assert_eq!(
            paginate(None, None),
            Pagination {
                page: 1,
                limit: 10,
                skip: 0
            }
        );
        assert_eq!(paginate(Some("abc"), Some("xyz")), paginate(None, None));
        assert_eq!(paginate(Some("0"), Some("0")), paginate(None, None));
    }

    #[test]
    fn pagination_clamps() {
        assert_eq!(paginate(Some("-4"), None).page, 1);
        assert_eq!(paginate(None, Some("-5")).limit, 1);
        assert_eq!(paginate(None, Some("1000")).limit, MAX_LIMIT);
        assert_eq!(paginate(None, Some("99999999999999999999999")).limit, MAX_LIMIT);
    }

    #[test]
    fn pagination_reads_leading_integer() {
        let p = paginate(Some("3rd"), Some("20.9"));
        assert_eq!(p.page, 3);
        assert_eq!(p.limit, 20);
        assert_eq!(p.skip, 40);
    }

    #[test]
    fn skip_is_previous_pages_times_limit() {
        for page in 1..=5i64 {
            for limit in [1i64, 7, 10, 100] {
                let p = paginate(Some(&page.to_string()), Some(&limit.to_string()));
                assert_eq!(p.skip, (page - 1) * limit);
            }
        }
    }

    #[test]
    fn total_pages_is_ceiling_with_floor_of_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(250, 100), 3);
        assert_eq!(total_pages(2, 2), 1);
    }

    #[test]
    fn list_spec_collects_all_three_parts() {
        let spec = ListSpec::from_query(&query(&[
            ("city", "Monterrey"),
            ("cuisine", "mexican,bbq"),
            ("sort", "rating"),
            ("order", "desc"),
            ("page", "1"),
            ("limit", "2"),
        ]));
        assert_eq!(spec.filter.city, Some(Match::Exact("Monterrey".into())));
        assert_eq!(spec.sort, SortSpec::desc(SortField::Rating));
        assert_eq!(spec.pagination, Pagination { page: 1, limit: 2, skip: 0 });
    }

    #[test]
    fn range_contains_is_inclusive() {
        let r = Range { min: Some(1.0), max: Some(3.0) };
        assert!(r.contains(1.0));
        assert!(r.contains(3.0));
        assert!(!r.contains(3.01));
        assert!(Range { min: None, max: Some(2.0) }.contains(-10.0));
    }
}
