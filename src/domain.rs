use serde::{Deserialize, Serialize};
use url::Url;

use crate::rows::{RowContent, RowData};

/// Which editor a row list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowDomain {
    Query,
    #[default]
    Header,
    Cookie,
    Auth,
    Context,
}

impl RowDomain {
    pub const ALL: [RowDomain; 5] = [
        RowDomain::Query,
        RowDomain::Header,
        RowDomain::Cookie,
        RowDomain::Auth,
        RowDomain::Context,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RowDomain::Query => "Params",
            RowDomain::Header => "Headers",
            RowDomain::Cookie => "Cookies",
            RowDomain::Auth => "Auth",
            RowDomain::Context => "Context",
        }
    }

    /// File stem used when the rows of this domain are stored on disk.
    pub fn file_stem(&self) -> &'static str {
        match self {
            RowDomain::Query => "query",
            RowDomain::Header => "headers",
            RowDomain::Cookie => "cookies",
            RowDomain::Auth => "auth",
            RowDomain::Context => "context",
        }
    }

    pub fn next(&self) -> RowDomain {
        match self {
            RowDomain::Query => RowDomain::Header,
            RowDomain::Header => RowDomain::Cookie,
            RowDomain::Cookie => RowDomain::Auth,
            RowDomain::Auth => RowDomain::Context,
            RowDomain::Context => RowDomain::Query,
        }
    }
}

/// Enabled rows with a non-empty key, as `(key, value)` in row order.
pub fn enabled_pairs(rows: &[RowData]) -> Vec<(&str, &str)> {
    rows.iter()
        .filter(|r| r.enabled && !r.key.is_empty())
        .map(|r| (r.key.as_str(), r.value.as_str()))
        .collect()
}

/// `Cookie` header value built from the enabled cookie rows.
pub fn cookie_header(rows: &[RowData]) -> Option<String> {
    let pairs = enabled_pairs(rows);
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Query parameters of `url` as row contents. Unparseable URLs yield none.
pub fn rows_from_url(url: &str) -> Vec<RowContent> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };
    parsed
        .query_pairs()
        .map(|(k, v)| RowContent::new(k.into_owned(), v.into_owned()))
        .collect()
}

/// Rewrite the query string of `url` from the enabled rows. Disabled rows are
/// left out; an unparseable URL is returned unchanged.
pub fn apply_query(url: &str, rows: &[RowData]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let pairs = enabled_pairs(rows);
    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, &str, bool)]) -> Vec<RowData> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (k, v, enabled))| {
                let mut content = RowContent::new(*k, *v);
                content.enabled = *enabled;
                RowData::new(content, i)
            })
            .collect()
    }

    #[test]
    fn test_enabled_pairs_skip_disabled_and_blank() {
        let rows = rows(&[("a", "1", true), ("b", "2", false), ("", "3", true)]);
        assert_eq!(enabled_pairs(&rows), vec![("a", "1")]);
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let rows = rows(&[("sid", "abc", true), ("theme", "dark", true)]);
        assert_eq!(cookie_header(&rows).as_deref(), Some("sid=abc; theme=dark"));
        assert_eq!(cookie_header(&[]), None);
    }

    #[test]
    fn test_rows_from_url() {
        let parsed = rows_from_url("https://example.com/api?page=2&q=rust%20lang");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].key, "q");
        assert_eq!(parsed[1].value, "rust lang");
        assert!(rows_from_url("not a url").is_empty());
    }

    #[test]
    fn test_apply_query_follows_row_order() {
        let rows = rows(&[("b", "2", true), ("a", "1", true), ("c", "3", false)]);
        assert_eq!(
            apply_query("https://example.com/api?old=1", &rows),
            "https://example.com/api?b=2&a=1"
        );
    }

    #[test]
    fn test_apply_query_without_rows_drops_query() {
        assert_eq!(
            apply_query("https://example.com/api?old=1", &[]),
            "https://example.com/api"
        );
        assert_eq!(apply_query("::bad", &[]), "::bad");
    }

    #[test]
    fn test_domain_cycle_visits_all() {
        let mut d = RowDomain::Query;
        for expected in RowDomain::ALL.iter().skip(1) {
            d = d.next();
            assert_eq!(d, *expected);
        }
        assert_eq!(d.next(), RowDomain::Query);
    }
}
