//! Path and query-string encoding.
//!
//! Query values are form-encoded: every byte other than ASCII alphanumerics
//! and `-_.~` is percent-encoded and spaces become `+`. Path segments use the
//! same set with spaces as `%20`, so `/` and `:` never split a segment.

use std::borrow::Cow;

/// Ordered list of query parameters. Absent values are dropped when added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn opt_param<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Adds one `key=value` pair per item.
    pub fn params<I>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        for value in values {
            self = self.param(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", encode_form(key), encode_form(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path?query`, or `path` unchanged when no parameter is present.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.encode())
        }
    }
}

/// Percent-encodes a single path segment with an empty safe set.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

fn encode_form(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_leaves_path_alone() {
        assert_eq!(Query::new().append_to("/v2/topics"), "/v2/topics");
        let none: Option<&str> = None;
        assert_eq!(
            Query::new().opt_param("cursor", none).append_to("/v2/topics"),
            "/v2/topics"
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let query = Query::new().param("limit", 50).param("cursor", "abc");
        assert_eq!(query.append_to("/v2/members"), "/v2/members?limit=50&cursor=abc");
    }

    #[test]
    fn absent_values_are_omitted() {
        let query = Query::new()
            .param("limit", 10)
            .opt_param::<String>("cursor", None);
        assert_eq!(query.encode(), "limit=10");
    }

    #[test]
    fn list_values_repeat_the_key() {
        let query = Query::new().params("id", ["a", "b", "c"]);
        assert_eq!(query.encode(), "id=a&id=b&id=c");
    }

    #[test]
    fn values_are_form_encoded() {
        let query = Query::new().param("cursor", "a b/c+d=e&f~g");
        assert_eq!(query.encode(), "cursor=a+b%2Fc%2Bd%3De%26f~g");
    }

    #[test]
    fn segment_encoding_escapes_reserved_characters() {
        assert_eq!(encode_segment("bot-1:project/42"), "bot-1%3Aproject%2F42");
        assert_eq!(encode_segment("a b"), "a%20b");
        assert_eq!(encode_segment("plain-id_1.2~3"), "plain-id_1.2~3");
    }

    #[test]
    fn segment_encoding_handles_utf8() {
        assert_eq!(encode_segment("ü"), "%C3%BC");
    }
}
