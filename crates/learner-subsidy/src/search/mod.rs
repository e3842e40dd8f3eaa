//! Filter-string assembly for the search provider.

/// Fluent builder for search filter expressions.
///
/// Clauses are joined with `AND`; `or` groups are parenthesized. Empty inputs
/// are skipped, so optional filters can be chained unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterBuilder {
    clauses: Vec<String>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, attribute: &str, value: &str) -> Self {
        if !attribute.is_empty() && !value.is_empty() {
            self.clauses.push(format!("{attribute}:{value}"));
        }
        self
    }

    pub fn or<V: AsRef<str>>(mut self, attribute: &str, values: &[V]) -> Self {
        if attribute.is_empty() {
            return self;
        }

        let terms: Vec<String> = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|value| !value.is_empty())
            .map(|value| format!("{attribute}:{value}"))
            .collect();

        if !terms.is_empty() {
            self.clauses.push(format!("({})", terms.join(" OR ")));
        }
        self
    }

    pub fn and_raw(mut self, clause: &str) -> Self {
        let clause = clause.trim();
        if !clause.is_empty() {
            self.clauses.push(clause.to_string());
        }
        self
    }

    pub fn enterprise_customer(self, enterprise_uuid: &str) -> Self {
        self.and("enterprise_customer_uuids", enterprise_uuid)
    }

    pub fn catalog_query_uuids<V: AsRef<str>>(self, catalog_query_uuids: &[V]) -> Self {
        self.or("enterprise_catalog_query_uuids", catalog_query_uuids)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn build(&self) -> String {
        self.clauses.join(" AND ")
    }
}
