//! Path parameters extracted during routing.

/// A single URL parameter, a key and a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, without the `:` or `*` marker.
    pub key: String,
    /// Matched path segment (or suffix, for a catch-all).
    pub value: String,
}

/// The ordered list of parameters matched from a path, in registration
/// order of the wildcards within the route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<Param>);

impl Params {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Returns the value of the first parameter named `key`, or an empty
    /// string when no such parameter was matched.
    pub fn by_name(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|param| param.key == key)
            .map_or("", |param| param.value.as_str())
    }

    /// Parses the first parameter named `key` as a numeric id.
    ///
    /// Returns zero when the parameter is missing or not an integer, so
    /// callers can treat "absent" and "malformed" alike.
    pub fn as_id(&self, key: &str) -> i64 {
        self.by_name(key).parse().unwrap_or(0)
    }

    /// Returns an iterator over the parameters in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }

    /// Returns the number of matched parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no parameters were matched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        let mut params = Params::new();
        params.push("name", "gopher");
        params.push("id", "42");

        assert_eq!(params.by_name("name"), "gopher");
        assert_eq!(params.by_name("id"), "42");
        assert_eq!(params.by_name("missing"), "");
    }

    #[test]
    fn test_first_match_wins() {
        let mut params = Params::new();
        params.push("id", "1");
        params.push("id", "2");

        assert_eq!(params.by_name("id"), "1");
    }

    #[test]
    fn test_as_id() {
        let mut params = Params::new();
        params.push("id", "42");
        params.push("slug", "hello-world");

        assert_eq!(params.as_id("id"), 42);
        assert_eq!(params.as_id("slug"), 0);
        assert_eq!(params.as_id("missing"), 0);
    }

    #[test]
    fn test_order_preserved() {
        let mut params = Params::new();
        params.push("dir", "js");
        params.push("filepath", "/inc/framework.js");

        let keys: Vec<&str> = params.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["dir", "filepath"]);
    }
}
