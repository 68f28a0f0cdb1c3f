//! Query-parameter filtering shared by every list endpoint.
//!
//! A [`Filter`] is a conjunction of predicates built from optional query
//! parameters. A parameter that is absent, blank or `"all"` adds no predicate,
//! so dropping a parameter can only widen the result.

/// Query value that disables a filter.
pub const ALL: &str = "all";

/// Records that take part in free-text search.
pub trait Searchable {
    fn title(&self) -> &str;
    fn body(&self) -> &str;
    fn tags(&self) -> &[String];
}

/// Normalise a raw query parameter: `None` means "no constraint".
pub fn active_param(param: Option<&str>) -> Option<String> {
    param
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != ALL)
        .map(str::to_string)
}

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;

pub struct Filter<'a, T> {
    predicates: Vec<Predicate<'a, T>>,
}

impl<T> Default for Filter<'_, T> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<'a, T: 'a> Filter<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pred(item, value)` when `param` is active.
    pub fn when<F>(mut self, param: Option<&str>, pred: F) -> Self
    where
        F: Fn(&T, &str) -> bool + Send + Sync + 'a,
    {
        if let Some(value) = active_param(param) {
            self.predicates.push(Box::new(move |item| pred(item, &value)));
        }
        self
    }

    /// Exact match against the wire representation of a field.
    pub fn eq<F>(self, param: Option<&str>, field: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'a,
    {
        self.when(param, move |item, value| field(item) == value)
    }

    /// Membership of the parameter in a list field.
    pub fn contains<F>(self, param: Option<&str>, list: F) -> Self
    where
        F: Fn(&T) -> &[String] + Send + Sync + 'a,
    {
        self.when(param, move |item, value| list(item).iter().any(|v| v == value))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|pred| pred(item))
    }

    /// Keep matching items, preserving their order.
    pub fn apply(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

impl<'a, T: Searchable + 'a> Filter<'a, T> {
    /// Case-insensitive substring search over title, body and tags.
    pub fn search(self, param: Option<&str>) -> Self {
        self.when(param, |item, needle| text_matches(item, needle))
    }
}

pub fn text_matches<T: Searchable>(item: &T, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    item.title().to_lowercase().contains(&needle)
        || item.body().to_lowercase().contains(&needle)
        || item
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        title: String,
        body: String,
        tags: Vec<String>,
        status: &'static str,
        contexts: Vec<String>,
    }

    impl Searchable for Card {
        fn title(&self) -> &str {
            &self.title
        }
        fn body(&self) -> &str {
            &self.body
        }
        fn tags(&self) -> &[String] {
            &self.tags
        }
    }

    fn card(title: &str, status: &'static str, tags: &[&str], contexts: &[&str]) -> Card {
        Card {
            title: title.to_string(),
            body: format!("{title} body"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            status,
            contexts: contexts.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn deck() -> Vec<Card> {
        vec![
            card("Write proposal", "active", &["work"], &["@computer"]),
            card("Call mom", "active", &["family"], &["@phone", "@home"]),
            card("Groceries", "completed", &["Errands"], &["@errands"]),
            card("Workout", "active", &["health", "routine"], &["@home"]),
        ]
    }

    fn build<'a>(status: Option<&str>, context: Option<&str>, search: Option<&str>) -> Filter<'a, Card> {
        Filter::new()
            .eq(status, |c: &Card| c.status.to_string())
            .contains(context, |c: &Card| c.contexts.as_slice())
            .search(search)
    }

    #[test]
    fn absent_and_all_params_impose_nothing() {
        let filter = build(None, Some("all"), Some("  "));
        assert!(filter.is_empty());
        assert_eq!(filter.apply(deck()), deck());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let result = build(Some("active"), Some("@home"), None).apply(deck());
        let titles: Vec<_> = result.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Call mom", "Workout"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_body_and_tags() {
        assert_eq!(build(None, None, Some("CALL")).apply(deck()).len(), 1);
        assert_eq!(build(None, None, Some("errands")).apply(deck()).len(), 1);
        assert_eq!(build(None, None, Some("body")).apply(deck()).len(), 4);
    }

    #[test]
    fn unknown_value_matches_nothing() {
        assert!(build(Some("bogus"), None, None).apply(deck()).is_empty());
    }

    #[test]
    fn every_combination_is_a_subset_and_dropping_a_param_widens() {
        let statuses = [None, Some("active"), Some("completed"), Some("all")];
        let contexts = [None, Some("@home"), Some("@phone")];
        let searches = [None, Some("o"), Some("work")];

        for status in statuses {
            for context in contexts {
                for search in searches {
                    let full = build(status, context, search).apply(deck());
                    for item in &full {
                        assert!(deck().contains(item));
                        assert!(build(status, context, search).matches(item));
                    }

                    let without_status = build(None, context, search).apply(deck());
                    let without_context = build(status, None, search).apply(deck());
                    let without_search = build(status, context, None).apply(deck());
                    for item in &full {
                        assert!(without_status.contains(item));
                        assert!(without_context.contains(item));
                        assert!(without_search.contains(item));
                    }
                }
            }
        }
    }
}
