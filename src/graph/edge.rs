use super::Predicate;

/// A directed transition between two named nodes. An edge with no
/// predicate is unconditional (spec.md §3, "Edge").
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub name: Option<String>,
    pub predicate: Option<Predicate>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, predicate: Option<Predicate>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            name: None,
            predicate,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Unconditional edges behave as predicate-true (spec.md §4.4 edge-case
    /// policies).
    pub fn matches(&self, state: &crate::state::State) -> bool {
        match &self.predicate {
            Some(p) => p.evaluate(state),
            None => true,
        }
    }
}
