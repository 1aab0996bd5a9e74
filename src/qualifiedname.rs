//! Qualified names: dotted paths that uniquely identify a declaration.
//!
//! A QN such as `project.package.module.Class.method` is the universal key
//! used by every table in the pipeline (Function Registry, Class Inheritance
//! Table, Import Map). Internally the separator is always `.`; ecosystems
//! that natively use `::` get that form only at the graph-writer boundary
//! (see [`Qn::to_wire_form`]).

use compact_str::CompactString;
use smallvec::SmallVec;

/// A dotted qualified name, stored as its component parts to avoid repeated
/// splitting during resolution (inheritance walks and suffix lookups both
/// need the component list).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qn {
    parts: SmallVec<[CompactString; 6]>,
}

impl Qn {
    /// Parses a dotted string into a `Qn`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self {
            parts: s.split('.').map(CompactString::from).collect(),
        }
    }

    /// Builds a `Qn` from an explicit component list.
    #[must_use]
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends one more component, returning a new `Qn`.
    #[must_use]
    pub fn join(&self, component: &str) -> Self {
        let mut parts = self.parts.clone();
        parts.push(CompactString::from(component));
        Self { parts }
    }

    /// Returns the dotted-path components.
    #[must_use]
    pub fn components(&self) -> &[CompactString] {
        &self.parts
    }

    /// Number of dotted components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True if this QN has no components (should not occur for valid QNs).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the parent QN (all but the last component), if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.parts.len() <= 1 {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].into(),
        })
    }

    /// Renders the QN in its internal dotted form.
    #[must_use]
    pub fn to_dotted(&self) -> String {
        self.parts.join(".")
    }

    /// Renders the QN using `::` as the separator, for ecosystems that
    /// natively use it at the graph-writer boundary.
    #[must_use]
    pub fn to_wire_form(&self, separator: &str) -> String {
        self.parts.join(separator)
    }

    /// Returns true if `self` lies within `package` (i.e. `self`'s dotted
    /// form starts with `package.`). Used by the import-distance heuristic
    /// to give a bonus to candidates in the caller's own parent package.
    #[must_use]
    pub fn is_within_package(&self, package: &Qn) -> bool {
        self.to_dotted()
            .starts_with(&format!("{}.", package.to_dotted()))
    }
}

impl std::fmt::Display for Qn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

impl From<&str> for Qn {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Qn {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_dotted() {
        let qn = Qn::parse("project.a.b.f");
        assert_eq!(qn.components().len(), 4);
        assert_eq!(qn.to_dotted(), "project.a.b.f");
    }

    #[test]
    fn wire_form_uses_requested_separator() {
        let qn = Qn::parse("project.a.b.f");
        assert_eq!(qn.to_wire_form("::"), "project::a::b::f");
    }

    #[test]
    fn join_appends_a_component() {
        let qn = Qn::parse("project.a");
        let joined = qn.join("b");
        assert_eq!(joined.to_dotted(), "project.a.b");
    }

    #[test]
    fn parent_strips_last_component() {
        let qn = Qn::parse("project.a.b");
        assert_eq!(qn.parent().unwrap().to_dotted(), "project.a");
        assert_eq!(Qn::parse("project").parent(), None);
    }
}
