use std::fmt;

/// A schema name, optionally qualified by its module.
///
/// Names written in a query may omit the module (`Issue`) or use an alias
/// (`t::Issue`); names stored in the schema are always fully qualified
/// (`test::Issue`).
///
/// # Examples
///
/// ```
/// use edgeql_core::QualifiedName;
///
/// let name = QualifiedName::parse("std::bool");
/// assert_eq!(name.module(), Some("std"));
/// assert_eq!(name.name(), "bool");
/// assert_eq!(name.to_string(), "std::bool");
///
/// let bare = QualifiedName::parse("Issue");
/// assert!(bare.module().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    module: Option<String>,
    name: String,
}

impl QualifiedName {
    /// A name qualified by `module`.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            name: name.into(),
        }
    }

    /// A name with no module qualifier.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            module: None,
            name: name.into(),
        }
    }

    /// Parse `module::name` or a bare `name`.
    ///
    /// Only the last `::` separates the module, so a dotted module path such
    /// as `a::b::T` keeps `a::b` as its module.
    pub fn parse(s: &str) -> Self {
        match s.rsplit_once("::") {
            Some((module, name)) if !module.is_empty() => Self::new(module, name),
            Some((_, name)) => Self::unqualified(name),
            None => Self::unqualified(s),
        }
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_qualified(&self) -> bool {
        self.module.is_some()
    }

    /// The same simple name placed in `module`.
    pub fn with_module(&self, module: impl Into<String>) -> Self {
        Self::new(module, self.name.clone())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}::{}", module, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
