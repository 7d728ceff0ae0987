use serde::{Deserialize, Serialize};

pub const JAVA_LANG_STRING: &str = "java.lang.String";
pub const JAVA_LANG_CLASS: &str = "java.lang.Class";
pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// The static type of an expression, as far as source analysis can tell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ResolvedType {
    Primitive(String),
    /// A class, interface, enum, record or annotation, by qualified name.
    Reference(String),
    Array(Box<ResolvedType>),
    TypeVariable(String),
    Null,
    Void,
}

impl ResolvedType {
    pub fn reference(qualified_name: impl Into<String>) -> Self {
        Self::Reference(qualified_name.into())
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    pub fn string() -> Self {
        Self::Reference(JAVA_LANG_STRING.to_string())
    }

    pub fn array_of(element: ResolvedType, dimensions: usize) -> Self {
        (0..dimensions).fold(element, |inner, _| Self::Array(Box::new(inner)))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Qualified name when this is a plain reference type (not an array).
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            Self::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Qualified name of the reference type at the bottom of any array nesting.
    pub fn innermost_reference(&self) -> Option<&str> {
        match self {
            Self::Reference(name) => Some(name),
            Self::Array(element) => element.innermost_reference(),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&ResolvedType> {
        match self {
            Self::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(name) | Self::Reference(name) | Self::TypeVariable(name) => {
                name.clone()
            }
            Self::Array(element) => format!("{}[]", element.describe()),
            Self::Null => "null".to_string(),
            Self::Void => "void".to_string(),
        }
    }
}

impl std::fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Which resolver in the chain produced a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeOrigin {
    Source,
    Archive,
    Platform,
}

impl TypeOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeOrigin::Source => "source",
            TypeOrigin::Archive => "archive",
            TypeOrigin::Platform => "platform",
        }
    }
}

impl std::fmt::Display for TypeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_nests_dimensions() {
        let ty = ResolvedType::array_of(ResolvedType::reference("pkg.Foo"), 2);

        assert_eq!(ty.describe(), "pkg.Foo[][]");
        assert_eq!(ty.innermost_reference(), Some("pkg.Foo"));
        assert_eq!(ty.qualified_name(), None);
    }

    #[test]
    fn test_primitive_has_no_reference() {
        let ty = ResolvedType::primitive("int");

        assert!(!ty.is_reference());
        assert_eq!(ty.innermost_reference(), None);
    }
}
