use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One method call found inside an inspected line range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
    pub method_name: String,
    pub line: u32,
    pub column: u32,
    /// Simple name of the class declaring the invoked method.
    pub declaring_class: Option<String>,
    /// `pkg.Type.method` when the declaration was found.
    pub qualified_name: Option<String>,
    pub class_qualified_name: Option<String>,
    pub package_name: Option<String>,
    /// Declaring classes of field-access arguments.
    pub argument_owners: Vec<String>,
    pub resolved: bool,
    pub error_message: Option<String>,
}

impl CallSite {
    pub fn new(method_name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            method_name: method_name.into(),
            line,
            column,
            declaring_class: None,
            qualified_name: None,
            class_qualified_name: None,
            package_name: None,
            argument_owners: Vec::new(),
            resolved: false,
            error_message: None,
        }
    }

    /// Fills in the owner fields from a qualified class name.
    pub fn with_owner(mut self, class_qualified_name: &str) -> Self {
        let (package, simple) = match class_qualified_name.rsplit_once('.') {
            Some((package, simple)) => (Some(package.to_string()), simple),
            None => (None, class_qualified_name),
        };
        self.declaring_class = Some(simple.to_string());
        self.qualified_name = Some(format!("{}.{}", class_qualified_name, self.method_name));
        self.class_qualified_name = Some(class_qualified_name.to_string());
        self.package_name = package;
        self
    }
}

/// All calls inside `[start_line, end_line]` of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInspection {
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub method_calls: Vec<CallSite>,
}

impl CallInspection {
    pub fn unresolved(&self) -> impl Iterator<Item = &CallSite> {
        self.method_calls.iter().filter(|c| !c.resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_owner_splits_package() {
        let call = CallSite::new("process", 12, 9).with_owner("com.acme.util.Helper");

        assert_eq!(call.declaring_class.as_deref(), Some("Helper"));
        assert_eq!(call.package_name.as_deref(), Some("com.acme.util"));
        assert_eq!(
            call.qualified_name.as_deref(),
            Some("com.acme.util.Helper.process")
        );
    }

    #[test]
    fn test_with_owner_default_package() {
        let call = CallSite::new("run", 1, 1).with_owner("Main");

        assert_eq!(call.declaring_class.as_deref(), Some("Main"));
        assert!(call.package_name.is_none());
    }
}
