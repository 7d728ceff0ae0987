use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::SourceSpan;

/// How a target was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TargetScope {
    /// One method or constructor declaration.
    Method,
    /// Every site whose start line falls inside `[start_line, end_line]`.
    LineRange { start_line: u32, end_line: u32 },
}

/// The code whose dependencies are being extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodTarget {
    /// Qualified name of the declaring type.
    pub owner: String,
    pub method_name: String,
    pub signature: String,
    pub source_file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    /// Byte range of the declaration node; `None` for line-range targets.
    pub span: Option<SourceSpan>,
    pub scope: TargetScope,
}

impl MethodTarget {
    pub fn method(
        owner: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
        source_file: PathBuf,
        start_line: u32,
        end_line: u32,
        span: SourceSpan,
    ) -> Self {
        Self {
            owner: owner.into(),
            method_name: method_name.into(),
            signature: signature.into(),
            source_file,
            start_line,
            end_line,
            span: Some(span),
            scope: TargetScope::Method,
        }
    }

    pub fn line_range(
        owner: impl Into<String>,
        source_file: PathBuf,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        let label = format!("lines {}-{}", start_line, end_line);
        Self {
            owner: owner.into(),
            method_name: label.clone(),
            signature: label,
            source_file,
            start_line,
            end_line,
            span: None,
            scope: TargetScope::LineRange {
                start_line,
                end_line,
            },
        }
    }

    /// Whether a site starting on `line` belongs to this target.
    pub fn covers_line(&self, line: u32) -> bool {
        match self.scope {
            TargetScope::Method => true,
            TargetScope::LineRange {
                start_line,
                end_line,
            } => start_line <= line && line <= end_line,
        }
    }

    pub fn is_line_range(&self) -> bool {
        matches!(self.scope, TargetScope::LineRange { .. })
    }

    pub fn qualified_method(&self) -> String {
        format!("{}#{}", self.owner, self.method_name)
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.source_file)
    }

    pub fn location(&self) -> String {
        format!(
            "{}:{}-{}",
            self.source_file.display(),
            self.start_line,
            self.end_line
        )
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Either of the two mutually exclusive ways of choosing a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSelector {
    /// A simple or partially qualified class name plus a method name.
    ByName {
        class_name: String,
        method_name: String,
    },
    /// A method name looked up inside one file.
    InFile { file: PathBuf, method_name: String },
    /// An inclusive line range inside one file.
    ByRange {
        file: PathBuf,
        start_line: u32,
        end_line: u32,
    },
}

impl MethodSelector {
    pub fn by_name(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self::ByName {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }

    pub fn in_file(file: impl Into<PathBuf>, method_name: impl Into<String>) -> Self {
        Self::InFile {
            file: file.into(),
            method_name: method_name.into(),
        }
    }

    pub fn by_range(file: impl Into<PathBuf>, start_line: u32, end_line: u32) -> Self {
        Self::ByRange {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::ByName {
                class_name,
                method_name,
            } => format!("{}#{}", class_name, method_name),
            Self::InFile { file, method_name } => {
                format!("{}#{}", file.display(), method_name)
            }
            Self::ByRange {
                file,
                start_line,
                end_line,
            } => format!("{}:{}-{}", file.display(), start_line, end_line),
        }
    }
}
