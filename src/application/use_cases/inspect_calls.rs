use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};

use super::{ClassLocationCache, LocateMethodUseCase};
use crate::application::SourceIndex;
use crate::domain::{CallInspection, CallSite, DomainError, MethodCallSite, Resolution, SiteKind};

/// Use case: list every method call in a line range with its declaring class.
pub struct InspectCallsUseCase {
    index: Rc<dyn SourceIndex>,
    locator: Rc<LocateMethodUseCase>,
    locations: Rc<ClassLocationCache>,
}

impl InspectCallsUseCase {
    pub fn new(
        index: Rc<dyn SourceIndex>,
        locator: Rc<LocateMethodUseCase>,
        locations: Rc<ClassLocationCache>,
    ) -> Self {
        Self {
            index,
            locator,
            locations,
        }
    }

    pub fn inspect(
        &self,
        file: &Path,
        start_line: u32,
        end_line: u32,
    ) -> Result<CallInspection, DomainError> {
        // Types declared in files named differently are found through the map.
        self.locations.locations();

        let target = self.locator.by_range(file, start_line, end_line)?;
        let sites = self.index.expression_sites(&target)?;

        let method_calls: Vec<CallSite> = sites
            .iter()
            .filter_map(|site| match &site.kind {
                SiteKind::MethodCall(call) => Some(call_site(call, site.line, site.column)),
                _ => None,
            })
            .collect();

        info!(
            "Found {} method calls in {}:{}-{}",
            method_calls.len(),
            file.display(),
            start_line,
            end_line
        );

        Ok(CallInspection {
            file_path: target.source_file,
            start_line,
            end_line,
            method_calls,
        })
    }
}

fn call_site(call: &MethodCallSite, line: u32, column: u32) -> CallSite {
    let mut info = match &call.resolution {
        Resolution::Resolved(method) => {
            let mut info = CallSite::new(call.name.as_str(), line, column).with_owner(&method.owner);
            info.resolved = true;
            info
        }
        Resolution::ScopeOnly { owner, reason } => {
            debug!("Call `{}` at line {} resolved through its receiver only", call.name, line);
            let mut info = CallSite::new(call.name.as_str(), line, column).with_owner(owner);
            info.error_message = Some(format!("{}; scope: {}", reason, owner));
            info
        }
        Resolution::Unresolved { scope_text, reason } => {
            let mut info = CallSite::new(call.name.as_str(), line, column);
            info.error_message = Some(match scope_text {
                Some(scope) => format!("{}; scope: {}", reason, scope),
                None => reason.to_string(),
            });
            info
        }
    };
    info.argument_owners = call.argument_owners.clone();
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MethodRef, ResolutionError};

    fn method_call(resolution: Resolution<MethodRef>) -> MethodCallSite {
        MethodCallSite {
            name: "save".to_string(),
            arity: 1,
            receiver: None,
            receiver_text: Some("repo".to_string()),
            resolution,
            argument_owners: vec!["app.Limits".to_string()],
        }
    }

    #[test]
    fn test_resolved_call_has_owner_details() {
        let call = method_call(Resolution::Resolved(MethodRef {
            owner: "app.data.Repo".to_string(),
            name: "save".to_string(),
            signature: "save(Order)".to_string(),
        }));

        let info = call_site(&call, 4, 9);

        assert!(info.resolved);
        assert_eq!(info.class_qualified_name.as_deref(), Some("app.data.Repo"));
        assert_eq!(info.package_name.as_deref(), Some("app.data"));
        assert_eq!(info.argument_owners, vec!["app.Limits".to_string()]);
    }

    #[test]
    fn test_unresolved_call_keeps_scope_text() {
        let call = method_call(Resolution::Unresolved {
            scope_text: Some("repo".to_string()),
            reason: ResolutionError::unknown_symbol("repo"),
        });

        let info = call_site(&call, 4, 9);

        assert!(!info.resolved);
        assert!(info.class_qualified_name.is_none());
        assert!(info.error_message.unwrap().contains("scope: repo"));
    }

    #[test]
    fn test_scope_only_call_is_not_resolved() {
        let call = method_call(Resolution::ScopeOnly {
            owner: "lib.Client".to_string(),
            reason: ResolutionError::OpaqueType("lib.Client".to_string()),
        });

        let info = call_site(&call, 1, 1);

        assert!(!info.resolved);
        assert_eq!(info.declaring_class.as_deref(), Some("Client"));
    }
}
