use super::AnalysisSession;
use crate::gateway::ValidationIssue;
use crate::workspace::ArtifactId;

/// Issues the editor should mark against the active artifact.
///
/// Empty unless `session` is a completed validation bound to `active`; this
/// keeps markers from one file showing up on another after a switch. Order is
/// the order the backend reported.
pub fn annotations<'a>(
    active: Option<&ArtifactId>,
    session: Option<&'a AnalysisSession>,
) -> &'a [ValidationIssue] {
    let (Some(active), Some(session)) = (active, session) else {
        return &[];
    };

    if &session.binding.artifact_id != active {
        return &[];
    }

    match session.result().and_then(|outcome| outcome.as_validation()) {
        Some(result) => result.errors.as_slice(),
        None => &[],
    }
}

/// First issue reported for a 1-based line, as shown in the gutter
pub fn issue_for_line(issues: &[ValidationIssue], line: u32) -> Option<&ValidationIssue> {
    issues.iter().find(|issue| issue.line == line)
}
