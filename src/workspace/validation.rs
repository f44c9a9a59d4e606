use log::*;
use regex::Regex;

const MAX_ID_BYTES: usize = 1500;
const RESERVED_PATTERN: &str = r"^__.*__$";

/// Reasons a workspace id is rejected before any request is made.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Workspace name cannot be empty")]
    Blank,

    #[error("Workspace name cannot contain '/'")]
    ContainsSlash,

    #[error("Workspace name cannot be '.' or '..'")]
    DotSegment,

    #[error("Workspace names of the form __name__ are reserved")]
    Reserved,

    #[error("Workspace name is too long ({0} bytes, at most 1500)")]
    TooLong(usize),
}

/// Trim and check a workspace id, returning the id to use.
///
pub fn validate_workspace_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::Blank);
    }
    if id.contains('/') {
        return Err(ValidationError::ContainsSlash);
    }
    if id == "." || id == ".." {
        return Err(ValidationError::DotSegment);
    }
    if is_reserved(id) {
        return Err(ValidationError::Reserved);
    }
    if id.len() > MAX_ID_BYTES {
        return Err(ValidationError::TooLong(id.len()));
    }
    Ok(id.to_owned())
}

fn is_reserved(id: &str) -> bool {
    match Regex::new(RESERVED_PATTERN) {
        Ok(re) => re.is_match(id),
        Err(e) => {
            warn!("Failed to compile regex pattern '{}': {}", RESERVED_PATTERN, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims_plain_names() {
        assert_eq!(validate_workspace_id("  team-alpha ").unwrap(), "team-alpha");
        assert_eq!(validate_workspace_id("Ünïcode space").unwrap(), "Ünïcode space");
        assert_eq!(validate_workspace_id("__half").unwrap(), "__half");
        assert_eq!(validate_workspace_id("___").unwrap(), "___");
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(validate_workspace_id("   "), Err(ValidationError::Blank));
        assert_eq!(validate_workspace_id("a/b"), Err(ValidationError::ContainsSlash));
        assert_eq!(validate_workspace_id(".."), Err(ValidationError::DotSegment));
        assert_eq!(validate_workspace_id("__admin__"), Err(ValidationError::Reserved));
        assert_eq!(
            validate_workspace_id(&"x".repeat(1501)),
            Err(ValidationError::TooLong(1501))
        );
    }
}
