//! Errors raised by the document model.
//!
//! Parsing never fails: malformed input degrades by omission. These errors
//! only cover contract violations by the caller.

/// Errors from building or querying a [`StyleSheet`](crate::css::stylesheet::StyleSheet).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    #[error("a ruleset needs at least one selector")]
    EmptySelectorList,
    #[error("{what} must not be empty")]
    EmptyArgument { what: &'static str },
    #[error("block index {index} is out of range for a stylesheet of {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("block {index} is not a ruleset")]
    NotARuleset { index: usize },
}

/// Reject blank query arguments.
pub(crate) fn require_non_blank<'a>(
    value: &'a str,
    what: &'static str,
) -> Result<&'a str, CssError> {
    if value.trim().is_empty() {
        Err(CssError::EmptyArgument { what })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert_eq!(
            require_non_blank("  \t", "class"),
            Err(CssError::EmptyArgument { what: "class" })
        );
        assert_eq!(require_non_blank("nav", "class"), Ok("nav"));
    }

    #[test]
    fn messages_name_the_problem() {
        let err = CssError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "block index 7 is out of range for a stylesheet of 3 blocks"
        );
        assert_eq!(
            CssError::EmptyArgument { what: "id" }.to_string(),
            "id must not be empty"
        );
    }
}
