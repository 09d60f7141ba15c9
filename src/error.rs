use std::fmt;

/// Failure to build a `PathPattern` from its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Empty,
    UnknownSigil(String),
    InvalidSuffix(String),
    InvalidRegex { pattern: String, reason: String },
    InvalidGlob { pattern: String, reason: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "path pattern must not be empty"),
            PatternError::UnknownSigil(p) => write!(
                f,
                "path pattern must start with '^', '/', or '*.': got [{}]",
                p
            ),
            PatternError::InvalidSuffix(p) => write!(f, "invalid suffix pattern [{}]", p),
            PatternError::InvalidRegex { pattern, reason } => {
                write!(f, "invalid regex pattern [{}]: {}", pattern, reason)
            }
            PatternError::InvalidGlob { pattern, reason } => {
                write!(f, "invalid glob pattern [{}]: {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for PatternError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty() {
        assert_eq!(
            PatternError::Empty.to_string(),
            "path pattern must not be empty"
        );
    }

    #[test]
    fn display_unknown_sigil() {
        assert_eq!(
            PatternError::UnknownSigil("api".to_string()).to_string(),
            "path pattern must start with '^', '/', or '*.': got [api]"
        );
    }

    #[test]
    fn display_invalid_suffix() {
        assert_eq!(
            PatternError::InvalidSuffix("*.a/b".to_string()).to_string(),
            "invalid suffix pattern [*.a/b]"
        );
    }

    #[test]
    fn display_invalid_regex() {
        let err = PatternError::InvalidRegex {
            pattern: "^(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid regex pattern [^(]: unclosed group");
    }
}
