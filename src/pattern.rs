use crate::error::PatternError;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Match-strategy class of a pattern.
///
/// Declaration order is specificity order: when two patterns of different
/// groups both match a path, the one whose group is declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternGroup {
    /// Literal full-path match, indexed by its full text.
    Exact,
    /// Regex and middle-glob patterns. Never indexed.
    Other,
    /// `/prefix/*`, indexed by its literal prefix.
    PrefixGlob,
    /// `*.ext`, indexed by the extension after the dot.
    SuffixGlob,
    /// Matches only `/`.
    Root,
    /// The `/` catch-all.
    Default,
}

impl PatternGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternGroup::Exact => "exact",
            PatternGroup::Other => "other",
            PatternGroup::PrefixGlob => "prefix_glob",
            PatternGroup::SuffixGlob => "suffix_glob",
            PatternGroup::Root => "root",
            PatternGroup::Default => "default",
        }
    }
}

/// A compiled route pattern.
///
/// Text forms:
/// - `/login`: exact path
/// - `/api/*`: the path `/api` and everything below it (`/*` matches all)
/// - `*.json`: any path ending in `.json`
/// - `/`: default catch-all
/// - `^/users/\d+$`: regular expression over the whole path
/// - `/static/*/logo.png`: middle glob; `*` stays within one segment, `**` spans segments
///
/// The root pattern has no text form and is built with [`PathPattern::root`].
#[derive(Debug, Clone)]
pub enum PathPattern {
    Root,
    Default,
    Exact(String),
    PrefixGlob(String),
    SuffixGlob(String),
    Regex { text: String, regex: Regex },
    MiddleGlob { text: String, matcher: GlobMatcher },
}

impl PathPattern {
    /// Parse a pattern from text. The first character selects the dialect.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        if text.is_empty() {
            return Err(PatternError::Empty);
        }

        if text.starts_with('^') {
            let regex = Regex::new(&format!("^(?:{})$", text)).map_err(|e| {
                PatternError::InvalidRegex {
                    pattern: text.to_string(),
                    reason: e.to_string(),
                }
            })?;
            return Ok(PathPattern::Regex {
                text: text.to_string(),
                regex,
            });
        }

        if let Some(suffix) = text.strip_prefix("*.") {
            if suffix.is_empty() || suffix.contains('/') || suffix.contains('*') {
                return Err(PatternError::InvalidSuffix(text.to_string()));
            }
            return Ok(PathPattern::SuffixGlob(text.to_string()));
        }

        if !text.starts_with('/') {
            return Err(PatternError::UnknownSigil(text.to_string()));
        }

        if text == "/" {
            return Ok(PathPattern::Default);
        }

        if let Some(prefix) = text.strip_suffix("/*") {
            if !prefix.contains('*') {
                return Ok(PathPattern::PrefixGlob(text.to_string()));
            }
        }

        if text.contains('*') {
            let matcher = GlobBuilder::new(text)
                .literal_separator(true)
                .build()
                .map_err(|e| PatternError::InvalidGlob {
                    pattern: text.to_string(),
                    reason: e.to_string(),
                })?
                .compile_matcher();
            return Ok(PathPattern::MiddleGlob {
                text: text.to_string(),
                matcher,
            });
        }

        Ok(PathPattern::Exact(text.to_string()))
    }

    pub fn root() -> Self {
        PathPattern::Root
    }

    /// Canonical text. Equality and ordering are defined over it.
    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Root => "",
            PathPattern::Default => "/",
            PathPattern::Exact(text)
            | PathPattern::PrefixGlob(text)
            | PathPattern::SuffixGlob(text) => text.as_str(),
            PathPattern::Regex { text, .. } | PathPattern::MiddleGlob { text, .. } => {
                text.as_str()
            }
        }
    }

    pub fn group(&self) -> PatternGroup {
        match self {
            PathPattern::Root => PatternGroup::Root,
            PathPattern::Default => PatternGroup::Default,
            PathPattern::Exact(_) => PatternGroup::Exact,
            PathPattern::PrefixGlob(_) => PatternGroup::PrefixGlob,
            PathPattern::SuffixGlob(_) => PatternGroup::SuffixGlob,
            PathPattern::Regex { .. } | PathPattern::MiddleGlob { .. } => PatternGroup::Other,
        }
    }

    /// Literal prefix used as the index key for exact and prefix-glob patterns.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            PathPattern::Exact(text) => Some(text.as_str()),
            PathPattern::PrefixGlob(text) => Some(&text[..text.len() - 2]),
            _ => None,
        }
    }

    /// Literal extension (without the dot) of a suffix-glob pattern.
    pub fn suffix(&self) -> Option<&str> {
        match self {
            PathPattern::SuffixGlob(text) => Some(&text[2..]),
            _ => None,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Root => path == "/",
            PathPattern::Default => true,
            PathPattern::Exact(text) => path == text.as_str(),
            PathPattern::PrefixGlob(text) => {
                let prefix = &text[..text.len() - 2];
                path.starts_with(prefix)
                    && (path.len() == prefix.len() || path.as_bytes()[prefix.len()] == b'/')
            }
            PathPattern::SuffixGlob(text) => path.ends_with(&text[1..]),
            PathPattern::Regex { regex, .. } => regex.is_match(path),
            PathPattern::MiddleGlob { matcher, .. } => matcher.is_match(path),
        }
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathPattern::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for PathPattern {}

impl Hash for PathPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

/// Group first, then longer text first, then alphabetical.
impl Ord for PathPattern {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.group(), Reverse(self.as_str().len()), self.as_str()).cmp(&(
            other.group(),
            Reverse(other.as_str().len()),
            other.as_str(),
        ))
    }
}

impl PartialOrd for PathPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
