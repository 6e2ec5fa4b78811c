use crate::error::{CleanError, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Shell-style matching: `*` stays inside one segment and dotfiles must be named explicitly
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Matching within a segment, where enumeration has already skipped hidden entries
const SEGMENT_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A parsed cleanup pattern
///
/// Plain glob syntax (`*`, `?`, `[abc]`, `[!abc]`) is handed to the `glob`
/// crate as-is. A negated bracket whose body is itself a wildcard pattern,
/// such as `[!test_*]`, is a negated prefix: it matches one character only
/// when the rest of the segment does not start with a match of the body.
/// `keys/[!test_*]*` therefore matches every entry of `keys` whose name does
/// not begin with `test_`.
#[derive(Debug, Clone)]
pub struct CleanPattern {
    source: String,
    /// Glob used for enumeration, with each negated prefix widened to `?`
    search: String,
    /// Extra per-segment checks, keyed by distance from the last segment
    filters: Vec<(usize, SegmentMatcher)>,
}

#[derive(Debug, Clone)]
enum SegmentMatcher {
    Glob(Pattern),
    NegatedPrefix {
        head: Pattern,
        excluded: Pattern,
        tail: Box<SegmentMatcher>,
    },
}

impl SegmentMatcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            SegmentMatcher::Glob(pattern) => pattern.matches_with(name, SEGMENT_OPTIONS),
            SegmentMatcher::NegatedPrefix {
                head,
                excluded,
                tail,
            } => name.char_indices().any(|(i, c)| {
                let after = i + c.len_utf8();
                head.matches_with(&name[..i], SEGMENT_OPTIONS)
                    && !excluded.matches_with(&name[i..], SEGMENT_OPTIONS)
                    && tail.matches(&name[after..])
            }),
        }
    }
}

impl CleanPattern {
    /// Parse a pattern, rejecting anything the glob engine cannot compile
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(CleanError::pattern(pattern, "pattern is empty"));
        }

        let segments: Vec<&str> = pattern.split('/').collect();
        if segments.contains(&"**") {
            return Err(CleanError::pattern(
                pattern,
                "recursive `**` segments are not supported",
            ));
        }
        let mut search_segments = Vec::with_capacity(segments.len());
        let mut filters = Vec::new();

        for (idx, segment) in segments.iter().enumerate() {
            let (search, matcher) = parse_segment(pattern, segment)?;
            if let Some(matcher) = matcher {
                let depth = segments[idx + 1..]
                    .iter()
                    .filter(|s| !s.is_empty() && **s != ".")
                    .count();
                filters.push((depth, matcher));
            }
            search_segments.push(search);
        }

        let search = search_segments.join("/");
        Pattern::new(&search).map_err(|e| CleanError::pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            search,
            filters,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Resolve the pattern against the filesystem as it is right now
    ///
    /// Relative patterns are resolved under `root`. The returned paths are
    /// `root`-prefixed and in lexical order.
    pub fn expand(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let search = if Path::new(&self.search).is_absolute() || root.as_os_str().is_empty() {
            self.search.clone()
        } else {
            let root = root.to_str().ok_or_else(|| {
                CleanError::pattern(
                    &self.source,
                    format!("base directory {} is not valid UTF-8", root.display()),
                )
            })?;
            format!(
                "{}/{}",
                Pattern::escape(root.trim_end_matches('/')),
                self.search
            )
        };
        debug!("Expanding {} as {}", self.source, search);

        let entries = glob::glob_with(&search, MATCH_OPTIONS)
            .map_err(|e| CleanError::pattern(&self.source, e.to_string()))?;

        let mut matches = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CleanError::FileSystem {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;
            if self.accepts(&path) {
                matches.push(path);
            }
        }

        Ok(matches)
    }

    fn accepts(&self, path: &Path) -> bool {
        self.filters.iter().all(|(depth, matcher)| {
            match path.components().rev().nth(*depth) {
                Some(Component::Normal(name)) => name.to_str().is_some_and(|n| matcher.matches(n)),
                _ => false,
            }
        })
    }
}

/// Split off the first negated prefix of a segment, recursing into the rest
fn parse_segment(pattern: &str, segment: &str) -> Result<(String, Option<SegmentMatcher>)> {
    let Some((start, end)) = find_negated_prefix(segment) else {
        return Ok((segment.to_string(), None));
    };

    let head = &segment[..start];
    let body = &segment[start + 2..end - 1];
    let (tail_search, tail) = parse_segment(pattern, &segment[end..])?;
    let tail = match tail {
        Some(matcher) => matcher,
        None => SegmentMatcher::Glob(compile(pattern, &tail_search)?),
    };

    let excluded = if body.ends_with('*') {
        body.to_string()
    } else {
        format!("{body}*")
    };

    let matcher = SegmentMatcher::NegatedPrefix {
        head: compile(pattern, head)?,
        excluded: compile(pattern, &excluded)?,
        tail: Box::new(tail),
    };
    Ok((format!("{head}?{tail_search}"), Some(matcher)))
}

/// Byte range of the first `[!...]` whose body contains `*` or `?`
fn find_negated_prefix(segment: &str) -> Option<(usize, usize)> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        let close = bracket_end(bytes, i)?;
        let negated = bytes.get(i + 1) == Some(&b'!');
        if negated && bytes[i + 2..close].iter().any(|&b| matches!(b, b'*' | b'?')) {
            return Some((i, close + 1));
        }
        i = close + 1;
    }
    None
}

fn bracket_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if bytes.get(j) == Some(&b'!') {
        j += 1;
    }
    // `]` right after the opening bracket is a member of the set
    if bytes.get(j) == Some(&b']') {
        j += 1;
    }
    bytes[j..].iter().position(|&b| b == b']').map(|p| j + p)
}

fn compile(pattern: &str, glob: &str) -> Result<Pattern> {
    Pattern::new(glob).map_err(|e| CleanError::pattern(pattern, e.to_string()))
}
