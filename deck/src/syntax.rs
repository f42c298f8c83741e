use regex::Regex;
use serde::Deserialize;

/// Default comment prefix: lines starting with it are dropped from slides.
pub const DEFAULT_COMMENT: &str = "%%";
/// Default stop marker: splits a section into progressively revealed slides.
pub const DEFAULT_STOP: &str = r"<!--\s*stop\s*-->";

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("invalid stop pattern `{pattern}`: {source}")]
    StopPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Syntax options as written in the `[syntax]` table of the config file.
///
/// An empty string disables the corresponding filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SyntaxOptions {
    pub comment: Option<String>,
    pub stop: Option<String>,
}

impl Default for SyntaxOptions {
    fn default() -> Self {
        SyntaxOptions {
            comment: Some(DEFAULT_COMMENT.to_string()),
            stop: Some(DEFAULT_STOP.to_string()),
        }
    }
}

/// Compiled syntax options, threaded into the slide builder.
#[derive(Debug, Clone, Default)]
pub struct Syntax {
    comment: Option<String>,
    stop: Option<Regex>,
}

impl Syntax {
    pub fn new(comment: Option<&str>, stop: Option<&str>) -> Result<Self, SyntaxError> {
        let comment = comment.filter(|c| !c.is_empty()).map(str::to_string);
        let stop = match stop.filter(|s| !s.is_empty()) {
            Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                SyntaxError::StopPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?),
            None => None,
        };
        Ok(Syntax { comment, stop })
    }

    /// No comment filtering and no stop splitting.
    pub fn plain() -> Self {
        Syntax::default()
    }

    pub fn from_options(options: &SyntaxOptions) -> Result<Self, SyntaxError> {
        Syntax::new(options.comment.as_deref(), options.stop.as_deref())
    }

    pub fn is_comment(&self, line: &str) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|prefix| line.starts_with(prefix))
    }

    /// Remove every stop marker from `line`, or `None` if the line has none.
    pub fn strip_stop(&self, line: &str) -> Option<String> {
        let stop = self.stop.as_ref()?;
        if stop.is_match(line) {
            Some(stop.replace_all(line, "").into_owned())
        } else {
            None
        }
    }
}
