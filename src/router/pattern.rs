use super::core::ParamVec;
use crate::error::RouteError;
use regex::Regex;
use std::sync::Arc;

/// A route pattern compiled into an anchored regex.
///
/// `/hello/{name}` becomes `^/hello/([^/]+)$`: every placeholder binds one or
/// more characters of a single segment and literal text is escaped, so only
/// the full path can match.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &'static str| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let mut regex_src = String::with_capacity(pattern.len() + 16);
        regex_src.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(pattern.matches('{').count());
        let mut literal = String::new();
        let mut after_placeholder = false;
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if after_placeholder && literal.is_empty() {
                        return Err(invalid("adjacent placeholders are ambiguous"));
                    }
                    regex_src.push_str(&regex::escape(&literal));
                    literal.clear();

                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        match n {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' | '/' => return Err(invalid("unclosed placeholder")),
                            _ => name.push(n),
                        }
                    }
                    if !closed {
                        return Err(invalid("unclosed placeholder"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty placeholder name"));
                    }
                    if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
                        return Err(invalid("placeholder names may only use [A-Za-z0-9_]"));
                    }
                    if param_names.iter().any(|p| p.as_ref() == name) {
                        return Err(invalid("placeholder name used twice"));
                    }
                    regex_src.push_str("([^/]+)");
                    param_names.push(Arc::from(name));
                    after_placeholder = true;
                }
                '}' => return Err(invalid("unmatched '}'")),
                _ => {
                    literal.push(c);
                    after_placeholder = false;
                }
            }
        }
        regex_src.push_str(&regex::escape(&literal));
        regex_src.push('$');

        let regex = Regex::new(&regex_src).map_err(|_| invalid("does not compile to a matcher"))?;
        Ok(Self { regex, param_names })
    }

    /// Match a full request path, binding placeholder names to segments
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        Some(
            self.param_names
                .iter()
                .zip(caps.iter().skip(1))
                .map(|(name, m)| {
                    (
                        Arc::clone(name),
                        m.map(|m| m.as_str().to_string()).unwrap_or_default(),
                    )
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }
}
