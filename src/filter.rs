//! Keyword filtering of related-GUID lists.
//!
//! Blacklist keywords come from `ui.related_filter_keywords`. They are
//! matched case-insensitively against a reference's element name and its
//! context, so `Sound` hides both `<SoundGuid>` entries and everything
//! under a `<Sounds>` block.

use regex::{Regex, RegexBuilder};

use crate::assets::RelatedRef;

/// Build an OR-pattern from literal keywords. `None` when there are none.
#[must_use]
pub fn build_pattern<S: AsRef<str>>(keywords: &[S]) -> Option<String> {
    let parts: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

/// A compiled blacklist; empty when there are no keywords.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    re: Option<Regex>,
}

impl Blacklist {
    #[must_use]
    pub fn from_keywords<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self::from_pattern(build_pattern(keywords).as_deref())
    }

    /// An invalid pattern is logged and gives an empty blacklist.
    #[must_use]
    pub fn from_pattern(pattern: Option<&str>) -> Self {
        Self {
            re: pattern.and_then(compile),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.re.is_none()
    }

    #[must_use]
    pub fn is_hidden(&self, r: &RelatedRef) -> bool {
        self.re.as_ref().is_some_and(|re| matches(re, r))
    }
}

/// Drop every reference matching `pattern`.
///
/// An invalid pattern is logged and filters nothing.
#[must_use]
pub fn apply_blacklist(refs: Vec<RelatedRef>, pattern: Option<&str>) -> Vec<RelatedRef> {
    let blacklist = Blacklist::from_pattern(pattern);
    if blacklist.is_empty() {
        return refs;
    }
    let before = refs.len();
    let kept: Vec<RelatedRef> = refs.into_iter().filter(|r| !blacklist.is_hidden(r)).collect();
    log::debug!("Blacklist hid {} of {} related entries", before - kept.len(), before);
    kept
}

/// Keep only references matching `pattern`.
///
/// An invalid pattern is logged and filters nothing.
#[must_use]
pub fn apply_include(refs: Vec<RelatedRef>, pattern: Option<&str>) -> Vec<RelatedRef> {
    match pattern.and_then(compile) {
        Some(re) => refs.into_iter().filter(|r| matches(&re, r)).collect(),
        None => refs,
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Invalid filter pattern '{}': {}", pattern, e);
            None
        }
    }
}

fn matches(re: &Regex, r: &RelatedRef) -> bool {
    re.is_match(&r.element_name) || re.is_match(&r.context)
}
