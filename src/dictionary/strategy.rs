//! Match strategies over a dictionary snapshot.
//!
//! Every variant keeps the state derived from the dictionary it was last
//! rebuilt against. The caller owns the dictionary and must pass the same
//! snapshot to `fetch` that it passed to `rebuild`; [`DictionaryStore`]
//! guarantees this by keeping both behind one lock.
//!
//! [`DictionaryStore`]: crate::DictionaryStore

use regex::Captures;
use regex::Regex;
use regex::RegexBuilder;
use serde_json::Value;

use super::Dictionary;
use crate::constants::UNION_PATTERN_SIZE_LIMIT;
use crate::utils::scoped_timer::ScopedTimer;
use crate::utils::value::to_lookup_string;
use crate::DictionaryError;
use crate::MatchMode;

#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Whole-string hash lookup. No derived state.
    Exact,

    /// Every key compiled as a pattern, in insertion order; the first key
    /// whose pattern matches anywhere in the input wins.
    ///
    /// Lookups scan all patterns, so cost grows linearly with the number
    /// of keys. Not suitable for dictionaries beyond a few thousand entries.
    ExactRegex { patterns: Vec<Regex> },

    /// All keys escaped literally and joined into one alternation in
    /// insertion order. Every occurrence of any key is substituted by its
    /// value; at a given position the earliest inserted key wins.
    /// `None` for an empty dictionary, which never matches.
    RegexUnion { union: Option<Regex> },
}

impl MatchStrategy {
    /// Strategy for `mode`, built against `dictionary`
    pub fn build(
        mode: MatchMode,
        dictionary: &Dictionary,
    ) -> Result<Self, DictionaryError> {
        let mut strategy = Self::empty(mode);
        strategy.rebuild(dictionary)?;
        Ok(strategy)
    }

    /// Strategy for an empty dictionary; matches nothing
    pub fn empty(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Exact => MatchStrategy::Exact,
            MatchMode::ExactRegex => MatchStrategy::ExactRegex { patterns: Vec::new() },
            MatchMode::RegexUnion => MatchStrategy::RegexUnion { union: None },
        }
    }

    pub fn mode(&self) -> MatchMode {
        match self {
            MatchStrategy::Exact => MatchMode::Exact,
            MatchStrategy::ExactRegex { .. } => MatchMode::ExactRegex,
            MatchStrategy::RegexUnion { .. } => MatchMode::RegexUnion,
        }
    }

    /// Recomputes derived state from `dictionary`.
    ///
    /// This is the expensive operation (one pattern compilation per key in
    /// `ExactRegex` mode), so it runs once per dictionary change. On error
    /// `self` is left unchanged.
    pub fn rebuild(
        &mut self,
        dictionary: &Dictionary,
    ) -> Result<(), DictionaryError> {
        match self {
            MatchStrategy::Exact => {}
            MatchStrategy::ExactRegex { patterns } => {
                let _timer = ScopedTimer::new("exact_regex_rebuild", format!("{} keys", dictionary.len()));
                let compiled = dictionary
                    .keys()
                    .map(|key| {
                        Regex::new(key).map_err(|e| DictionaryError::InvalidPattern {
                            key: key.clone(),
                            source: Box::new(e),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                *patterns = compiled;
            }
            MatchStrategy::RegexUnion { union } => {
                let _timer = ScopedTimer::new("regex_union_rebuild", format!("{} keys", dictionary.len()));
                *union = build_union(dictionary)?;
            }
        }
        Ok(())
    }

    /// Owned copy of the matched value, if any
    pub fn fetch(
        &self,
        dictionary: &Dictionary,
        source: &str,
    ) -> Option<Value> {
        match self {
            MatchStrategy::Exact => dictionary.get(source).cloned(),
            MatchStrategy::ExactRegex { patterns } => patterns
                .iter()
                .position(|pattern| pattern.is_match(source))
                .and_then(|index| dictionary.get_index(index))
                .map(|(_, value)| value.clone()),
            MatchStrategy::RegexUnion { union } => {
                let union = union.as_ref()?;
                let replaced = union.replace_all(source, |caps: &Captures| {
                    dictionary.get(&caps[0]).map(to_lookup_string).unwrap_or_default()
                });
                if replaced == source {
                    None
                } else {
                    Some(Value::String(replaced.into_owned()))
                }
            }
        }
    }
}

fn build_union(dictionary: &Dictionary) -> Result<Option<Regex>, DictionaryError> {
    if dictionary.is_empty() {
        return Ok(None);
    }

    let pattern = dictionary.keys().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&pattern)
        .size_limit(UNION_PATTERN_SIZE_LIMIT)
        .dfa_size_limit(UNION_PATTERN_SIZE_LIMIT)
        .build()
        .map(Some)
        .map_err(|e| DictionaryError::InvalidPattern {
            key: format!("<union of {} keys>", dictionary.len()),
            source: Box::new(e),
        })
}
