use serde::Deserialize;
use serde::Serialize;

/// Match strategy selection
///
/// | exact | regex | mode        |
/// |-------|-------|-------------|
/// | true  | false | Exact       |
/// | true  | true  | ExactRegex  |
/// | false | *     | RegexUnion  |
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MatchConfig {
    #[serde(default = "default_exact")]
    pub exact: bool,

    /// Treat dictionary keys as regular expressions. Ignored when `exact` is false.
    #[serde(default)]
    pub regex: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            exact: default_exact(),
            regex: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    ExactRegex,
    RegexUnion,
}

impl MatchConfig {
    pub fn mode(&self) -> MatchMode {
        match (self.exact, self.regex) {
            (true, false) => MatchMode::Exact,
            (true, true) => MatchMode::ExactRegex,
            (false, _) => MatchMode::RegexUnion,
        }
    }
}

fn default_exact() -> bool {
    true
}
