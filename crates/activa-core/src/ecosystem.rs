//! Package ecosystems
//!
//! The closed set of registries every key and dimension row is scoped to.
//! The list is compiled in; filter UIs read it through [`Ecosystem::list`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A package ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Ruby,
    Python,
    Javascript,
    Php,
    Perl,
    Bash,
    Go,
    Java,
    Lua,
    Rust,
    Elixir,
    Swift,
}

const ALL: [Ecosystem; 12] = [
    Ecosystem::Ruby,
    Ecosystem::Python,
    Ecosystem::Javascript,
    Ecosystem::Php,
    Ecosystem::Perl,
    Ecosystem::Bash,
    Ecosystem::Go,
    Ecosystem::Java,
    Ecosystem::Lua,
    Ecosystem::Rust,
    Ecosystem::Elixir,
    Ecosystem::Swift,
];

impl Ecosystem {
    /// All ecosystems in display order
    pub fn list() -> &'static [Ecosystem] {
        &ALL
    }

    /// Whether `value` names a known ecosystem
    pub fn contains(value: &str) -> bool {
        value.parse::<Ecosystem>().is_ok()
    }

    /// Lowercase identifier, as stored and as used in query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Ruby => "ruby",
            Ecosystem::Python => "python",
            Ecosystem::Javascript => "javascript",
            Ecosystem::Php => "php",
            Ecosystem::Perl => "perl",
            Ecosystem::Bash => "bash",
            Ecosystem::Go => "go",
            Ecosystem::Java => "java",
            Ecosystem::Lua => "lua",
            Ecosystem::Rust => "rust",
            Ecosystem::Elixir => "elixir",
            Ecosystem::Swift => "swift",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Ecosystem::Ruby => "Ruby",
            Ecosystem::Python => "Python",
            Ecosystem::Javascript => "JavaScript",
            Ecosystem::Php => "PHP",
            Ecosystem::Perl => "Perl",
            Ecosystem::Bash => "Bash",
            Ecosystem::Go => "Go",
            Ecosystem::Java => "Java",
            Ecosystem::Lua => "Lua",
            Ecosystem::Rust => "Rust",
            Ecosystem::Elixir => "Elixir",
            Ecosystem::Swift => "Swift",
        }
    }

    /// Logo identifier understood by the badge service, if one is mapped
    pub fn badge_logo(&self) -> Option<&'static str> {
        match self {
            Ecosystem::Ruby => Some("rubygems"),
            Ecosystem::Python => Some("pypi"),
            Ecosystem::Javascript => Some("npm"),
            Ecosystem::Php => Some("packagist"),
            Ecosystem::Perl => Some("cpan"),
            Ecosystem::Bash => Some("gnubash"),
            Ecosystem::Go => Some("go"),
            Ecosystem::Java => Some("java"),
            Ecosystem::Lua => Some("lua"),
            Ecosystem::Rust | Ecosystem::Elixir | Ecosystem::Swift => None,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        ALL.iter()
            .copied()
            .find(|eco| eco.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownEcosystem(s.to_string()))
    }
}
