//! Core types shared across the tree, stub and persistence layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NodeId: stable handle of a node slot in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Timestamp: UTC canonical time of a node
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Local time derived from a canonical timestamp
pub type LocalTimestamp = chrono::DateTime<chrono::Local>;

/// Host platform conventions the tree emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    #[serde(alias = "MacOS", alias = "macOS")]
    OSX,
    FreeBSD,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::OSX
        } else if cfg!(target_os = "freebsd") {
            Platform::FreeBSD
        } else {
            Platform::Linux
        }
    }

    pub fn directory_separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Linux | Platform::OSX | Platform::FreeBSD => '/',
        }
    }

    /// Default name comparer for the platform
    pub fn default_comparer(self) -> NameComparer {
        match self {
            Platform::Windows | Platform::OSX => NameComparer::OrdinalIgnoreCase,
            Platform::Linux | Platform::FreeBSD => NameComparer::Ordinal,
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::OSX => "OSX",
            Platform::FreeBSD => "FreeBSD",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "osx" | "macos" => Ok(Platform::OSX),
            "freebsd" => Ok(Platform::FreeBSD),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// Name equality rule fixed per volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameComparer {
    Ordinal,
    OrdinalIgnoreCase,
}

impl NameComparer {
    pub fn for_case_sensitivity(case_sensitive: bool) -> Self {
        if case_sensitive {
            NameComparer::Ordinal
        } else {
            NameComparer::OrdinalIgnoreCase
        }
    }

    pub fn is_case_sensitive(self) -> bool {
        self == NameComparer::Ordinal
    }

    pub fn equals(self, a: &str, b: &str) -> bool {
        match self {
            NameComparer::Ordinal => a == b,
            NameComparer::OrdinalIgnoreCase => {
                if a.is_ascii() && b.is_ascii() {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a.chars().count() == b.chars().count()
                        && a.chars().zip(b.chars()).all(|(x, y)| self.fold(x) == self.fold(y))
                }
            }
        }
    }

    /// Fold `c` for comparison under this comparer.
    ///
    /// Case-insensitive folding is one-to-one: a character whose uppercase
    /// form expands to several characters (`ß`) is kept as is.
    pub fn fold(self, c: char) -> char {
        match self {
            NameComparer::Ordinal => c,
            NameComparer::OrdinalIgnoreCase => {
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(single), None) => single,
                    _ => c,
                }
            }
        }
    }
}
