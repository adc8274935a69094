//! Spelling suggestions returned by dictionary lookups.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpeliukError;

/// A dictionary term close to a looked-up word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The suggested word.
    pub term: String,
    /// Edit distance from the looked-up word.
    pub distance: usize,
    /// Frequency of the suggested word in the dictionary.
    pub count: u64,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(term: impl Into<String>, distance: usize, count: u64) -> Self {
        Suggestion {
            term: term.into(),
            distance,
            count,
        }
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Closest first, then most frequent, then alphabetical for a stable order
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.term.cmp(&other.term))
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (distance {}, count {})", self.term, self.distance, self.count)
    }
}

/// Controls the closeness and quantity of returned suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// The most frequent suggestion among those with the smallest distance.
    Top,
    /// All suggestions with the smallest distance found, ordered by frequency.
    #[default]
    Closest,
    /// All suggestions within the maximum distance.
    All,
}

impl FromStr for Verbosity {
    type Err = SpeliukError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Verbosity::Top),
            "closest" => Ok(Verbosity::Closest),
            "all" => Ok(Verbosity::All),
            other => Err(SpeliukError::invalid_argument(format!(
                "Unknown verbosity '{other}', expected top, closest or all"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_ordering() {
        let mut suggestions = vec![
            Suggestion::new("жити", 2, 100),
            Suggestion::new("живе", 1, 10),
            Suggestion::new("живу", 1, 50),
        ];
        suggestions.sort();

        let terms: Vec<&str> = suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, vec!["живу", "живе", "жити"]);
    }

    #[test]
    fn test_verbosity_from_str() {
        assert_eq!("TOP".parse::<Verbosity>().unwrap(), Verbosity::Top);
        assert_eq!("closest".parse::<Verbosity>().unwrap(), Verbosity::Closest);
        assert!("some".parse::<Verbosity>().is_err());
        assert_eq!(Verbosity::default(), Verbosity::Closest);
    }
}
