//! Weighted status code selection

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Status weight table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeightsError {
    #[error("No valid code:weight pairs in '{0}'")]
    NoValidPairs(String),

    #[error("Total weight must be greater than zero")]
    ZeroTotalWeight,

    #[error("Total weight exceeds {}", u32::MAX)]
    TotalWeightOverflow,

    #[error("Status code {0} is outside 100..=599")]
    InvalidStatusCode(u16),
}

const VALID_CODES: std::ops::RangeInclusive<u16> = 100..=599;

/// One entry of the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusWeight {
    pub code: u16,
    pub weight: u32,
}

/// Status codes with relative selection weights
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StatusWeight>", into = "Vec<StatusWeight>")]
pub struct StatusWeights {
    entries: Vec<StatusWeight>,
    total: u32,
}

impl StatusWeights {
    pub fn new(entries: Vec<StatusWeight>) -> Result<Self, WeightsError> {
        if let Some(entry) = entries.iter().find(|e| !VALID_CODES.contains(&e.code)) {
            return Err(WeightsError::InvalidStatusCode(entry.code));
        }

        let total = entries
            .iter()
            .try_fold(0u32, |sum, e| sum.checked_add(e.weight))
            .ok_or(WeightsError::TotalWeightOverflow)?;
        if total == 0 {
            return Err(WeightsError::ZeroTotalWeight);
        }
        Ok(Self { entries, total })
    }

    /// Parse `"200:60,500:40"`.
    ///
    /// Malformed pairs are skipped. An empty string yields the default table.
    pub fn parse(table: &str) -> Result<Self, WeightsError> {
        if table.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut entries = Vec::new();
        for pair in table.split(',') {
            match parse_pair(pair) {
                Some(entry) => entries.push(entry),
                None => warn!("Ignoring malformed status weight '{}'", pair.trim()),
            }
        }

        if entries.is_empty() {
            return Err(WeightsError::NoValidPairs(table.to_string()));
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> &[StatusWeight] {
        &self.entries
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    /// Draw a status code with probability proportional to its weight
    pub fn select<R: Rng>(&self, rng: &mut R) -> u16 {
        let mut remaining = rng.random_range(0..self.total);
        for entry in &self.entries {
            if remaining < entry.weight {
                return entry.code;
            }
            remaining -= entry.weight;
        }
        // Unreachable while total is the sum of the weights
        self.entries[self.entries.len() - 1].code
    }
}

fn parse_pair(pair: &str) -> Option<StatusWeight> {
    let (code, weight) = pair.trim().split_once(':')?;
    let code: u16 = code.trim().parse().ok()?;
    let weight: u32 = weight.trim().parse().ok()?;
    if !VALID_CODES.contains(&code) {
        return None;
    }
    Some(StatusWeight { code, weight })
}

impl Default for StatusWeights {
    fn default() -> Self {
        let entries = [
            (200, 60),
            (201, 5),
            (202, 5),
            (400, 5),
            (401, 5),
            (403, 3),
            (404, 5),
            (429, 2),
            (500, 5),
            (503, 5),
        ]
        .into_iter()
        .map(|(code, weight)| StatusWeight { code, weight })
        .collect();

        Self {
            entries,
            total: 100,
        }
    }
}

impl TryFrom<Vec<StatusWeight>> for StatusWeights {
    type Error = WeightsError;

    fn try_from(entries: Vec<StatusWeight>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<StatusWeights> for Vec<StatusWeight> {
    fn from(weights: StatusWeights) -> Self {
        weights.entries
    }
}

impl fmt::Display for StatusWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}:{}", e.code, e.weight))
            .collect();
        f.write_str(&pairs.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_table() {
        let weights = StatusWeights::default();
        assert_eq!(weights.entries().len(), 10);
        assert_eq!(weights.total_weight(), 100);
        assert_eq!(
            weights.total_weight(),
            weights.entries().iter().map(|e| e.weight).sum::<u32>()
        );
    }

    #[test]
    fn test_parse() {
        let weights = StatusWeights::parse("200:60, 500:40").unwrap();
        assert_eq!(
            weights.entries(),
            &[
                StatusWeight { code: 200, weight: 60 },
                StatusWeight { code: 500, weight: 40 }
            ]
        );
        assert_eq!(weights.to_string(), "200:60,500:40");
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let weights = StatusWeights::parse("200:60,oops,abc:1,500:x,999:5,503:10").unwrap();
        assert_eq!(weights.entries().len(), 2);
        assert_eq!(weights.total_weight(), 70);
    }

    #[test]
    fn test_parse_empty_uses_default() {
        assert_eq!(StatusWeights::parse("").unwrap(), StatusWeights::default());
    }

    #[test]
    fn test_parse_rejects_unusable_tables() {
        assert!(matches!(
            StatusWeights::parse("nothing,here"),
            Err(WeightsError::NoValidPairs(_))
        ));
        assert_eq!(
            StatusWeights::parse("200:0,500:0"),
            Err(WeightsError::ZeroTotalWeight)
        );
    }

    #[test]
    fn test_zero_weight_is_never_selected() {
        let weights = StatusWeights::parse("200:0,418:1").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            assert_eq!(weights.select(&mut rng), 418);
        }
    }

    #[test]
    fn test_selection_follows_weights() {
        let weights = StatusWeights::parse("200:60,500:40").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let draws = 100_000;
        let ok = (0..draws)
            .filter(|_| weights.select(&mut rng) == 200)
            .count();
        let ratio = ok as f64 / draws as f64;

        assert!((ratio - 0.6).abs() < 0.01, "ratio was {ratio}");
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let yaml = "- code: 200\n  weight: 3\n- code: 503\n  weight: 1\n";
        let weights: StatusWeights = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(weights.total_weight(), 4);

        let zero = "- code: 200\n  weight: 0\n";
        assert!(serde_yaml::from_str::<StatusWeights>(zero).is_err());
    }

    #[test]
    fn test_total_weight_overflow_is_an_error() {
        assert_eq!(
            StatusWeights::parse("200:4294967295,500:1"),
            Err(WeightsError::TotalWeightOverflow)
        );

        let max = StatusWeights::parse("200:4294967294,500:1").unwrap();
        assert_eq!(max.total_weight(), u32::MAX);
        let mut rng = StdRng::seed_from_u64(3);
        let code = max.select(&mut rng);
        assert!(code == 200 || code == 500);
    }

    #[test]
    fn test_out_of_range_codes_rejected_on_every_path() {
        assert_eq!(
            StatusWeights::new(vec![StatusWeight { code: 42, weight: 1 }]),
            Err(WeightsError::InvalidStatusCode(42))
        );

        let yaml = "- code: 200\n  weight: 1\n- code: 42\n  weight: 1\n";
        assert!(serde_yaml::from_str::<StatusWeights>(yaml).is_err());

        // The string form skips the bad pair instead
        let parsed = StatusWeights::parse("200:1,42:1").unwrap();
        assert_eq!(parsed.entries().len(), 1);
    }
}
