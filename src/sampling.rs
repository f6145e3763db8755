//! Measurement distributions and shot sampling.

use std::collections::BTreeMap;
use std::fmt::Display;

use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::Binomial;
use tracing::debug;

use crate::error::{DjError, Result};

/// Probabilities below this are treated as exact zeros.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Anything that can report how likely an n-bit outcome is.
pub trait Outcomes {
    fn num_of_bits(&self) -> usize;

    /// Relative frequency (or probability) of `bits`.
    fn probability(&self, bits: &str) -> f64;

    /// Whether `bits` has non-zero weight.
    fn contains(&self, bits: &str) -> bool {
        self.probability(bits) > 0.0
    }
}

fn format_bits(index: usize, width: usize) -> String {
    format!("{:0width$b}", index, width = width)
}

fn parse_bits(bits: &str, width: usize) -> Option<usize> {
    if bits.len() != width {
        return None;
    }
    usize::from_str_radix(bits, 2).ok()
}

/// Exact probability of each n-bit outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    num_of_bits: usize,
    probabilities: Vec<f64>,
}

impl Distribution {
    /// Wrap raw probabilities indexed by basis state, snapping round-off
    /// below [`PROBABILITY_EPSILON`] to zero.
    pub fn new(probabilities: Vec<f64>) -> Result<Self> {
        let len = probabilities.len();
        if len == 0 || (len & (len - 1)) != 0 {
            return Err(DjError::invalid_argument(
                "Distribution length must be a non-zero power of 2",
            ));
        }
        if probabilities.iter().any(|p| !p.is_finite() || *p < -PROBABILITY_EPSILON) {
            return Err(DjError::invalid_argument(
                "Probabilities must be finite and non-negative",
            ));
        }

        let probabilities = probabilities
            .into_iter()
            .map(|p| if p < PROBABILITY_EPSILON { 0.0 } else { p })
            .collect();
        Ok(Self {
            num_of_bits: len.ilog2() as usize,
            probabilities,
        })
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// (bitstring, probability) for every outcome, in basis order.
    pub fn iter(&self) -> impl Iterator<Item = (String, f64)> + '_ {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| (format_bits(i, self.num_of_bits), p))
    }

    /// Only the outcomes with non-zero probability.
    pub fn support(&self) -> impl Iterator<Item = (String, f64)> + '_ {
        self.iter().filter(|(_, p)| *p > 0.0)
    }
}

impl Outcomes for Distribution {
    fn num_of_bits(&self) -> usize {
        self.num_of_bits
    }

    fn probability(&self, bits: &str) -> f64 {
        parse_bits(bits, self.num_of_bits)
            .and_then(|i| self.probabilities.get(i).copied())
            .unwrap_or(0.0)
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (bits, p) in self.support() {
            writeln!(f, "|{}⟩: {:.2}%", bits, p * 100.0)?;
        }
        Ok(())
    }
}

/// Observed counts per outcome. Outcomes never seen are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    num_of_bits: usize,
    counts: BTreeMap<String, u64>,
}

impl Counts {
    pub fn new(num_of_bits: usize) -> Self {
        Self {
            num_of_bits,
            counts: BTreeMap::new(),
        }
    }

    /// Tally a list of recorded shots. Every shot must be a `num_of_bits`-wide
    /// string of `0` and `1`.
    pub fn from_memory(num_of_bits: usize, memory: &[String]) -> Result<Self> {
        let mut counts = Self::new(num_of_bits);
        for bits in memory {
            if bits.len() != num_of_bits || !bits.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(DjError::invalid_argument(format!(
                    "Recorded shot {bits:?} is not a {num_of_bits}-bit string"
                )));
            }
            *counts.counts.entry(bits.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub fn get(&self, bits: &str) -> u64 {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    pub fn shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Observed outcomes in ascending bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(bits, &count)| (bits.as_str(), count))
    }

    fn insert(&mut self, index: usize, count: u64) {
        if count > 0 {
            self.counts.insert(format_bits(index, self.num_of_bits), count);
        }
    }
}

impl Outcomes for Counts {
    fn num_of_bits(&self) -> usize {
        self.num_of_bits
    }

    fn probability(&self, bits: &str) -> f64 {
        let shots = self.shots();
        if shots == 0 {
            return 0.0;
        }
        self.get(bits) as f64 / shots as f64
    }

    fn contains(&self, bits: &str) -> bool {
        self.counts.contains_key(bits)
    }
}

impl Display for Counts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shots = self.shots().max(1) as f64;
        for (bits, count) in self.iter() {
            writeln!(f, "|{}⟩: {:.2}%", bits, count as f64 / shots * 100.0)?;
        }
        Ok(())
    }
}

fn check_shots(shots: u64) -> Result<()> {
    if shots == 0 {
        return Err(DjError::invalid_argument("Number of shots must be positive"));
    }
    Ok(())
}

/// Draw `shots` independent outcomes and return their counts.
///
/// The multinomial is sampled exactly as a chain of conditional binomials,
/// so the cost grows with the number of outcomes rather than with `shots`.
pub fn sample_counts<R: Rng>(
    distribution: &Distribution,
    shots: u64,
    rng: &mut R,
) -> Result<Counts> {
    check_shots(shots)?;
    let total = distribution.total();
    if total <= 0.0 {
        return Err(DjError::invalid_argument("Distribution has no probability mass"));
    }

    let last = distribution
        .probabilities
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(0);
    let mut counts = Counts::new(distribution.num_of_bits);
    let mut remaining_shots = shots;
    let mut remaining_mass = total;

    for (index, &p) in distribution.probabilities.iter().enumerate() {
        if remaining_shots == 0 {
            break;
        }
        if p == 0.0 {
            continue;
        }

        let conditional = p / remaining_mass;
        // The last outcome absorbs whatever round-off left over.
        let count = if index == last || conditional >= 1.0 {
            remaining_shots
        } else {
            let binomial = Binomial::new(remaining_shots, conditional)
                .map_err(|e| DjError::invalid_argument(format!("Bad sampling weight: {e}")))?;
            rng.sample(binomial)
        };

        counts.insert(index, count);
        remaining_shots -= count;
        remaining_mass -= p;
    }

    debug!(shots, outcomes = counts.len(), "sampled counts");
    Ok(counts)
}

/// Draw `shots` outcomes one at a time, keeping their order.
pub fn sample_memory<R: Rng>(
    distribution: &Distribution,
    shots: u64,
    rng: &mut R,
) -> Result<Vec<String>> {
    check_shots(shots)?;
    let weights = WeightedIndex::new(distribution.probabilities.iter().copied())
        .map_err(|e| DjError::invalid_argument(format!("Bad sampling weights: {e}")))?;

    Ok((0..shots)
        .map(|_| format_bits(rng.sample(&weights), distribution.num_of_bits))
        .collect())
}

/// Draw `shots` outcomes one at a time and tally the same shots into counts.
pub fn sample_recorded<R: Rng>(
    distribution: &Distribution,
    shots: u64,
    rng: &mut R,
) -> Result<(Counts, Vec<String>)> {
    let memory = sample_memory(distribution, shots, rng)?;
    let counts = Counts::from_memory(distribution.num_of_bits, &memory)?;
    debug!(shots, outcomes = counts.len(), "sampled recorded shots");
    Ok((counts, memory))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_snaps_round_off_to_zero() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![1e-17, 0.5, 0.25, 0.25])?;

        assert_eq!(0.0, distribution.probability("00"));
        assert!(!distribution.contains("00"));
        assert_approx_eq!(0.5, distribution.probability("01"));
        assert_eq!(0.0, distribution.probability("1"));
        assert_eq!(3, distribution.support().count());
        Ok(())
    }

    #[test]
    fn test_rejects_bad_distributions() {
        assert!(Distribution::new(vec![]).is_err());
        assert!(Distribution::new(vec![0.5; 3]).is_err());
        assert!(Distribution::new(vec![f64::NAN, 1.0]).is_err());
        assert!(Distribution::new(vec![-0.5, 1.5]).is_err());
    }

    #[test]
    fn test_counts_sum_to_shots() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![0.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])?;
        let mut rng = StdRng::seed_from_u64(7);
        let counts = sample_counts(&distribution, 8192, &mut rng)?;

        assert_eq!(8192, counts.shots());
        assert_eq!(0, counts.get("00"));
        assert!(!counts.contains("00"));
        for bits in ["01", "10", "11"] {
            assert!((counts.probability(bits) - 1.0 / 3.0).abs() < 0.05);
        }
        Ok(())
    }

    #[test]
    fn test_certain_outcome_takes_every_shot() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![1.0, 0.0, 0.0, 0.0])?;
        let counts = sample_counts(&distribution, 1024, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(1, counts.len());
        assert_eq!(1024, counts.get("00"));
        Ok(())
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![0.1, 0.2, 0.3, 0.4])?;

        let a = sample_counts(&distribution, 500, &mut StdRng::seed_from_u64(42))?;
        let b = sample_counts(&distribution, 500, &mut StdRng::seed_from_u64(42))?;
        assert_eq!(a, b);

        let m1 = sample_memory(&distribution, 50, &mut StdRng::seed_from_u64(42))?;
        let m2 = sample_memory(&distribution, 50, &mut StdRng::seed_from_u64(42))?;
        assert_eq!(m1, m2);
        Ok(())
    }

    #[test]
    fn test_memory_never_draws_impossible_outcomes() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![0.0, 0.5, 0.0, 0.5])?;
        let memory = sample_memory(&distribution, 200, &mut StdRng::seed_from_u64(3))?;
        let counts = Counts::from_memory(2, &memory)?;

        assert_eq!(200, counts.shots());
        assert_eq!(0, counts.get("00"));
        assert_eq!(0, counts.get("10"));
        Ok(())
    }

    #[test]
    fn test_recorded_counts_tally_the_recorded_shots() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![0.25; 4])?;
        let (counts, memory) =
            sample_recorded(&distribution, 100, &mut StdRng::seed_from_u64(1))?;

        assert_eq!(100, memory.len());
        assert_eq!(Counts::from_memory(2, &memory)?, counts);
        assert_eq!(100, counts.shots());
        assert!(counts.len() > 1);
        Ok(())
    }

    #[test]
    fn test_from_memory_rejects_malformed_shots() -> anyhow::Result<()> {
        let wrong_width = vec!["01".to_string(), "011".to_string()];
        assert!(matches!(
            Counts::from_memory(2, &wrong_width),
            Err(DjError::InvalidArgument(_))
        ));

        let not_binary = vec!["0x".to_string()];
        assert!(Counts::from_memory(2, &not_binary).is_err());

        let counts = Counts::from_memory(2, &["10".to_string(), "10".to_string()])?;
        assert_eq!(2, counts.get("10"));
        assert_approx_eq!(1.0, counts.probability("10"));
        Ok(())
    }

    #[test]
    fn test_zero_shots_is_invalid() -> anyhow::Result<()> {
        let distribution = Distribution::new(vec![1.0, 0.0])?;
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            sample_counts(&distribution, 0, &mut rng),
            Err(DjError::InvalidArgument(_))
        ));
        assert!(sample_memory(&distribution, 0, &mut rng).is_err());
        Ok(())
    }
}
