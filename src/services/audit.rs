//! Quality audit of root families.
//!
//! Samples families, counts their pairs and reports how many are
//! affix-trivial or hang off very short roots.

use crate::models::{CanonicalRootId, RootFamily};
use crate::services::TrivialityFilter;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::fmt;

/// Roots with this many letters or fewer count as short.
const SHORT_ROOT_LETTERS: usize = 3;
/// Example pairs kept per sampled root.
const EXAMPLES_PER_ROOT: usize = 3;

/// Overall verdict on the trivial-pair rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVerdict {
    /// At most 10% trivial pairs.
    Good,
    /// At most 15% trivial pairs.
    Moderate,
    /// More than 15% trivial pairs.
    Poor,
}

impl fmt::Display for AuditVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
        };
        f.write_str(s)
    }
}

/// One example pair from a sampled root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditExample {
    /// First word.
    pub word1: String,
    /// Second word.
    pub word2: String,
    /// Whether the pair is affix-trivial.
    pub trivial: bool,
}

/// Findings for one sampled root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootAudit {
    /// Canonical id.
    pub root: CanonicalRootId,
    /// Root gloss.
    pub gloss: Option<String>,
    /// Source count.
    pub source_count: usize,
    /// Pairs in the family.
    pub pairs: usize,
    /// Affix-trivial pairs in the family.
    pub trivial_pairs: usize,
    /// A few example pairs.
    pub examples: Vec<AuditExample>,
}

/// Audit totals over the sampled roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Families given to the audit.
    pub total_roots: usize,
    /// Families with two or more words.
    pub multi_word_roots: usize,
    /// Families sampled.
    pub sampled_roots: usize,
    /// Pairs across the sample.
    pub total_pairs: usize,
    /// Affix-trivial pairs across the sample.
    pub trivial_pairs: usize,
    /// Pairs whose root has at most three letters.
    pub short_root_pairs: usize,
    /// Per-root findings.
    pub roots: Vec<RootAudit>,
}

impl AuditReport {
    /// Share of trivial pairs, in percent.
    #[must_use]
    pub fn trivial_percentage(&self) -> f64 {
        percentage(self.trivial_pairs, self.total_pairs)
    }

    /// Share of short-root pairs, in percent.
    #[must_use]
    pub fn short_root_percentage(&self) -> f64 {
        percentage(self.short_root_pairs, self.total_pairs)
    }

    /// Verdict from the trivial-pair rate.
    #[must_use]
    pub fn verdict(&self) -> AuditVerdict {
        let rate = self.trivial_percentage();
        if rate > 15.0 {
            AuditVerdict::Poor
        } else if rate > 10.0 {
            AuditVerdict::Moderate
        } else {
            AuditVerdict::Good
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Audits up to `sample_size` randomly chosen multi-word families.
pub fn audit_families<'a, I, R>(families: I, sample_size: usize, rng: &mut R) -> AuditReport
where
    I: IntoIterator<Item = &'a RootFamily>,
    R: Rng + ?Sized,
{
    let filter = TrivialityFilter::new();
    let mut total_roots = 0;
    let candidates: Vec<&RootFamily> = families
        .into_iter()
        .inspect(|_| total_roots += 1)
        .filter(|f| f.words.len() >= 2)
        .collect();

    let mut report = AuditReport {
        total_roots,
        multi_word_roots: candidates.len(),
        ..AuditReport::default()
    };

    let mut sample: Vec<&RootFamily> = candidates
        .choose_multiple(rng, sample_size)
        .copied()
        .collect();
    sample.sort_by(|a, b| a.canonical_id.cmp(&b.canonical_id));

    for family in sample {
        let root = family.canonical_id.as_str();
        let pairs: Vec<(&str, &str)> = family.pairs().collect();
        let trivial = pairs
            .iter()
            .filter(|(w1, w2)| filter.is_trivial(root, w1, w2))
            .count();

        report.total_pairs += pairs.len();
        report.trivial_pairs += trivial;
        if family.canonical_id.base().chars().count() <= SHORT_ROOT_LETTERS {
            report.short_root_pairs += pairs.len();
        }

        let examples = pairs
            .choose_multiple(rng, EXAMPLES_PER_ROOT)
            .map(|(w1, w2)| AuditExample {
                word1: (*w1).to_string(),
                word2: (*w2).to_string(),
                trivial: filter.is_trivial(root, w1, w2),
            })
            .collect();

        report.roots.push(RootAudit {
            root: family.canonical_id.clone(),
            gloss: family.gloss.clone(),
            source_count: family.source_count,
            pairs: pairs.len(),
            trivial_pairs: trivial,
            examples,
        });
    }

    report.sampled_roots = report.roots.len();
    tracing::info!(
        sampled = report.sampled_roots,
        pairs = report.total_pairs,
        trivial = report.trivial_pairs,
        verdict = %report.verdict(),
        "Audit complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn family(id: &str, words: &[&str]) -> RootFamily {
        RootFamily::new(CanonicalRootId::new(id), words.iter().copied()).with_source_count(2)
    }

    #[test]
    fn test_full_sample_counts() {
        let families = [
            family("CAR", &["car", "cart", "carriage"]),
            family("BHEL", &["bowl", "bold", "ball", "bull"]),
            family("LONE", &["alone"]),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let report = audit_families(&families, 100, &mut rng);

        assert_eq!(report.total_roots, 3);
        assert_eq!(report.multi_word_roots, 2);
        assert_eq!(report.sampled_roots, 2);
        assert_eq!(report.total_pairs, 3 + 6);
        // car/cart and car/carriage
        assert_eq!(report.trivial_pairs, 2);
        assert_eq!(report.short_root_pairs, 3);
        assert_eq!(report.verdict(), AuditVerdict::Poor);
        assert_eq!(report.roots[0].root.as_str(), "BHEL");
        assert_eq!(report.roots[0].examples.len(), 3);
    }

    #[test]
    fn test_sample_size_limits() {
        let families = [
            family("BHEL", &["bowl", "bold"]),
            family("WER", &["warp", "wrist"]),
            family("SAL", &["salary", "salad"]),
        ];
        let report = audit_families(&families, 2, &mut StdRng::seed_from_u64(1));
        assert_eq!(report.sampled_roots, 2);
        assert_eq!(report.total_pairs, 2);
    }

    #[test]
    fn test_verdict_thresholds() {
        let report = |trivial| AuditReport {
            total_pairs: 100,
            trivial_pairs: trivial,
            ..AuditReport::default()
        };
        assert_eq!(report(10).verdict(), AuditVerdict::Good);
        assert_eq!(report(15).verdict(), AuditVerdict::Moderate);
        assert_eq!(report(16).verdict(), AuditVerdict::Poor);
        assert_eq!(AuditReport::default().verdict(), AuditVerdict::Good);
        assert!((report(16).trivial_percentage() - 16.0).abs() < 1e-9);
    }
}
