//! Root canonicalization.
//!
//! Folds the many spellings of a reconstructed root (`*habjan-`, `habban`,
//! `PIE *bhel-`, `*wr̥-idh-`) into one [`CanonicalRootId`], or rejects the
//! string as junk.
//!
//! # Steps
//!
//! 1. Strip language/prefix labels and leading `*` markers
//! 2. Hold aside a trailing `(N)` sense suffix, drop a nasal infinitive ending
//! 3. Return already-canonical ids unchanged
//! 4. Uppercase, NFD-decompose and drop combining marks
//! 5. Drop punctuation except `-`
//! 6. Collapse geminate consonants
//! 7. Apply the [`AblautTable`] until stable
//! 8. Drop hyphens, re-append the suffix
//! 9. Validate against length rules and stoplists

use crate::config::AblautRuleConfig;
use crate::models::root::split_sense_suffix;
use crate::models::{CanonicalRootId, Canonicalization, RejectionReason};
use crate::{Error, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Labels stripped from the front of a raw root, matched case-insensitively.
const LABEL_PREFIXES: &[&str] = &[
    "proto-indo-european ",
    "pie ",
    "proto-germanic ",
    "proto-celtic ",
    "proto-slavic ",
    "proto-baltic ",
    "sanskrit ",
    "latin ",
    "greek ",
    "ultimately from ",
    "from ",
    "the root ",
    "root ",
];

/// Built-in ablaut/orthographic equivalences: `(pattern, replacement, family)`.
///
/// Applied in order to the uppercased, degeminated root.
const BUILTIN_ABLAUT_RULES: &[(&str, &str, &str)] = &[
    // Germanic *habjan- (have, heave, hover)
    ("HAB[BJ]*AN", "HABJAN", "habjan"),
    ("HAF[FT]*AN", "HABJAN", "habjan"),
    ("HEB[BJ]*AN", "HABJAN", "habjan"),
    // PIE *wer- grades
    ("WER[HDNT]*", "WER", "wer"),
    ("WOR[HDNT]*", "WER", "wer"),
    ("WUR[HDNT]*", "WER", "wer"),
    // PIE *bhel- (blow, belly)
    ("BHEL[HJLW]*", "BHEL", "bhel"),
    ("BHOL[HJLW]*", "BHEL", "bhel"),
    ("BHUL[HJLW]*", "BHEL", "bhel"),
    // PIE *dʰeh₁- (do, deed)
    ("DHE[HJ]*", "DHE", "dhe"),
    ("DHO[HJ]*", "DHE", "dhe"),
    ("DHA[HJ]*", "DHE", "dhe"),
    // Germanic spelling: -ian/-jan, -ij/-j
    ("([BCDFGHJKLMNPQRSTVWXYZ]+)IAN", "${1}JAN", "germanic-jan"),
    ("([BCDFGHJKLMNPQRSTVWXYZ]+)IJ", "${1}J", "germanic-j"),
];

/// Three-letter common words and fragments that are never roots.
const MORPHOLOGICAL_FRAGMENTS: &[&str] = &[
    "CAR", "CAT", "BAT", "BAD", "BAG", "BIG", "BOX", "BOY", "BAY", "CUP", "CUT", "DOG", "EAR",
    "EYE", "FAR", "FUN", "GET", "GOT", "HAD", "HAS", "HIM", "HIS", "HOW", "ITS", "MAY", "NEW",
    "NOW", "OLD", "OUR", "OUT", "PUT", "RUN", "SAY", "SEE", "SIT", "THE", "TOO", "TOP", "TWO",
    "USE", "WAY", "WHO", "WIN", "YES", "YET",
];

/// Tokens that slip through extraction but are not roots.
const NON_ROOT_TOKENS: &[&str] = &[
    "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HAD", "HER", "WAS", "ONE",
    "OUR", "OUT", "DAY", "GET", "HAS", "HIM", "HIS", "HOW", "ITS", "MAY", "NEW", "NOW", "OLD",
    "SEE", "TWO", "WHO", "BOY", "DID", "SHE", "USE", "WAY", "OIL", "SIT", "SET", "RUN", "EAT",
    "ENGLISH", "GERMAN", "FRENCH", "DUTCH", "LATIN", "GREEK", "SANSKRIT", "MIDDLE", "PROTO",
    "ANCIENT", "EARLY", "COGNATE", "RELATED", "COMPARE", "ALSO", "WORD", "TERM", "MEANING",
    "SENSE", "LITERALLY", "ORIGINALLY", "PROBABLY", "POSSIBLY", "PERHAPS", "SCOTS", "WELSH",
    "IRISH", "NORSE", "GERMANIC", "CELTIC", "SLAVIC", "INFLUENCED", "BORROWED", "AKIN",
];

/// Minimum alphabetic characters in an accepted root.
const MIN_ROOT_LETTERS: usize = 3;

/// Upper bound on ablaut passes; rules may feed one another.
const MAX_ABLAUT_PASSES: usize = 4;

/// Precomposed nasal vowels of Germanic infinitive endings.
const NASAL_VOWELS: &[char] = &['ą', 'ę', 'į', 'ǫ', 'ų', 'Ą', 'Ę', 'Į', 'Ǫ', 'Ų'];

/// Combining ogonek, for decomposed nasal vowels.
const OGONEK: char = '\u{0328}';

/// One equivalence rule of the ablaut table.
#[derive(Debug, Clone)]
pub struct AblautRule {
    pattern: Regex,
    replacement: String,
    family: String,
}

impl AblautRule {
    /// Compiles a rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the pattern is not a valid regex.
    pub fn new(pattern: &str, replacement: &str, family: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::InvalidInput(format!("invalid ablaut pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
            family: family.to_string(),
        })
    }

    /// The source regex.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// The family label.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }
}

/// Ordered table of spellings that denote the same root.
///
/// This table is the only place that decides "these spellings are one
/// root". It can be listed for auditing and extended from configuration.
#[derive(Debug, Clone)]
pub struct AblautTable {
    rules: Vec<AblautRule>,
}

impl AblautTable {
    /// An empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rule set.
    #[must_use]
    pub fn builtin() -> Self {
        let rules = BUILTIN_ABLAUT_RULES
            .iter()
            .filter_map(|(pattern, replacement, family)| {
                AblautRule::new(pattern, replacement, family)
                    .inspect_err(|e| tracing::error!(error = %e, "Skipping built-in ablaut rule"))
                    .ok()
            })
            .collect();
        Self { rules }
    }

    /// Appends a rule after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the pattern does not compile.
    pub fn with_rule(mut self, pattern: &str, replacement: &str, family: &str) -> Result<Self> {
        self.rules.push(AblautRule::new(pattern, replacement, family)?);
        Ok(self)
    }

    /// Appends rules from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] on the first pattern that does not compile.
    pub fn extended(self, extra: &[AblautRuleConfig]) -> Result<Self> {
        extra.iter().try_fold(self, |table, rule| {
            table.with_rule(
                &rule.pattern,
                &rule.replacement,
                rule.family.as_deref().unwrap_or("custom"),
            )
        })
    }

    /// Applies the rules in order, repeating until the root stops changing.
    #[must_use]
    pub fn apply(&self, root: &str) -> String {
        let mut current = self.apply_once(root);
        for _ in 1..MAX_ABLAUT_PASSES {
            let next = self.apply_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn apply_once(&self, root: &str) -> String {
        self.rules.iter().fold(root.to_string(), |acc, rule| {
            rule.pattern
                .replace_all(&acc, rule.replacement.as_str())
                .into_owned()
        })
    }

    /// The rules, in application order.
    #[must_use]
    pub fn rules(&self) -> &[AblautRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for AblautTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Converts raw root strings into canonical ids.
///
/// Deterministic and idempotent: canonicalizing an accepted id returns the
/// same id.
#[derive(Debug, Clone)]
pub struct RootCanonicalizer {
    ablaut: AblautTable,
}

impl Default for RootCanonicalizer {
    fn default() -> Self {
        Self::new(AblautTable::builtin())
    }
}

impl RootCanonicalizer {
    /// Creates a canonicalizer over the given ablaut table.
    #[must_use]
    pub const fn new(ablaut: AblautTable) -> Self {
        Self { ablaut }
    }

    /// Creates a canonicalizer with the built-in table plus configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a configured rule does not compile.
    pub fn from_config(extra: &[AblautRuleConfig]) -> Result<Self> {
        Ok(Self::new(AblautTable::builtin().extended(extra)?))
    }

    /// The ablaut table in use.
    #[must_use]
    pub const fn ablaut(&self) -> &AblautTable {
        &self.ablaut
    }

    /// Canonicalizes a raw root string.
    pub fn canonicalize(&self, raw: &str) -> Canonicalization {
        let outcome = self.canonicalize_inner(raw);
        let label = match &outcome {
            Canonicalization::Accepted(_) => "accepted",
            Canonicalization::Rejected(reason) => {
                tracing::debug!(raw, reason = %reason, "Rejected root");
                reason.as_str()
            },
        };
        metrics::counter!("canonicalization_total", "outcome" => label).increment(1);
        outcome
    }

    /// Canonicalizes and keeps only accepted ids.
    pub fn canonical_id(&self, raw: &str) -> Option<CanonicalRootId> {
        self.canonicalize(raw).accepted()
    }

    fn canonicalize_inner(&self, raw: &str) -> Canonicalization {
        let stripped = strip_labels(raw);
        if stripped.is_empty() {
            return Canonicalization::Rejected(RejectionReason::Empty);
        }

        let (body, sense) = split_sense_suffix(stripped);
        let body = strip_nasal_ending(body);
        if is_canonical_shape(body) {
            return match validate(body) {
                Ok(()) => Canonicalization::Accepted(with_sense(body.to_string(), sense)),
                Err(reason) => Canonicalization::Rejected(reason),
            };
        }

        let cleaned: String = body
            .to_uppercase()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .filter(|c| c.is_alphanumeric() || *c == '-')
            .collect();
        let degeminated = collapse_geminates(&cleaned);
        let unified = self.ablaut.apply(&degeminated);
        let base: String = unified.chars().filter(|c| *c != '-').collect();

        if let Err(reason) = validate(&base) {
            return Canonicalization::Rejected(reason);
        }
        Canonicalization::Accepted(with_sense(base, sense))
    }
}

fn with_sense(base: String, sense: Option<u32>) -> CanonicalRootId {
    match sense {
        Some(n) => CanonicalRootId::new(format!("{base}({n})")),
        None => CanonicalRootId::new(base),
    }
}

/// True for strings the slow path would return unchanged: uppercase
/// alphanumerics with no combining marks or hyphens.
fn is_canonical_shape(body: &str) -> bool {
    !body.is_empty()
        && body.chars().all(|c| {
            c.is_alphanumeric() && !is_combining_mark(c) && {
                let mut upper = c.to_uppercase();
                upper.next() == Some(c) && upper.next().is_none()
            }
        })
}

/// Drops a Germanic nasal infinitive ending: `habjaną` becomes `habjan`.
fn strip_nasal_ending(body: &str) -> &str {
    let trimmed = body.trim_end_matches('-');
    let mut chars = trimmed.chars();
    match chars.next_back() {
        Some(c) if NASAL_VOWELS.contains(&c) => chars.as_str(),
        Some(OGONEK) => {
            chars.next_back();
            chars.as_str()
        },
        _ => body,
    }
}

/// Strips prefix labels and `*` markers until neither remains.
fn strip_labels(raw: &str) -> &str {
    let mut current = raw.trim();
    loop {
        let before = current.len();
        for prefix in LABEL_PREFIXES {
            let matches = current
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if matches {
                current = current[prefix.len()..].trim_start();
                break;
            }
        }
        current = current.trim_start_matches('*').trim();
        if current.len() == before {
            return current;
        }
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_uppercase() && !matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')
}

/// Collapses runs of the same consonant: `HABBAN` becomes `HABAN`.
fn collapse_geminates(root: &str) -> String {
    let mut out = String::with_capacity(root.len());
    let mut previous: Option<char> = None;
    for c in root.chars() {
        if previous == Some(c) && is_consonant(c) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

/// Validates a canonical base (no sense suffix).
fn validate(base: &str) -> std::result::Result<(), RejectionReason> {
    if base.is_empty() {
        return Err(RejectionReason::Empty);
    }
    if base.chars().all(char::is_numeric) {
        return Err(RejectionReason::Numeric);
    }
    let letters = base.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return Err(RejectionReason::NoLetters);
    }
    if letters < MIN_ROOT_LETTERS {
        return Err(RejectionReason::TooShort { letters });
    }

    let ascii_letters: String = base.chars().filter(char::is_ascii_uppercase).collect();
    if ascii_letters.len() == 3 && MORPHOLOGICAL_FRAGMENTS.contains(&ascii_letters.as_str()) {
        return Err(RejectionReason::MorphologicalFragment(ascii_letters));
    }
    if NON_ROOT_TOKENS.contains(&ascii_letters.as_str()) {
        return Err(RejectionReason::NonRootToken(ascii_letters));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn canon(raw: &str) -> Option<String> {
        RootCanonicalizer::default()
            .canonical_id(raw)
            .map(|id| id.as_str().to_string())
    }

    #[test_case("*wr̥-idh-", "WRIDH" ; "syllabic r with hyphens")]
    #[test_case("*wer-(2)", "WER(2)" ; "numbered sense")]
    #[test_case("PIE *bhel-", "BHEL" ; "pie label")]
    #[test_case("ghen", "GHEN" ; "bare root")]
    #[test_case("BHEL", "BHEL" ; "already canonical")]
    #[test_case("*deḱ-", "DEK" ; "palatal diacritic")]
    #[test_case("*sal-", "SAL" ; "salt root")]
    #[test_case("from Proto-Indo-European *bʰer-", "BʰER" ; "stacked labels")]
    #[test_case("the root *ghos-ti-", "GHOSTI" ; "the root label")]
    fn test_canonicalize_accepts(raw: &str, expected: &str) {
        assert_eq!(canon(raw).as_deref(), Some(expected));
    }

    #[test_case("habban" ; "geminate b")]
    #[test_case("habjan" ; "j grade")]
    #[test_case("hebban" ; "e grade")]
    #[test_case("*habjan-" ; "asterisked")]
    #[test_case("Proto-Germanic *habjaną" ; "nasal infinitive ending")]
    #[test_case("habjana\u{0328}" ; "decomposed nasal ending")]
    #[test_case("Proto-Germanic *haftan" ; "haft variant")]
    fn test_ablaut_unification(raw: &str) {
        assert_eq!(canon(raw).as_deref(), Some("HABJAN"));
    }

    #[test]
    fn test_rejections() {
        let c = RootCanonicalizer::default();
        assert!(matches!(
            c.canonicalize("car"),
            Canonicalization::Rejected(RejectionReason::MorphologicalFragment(_))
        ));
        assert!(!c.canonicalize("the").is_accepted());
        assert_eq!(
            c.canonicalize(""),
            Canonicalization::Rejected(RejectionReason::Empty)
        );
        assert_eq!(
            c.canonicalize("*"),
            Canonicalization::Rejected(RejectionReason::Empty)
        );
        assert_eq!(
            c.canonicalize("1234"),
            Canonicalization::Rejected(RejectionReason::Numeric)
        );
        assert_eq!(
            c.canonicalize("ab"),
            Canonicalization::Rejected(RejectionReason::TooShort { letters: 2 })
        );
        assert!(matches!(
            c.canonicalize("probably"),
            Canonicalization::Rejected(RejectionReason::NonRootToken(_))
        ));
        assert!(matches!(
            c.canonicalize("COMPARE"),
            Canonicalization::Rejected(RejectionReason::NonRootToken(_))
        ));
        assert!(!c.canonicalize("CAR").is_accepted());
    }

    #[test]
    fn test_idempotent_on_outputs() {
        let c = RootCanonicalizer::default();
        for raw in ["*wr̥-idh-", "*wer-(2)", "habban", "*deḱ-", "dʰeh₁", "ǵʰen-"] {
            if let Some(id) = c.canonical_id(raw) {
                assert_eq!(c.canonical_id(id.as_str()), Some(id.clone()), "raw: {raw}");
            }
        }
    }

    #[test]
    fn test_chained_rules_reach_fixed_point() {
        let c = RootCanonicalizer::default();
        let id = c.canonical_id("hebianþ").unwrap();
        assert_eq!(id.as_str(), "HABJANÞ");
        assert_eq!(c.canonical_id(id.as_str()), Some(id));
    }

    #[test]
    fn test_non_ascii_ids_are_fixed_points() {
        let c = RootCanonicalizer::default();
        for id in ["BʰER", "HABJANÞ", "KEH₂P", "WER(2)"] {
            assert_eq!(canon(id).as_deref(), Some(id));
        }
    }

    #[test]
    fn test_strip_nasal_ending() {
        assert_eq!(strip_nasal_ending("habjaną"), "habjan");
        assert_eq!(strip_nasal_ending("habjaną-"), "habjan");
        assert_eq!(strip_nasal_ending("habjan-"), "habjan-");
        assert_eq!(strip_nasal_ending("ą"), "");
    }

    #[test]
    fn test_strip_labels() {
        assert_eq!(strip_labels("  PIE *bhel- "), "bhel-");
        assert_eq!(strip_labels("ultimately from *ker-"), "ker-");
        assert_eq!(strip_labels("Latin"), "Latin");
        assert_eq!(strip_labels("**root *x"), "x");
    }

    #[test]
    fn test_collapse_geminates_keeps_vowels() {
        assert_eq!(collapse_geminates("HABBAN"), "HABAN");
        assert_eq!(collapse_geminates("WOOD"), "WOOD");
        assert_eq!(collapse_geminates("SSTTAL"), "STAL");
    }

    #[test]
    fn test_builtin_table_compiles_every_rule() {
        let table = AblautTable::builtin();
        assert_eq!(table.len(), BUILTIN_ABLAUT_RULES.len());
        assert!(table.rules().iter().any(|r| r.family() == "habjan"));
    }

    #[test]
    fn test_table_extension() {
        let extra = vec![AblautRuleConfig {
            pattern: "GHOS-?TI".to_string(),
            replacement: "GHOS".to_string(),
            family: Some("guest/host".to_string()),
        }];
        let c = RootCanonicalizer::from_config(&extra).unwrap();
        assert_eq!(c.canonical_id("*ghos-ti-").map(|id| id.to_string()), Some("GHOS".into()));
        assert_eq!(c.ablaut().rules().last().map(AblautRule::family), Some("guest/host"));
    }

    #[test]
    fn test_bad_rule_is_rejected() {
        let result = AblautTable::empty().with_rule("([", "X", "broken");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
