//! # Sentiment
//! Polarity score types, the closed label set, and the default lexicon scorer.
//!
//! The classifier only ever sees [`PolarityScores`]; how they were produced is the
//! business of whatever implements [`PolarityScorer`]. [`LexiconScorer`] is the
//! built-in implementation: a valence lexicon with negation, boosters, ALL-CAPS and
//! exclamation emphasis, and a contrastive "but" rule.

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

static LEXICON: Lazy<Arc<HashMap<String, f32>>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    Arc::new(serde_json::from_str::<HashMap<String, f32>>(raw).expect("valid sentiment lexicon"))
});

/// Scalar added (or subtracted) per booster / dampener word.
const B_INCR: f32 = 0.293;
/// Extra emphasis for an ALL-CAPS word when the text mixes case.
const C_INCR: f32 = 0.733;
/// Valence multiplier applied when a negator precedes the word.
const N_SCALAR: f32 = -0.74;
/// Normalisation constant: compound = x / sqrt(x² + ALPHA).
const ALPHA: f32 = 15.0;

/// Fractional positive/neutral/negative weights plus the normalised aggregate.
///
/// `pos + neu + neg` is expected to be ~1.0 but never enforced; the scorer is
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScores {
    pub pos: f32,
    pub neu: f32,
    pub neg: f32,
    /// Aggregate polarity in <-1.0, 1.0>.
    pub compound: f32,
}

impl PolarityScores {
    pub fn new(pos: f32, neu: f32, neg: f32, compound: f32) -> Self {
        Self {
            pos,
            neu,
            neg,
            compound,
        }
    }
}

/// Discrete sentiment derived from `compound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = anyhow::Error;

    /// Case-insensitive; accepts the display names only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => anyhow::bail!("unknown sentiment label: {other}"),
        }
    }
}

/// Anything that can turn text into polarity scores.
///
/// Errors are the scorer's own and travel to the caller untouched.
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> anyhow::Result<PolarityScores>;

    /// Name for diagnostics/logs.
    fn name(&self) -> &'static str;
}

/// Lexicon-based scorer. Cheap to clone; the lexicon is shared.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: Arc<HashMap<String, f32>>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::embedded()
    }
}

impl LexiconScorer {
    /// Scorer backed by the lexicon compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            lexicon: LEXICON.clone(),
        }
    }

    /// Load a `{ "word": valence, ... }` JSON lexicon from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing lexicon {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let parsed: HashMap<String, f32> = serde_json::from_str(raw)?;
        let lexicon = parsed
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Ok(Self {
            lexicon: Arc::new(lexicon),
        })
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    #[inline]
    fn word_valence(&self, w: &str) -> f32 {
        *self.lexicon.get(w).unwrap_or(&0.0)
    }

    /// Per-token valences after boosters, caps emphasis, negation and the "but" rule.
    fn token_valences(&self, tokens: &[&str]) -> Vec<f32> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let cap_diff = is_cap_differential(tokens);

        let mut out = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let w = lowered[i].as_str();
            // boostery samy o sobě nenesou valenci
            if booster_scalar(w).is_some() {
                out.push(0.0);
                continue;
            }

            let mut v = self.word_valence(w);
            if v != 0.0 {
                if cap_diff && is_all_caps(tokens[i]) {
                    v += C_INCR.copysign(v);
                }

                for k in 1..=3usize {
                    if i < k {
                        break;
                    }
                    if let Some(b) = booster_scalar(lowered[i - k].as_str()) {
                        let mut scalar = b * v.signum();
                        if cap_diff && is_all_caps(tokens[i - k]) {
                            scalar += C_INCR.copysign(v);
                        }
                        scalar *= match k {
                            1 => 1.0,
                            2 => 0.95,
                            _ => 0.9,
                        };
                        v += scalar;
                    }
                }

                let negated = (1..=3).any(|k| i >= k && is_negator(lowered[i - k].as_str()));
                if negated {
                    v *= N_SCALAR;
                }
            }
            out.push(v);
        }

        if let Some(but) = lowered.iter().position(|w| w == "but") {
            for (i, v) in out.iter_mut().enumerate() {
                if i < but {
                    *v *= 0.5;
                } else if i > but {
                    *v *= 1.5;
                }
            }
        }

        out
    }

    /// Pure scoring; the trait impl just wraps this in `Ok`.
    pub fn score(&self, text: &str) -> PolarityScores {
        let text = normalize_apostrophes(text);
        let tokens = tokenize(&text);
        if tokens.is_empty() {
            return PolarityScores::default();
        }

        let valences = self.token_valences(&tokens);
        let punct = punctuation_emphasis(&text);

        let mut sum: f32 = valences.iter().sum();
        if sum > 0.0 {
            sum += punct;
        } else if sum < 0.0 {
            sum -= punct;
        }
        let compound = normalize(sum);

        let (mut pos_sum, mut neg_sum, mut neu_count) = (0.0f32, 0.0f32, 0.0f32);
        for &v in &valences {
            if v > 0.0 {
                pos_sum += v + 1.0;
            } else if v < 0.0 {
                neg_sum += v - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += punct;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= punct;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        if total <= 0.0 {
            return PolarityScores::new(0.0, 0.0, 0.0, round_to(compound, 4));
        }

        PolarityScores {
            pos: round_to((pos_sum / total).abs(), 3),
            neu: round_to((neu_count / total).abs(), 3),
            neg: round_to((neg_sum / total).abs(), 3),
            compound: round_to(compound, 4),
        }
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity_scores(&self, text: &str) -> anyhow::Result<PolarityScores> {
        Ok(self.score(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Typographic quotes (U+2018, U+2019) become `'` so "don’t" hits the negator list.
fn normalize_apostrophes(s: &str) -> Cow<'_, str> {
    if s.contains(['\u{2018}', '\u{2019}']) {
        Cow::Owned(s.replace(['\u{2018}', '\u{2019}'], "'"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Whitespace tokens with surrounding punctuation stripped; apostrophes inside words survive.
fn tokenize(s: &str) -> Vec<&str> {
    s.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_all_caps(tok: &str) -> bool {
    tok.chars().any(|c| c.is_alphabetic())
        && tok
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
}

/// True when some, but not all, tokens are shouted.
fn is_cap_differential(tokens: &[&str]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    caps > 0 && caps < tokens.len()
}

fn booster_scalar(tok: &str) -> Option<f32> {
    match tok {
        "absolutely" | "amazingly" | "completely" | "deeply" | "enormously" | "entirely"
        | "extremely" | "fully" | "greatly" | "highly" | "hugely" | "incredibly" | "really"
        | "so" | "totally" | "tremendously" | "truly" | "utterly" | "very" => Some(B_INCR),
        "barely" | "hardly" | "marginally" | "occasionally" | "partly" | "scarcely"
        | "slightly" | "somewhat" => Some(-B_INCR),
        _ => None,
    }
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nothing"
            | "nobody"
            | "neither"
            | "nor"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "won't"
            | "can't"
            | "couldn't"
            | "shouldn't"
            | "cannot"
            | "without"
    )
}

/// Exclamation marks (max 4) and repeated question marks push the sum outwards.
fn punctuation_emphasis(text: &str) -> f32 {
    let ep = text.matches('!').count().min(4) as f32 * 0.292;
    let qm = text.matches('?').count();
    let qp = match qm {
        0 | 1 => 0.0,
        2 | 3 => qm as f32 * 0.18,
        _ => 0.96,
    };
    ep + qp
}

fn normalize(score: f32) -> f32 {
    let n = score / (score * score + ALPHA).sqrt();
    n.clamp(-1.0, 1.0)
}

fn round_to(x: f32, places: i32) -> f32 {
    let f = 10f32.powi(places);
    (x * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LexiconScorer {
        LexiconScorer::embedded()
    }

    #[test]
    fn embedded_lexicon_loads() {
        assert!(!scorer().is_empty());
    }

    #[test]
    fn sample_sentences_score_in_expected_direction() {
        let s = scorer();
        for text in [
            "I absolutely love this product! It's amazing!",
            "What a wonderful day! Everything is perfect.",
        ] {
            assert!(s.score(text).compound >= 0.05, "expected positive: {text}");
        }
        for text in [
            "This is terrible. I hate it so much.",
            "Worst experience ever. Never again.",
        ] {
            assert!(s.score(text).compound <= -0.05, "expected negative: {text}");
        }
    }

    #[test]
    fn no_lexicon_words_is_fully_neutral() {
        let p = scorer().score("The meeting is scheduled for 3 PM.");
        assert_eq!(p.compound, 0.0);
        assert_eq!(p.neu, 1.0);
        assert_eq!(p.pos, 0.0);
        assert_eq!(p.neg, 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let s = scorer();
        assert!(s.score("this is good").compound > 0.0);
        assert!(s.score("this is not good").compound < 0.0);
    }

    #[test]
    fn curly_apostrophe_negation_matches_ascii() {
        let s = scorer();
        let ascii = s.score("I don't like it");
        let curly = s.score("I don\u{2019}t like it");
        assert!(ascii.compound < 0.0);
        assert_eq!(curly, ascii);
        assert_eq!(s.score("it isn\u{2018}t good"), s.score("it isn't good"));
    }

    #[test]
    fn boosters_and_exclamations_amplify() {
        let s = scorer();
        let plain = s.score("the food was good").compound;
        let boosted = s.score("the food was very good").compound;
        let shouted = s.score("the food was very good!!!").compound;
        assert!(boosted > plain);
        assert!(shouted > boosted);
    }

    #[test]
    fn contrastive_but_favours_second_clause() {
        let p = scorer().score("the plot was good but the acting was terrible");
        assert!(p.compound < 0.0, "got {p:?}");
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(scorer().score("   "), PolarityScores::default());
    }

    #[test]
    fn custom_lexicon_from_json() {
        let s = LexiconScorer::from_json_str(r#"{ " Meh ": -1.0, "": 2.0 }"#).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.score("meh").compound < 0.0);
    }

    #[test]
    fn label_round_trips_through_str() {
        for l in SentimentLabel::ALL {
            assert_eq!(l.as_str().parse::<SentimentLabel>().unwrap(), l);
        }
        assert!("mixed".parse::<SentimentLabel>().is_err());
    }
}
