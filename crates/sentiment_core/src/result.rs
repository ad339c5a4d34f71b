use std::fmt;

use crate::DataIntegrityWarning;

/// Allowed deviation of `pos + neu + neg` from 1.
pub const DETAIL_SUM_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parses a wire label, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
            .into_iter()
            .find(|candidate| candidate.label().eq_ignore_ascii_case(raw))
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// VADER-style breakdown: three proportions plus a signed compound score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailScores {
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
    pub compound: f64,
}

impl DetailScores {
    pub fn proportion_sum(&self) -> f64 {
        self.pos + self.neu + self.neg
    }

    /// Returns a warning when the proportions do not add up to 1 within tolerance.
    pub fn integrity_warning(&self) -> Option<DataIntegrityWarning> {
        let sum = self.proportion_sum();
        // Small slack so a sum of exactly 1 ± tolerance is not flagged by rounding.
        if (sum - 1.0).abs() > DETAIL_SUM_TOLERANCE + f64::EPSILON * 4.0 {
            Some(DataIntegrityWarning {
                sum,
                tolerance: DETAIL_SUM_TOLERANCE,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub time: String,
    pub sentiment_value: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub term: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(term: impl Into<String>, count: u64) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Orders word counts by count descending; equal counts keep their input order.
pub fn sort_word_counts(mut counts: Vec<WordCount>) -> Vec<WordCount> {
    // `sort_by` is stable, which is what keeps first-seen order for ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Canonical analysis outcome, independent of which endpoint produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub score: f64,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub detail: Option<DetailScores>,
    /// Empty when the service sent no timeline.
    pub timeline: Vec<TimelinePoint>,
    /// Sorted per [`sort_word_counts`]; empty when absent.
    pub word_frequency: Vec<WordCount>,
    pub textblob_score: Option<f64>,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl AnalysisResult {
    pub fn new(sentiment: Sentiment, score: f64, confidence: f64) -> Self {
        Self {
            sentiment,
            score,
            confidence,
            detail: None,
            timeline: Vec::new(),
            word_frequency: Vec::new(),
            textblob_score: None,
            warnings: Vec::new(),
        }
    }

    /// Attaches detail scores and records an integrity warning if they are inconsistent.
    pub fn with_detail(mut self, detail: DetailScores) -> Self {
        if let Some(warning) = detail.integrity_warning() {
            self.warnings.push(warning);
        }
        self.detail = Some(detail);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
