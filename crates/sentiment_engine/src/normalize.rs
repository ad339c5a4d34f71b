//! Decoding of service responses into the canonical [`AnalysisResult`].
//!
//! The three endpoints disagree on where detail scores live and on how word
//! frequencies are shaped. Everything is decoded into loose wire structs first and
//! then checked field by field, so a response either becomes a complete result or a
//! `MalformedResponse`.

use engine_logging::engine_warn;
use serde::Deserialize;
use sentiment_core::{
    sort_word_counts, AnalysisError, AnalysisKind, AnalysisResult, DetailScores, Sentiment,
    TimelinePoint, WordCount,
};

#[derive(Debug, Deserialize)]
struct WireResponse {
    sentiment: Option<String>,
    score: Option<f64>,
    confidence: Option<f64>,
    detail: Option<WireDetail>,
    details: Option<WireDetails>,
    pos: Option<f64>,
    neu: Option<f64>,
    neg: Option<f64>,
    compound_score: Option<f64>,
    #[serde(rename = "wordFrequency", alias = "word_frequency")]
    word_frequency: Option<WireWordFrequency>,
    timeline: Option<Vec<WireTimelinePoint>>,
}

#[derive(Debug, Deserialize)]
struct WireDetail {
    pos: f64,
    neu: f64,
    neg: f64,
    compound: f64,
}

#[derive(Debug, Deserialize)]
struct WireDetails {
    vader_scores: Option<WireDetail>,
    textblob_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireWordFrequency {
    List(Vec<WireWordCount>),
    Map(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct WireWordCount {
    #[serde(alias = "term")]
    word: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct WireTimelinePoint {
    time: String,
    #[serde(alias = "sentimentValue")]
    sentiment: f64,
    volume: f64,
}

/// Where detail scores may be found in a response.
#[derive(Debug, Clone, Copy)]
enum DetailSource {
    /// `detail: {pos, neu, neg, compound}`
    Nested,
    /// `details: {vader_scores: {..}}`
    Vader,
    /// `pos`, `neu`, `neg`, `compound_score` at the top level.
    TopLevel,
}

/// Detail sources consulted for each kind, highest priority first.
fn detail_sources(kind: AnalysisKind) -> &'static [DetailSource] {
    match kind {
        AnalysisKind::Text => &[DetailSource::Nested, DetailSource::TopLevel],
        AnalysisKind::Url => &[DetailSource::Nested],
        AnalysisKind::Hashtag => &[DetailSource::Vader, DetailSource::Nested],
    }
}

/// Converts a 2xx response body into the canonical result.
pub fn normalize(kind: AnalysisKind, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|err| malformed(kind, format!("body is not JSON: {err}")))?;
    if !value.is_object() {
        return Err(malformed(kind, "body is not a JSON object"));
    }
    let wire: WireResponse =
        serde_json::from_value(value).map_err(|err| malformed(kind, err.to_string()))?;

    let label = wire
        .sentiment
        .as_deref()
        .ok_or_else(|| malformed(kind, "missing field `sentiment`"))?;
    let sentiment = Sentiment::parse(label)
        .ok_or_else(|| malformed(kind, format!("unknown sentiment {label:?}")))?;
    let score = require_number(kind, "score", wire.score)?;
    let confidence = require_number(kind, "confidence", wire.confidence)?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(malformed(
            kind,
            format!("confidence {confidence} is outside [0, 1]"),
        ));
    }

    let mut result = AnalysisResult::new(sentiment, score, confidence);
    if let Some(detail) = pick_detail(kind, &wire) {
        result = result.with_detail(detail);
    }
    result.textblob_score = wire.details.as_ref().and_then(|d| d.textblob_score);
    result.timeline = wire
        .timeline
        .unwrap_or_default()
        .into_iter()
        .map(|point| TimelinePoint {
            time: point.time,
            sentiment_value: point.sentiment,
            volume: point.volume,
        })
        .collect();
    if let Some(words) = wire.word_frequency {
        result.word_frequency = word_counts(kind, words)?;
    }

    for warning in &result.warnings {
        engine_warn!("{} response integrity: {}", kind, warning);
    }
    Ok(result)
}

fn pick_detail(kind: AnalysisKind, wire: &WireResponse) -> Option<DetailScores> {
    detail_sources(kind)
        .iter()
        .find_map(|source| match source {
            DetailSource::Nested => wire.detail.as_ref().map(to_detail),
            DetailSource::Vader => wire
                .details
                .as_ref()
                .and_then(|d| d.vader_scores.as_ref())
                .map(to_detail),
            DetailSource::TopLevel => match (wire.pos, wire.neu, wire.neg, wire.compound_score) {
                (Some(pos), Some(neu), Some(neg), Some(compound)) => Some(DetailScores {
                    pos,
                    neu,
                    neg,
                    compound,
                }),
                _ => None,
            },
        })
}

fn to_detail(wire: &WireDetail) -> DetailScores {
    DetailScores {
        pos: wire.pos,
        neu: wire.neu,
        neg: wire.neg,
        compound: wire.compound,
    }
}

fn word_counts(
    kind: AnalysisKind,
    words: WireWordFrequency,
) -> Result<Vec<WordCount>, AnalysisError> {
    let counts = match words {
        WireWordFrequency::List(entries) => entries
            .into_iter()
            .map(|entry| WordCount::new(entry.word, entry.count))
            .collect(),
        WireWordFrequency::Map(entries) => entries
            .into_iter()
            .map(|(term, count)| match count.as_u64() {
                Some(count) => Ok(WordCount::new(term, count)),
                None => Err(malformed(
                    kind,
                    format!("word count for {term:?} is not a non-negative integer"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(sort_word_counts(counts))
}

fn require_number(
    kind: AnalysisKind,
    field: &str,
    value: Option<f64>,
) -> Result<f64, AnalysisError> {
    match value {
        Some(number) if number.is_finite() => Ok(number),
        Some(number) => Err(malformed(kind, format!("field `{field}` is {number}"))),
        None => Err(malformed(kind, format!("missing field `{field}`"))),
    }
}

fn malformed(kind: AnalysisKind, reason: impl AsRef<str>) -> AnalysisError {
    AnalysisError::malformed(format!("{kind} response: {}", reason.as_ref()))
}
