use std::io::{self, Write};

use chrono::{DateTime, Local};
use sentiment_core::{AnalysisResult, RequestStatus, SessionViewModel};

/// How many word-frequency rows are printed.
const TOP_WORDS: usize = 10;

pub fn render<W: Write>(
    out: &mut W,
    view: &SessionViewModel,
    now: DateTime<Local>,
) -> io::Result<()> {
    if let Some(invalid) = &view.validation {
        writeln!(out, "error: {}", invalid.message)?;
    }

    match view.status {
        RequestStatus::Idle => {}
        RequestStatus::Pending {
            attempt,
            retry_delay_ms: None,
        } if attempt <= 1 => {
            writeln!(out, "Analyzing {}...", view.kind.noun())?;
        }
        RequestStatus::Pending {
            attempt,
            retry_delay_ms,
        } => {
            let seconds = retry_delay_ms.unwrap_or_default() as f64 / 1000.0;
            writeln!(
                out,
                "Service busy, retrying in {seconds:.1}s (attempt {attempt})..."
            )?;
        }
        RequestStatus::Success => {
            if let Some(result) = &view.result {
                render_result(out, result)?;
                for warning in &view.warnings {
                    writeln!(out, "warning: {}", warning.message)?;
                }
                writeln!(out, "Analyzed at {}", now.format("%Y-%m-%d %H:%M:%S"))?;
            }
        }
        RequestStatus::Error => {
            if let Some(error) = &view.error {
                writeln!(out, "error: {}", error.message)?;
            }
        }
    }
    Ok(())
}

fn render_result<W: Write>(out: &mut W, result: &AnalysisResult) -> io::Result<()> {
    writeln!(out, "Sentiment:  {}", result.sentiment)?;
    writeln!(out, "Score:      {:.3}", result.score)?;
    writeln!(out, "Confidence: {:.0}%", result.confidence * 100.0)?;
    if let Some(detail) = &result.detail {
        writeln!(
            out,
            "Detail:     pos {:.3}  neu {:.3}  neg {:.3}  compound {:+.3}",
            detail.pos, detail.neu, detail.neg, detail.compound
        )?;
    }
    if let Some(textblob) = result.textblob_score {
        writeln!(out, "TextBlob:   {textblob:+.3}")?;
    }

    if !result.word_frequency.is_empty() {
        writeln!(out, "Top words:")?;
        let width = result
            .word_frequency
            .iter()
            .take(TOP_WORDS)
            .map(|w| w.term.chars().count())
            .max()
            .unwrap_or(0);
        for word in result.word_frequency.iter().take(TOP_WORDS) {
            writeln!(out, "  {:<width$}  {}", word.term, word.count)?;
        }
    }

    if !result.timeline.is_empty() {
        writeln!(out, "Timeline:")?;
        for point in &result.timeline {
            writeln!(
                out,
                "  {}  {:+.3}  vol {}",
                point.time, point.sentiment_value, point.volume
            )?;
        }
    }
    Ok(())
}
