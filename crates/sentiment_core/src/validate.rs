use crate::AnalysisKind;

/// Upper bound on submitted text, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Input that passed validation and is ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload(String);

impl NormalizedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Reasons user input is rejected before any request is made.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("{}", empty_message(.kind))]
    Empty { kind: AnalysisKind },
    #[error("Text is too long ({actual} characters, at most {max} allowed)")]
    TooLong { max: usize, actual: usize },
    #[error("Please enter a valid URL ({reason})")]
    MalformedUrl { reason: String },
    #[error("Only http and https URLs can be analyzed (got {scheme})")]
    UnsupportedScheme { scheme: String },
}

fn empty_message(kind: &AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Text => "Please enter some text",
        AnalysisKind::Url => "Please enter a URL",
        AnalysisKind::Hashtag => "Please enter a hashtag",
    }
}

/// Normalize and validate raw user input for the given analysis kind.
///
/// - text: trimmed, non-empty, at most [`MAX_TEXT_CHARS`] characters.
/// - url: trimmed, `https://` prepended when no `scheme://` is present, must parse
///   as an http(s) URL with a host. The trimmed (possibly prefixed) string is the
///   payload, not the re-serialized URL.
/// - hashtag: trimmed, at most one leading `#` removed, non-empty remainder.
pub fn validate(kind: AnalysisKind, raw: &str) -> Result<NormalizedPayload, InvalidInput> {
    let trimmed = raw.trim();
    match kind {
        AnalysisKind::Text => validate_text(trimmed),
        AnalysisKind::Url => validate_url(trimmed),
        AnalysisKind::Hashtag => validate_hashtag(trimmed),
    }
}

fn validate_text(trimmed: &str) -> Result<NormalizedPayload, InvalidInput> {
    if trimmed.is_empty() {
        return Err(InvalidInput::Empty {
            kind: AnalysisKind::Text,
        });
    }
    let actual = trimmed.chars().count();
    if actual > MAX_TEXT_CHARS {
        return Err(InvalidInput::TooLong {
            max: MAX_TEXT_CHARS,
            actual,
        });
    }
    Ok(NormalizedPayload(trimmed.to_string()))
}

fn validate_url(trimmed: &str) -> Result<NormalizedPayload, InvalidInput> {
    if trimmed.is_empty() {
        return Err(InvalidInput::Empty {
            kind: AnalysisKind::Url,
        });
    }

    let candidate = if has_scheme_prefix(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = url::Url::parse(&candidate).map_err(|err| InvalidInput::MalformedUrl {
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InvalidInput::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
        });
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(InvalidInput::MalformedUrl {
            reason: "missing host".to_string(),
        });
    }

    Ok(NormalizedPayload(candidate))
}

/// True when the input starts with an RFC 3986 scheme followed by `://`.
fn has_scheme_prefix(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn validate_hashtag(trimmed: &str) -> Result<NormalizedPayload, InvalidInput> {
    let tag = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if tag.is_empty() {
        return Err(InvalidInput::Empty {
            kind: AnalysisKind::Hashtag,
        });
    }
    Ok(NormalizedPayload(tag.to_string()))
}
