use std::fmt;

/// The three analyzer flavours. Each one fixes an endpoint, a request field and a
/// validation rule; everything else in the request pipeline is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKind {
    Text,
    Url,
    Hashtag,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Text,
        AnalysisKind::Url,
        AnalysisKind::Hashtag,
    ];

    /// Path of the analysis endpoint, relative to the service base URL.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            AnalysisKind::Text => "/analyze/text",
            AnalysisKind::Url => "/analyze/url",
            AnalysisKind::Hashtag => "/analyze/hashtag",
        }
    }

    /// Name of the JSON field that carries the payload in the request body.
    pub fn request_field(self) -> &'static str {
        match self {
            AnalysisKind::Text => "text",
            AnalysisKind::Url => "url",
            AnalysisKind::Hashtag => "hashtag",
        }
    }

    /// Human-facing noun used in messages.
    pub fn noun(self) -> &'static str {
        match self {
            AnalysisKind::Text => "text",
            AnalysisKind::Url => "URL",
            AnalysisKind::Hashtag => "hashtag",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_field())
    }
}
