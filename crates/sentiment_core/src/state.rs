use crate::view_model::{ErrorView, RequestStatus, SessionViewModel};
use crate::{AnalysisError, AnalysisKind, AnalysisResult, InvalidInput, NormalizedPayload};

/// Monotonic per-session request counter. Zero means "nothing submitted yet".
pub type Generation = u64;

/// One submitted request. Superseded by the next submit, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    kind: AnalysisKind,
    payload: String,
    generation: Generation,
}

impl AnalysisRequest {
    pub fn new(kind: AnalysisKind, payload: NormalizedPayload, generation: Generation) -> Self {
        Self {
            kind,
            payload: payload.into_inner(),
            generation,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending {
        generation: Generation,
        /// 1-based number of the attempt currently in flight or scheduled.
        attempt: u32,
        retry_delay_ms: Option<u64>,
    },
    Success(AnalysisResult),
    Error(AnalysisError),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Success(_) | RequestState::Error(_))
    }
}

/// State behind one analyzer screen. Sessions of different kinds never share anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    kind: AnalysisKind,
    input: String,
    latest_generation: Generation,
    active: Option<AnalysisRequest>,
    state: RequestState,
    validation_error: Option<InvalidInput>,
    dirty: bool,
}

impl Session {
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            input: String::new(),
            latest_generation: 0,
            active: None,
            state: RequestState::Idle,
            validation_error: None,
            dirty: false,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn latest_generation(&self) -> Generation {
        self.latest_generation
    }

    pub fn active_request(&self) -> Option<&AnalysisRequest> {
        self.active.as_ref()
    }

    pub fn validation_error(&self) -> Option<&InvalidInput> {
        self.validation_error.as_ref()
    }

    /// Whether an outcome tagged with `generation` would still be applied.
    pub fn accepts(&self, generation: Generation) -> bool {
        generation == self.latest_generation
            && self.pending_generation() == Some(generation)
    }

    pub fn view(&self) -> SessionViewModel {
        let (status, result, error) = match &self.state {
            RequestState::Idle => (RequestStatus::Idle, None, None),
            RequestState::Pending {
                attempt,
                retry_delay_ms,
                ..
            } => (
                RequestStatus::Pending {
                    attempt: *attempt,
                    retry_delay_ms: *retry_delay_ms,
                },
                None,
                None,
            ),
            RequestState::Success(result) => (RequestStatus::Success, Some(result.clone()), None),
            RequestState::Error(err) => (
                RequestStatus::Error,
                None,
                Some(ErrorView::from_error(err, self.kind)),
            ),
        };
        let warnings = result
            .as_ref()
            .map(|r| r.warnings.iter().map(ErrorView::from_warning).collect())
            .unwrap_or_default();
        let validation = self
            .validation_error
            .clone()
            .map(|invalid| ErrorView::from_error(&AnalysisError::from(invalid), self.kind));

        SessionViewModel {
            kind: self.kind,
            input: self.input.clone(),
            generation: self.latest_generation,
            status,
            result,
            error,
            validation,
            warnings,
        }
    }

    /// Returns whether the session changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input || self.validation_error.is_some() {
            self.input = input;
            self.validation_error = None;
            self.dirty = true;
        }
    }

    pub(crate) fn reject_input(&mut self, invalid: InvalidInput) {
        self.validation_error = Some(invalid);
        self.dirty = true;
    }

    /// The generation of the request that is still in flight, if any.
    pub(crate) fn pending_generation(&self) -> Option<Generation> {
        match self.state {
            RequestState::Pending { generation, .. } => Some(generation),
            _ => None,
        }
    }

    /// Starts a new request: bumps the generation and enters `Pending` in one step.
    pub(crate) fn begin_request(&mut self, payload: NormalizedPayload) -> AnalysisRequest {
        self.latest_generation += 1;
        let request = AnalysisRequest::new(self.kind, payload, self.latest_generation);
        self.active = Some(request.clone());
        self.state = RequestState::Pending {
            generation: self.latest_generation,
            attempt: 1,
            retry_delay_ms: None,
        };
        self.validation_error = None;
        self.dirty = true;
        request
    }

    pub(crate) fn note_retry(
        &mut self,
        generation: Generation,
        attempt: u32,
        delay_ms: u64,
    ) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.state = RequestState::Pending {
            generation,
            attempt,
            retry_delay_ms: Some(delay_ms),
        };
        self.dirty = true;
        true
    }

    /// Applies a finished request. Stale or duplicate outcomes are ignored.
    pub(crate) fn settle(
        &mut self,
        generation: Generation,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.state = match outcome {
            Ok(result) => RequestState::Success(result),
            Err(err) => RequestState::Error(err),
        };
        self.dirty = true;
        true
    }
}
