use crate::{validate, Effect, Msg, Session};

/// Pure update function: applies a message to a session and returns any effects.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            session.set_input(text);
            Vec::new()
        }
        Msg::Submitted => submit(&mut session),
        Msg::RetryScheduled {
            generation,
            attempt,
            delay_ms,
        } => {
            session.note_retry(generation, attempt, delay_ms);
            Vec::new()
        }
        Msg::ResponseArrived {
            generation,
            outcome,
        } => {
            // Stale generations fall through untouched: last submit wins.
            session.settle(generation, outcome);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (session, effects)
}

fn submit(session: &mut Session) -> Vec<Effect> {
    let payload = match validate(session.kind(), session.input()) {
        Ok(payload) => payload,
        Err(invalid) => {
            // Invalid input never leaves the current state and never reaches the network.
            session.reject_input(invalid);
            return Vec::new();
        }
    };

    let superseded = session.pending_generation();
    let request = session.begin_request(payload);

    let mut effects = Vec::with_capacity(1 + usize::from(superseded.is_some()));
    if let Some(generation) = superseded {
        effects.push(Effect::Supersede {
            kind: session.kind(),
            generation,
        });
    }
    effects.push(Effect::Dispatch(request));
    effects
}
