use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use sentiment_core::{update, Msg, RequestState, Session};
use sentiment_engine::{EngineHandle, ServiceConfig};

use crate::cli::Cli;
use crate::effects::EffectRunner;
use crate::render;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Configuration or engine construction failed; nothing was submitted.
pub const EXIT_STARTUP: u8 = 3;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Startup errors are returned; failures after startup are mapped to an exit code here.
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = build_config(cli)?;
    engine_info!(
        "Starting kind={} base_url={} max_attempts={}",
        cli.analysis_kind(),
        config.base_url(),
        config.retry.max_attempts
    );
    let engine = EngineHandle::new(config).context("failed to start engine")?;
    let mut screen = Screen::new(
        Session::new(cli.analysis_kind()),
        EffectRunner::new(engine),
        io::stdout(),
    );

    let outcome = match &cli.input {
        Some(input) => screen.run_once(input),
        None => screen.run_lines(spawn_stdin_reader()),
    };
    Ok(ExitCode::from(exit_status(outcome)))
}

fn build_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    Ok(config)
}

fn exit_status(outcome: io::Result<u8>) -> u8 {
    match outcome {
        Ok(code) => code,
        Err(err) => {
            engine_error!("Output failed: {}", err);
            eprintln!("sentiment: {err}");
            EXIT_FAILED
        }
    }
}

/// One analyzer screen: owns its session and renders it to `out` whenever it changes.
struct Screen<W: Write> {
    session: Option<Session>,
    runner: EffectRunner,
    out: W,
}

impl<W: Write> Screen<W> {
    fn new(session: Session, runner: EffectRunner, out: W) -> Self {
        Self {
            session: Some(session),
            runner,
            out,
        }
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn dispatch_msg(&mut self, msg: Msg) -> io::Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        if let Msg::ResponseArrived { generation, .. } = &msg {
            if !session.accepts(*generation) {
                engine_debug!(
                    "Dropping stale response kind={} generation={} latest={}",
                    session.kind(),
                    generation,
                    session.latest_generation()
                );
            }
        }

        let (mut session, effects) = update(session, msg);
        self.runner.enqueue(effects);
        let changed = session.consume_dirty();
        let view = session.view();
        self.session = Some(session);

        if changed {
            if let Some(error) = &view.error {
                engine_warn!("kind={} failed: {}", view.kind, error.detail);
            }
            render::render(&mut self.out, &view, Local::now())?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn submit(&mut self, input: &str) -> io::Result<()> {
        self.dispatch_msg(Msg::InputChanged(input.to_string()))?;
        self.dispatch_msg(Msg::Submitted)
    }

    fn is_pending(&self) -> bool {
        self.session().is_some_and(|s| s.state().is_pending())
    }

    fn pump_engine(&mut self, timeout: Duration) -> io::Result<()> {
        if let Some((kind, msg)) = self.runner.next_msg(timeout) {
            if self.session().is_some_and(|s| s.kind() == kind) {
                self.dispatch_msg(msg)?;
            }
        }
        Ok(())
    }

    fn run_once(&mut self, input: &str) -> io::Result<u8> {
        self.submit(input)?;
        while self.is_pending() {
            self.pump_engine(POLL_INTERVAL)?;
        }
        Ok(self.exit_code())
    }

    fn run_lines(&mut self, lines: mpsc::Receiver<String>) -> io::Result<u8> {
        let mut input_open = true;
        loop {
            while input_open {
                match lines.try_recv() {
                    Ok(line) => self.submit(&line)?,
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => input_open = false,
                }
            }
            if !input_open && !self.is_pending() {
                break;
            }
            self.pump_engine(POLL_INTERVAL)?;
        }
        Ok(self.exit_code())
    }

    fn exit_code(&self) -> u8 {
        let Some(session) = self.session() else {
            return EXIT_SUCCESS;
        };
        match session.state() {
            RequestState::Error(_) => EXIT_FAILED,
            _ if session.validation_error().is_some() => EXIT_INVALID_INPUT,
            _ => EXIT_SUCCESS,
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    engine_warn!("Failed to read stdin: {}", err);
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use sentiment_core::AnalysisKind;

    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn screen<W: Write>(kind: AnalysisKind, out: W) -> Screen<W> {
        let engine = EngineHandle::new(ServiceConfig::default()).expect("engine");
        Screen::new(Session::new(kind), EffectRunner::new(engine), out)
    }

    #[test]
    fn blank_input_exits_as_invalid() {
        let mut screen = screen(AnalysisKind::Hashtag, Vec::new());
        let outcome = screen.run_once("  #  ");

        assert_eq!(exit_status(outcome), EXIT_INVALID_INPUT);
        assert_eq!(
            String::from_utf8(screen.out).unwrap(),
            "error: Please enter a hashtag\n"
        );
    }

    #[test]
    fn broken_output_is_a_failure_not_a_startup_error() {
        let mut screen = screen(AnalysisKind::Text, ClosedPipe);
        let outcome = screen.run_once("");

        assert_eq!(outcome.as_ref().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(exit_status(outcome), EXIT_FAILED);
    }
}
