/*!
 * Application Loop
 * Terminal session, event dispatch and the refresh tick
 */

use super::{input, render};
use crate::core::config::SimConfig;
use crate::core::errors::AppResult;
use crate::memory::{Command, Engine, Transition};
use crate::monitoring::{HostMemorySource, HostSampler};
use crossterm::{
    cursor::Show,
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use rand::Rng;
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode and alternate screen, undone on drop
///
/// Must exist before the `Terminal` is opened so a failed open still
/// restores the shell.
struct ScreenGuard<W: Write> {
    out: W,
    raw_mode: bool,
}

impl ScreenGuard<Stdout> {
    fn enter() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut guard = Self {
            out: io::stdout(),
            raw_mode: true,
        };
        execute!(guard.out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for ScreenGuard<W> {
    fn drop(&mut self) {
        if self.raw_mode {
            if let Err(e) = disable_raw_mode() {
                warn!(error = %e, "Failed to disable raw mode");
            }
        }
        if let Err(e) = execute!(self.out, LeaveAlternateScreen, Show) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
    }
}

/// Open terminal plus the screen state it runs in
///
/// Field order matters: the terminal drops before the screen is restored.
struct TerminalSession<B: Backend, W: Write> {
    terminal: Terminal<B>,
    _screen: ScreenGuard<W>,
}

impl<B: Backend, W: Write> TerminalSession<B, W> {
    fn attach<F>(screen: ScreenGuard<W>, open: F) -> AppResult<Self>
    where
        F: FnOnce() -> io::Result<Terminal<B>>,
    {
        let terminal = open()?;
        Ok(Self {
            terminal,
            _screen: screen,
        })
    }
}

fn open_session() -> AppResult<TerminalSession<CrosstermBackend<Stdout>, Stdout>> {
    let screen = ScreenGuard::enter()?;
    TerminalSession::attach(screen, || Terminal::new(CrosstermBackend::new(io::stdout())))
}

/// Merge the sampler's newest reading into the engine
fn tick<R: Rng>(engine: &mut Engine<R>, sampler: &HostSampler) -> Transition {
    engine.apply(Command::Tick(sampler.latest()))
}

/// Wall clock for the operations panel
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: UtcOffset,
}

impl Clock {
    /// `offset` should be resolved before any threads start; see `main`
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn now(&self) -> String {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        now.format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_else(|_| "--:--:--".to_string())
    }
}

/// Run the interactive front-end until the user quits
pub async fn run<S>(config: SimConfig, source: S, clock: Clock) -> AppResult<()>
where
    S: HostMemorySource + 'static,
{
    let mut engine = Engine::new(&config);
    let sampler = HostSampler::spawn(source, config.refresh_interval);

    let result = match open_session() {
        Ok(mut session) => event_loop(&mut session.terminal, &mut engine, &sampler, &config, clock).await,
        Err(e) => Err(e),
    };

    sampler.shutdown().await;

    let counters = engine.counters();
    info!(
        allocations = counters.total_allocations,
        deallocations = counters.total_deallocations,
        peak_pct = engine.metrics().peak_usage_ratio,
        "Session finished"
    );
    result
}

async fn event_loop(
    terminal: &mut Term,
    engine: &mut Engine,
    sampler: &HostSampler,
    config: &SimConfig,
    clock: Clock,
) -> AppResult<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let snapshot = engine.snapshot();
        let now = clock.now();
        terminal.draw(|f| render::draw(f, &snapshot, &now))?;

        tokio::select! {
            _ = ticker.tick() => {
                tick(engine, sampler);
            }

            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    let Some(command) = input::command_for_key(key) else {
                        continue;
                    };
                    match engine.apply(command) {
                        Transition::Quit => break,
                        Transition::Rejected(reason) => {
                            debug!(%reason, "Command had no effect");
                        }
                        _ => {}
                    }
                }
                // Resize and friends just trigger a redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    Ok(())
}
