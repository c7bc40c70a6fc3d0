//! Real-time session loop.
//!
//! Joins editor input and timer wakeups onto one logical timeline. Input is
//! polled first so an edit always preempts a wakeup that arrived at the same
//! moment; a wakeup made stale by that edit is then dropped by its
//! generation.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::{Command, Event};
use crate::present::Presenter;
use crate::session::WritingSession;
use crate::storage::{clear_draft, save_draft, Archive, KvStore};
use crate::timer::{TokioTimers, Wakeup};

/// What the editor surface can send into the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Persist the current buffer as the draft.
    SaveDraft,
    Quit,
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub events: usize,
    pub destroyed: usize,
    pub archived: usize,
}

/// Run until `Input::Quit` or until the input channel closes.
///
/// Every event is forwarded to `presenter`. Errors from commands and draft
/// saves are reported through `Presenter::on_status` and never end the loop.
/// A destruction also drops any saved draft.
pub async fn drive<A, P>(
    session: &mut WritingSession<TokioTimers, A>,
    wakeups: &mut mpsc::UnboundedReceiver<Wakeup>,
    inputs: &mut mpsc::Receiver<Input>,
    presenter: &mut P,
) -> DriveSummary
where
    A: Archive + KvStore,
    P: Presenter + ?Sized,
{
    let mut summary = DriveSummary::default();
    loop {
        let events = tokio::select! {
            biased;
            input = inputs.recv() => match input {
                None | Some(Input::Quit) => break,
                Some(Input::Command(command)) => match session.dispatch(command) {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(error = %e, "command rejected");
                        presenter.on_status(&e.to_string());
                        Vec::new()
                    }
                },
                Some(Input::SaveDraft) => {
                    let text = session.buffer().to_string();
                    match save_draft(session.archive_mut(), &text) {
                        Ok(draft) => presenter.on_status(&format!("draft saved ({} words)", draft.word_count)),
                        Err(e) => presenter.on_status(&format!("draft not saved: {e}")),
                    }
                    Vec::new()
                }
            },
            Some(wakeup) = wakeups.recv() => session.handle_wakeup(wakeup),
        };

        for event in &events {
            render_event(session, presenter, event, &mut summary);
        }
        // Erased text must not come back through --resume.
        if events
            .iter()
            .any(|e| matches!(e, Event::TextDestroyed { .. }))
        {
            if let Err(e) = clear_draft(session.archive_mut()) {
                warn!(error = %e, "stale draft not cleared after destruction");
            }
        }
    }
    debug!(?summary, "session loop finished");
    summary
}

fn render_event<A, P>(
    session: &WritingSession<TokioTimers, A>,
    presenter: &mut P,
    event: &Event,
    summary: &mut DriveSummary,
) where
    A: Archive,
    P: Presenter + ?Sized,
{
    summary.events += 1;
    match event {
        Event::DecayTick { .. } => {
            if let Some(frame) = event.frame() {
                presenter.on_frame(session.buffer(), &frame);
            }
        }
        Event::TextDestroyed {
            final_text,
            word_count,
            archived,
            ..
        } => {
            summary.destroyed += 1;
            if *archived {
                summary.archived += 1;
            }
            presenter.on_destroyed(final_text, *word_count);
        }
        Event::SessionStarted { .. } | Event::ActivityObserved { .. } | Event::SessionReset { .. } => {
            presenter.on_restore(session.buffer());
        }
        Event::TimeoutChanged { timeout_seconds, .. } => {
            presenter.on_status(&format!("timeout set to {timeout_seconds}s"));
        }
    }
}
