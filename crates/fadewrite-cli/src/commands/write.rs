use std::thread;
use std::time::Duration;

use clap::Args;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fadewrite_core::storage::{load_draft, save_draft, Draft};
use fadewrite_core::{
    drive, word_count, Command, Config, DecayEngine, Input, Presenter, TimeoutSeconds,
    TokioTimers, WritingSession,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::store::Store;
use super::terminal::{Rgb, SharedEditor, TerminalGuard, TerminalPresenter};

#[derive(Args)]
pub struct WriteArgs {
    /// Seconds of decay before the text is erased (1-30). Defaults to the config value.
    #[arg(long)]
    timeout: Option<u32>,
    /// Start from the saved draft
    #[arg(long)]
    resume: bool,
}

/// What a keystroke means for the session.
#[derive(Debug, PartialEq)]
enum KeyAction {
    Edit,
    Reset,
    SaveDraft,
    Quit,
    Ignore,
}

/// Apply `key` to `text` and classify it.
fn apply_key(key: &KeyEvent, text: &mut String) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => KeyAction::Quit,
        KeyCode::Char('s') if ctrl => KeyAction::SaveDraft,
        KeyCode::Char(_) if ctrl => KeyAction::Ignore,
        KeyCode::Esc => KeyAction::Reset,
        KeyCode::Char(c) => {
            text.push(c);
            KeyAction::Edit
        }
        KeyCode::Enter => {
            text.push('\n');
            KeyAction::Edit
        }
        KeyCode::Tab => {
            text.push('\t');
            KeyAction::Edit
        }
        KeyCode::Backspace => {
            // Deleting counts as activity even on an empty buffer.
            text.pop();
            KeyAction::Edit
        }
        _ => KeyAction::Ignore,
    }
}

/// Blocking key reader. Runs on its own thread until quit or until the loop
/// stops listening.
fn read_keys(editor: SharedEditor, tx: mpsc::Sender<Input>) {
    loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
                continue;
            }
            Ok(true) => {}
            Err(e) => {
                warn!(error = %e, "terminal input failed");
                let _ = tx.blocking_send(Input::Quit);
                return;
            }
        }
        let key = match event::read() {
            Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "terminal input failed");
                let _ = tx.blocking_send(Input::Quit);
                return;
            }
        };

        let input = {
            let mut state = editor.lock();
            match apply_key(&key, &mut state.text) {
                KeyAction::Edit if state.active => Input::Command(Command::UserEditedText {
                    new_text: state.text.clone(),
                }),
                KeyAction::Edit => {
                    state.active = true;
                    Input::Command(Command::UserRequestedStart {
                        initial_text: Some(state.text.clone()),
                    })
                }
                KeyAction::Reset => {
                    state.text.clear();
                    state.active = false;
                    Input::Command(Command::UserRequestedReset)
                }
                KeyAction::SaveDraft => Input::SaveDraft,
                KeyAction::Quit => Input::Quit,
                KeyAction::Ignore => continue,
            }
        };

        let quitting = input == Input::Quit;
        if tx.blocking_send(input).is_err() || quitting {
            return;
        }
    }
}

/// Saved draft for `--resume`, plus a status line when it could not be used.
/// An unreadable draft starts an empty session instead of failing.
fn resume_draft(store: &Store) -> (Option<Draft>, Option<String>) {
    match load_draft(store) {
        Ok(Some(draft)) => (Some(draft), None),
        Ok(None) => (None, Some("no draft to resume".to_string())),
        Err(e) => {
            warn!(error = %e, "saved draft unreadable; starting empty");
            (None, Some(format!("draft not loaded: {e}")))
        }
    }
}

pub fn run(args: WriteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let timeout = match args.timeout {
        Some(secs) => TimeoutSeconds::new(secs)?,
        None => config.timeout(),
    };

    let store = Store::open();
    let (draft, resume_status) = if args.resume {
        resume_draft(&store)
    } else {
        (None, None)
    };

    let ink = Rgb::parse(&config.ui.ink_color).unwrap_or(Rgb(228, 228, 231));
    let paper = Rgb::parse(&config.ui.paper_color).unwrap_or(Rgb(24, 24, 27));
    let editor = SharedEditor::default();
    let mut presenter = TerminalPresenter::new(ink, paper, config.ui.show_status, editor.clone());
    if !store.is_persistent() {
        presenter.set_status("history unavailable");
    }
    if let Some(status) = resume_status {
        presenter.set_status(status);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let guard = TerminalGuard::enter()?;
    let (summary, leftover) = runtime.block_on(async {
        let (timers, mut wakeups) = TokioTimers::new();
        let engine = DecayEngine::new(timers, timeout, config.easing());
        let mut session = WritingSession::new(engine, store)
            .with_min_archive_words(config.history.min_words);

        let (tx, mut rx) = mpsc::channel(64);
        if let Some(draft) = &draft {
            {
                let mut state = editor.lock();
                state.text = draft.text.clone();
                state.active = true;
            }
            let _ = tx
                .send(Input::Command(Command::UserRequestedStart {
                    initial_text: Some(draft.text.clone()),
                }))
                .await;
        } else {
            presenter.on_restore("");
        }

        let reader_editor = editor.clone();
        let reader = thread::spawn(move || read_keys(reader_editor, tx));

        let summary = drive(&mut session, &mut wakeups, &mut rx, &mut presenter).await;
        rx.close();
        if reader.join().is_err() {
            warn!("key reader thread panicked");
        }

        let leftover = session.buffer().to_string();
        if !leftover.trim().is_empty() {
            if let Err(e) = save_draft(session.archive_mut(), &leftover) {
                warn!(error = %e, "draft not saved on exit");
            }
        }
        (summary, leftover)
    });
    drop(guard);

    debug!(?summary, "write session ended");
    if !leftover.trim().is_empty() {
        println!("draft saved ({} words)", word_count(&leftover));
    }
    if summary.destroyed > 0 {
        println!("{} erased, {} archived", summary.destroyed, summary.archived);
    }
    Ok(())
}
