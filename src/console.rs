//! Line-oriented console front end: command parsing, the board snapshot the
//! reader works from, and the printing done on each notice.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::error;

use crate::kernel::event::{Event, InputEvent};
use crate::pool::PhraseId;
use crate::Reactor;

pub const USAGE: &str =
    "Drop an action with its number (1-5, c1..), '+text' for a custom action, '?text' to tidy one, 'h' for history, 'q' to quit.";

/// Ids the console can target, refreshed after every step.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub slots: Vec<Option<PhraseId>>,
    pub custom: Vec<PhraseId>,
    pub history: Vec<String>,
}

impl Board {
    pub fn capture(reactor: &Reactor) -> Self {
        Self {
            slots: reactor
                .pool
                .slots()
                .iter()
                .map(|slot| slot.phrase.as_ref().map(|p| p.id))
                .collect(),
            custom: reactor.pool.custom().iter().map(|p| p.id).collect(),
            history: reactor.batcher.active_modifications().to_vec(),
        }
    }
}

pub fn print_board(reactor: &Reactor, name: &str) {
    println!("--- actions ---");
    for slot in reactor.pool.slots() {
        match &slot.phrase {
            Some(phrase) => println!("  [{}] {}", slot.index + 1, phrase.display_text(name)),
            None => println!("  [{}] (empty)", slot.index + 1),
        }
    }
    for (i, phrase) in reactor.pool.custom().iter().enumerate() {
        println!("  [c{}] {}", i + 1, phrase.display_text(name));
    }
}

pub fn print_scene(reactor: &Reactor) {
    println!("--- scene ---");
    println!("  {}", reactor.state.description());
    println!("  image: {}", reactor.state.image());
    println!("  history: {}", reactor.batcher.active_modifications().join(" | "));
}

fn print_history(board: &Board) {
    println!("--- history ({}) ---", board.history.len());
    for (i, text) in board.history.iter().enumerate() {
        println!("  {}. {}", i + 1, text);
    }
}

/// Maps a console line onto a reactor event.
pub fn parse_command(line: &str, board: &Board) -> Option<Event> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(Event::Shutdown);
    }
    if let Some(text) = line.strip_prefix('+') {
        return Some(Event::Input(InputEvent::custom("console", text)));
    }
    if let Some(text) = line.strip_prefix('?') {
        return Some(Event::Input(InputEvent::rewrite("console", text)));
    }
    if let Some(n) = line.strip_prefix('c').and_then(|n| n.parse::<usize>().ok()) {
        let id = board.custom.get(n.checked_sub(1)?)?;
        return Some(Event::Input(InputEvent::drop("console", *id)));
    }
    let n = line.parse::<usize>().ok()?;
    let id = board.slots.get(n.checked_sub(1)?)?.as_ref()?;
    Some(Event::Input(InputEvent::drop("console", *id)))
}

/// Forwards commands from `reader` until `q` or end of input. Either way the
/// reactor is sent `Event::Shutdown` exactly once.
pub async fn read_commands<R>(reader: R, tx: mpsc::Sender<Event>, board: watch::Receiver<Board>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let snapshot = board.borrow().clone();
        if line.trim().eq_ignore_ascii_case("h") {
            print_history(&snapshot);
            continue;
        }
        let Some(event) = parse_command(&line, &snapshot) else {
            println!("?? nothing to drop there");
            continue;
        };
        let stop = matches!(event, Event::Shutdown);
        if let Err(e) = tx.send(event).await {
            error!("Failed to send input: {}", e);
            return;
        }
        if stop {
            return;
        }
    }

    if tx.send(Event::Shutdown).await.is_err() {
        error!("Reactor gone before shutdown");
    }
}
