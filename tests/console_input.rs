use fanto::console::{parse_command, read_commands, Board};
use fanto::kernel::event::{Event, InputContent};
use fanto::pool::PhraseId;
use tokio::sync::{mpsc, watch};

fn board() -> (Board, PhraseId, PhraseId) {
    let slot = PhraseId::new();
    let custom = PhraseId::new();
    let board = Board {
        slots: vec![Some(slot), None],
        custom: vec![custom],
        history: Vec::new(),
    };
    (board, slot, custom)
}

async fn collect(input: &'static [u8], board: Board) -> Vec<Event> {
    let (tx, mut rx) = mpsc::channel(16);
    let (_board_tx, board_rx) = watch::channel(board);
    read_commands(input, tx, board_rx).await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn end_of_input_shuts_the_reactor_down() {
    let events = collect(b"", Board::default()).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Shutdown));
}

#[tokio::test]
async fn commands_are_forwarded_before_shutdown() {
    let (board, slot, _) = board();
    let events = collect(b"1\n\n2\nh\n+Paint the fence purple!\n", board).await;

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], Event::Input(input) if matches!(input.content, InputContent::Drop(id) if id == slot)));
    assert!(matches!(&events[1], Event::Input(input) if matches!(&input.content, InputContent::Custom(t) if t == "Paint the fence purple!")));
    assert!(matches!(events[2], Event::Shutdown));
}

#[tokio::test]
async fn quit_sends_a_single_shutdown() {
    let events = collect(b"q\n1\n", board().0).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Shutdown));
}

#[test]
fn parses_custom_tray_and_rewrite_commands() {
    let (board, _, custom) = board();
    assert!(matches!(
        parse_command("c1", &board),
        Some(Event::Input(input)) if matches!(input.content, InputContent::Drop(id) if id == custom)
    ));
    assert!(matches!(
        parse_command("?make the elephant dance", &board),
        Some(Event::Input(input)) if matches!(&input.content, InputContent::Rewrite(t) if t == "make the elephant dance")
    ));
    assert!(parse_command("c2", &board).is_none());
    assert!(parse_command("0", &board).is_none());
}
