//! Interactive client loop.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{mpsc, watch};

use crate::{
    config::ClientConfig,
    domain::RoomId,
    error::ClientError,
    session::ChatSession,
    state::SessionState,
    transport::ConnectionState,
};

use super::{
    command::{self, Command},
    formatter::MessageFormatter,
    ui::{prompt_for, redisplay_prompt},
};

/// What has already been printed, so only changes are rendered
#[derive(Default)]
struct Rendered {
    entries: usize,
    counts: Option<(u64, Option<u64>)>,
}

/// Run the interactive client until the user quits or the connection is closed.
///
/// # Errors
///
/// Returns [`ClientError::InvalidRoomId`] before connecting if `room` is
/// empty, and [`ClientError::ConnectionError`] once the transport gives up.
pub async fn run_client(config: ClientConfig, room: Option<String>) -> Result<(), ClientError> {
    let room = room.map(RoomId::new).transpose()?;
    tracing::info!("Connecting to {}", config.backend_url);
    let session = ChatSession::start(config);

    if let Some(room) = room {
        session.join_room(room.clone())?;
        print!("{}", MessageFormatter::format_room_joined(room.as_str()));
    }

    println!("\nType messages and press Enter to send. /help lists commands. Press Ctrl+C to exit.\n");

    let (prompt_tx, prompt_rx) = watch::channel(prompt_for(&session.chat_room_id()));
    let mut input_rx = spawn_readline(prompt_rx);
    let mut state_rx = session.subscribe();
    let mut connection_rx = session.connection_state();
    let mut rendered = Rendered::default();

    loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break;
                };
                match command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Join(room)) => {
                        session.join_room(room.clone())?;
                        prompt_tx.send_replace(prompt_for(room.as_str()));
                        print!("{}", MessageFormatter::format_room_joined(room.as_str()));
                    }
                    Ok(Command::Say(message)) => session.send_message(&message)?,
                    Ok(Command::Clear) => {
                        session.clear_history();
                        rendered.entries = 0;
                    }
                    Ok(Command::Help) => print!("{}", MessageFormatter::format_help()),
                    Err(e) => print!("{}", MessageFormatter::format_error(&e.to_string())),
                }
                redisplay_prompt(&prompt_tx.borrow());
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                render_state(&state, &mut rendered);
                redisplay_prompt(&prompt_tx.borrow());
            }
            changed = connection_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection_rx.borrow_and_update();
                if let Some(text) = MessageFormatter::format_connection_state(state) {
                    print!("{}", text);
                    redisplay_prompt(&prompt_tx.borrow());
                }
                if state == ConnectionState::Closed {
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
            }
        }
    }

    tracing::info!("Client session ended normally");
    Ok(())
}

/// Print transcript entries and counters that changed since the last render
fn render_state(state: &SessionState, rendered: &mut Rendered) {
    let history = state.chat_history();
    if history.len() < rendered.entries {
        rendered.entries = 0;
    }
    for entry in &history[rendered.entries..] {
        print!("{}", MessageFormatter::format_entry(entry));
    }
    rendered.entries = history.len();

    let room = state
        .current_room_id()
        .map(|_| state.room_client_count());
    let counts = (state.total_client_count(), room);
    if rendered.counts != Some(counts) {
        print!("{}", MessageFormatter::format_counts(counts.0, counts.1));
        rendered.counts = Some(counts);
    }
}

/// Read lines on a blocking thread (rustyline is synchronous)
fn spawn_readline(prompt: watch::Receiver<String>) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let current_prompt = prompt.borrow().clone();
            match rl.readline(&current_prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatEntry;

    #[tokio::test]
    async fn test_run_client_rejects_empty_room_before_connecting() {
        // テスト項目: 起動時のルーム ID が空の場合、接続前に InvalidRoomId エラーになる
        // given (前提条件):
        let config = ClientConfig::new("ws://127.0.0.1:1/ws");

        // when (操作):
        let result = run_client(config, Some(String::new())).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidRoomId(_))));
    }

    #[test]
    fn test_render_state_resets_after_clear() {
        // テスト項目: 履歴がクリアされた場合、描画済み件数がリセットされる
        // given (前提条件):
        let mut rendered = Rendered {
            entries: 3,
            counts: Some((1, None)),
        };
        let state = SessionState::default();

        // when (操作):
        render_state(&state, &mut rendered);

        // then (期待する結果):
        assert_eq!(rendered.entries, 0);
        assert_eq!(rendered.counts, Some((0, None)));
    }

    #[test]
    fn test_render_state_tracks_new_entries() {
        // テスト項目: 新しいエントリを描画すると描画済み件数が更新される
        // given (前提条件):
        let mut rendered = Rendered::default();
        let mut state = SessionState::default();
        state.push_entry(ChatEntry::from_server("a".to_string(), "t".to_string()));
        state.push_entry(ChatEntry::from_server("b".to_string(), "t".to_string()));

        // when (操作):
        render_state(&state, &mut rendered);

        // then (期待する結果):
        assert_eq!(rendered.entries, 2);
    }
}
