//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after printing output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Prompt shown in front of the input line
pub fn prompt_for(room_id: &str) -> String {
    if room_id.is_empty() {
        "(no room)> ".to_string()
    } else {
        format!("#{}> ", room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_for_room() {
        // テスト項目: ルーム参加中はルーム名がプロンプトに表示される
        // given (前提条件):
        let room_id = "general";

        // when (操作):
        let prompt = prompt_for(room_id);

        // then (期待する結果):
        assert_eq!(prompt, "#general> ");
    }

    #[test]
    fn test_prompt_without_room() {
        // テスト項目: ルーム未参加の場合は (no room) と表示される
        // given (前提条件):
        let room_id = "";

        // when (操作):
        let prompt = prompt_for(room_id);

        // then (期待する結果):
        assert_eq!(prompt, "(no room)> ");
    }
}
