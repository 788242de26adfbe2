//! Conversation titles derived from the opening message

const TITLE_WORDS: usize = 4;

/// Build a title from the first user message: its first four space-separated
/// words, followed by `...` when the message had more.
pub fn title_from_first_message(message: &str) -> String {
    let words: Vec<&str> = message.split(' ').collect();
    let mut title = words
        .iter()
        .take(TITLE_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > TITLE_WORDS {
        title.push_str("...");
    }
    title
}
