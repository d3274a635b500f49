/// Text processing utilities
pub mod text {
    /// First `max_chars` characters of `text`, never splitting a character.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &text[..byte_index],
            None => text,
        }
    }

    /// Split `text` into chunks of at most `max_chars` characters.
    ///
    /// Breaks after sentence punctuation where possible, then on whitespace.
    /// A single word longer than `max_chars` is cut hard.
    pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
        let max_chars = max_chars.max(1);
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for word in text.split_whitespace() {
            let mut word = word;
            loop {
                let word_len = word.chars().count();
                let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };

                if needed <= max_chars {
                    if !current.is_empty() {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.push_str(word);
                    current_len += word_len;
                    if ends_sentence(word) {
                        chunks.push(std::mem::take(&mut current));
                        current_len = 0;
                    }
                    break;
                }

                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                    continue;
                }

                // Oversized word on an empty chunk
                let head = truncate_chars(word, max_chars);
                chunks.push(head.to_string());
                word = &word[head.len()..];
                if word.is_empty() {
                    break;
                }
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    fn ends_sentence(word: &str) -> bool {
        word.ends_with(['.', '!', '?', ';', '…'])
    }

}
