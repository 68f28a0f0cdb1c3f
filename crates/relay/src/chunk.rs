/// Largest reply a chat message may carry, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Split `text` into pieces of at most `max_chars` characters, breaking on
/// line boundaries. A single line longer than the limit is hard-split.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { current_len + 1 + line_len };

        if needed <= max_chars {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let mut pieces = hard_split(line, max_chars);
            // Keep the tail open so following lines can join it.
            let tail = pieces.pop().unwrap_or_default();
            chunks.extend(pieces);
            current_len = tail.chars().count();
            current = tail;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn hard_split(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}

/// Split and number `text` so every part, prefix included, fits in
/// `max_chars`. A limit too small for the prefix still yields one character
/// of content per part.
pub fn split_numbered(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = split_message(text, max_chars);
    let mut total = chunks.len();
    while total > 1 {
        let budget = max_chars.saturating_sub(prefix(total, total).chars().count());
        chunks = split_message(text, budget);
        if chunks.len() <= total {
            break;
        }
        // More parts can mean a longer prefix, so go again.
        total = chunks.len();
    }
    numbered(chunks)
}

fn prefix(part: usize, total: usize) -> String {
    format!("Part {part}/{total}\n\n")
}

/// Chunks ready to send, numbered `Part i/n` when there is more than one.
pub fn numbered(chunks: Vec<String>) -> Vec<String> {
    let total = chunks.len();
    if total <= 1 {
        return chunks;
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| prefix(i + 1, total) + &chunk)
        .collect()
}
