/// Greedily pack a file's lines into chunks of at most `max_chars`
/// characters, never splitting a line in half. Chunks whose non-whitespace
/// content is below `min_non_whitespace` characters are dropped — mostly
/// blank-line runs and closing-brace-only tails with nothing worth
/// embedding.
#[must_use]
pub fn chunk_file(content: &str, max_chars: usize, min_non_whitespace: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        let would_be = current.len() + line.len() + 1;
        if !current.is_empty() && would_be > max_chars {
            push_if_substantial(&mut chunks, std::mem::take(&mut current), min_non_whitespace);
        }
        current.push_str(line);
        current.push('\n');
    }
    push_if_substantial(&mut chunks, current, min_non_whitespace);

    chunks
}

fn push_if_substantial(chunks: &mut Vec<String>, chunk: String, min_non_whitespace: usize) {
    let non_whitespace = chunk.chars().filter(|c| !c.is_whitespace()).count();
    if non_whitespace >= min_non_whitespace {
        chunks.push(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_lines_without_splitting_them() {
        let content = "line one\nline two\nline three\n";
        let chunks = chunk_file(content, 18, 1);
        assert!(chunks.iter().all(|c| c.lines().count() <= 2));
        assert!(chunks.iter().all(|c| !c.contains("line on")));
    }

    #[test]
    fn drops_blank_only_chunks() {
        let content = "\n\n\n   \n";
        let chunks = chunk_file(content, 1000, 10);
        assert!(chunks.is_empty());
    }

    #[test]
    fn keeps_short_but_substantial_chunk() {
        let content = "x = 1\n";
        let chunks = chunk_file(content, 1000, 3);
        assert_eq!(chunks.len(), 1);
    }
}
