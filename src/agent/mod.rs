//! Agents: descriptors, the sub-agent factory, delegation prompt text and
//! the tool-calling loop they all run on.

pub mod agent_loop;
pub mod delegation;
pub mod factory;
pub mod llm;
pub mod sub_agent;
pub mod types;

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("tài liệu", 3), "tài");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 5), "");
    }
}
