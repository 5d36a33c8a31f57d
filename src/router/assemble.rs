//! 回复组装与过滤
//!
//! 从本轮的完整转录里筛出最终用户可见文本：只留 assistant 消息，去掉交接/
//! 控制话术，按整条文本对"历史 ∪ 本轮已保留"去重，空行分隔拼接。
//! 全部被滤掉时必须给出固定的兜底文案，绝不返回空串。

use crate::memory::Role;

/// 内部交接话术的特征子串（大小写不敏感匹配）
const CONTROL_PHRASES: [&str; 4] = [
    "transferring to",
    "transferring back to",
    "invoking tool",
    "calling agent",
];

/// 全滤空时的兜底文案
pub const FALLBACK_REPLY: &str =
    "I wasn't able to put together an answer this time. Could you rephrase or add a bit more detail?";

/// 本轮转录中的一条消息
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// 显式标记的交接/控制消息
    pub is_control: bool,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            is_control: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            is_control: false,
        }
    }

    pub fn control(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            is_control: true,
        }
    }
}

fn contains_control_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    CONTROL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// 组装最终回复
///
/// prior_assistant_texts 是历史中已有的 assistant 整条文本；本轮保留的条目
/// 也依次加入去重集合，同一文本在同轮内第二次出现同样被丢弃。
pub fn assemble_reply(turn: &[TranscriptEntry], prior_assistant_texts: &[&str]) -> String {
    let mut seen: Vec<&str> = prior_assistant_texts.to_vec();
    let mut kept: Vec<&str> = Vec::new();

    for entry in turn {
        if entry.role != Role::Assistant || entry.is_control {
            continue;
        }
        if contains_control_phrase(&entry.text) {
            continue;
        }
        if seen.contains(&entry.text.as_str()) {
            continue;
        }
        seen.push(&entry.text);
        kept.push(&entry.text);
    }

    if kept.is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        kept.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_control_and_duplicates() {
        let turn = vec![
            TranscriptEntry::assistant("Transferring to shopper_agent"),
            TranscriptEntry::assistant("Here are some shops..."),
            TranscriptEntry::assistant("Here are some shops..."),
        ];
        let reply = assemble_reply(&turn, &[]);
        assert_eq!(reply, "Here are some shops...");
    }

    #[test]
    fn test_drops_non_assistant_entries() {
        let turn = vec![
            TranscriptEntry::user("do you have shops?"),
            TranscriptEntry::assistant("Shops below."),
        ];
        assert_eq!(assemble_reply(&turn, &[]), "Shops below.");
    }

    #[test]
    fn test_drops_history_duplicates() {
        let turn = vec![
            TranscriptEntry::assistant("Old answer"),
            TranscriptEntry::assistant("New answer"),
        ];
        assert_eq!(assemble_reply(&turn, &["Old answer"]), "New answer");
    }

    #[test]
    fn test_control_flag_filtered_even_without_phrase() {
        let turn = vec![
            TranscriptEntry::control("handing over now"),
            TranscriptEntry::assistant("Real content"),
        ];
        assert_eq!(assemble_reply(&turn, &[]), "Real content");
    }

    #[test]
    fn test_control_phrase_case_insensitive() {
        let turn = vec![
            TranscriptEntry::assistant("TRANSFERRING BACK TO supervisor"),
            TranscriptEntry::assistant("Done."),
        ];
        assert_eq!(assemble_reply(&turn, &[]), "Done.");
    }

    #[test]
    fn test_everything_filtered_yields_fallback() {
        let turn = vec![TranscriptEntry::assistant("Transferring to mentor_agent")];
        assert_eq!(assemble_reply(&turn, &[]), FALLBACK_REPLY);
    }

    #[test]
    fn test_join_preserves_order_with_blank_line() {
        let turn = vec![
            TranscriptEntry::assistant("First part."),
            TranscriptEntry::assistant("Second part."),
        ];
        assert_eq!(assemble_reply(&turn, &[]), "First part.\n\nSecond part.");
    }
}
