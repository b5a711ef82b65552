//! Frequency of Chinese words in user messages.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use jieba_rs::Jieba;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::types::{ConversationRecord, is_truthy, part_text};

static SEGMENTER: Lazy<Jieba> = Lazy::new(Jieba::new);

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "的", "了", "是", "在", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也",
        "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那",
        "啊", "呢", "吧", "吗", "啦", "么", "哦", "哈", "嗯", "呀", "哎", "噢", "喔", "对", "嘿",
        "把", "给", "让", "但", "但是", "而", "而且", "或者", "所以", "因为", "如果", "虽然",
        "这个", "那个", "这样", "那样", "这些", "那些", "什么", "怎么", "为什么", "如何", "哪里",
        "谁", "什么时候", "多少", "几", "怎样", "为", "向", "从", "与", "及", "以", "并", "等",
        "中", "内", "外", "前", "后", "下", "时", "里", "年", "月", "日", "点", "分", "秒",
    ]
    .into_iter()
    .collect()
});

/// CJK Unified Ideographs, U+4E00..=U+9FFF.
pub fn is_han(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// Whether a segmented token should be counted.
pub fn is_countable(word: &str) -> bool {
    word.chars().count() > 1 && !STOP_WORDS.contains(word) && word.chars().all(is_han)
}

/// Word counts that remember first-appearance order for tie breaking.
#[derive(Debug, Clone, Default)]
pub struct WordCounter {
    counts: HashMap<String, (usize, usize)>,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        let next = self.counts.len();
        self.counts
            .entry(word.to_string())
            .or_insert((0, next))
            .0 += 1;
    }

    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).map_or(0, |(count, _)| *count)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent words, highest count first; equal counts keep the
    /// order in which the words were first seen.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(word, (count, seen))| (word.as_str(), *count, *seen))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        entries
            .into_iter()
            .take(n)
            .map(|(word, count, _)| (word, count))
            .collect()
    }
}

/// Text of every user message whose first part contains Chinese.
pub fn user_messages(conversations: &[ConversationRecord]) -> Vec<String> {
    conversations
        .iter()
        .flat_map(|conversation| conversation.messages())
        .filter(|message| message.role() == Some("user"))
        .filter_map(|message| message.first_part())
        .filter(|part| is_truthy(part))
        .map(part_text)
        .filter(|text| text.chars().any(is_han))
        .collect()
}

/// Segment `text` and count the words worth keeping.
pub fn count_words(counter: &mut WordCounter, text: &str) {
    for word in SEGMENTER.cut(text, true) {
        if is_countable(word) {
            counter.add(word);
        }
    }
}

/// Count Chinese words across all user messages of the export.
pub fn count_user_words(conversations: &[ConversationRecord]) -> WordCounter {
    let messages = user_messages(conversations);
    debug!(messages = messages.len(), "segmenting user messages");
    let mut counter = WordCounter::new();
    for text in &messages {
        count_words(&mut counter, text);
    }
    if counter.is_empty() {
        debug!("no countable Chinese words");
    } else {
        debug!(distinct = counter.len(), "counted words");
    }
    counter
}

/// Report the `top` most frequent words of user messages.
pub fn write_word_frequency<W: Write>(
    out: &mut W,
    conversations: &[ConversationRecord],
    top: usize,
) -> io::Result<()> {
    if conversations.is_empty() {
        return writeln!(out, "对话列表为空");
    }

    let counter = count_user_words(conversations);
    writeln!(out, "\n=== 用户提问词频分析 ===")?;
    writeln!(out, "\n前{top}个最常见的中文词：")?;
    for (word, count) in counter.most_common(top) {
        writeln!(out, "{word}: {count}次")?;
    }
    Ok(())
}
