//! Mixed-script tokenization for ranking.
//!
//! Splits text into CJK and Latin/digit runs. CJK runs are segmented with
//! jieba so ranking units are real words rather than single characters;
//! Latin/digit runs are split on whitespace. Punctuation belongs to neither
//! class and is dropped.

use jieba_rs::Jieba;
use std::sync::OnceLock;

static JIEBA: OnceLock<Jieba> = OnceLock::new();

fn jieba() -> &'static Jieba {
    JIEBA.get_or_init(Jieba::new)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    /// CJK Unified Ideographs (U+4E00..=U+9FFF).
    Cjk,
    /// ASCII alphanumerics and whitespace.
    Word,
    /// Anything else; not a ranking unit.
    Skip,
}

fn classify(c: char) -> RunKind {
    if ('\u{4e00}'..='\u{9fff}').contains(&c) {
        RunKind::Cjk
    } else if c.is_ascii_alphanumeric() || c.is_whitespace() {
        RunKind::Word
    } else {
        RunKind::Skip
    }
}

/// Tokenize text into an ordered sequence of ranking units.
///
/// Pure function; never fails on valid UTF-8. Empty input yields an empty
/// sequence.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut kind = RunKind::Skip;

    for c in text.chars() {
        let k = classify(c);
        if k != kind && !run.is_empty() {
            flush_run(&run, kind, &mut tokens);
            run.clear();
        }
        kind = k;
        if k != RunKind::Skip {
            run.push(c);
        }
    }
    if !run.is_empty() {
        flush_run(&run, kind, &mut tokens);
    }

    tokens
}

fn flush_run(run: &str, kind: RunKind, tokens: &mut Vec<String>) {
    match kind {
        RunKind::Cjk => {
            for word in jieba().cut(run, true) {
                if !word.is_empty() {
                    tokens.push(word.to_string());
                }
            }
        }
        RunKind::Word => {
            tokens.extend(run.split_whitespace().map(String::from));
        }
        RunKind::Skip => {}
    }
}
