//! Parser for bot commands in issue and comment text.
//!
//! This module provides a pure parser that extracts structured intents from
//! unstructured GitHub text.

use super::types::{Intent, PullRequestRef, Utterance};

/// Parses the first intent addressed to the bot.
///
/// # Arguments
///
/// * `text` - The issue body or comment text to parse
/// * `bot_name` - The bot name without the `@` prefix (e.g., `"bug-bash-helper"`)
///
/// # Parsing Rules
///
/// - The mention `@{bot_name}` is case-insensitive (like GitHub mentions)
/// - The mention must be at a word boundary (not preceded by alphanumeric chars)
///   and followed by whitespace or the end of the text
/// - The verb is searched on the rest of the mention's line; the first known
///   verb wins
/// - Verbs are case-insensitive whole words
/// - If several mentions are present, the first one carrying a verb wins
///
/// # Examples
///
/// ```
/// use bug_helpers::commands::{parse_utterance, Intent, Utterance};
///
/// assert_eq!(
///     parse_utterance("@bug-bash-helper assign me", "bug-bash-helper"),
///     Utterance::Addressed(Some(Intent::Assign))
/// );
/// assert_eq!(
///     parse_utterance("@Bug-Bash-Helper hello", "bug-bash-helper"),
///     Utterance::Addressed(None)
/// );
/// assert_eq!(
///     parse_utterance("no mention here", "bug-bash-helper"),
///     Utterance::NotAddressed
/// );
/// // Not a valid mention (preceded by alphanumeric):
/// assert_eq!(
///     parse_utterance("foo@bug-bash-helper assign", "bug-bash-helper"),
///     Utterance::NotAddressed
/// );
/// ```
pub fn parse_utterance(text: &str, bot_name: &str) -> Utterance {
    let trigger = format!("@{}", bot_name);
    let mut addressed = false;
    let mut search_start = 0;

    while let Some(abs_pos) = find_trigger(text, search_start, &trigger) {
        let after_trigger = &text[abs_pos + trigger.len()..];
        search_start = abs_pos + trigger.len();

        // `@bot-name-other` or `@bot-name:` is somebody else
        if !after_trigger.chars().next().is_none_or(char::is_whitespace) {
            continue;
        }
        addressed = true;

        if let Some(intent) = parse_mention_line(first_line(after_trigger)) {
            return Utterance::Addressed(Some(intent));
        }
    }

    if addressed {
        Utterance::Addressed(None)
    } else {
        Utterance::NotAddressed
    }
}

/// Finds the next occurrence of the trigger (case-insensitive) at a valid word boundary.
/// Returns the byte position of the `@` character if found.
fn find_trigger(text: &str, start: usize, trigger: &str) -> Option<usize> {
    let mut search_pos = start;

    while search_pos < text.len() {
        let at_pos = text[search_pos..].find('@')?;
        let abs_pos = search_pos + at_pos;

        // May be None if the end lands inside a multi-byte character.
        if let Some(candidate) = text.get(abs_pos..abs_pos + trigger.len())
            && candidate.eq_ignore_ascii_case(trigger)
        {
            let valid_boundary = text[..abs_pos]
                .chars()
                .next_back()
                .is_none_or(|prev| !prev.is_alphanumeric());
            if valid_boundary {
                return Some(abs_pos);
            }
        }

        search_pos = abs_pos + 1;
    }
    None
}

/// Returns the text up to (not including) the first line break.
fn first_line(text: &str) -> &str {
    match text.find('\n') {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// Finds the first known verb on the line following a mention.
fn parse_mention_line(line: &str) -> Option<Intent> {
    let words = split_words(line);

    for (index, &(_, word)) in words.iter().enumerate() {
        let intent = match normalize_word(word).as_str() {
            "assign" => Some(Intent::Assign),
            "unassign" => Some(Intent::Unassign),
            "ready" => Some(Intent::Ready {
                pull_request: find_pull_request_ref(line),
            }),
            "pass" => Some(Intent::Pass),
            "fail" => Some(Intent::Fail),
            "help" => Some(Intent::Help),
            "add" => label_argument(line, &words, index).map(Intent::AddLabels),
            "remove" => label_argument(line, &words, index).map(Intent::RemoveLabels),
            _ => None,
        };
        if intent.is_some() {
            return intent;
        }
    }
    None
}

/// Parses `label[s][:] a, b, c` following the word at `verb_index`.
///
/// Returns `None` if the next word is not `label`/`labels`, so that a stray
/// "add" or "remove" does not swallow the line.
fn label_argument(line: &str, words: &[(usize, &str)], verb_index: usize) -> Option<Vec<String>> {
    let &(pos, word) = words.get(verb_index + 1)?;
    let lower = word.to_ascii_lowercase();

    let stem_len = if lower.starts_with("labels") {
        "labels".len()
    } else if lower.starts_with("label") {
        "label".len()
    } else {
        return None;
    };

    let tail = &word[stem_len..];
    if !(tail.is_empty() || tail.starts_with(':')) {
        return None;
    }

    Some(split_labels(&line[pos + stem_len..]))
}

/// Splits a comma-separated label list, trimming each value and dropping blanks.
fn split_labels(text: &str) -> Vec<String> {
    let text = text.trim_start();
    let text = text.strip_prefix(':').unwrap_or(text);

    text.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect()
}

/// Finds a `#1234`, `PR#1234` or `https://...` reference on the line.
fn find_pull_request_ref(line: &str) -> Option<PullRequestRef> {
    for (_, word) in split_words(line) {
        let word = word.trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        let word = word.trim_start_matches('(');

        if word.starts_with("https://") || word.starts_with("http://") {
            return Some(PullRequestRef::Url(word.to_string()));
        }

        let digits = match word.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("pr") => &word[2..],
            _ => word,
        };
        if let Some(digits) = digits.strip_prefix('#')
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = digits.parse::<u64>()
            && n > 0
        {
            return Some(PullRequestRef::Number(n));
        }
    }
    None
}

/// Lowercases a word and strips surrounding punctuation (`label:` -> `label`).
fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_ascii_lowercase()
}

/// Splits text at whitespace, returning each word with its byte offset.
fn split_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}
