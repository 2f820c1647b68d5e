//! Answer cleaning for translation providers
//!
//! All lengths are counted in characters, not bytes.

/// Longest Gemini short answer kept as is
const SHORT_MAX_CHARS: usize = 20;

/// Longest Gemini short answer that is kept after truncation
const SHORT_TRUNCATE_LIMIT: usize = 30;

/// Longest machine translation before it is cut with `...`
const MACHINE_MAX_CHARS: usize = 50;

/// Longest labeled-definition fallback answer
const DEFINITION_MAX_CHARS: usize = 60;

/// Whether `text` contains a Hangul syllable
pub fn has_hangul(text: &str) -> bool {
    text.chars().any(is_hangul)
}

fn is_hangul(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    let Some(rest) = text.strip_prefix(label) else {
        return text;
    };
    let rest = rest.trim_start();
    match rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) {
        Some(value) => value.trim_start(),
        None => text,
    }
}

fn strip_label_spaced<'a>(text: &'a str, head: &str, tail: &str) -> &'a str {
    // `한국어 뜻:` also appears as `한국어뜻:`
    let Some(rest) = text.strip_prefix(head) else {
        return text;
    };
    let rest = rest.trim_start();
    if rest.starts_with(tail) {
        let stripped = strip_label(rest, tail);
        if stripped.len() != rest.len() {
            return stripped;
        }
    }
    text
}

/// Drop one leading and one trailing quote, then one pair of parentheses
fn strip_wrappers(text: &str) -> &str {
    const QUOTES: [char; 3] = ['"', '\'', '`'];
    let text = text.strip_prefix(QUOTES).unwrap_or(text);
    let text = text.strip_suffix(QUOTES).unwrap_or(text);
    let text = text.strip_prefix('(').unwrap_or(text);
    text.strip_suffix(')').unwrap_or(text)
}

/// Strip the labels and wrappers a model adds around a one-word answer
fn strip_decorations(raw: &str) -> String {
    let text = raw.trim();
    let text = strip_label_spaced(text, "한국어", "뜻");
    let text = strip_label(text, "답변");
    let text = strip_wrappers(text).replace('→', "");
    let text = text.trim();

    if text.chars().any(|c| c.is_ascii_alphabetic()) {
        text.chars()
            .filter(|c| !c.is_ascii_alphabetic() && !c.is_whitespace())
            .collect::<String>()
            .trim()
            .to_string()
    } else {
        text.to_string()
    }
}

/// Clean a short Gemini answer.
///
/// Kept when it has at most 20 characters and some Hangul; answers up to 30
/// characters are cut to 20. Anything else is rejected.
pub fn clean_short_answer(raw: &str) -> Option<String> {
    let meaning = strip_decorations(raw);
    let len = meaning.chars().count();

    if len == 0 {
        None
    } else if len <= SHORT_MAX_CHARS && has_hangul(&meaning) {
        Some(meaning)
    } else if len <= SHORT_TRUNCATE_LIMIT {
        Some(truncate_chars(&meaning, SHORT_MAX_CHARS))
    } else {
        None
    }
}

/// Simplify a machine translation: cut long text, drop `하는 것`/`것` filler
pub fn simplify_machine(text: &str) -> String {
    let mut text = if text.chars().count() > MACHINE_MAX_CHARS {
        format!("{}...", truncate_chars(text, MACHINE_MAX_CHARS))
    } else {
        text.to_string()
    };

    text = text.replace("하는 것", "");
    text = text.replace('것', "");
    text.trim().to_string()
}

/// Keep only ASCII word characters, whitespace and Hangul syllables
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || is_hangul(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Value of a `label: value` line; a bare `label:` line takes the next line
pub fn pick_labeled(raw: &str, label: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = line.strip_prefix(label) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(value) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) else {
            continue;
        };
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
        return lines.get(i + 1).map(|next| next.to_string());
    }

    None
}

/// Clean a labeled definition answer when the `간단한 뜻` line is missing
pub fn clean_definition_fallback(raw: &str) -> Option<String> {
    let meaning = sanitize(&strip_decorations(raw));
    let len = meaning.chars().count();
    (len > 0 && len <= DEFINITION_MAX_CHARS && has_hangul(&meaning)).then_some(meaning)
}
