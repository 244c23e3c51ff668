use crate::decode::Extraction;
use crate::decode::language;

const FENCE: &str = "```";

/// Longest file name accepted from a free-text indicator.
const MAX_FILENAME_LEN: usize = 200;

const FILENAME_LABELS: &[&str] = &["filename:", "file name:", "file:"];

/// One fenced region of the reply, with whatever annotations it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Declared language token, lowercased.
    pub language: Option<String>,
    pub filename: Option<String>,
    /// Block body, trimmed. A consumed first-line filename indicator is not included.
    pub content: String,
}

/// Scan `text` for fenced blocks in order of appearance.
///
/// The closing fence is the next triple backtick after the opening line, even when
/// it sits at the end of a content line. A block still open at end of text is
/// returned with everything up to the end.
pub fn scan(text: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(FENCE) {
        let open = pos + rel;
        let info_start = skip_backticks(text, open + FENCE.len());

        let Some(nl) = text[info_start..].find('\n') else {
            break;
        };
        let info_end = info_start + nl;
        let info_line = &text[info_start..info_end];

        // Triple backticks opened and closed on one line is inline code, not a block.
        if let Some(inline_close) = info_line.find(FENCE) {
            pos = skip_backticks(text, info_start + inline_close + FENCE.len());
            continue;
        }

        let body_start = info_end + 1;
        let (body_end, next) = match text[body_start..].find(FENCE) {
            Some(close) => {
                let end = body_start + close;
                (end, skip_backticks(text, end + FENCE.len()))
            }
            None => (text.len(), text.len()),
        };

        blocks.push(parse_block(
            info_line.trim(),
            &text[body_start..body_end],
            preceding_line(text, open),
        ));
        pos = next;
    }

    blocks
}

fn skip_backticks(text: &str, mut at: usize) -> usize {
    while text.as_bytes().get(at) == Some(&b'`') {
        at += 1;
    }
    at
}

/// Last non-blank line before the fence. Covers both a caption line and prose
/// on the same line as the opening fence.
fn preceding_line(text: &str, open: usize) -> &str {
    let before = text[..open].trim_end();
    before.rsplit('\n').next().unwrap_or("").trim()
}

fn parse_block(info: &str, body: &str, preceding: &str) -> FencedBlock {
    let (language, mut filename) = parse_info(info);

    if filename.is_none()
        && let Extraction::Found(name) = caption_filename(preceding)
    {
        filename = Some(name);
    }

    let mut content = body.trim();
    if filename.is_none()
        && let Some((first, rest)) = content.split_once('\n')
        && let Extraction::Found(name) = first_line_filename(first)
        && !rest.trim().is_empty()
    {
        filename = Some(name);
        content = rest.trim();
    }

    FencedBlock {
        language,
        filename,
        content: content.to_string(),
    }
}

/// Split the info string into a language token and a file name. Accepts
/// `jsx`, `jsx App.jsx`, `App.jsx`, `jsx:App.jsx`, `file=App.jsx`, `filename="App.jsx"`.
fn parse_info(info: &str) -> (Option<String>, Option<String>) {
    let mut language = None;
    let mut filename = None;

    for token in info.split_whitespace() {
        if let Some(value) = key_value(token) {
            if filename.is_none() && !value.is_empty() {
                filename = Some(value.to_string());
            }
            continue;
        }

        if let Some((lang, path)) = token.split_once(':')
            && is_language_token(lang)
            && looks_like_filename(path)
        {
            language.get_or_insert_with(|| lang.to_ascii_lowercase());
            filename.get_or_insert_with(|| path.to_string());
            continue;
        }

        let bare = strip_quotes(token);
        if filename.is_none() && looks_like_filename(bare) {
            filename = Some(bare.to_string());
        } else if language.is_none() && is_language_token(token) {
            language = Some(token.to_ascii_lowercase());
        }
    }

    (language, filename)
}

fn key_value(token: &str) -> Option<&str> {
    let lower = token.to_ascii_lowercase();
    ["filename=", "filename:", "file=", "file:", "title=", "name="]
        .iter()
        .find(|key| lower.starts_with(*key))
        .map(|key| strip_quotes(&token[key.len()..]))
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

fn is_language_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 32
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_'))
}

/// A single path-like token whose last component has an alphanumeric extension.
pub fn looks_like_filename(token: &str) -> bool {
    if token.is_empty() || token.len() > MAX_FILENAME_LEN {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '@' | '+');
    if !token.chars().all(allowed) || !token.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if token.starts_with('/') || token.split('/').any(|part| part.is_empty() || part == "..") {
        return false;
    }
    language::extension_of(token).is_some_and(|ext| {
        ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
    })
}

/// Stricter check for free-text indicators: the extension must be one we know.
fn is_known_filename(token: &str) -> bool {
    looks_like_filename(token) && language::language_for_filename(token).is_some()
}

fn strip_label(s: &str) -> &str {
    let lower = s.to_ascii_lowercase();
    FILENAME_LABELS
        .iter()
        .find(|label| lower.starts_with(*label))
        .map(|label| s[label.len()..].trim())
        .unwrap_or(s)
}

/// File name from a caption line such as `**App.jsx**`, `### src/App.jsx`,
/// `` `App.jsx`: ``, `File: App.jsx` or `1. App.jsx`.
fn caption_filename(line: &str) -> Extraction<String> {
    let mut s = line.trim();
    s = s.trim_start_matches(|c: char| c == '#' || c == '-' || c == '>' || c.is_whitespace());
    if let Some((num, rest)) = s.split_once(". ")
        && !num.is_empty()
        && num.chars().all(|c| c.is_ascii_digit())
    {
        s = rest;
    }
    s = s.trim_matches(|c: char| c == '*' || c.is_whitespace());
    s = s.trim_end_matches(':').trim();
    s = strip_label(s);
    s = s.trim_matches(|c: char| c == '*' || c == '`' || c == '"' || c == '\'' || c.is_whitespace());
    s = s.trim_end_matches(':');

    if is_known_filename(s) {
        Extraction::Found(s.to_string())
    } else {
        Extraction::NotFound
    }
}

/// File name from the first body line: a lone name, or a comment carrying one
/// (`// App.jsx`, `# File: app.py`, `<!-- index.html -->`, `/* style.css */`).
fn first_line_filename(line: &str) -> Extraction<String> {
    let mut s = line.trim();
    for (open, close) in [("<!--", "-->"), ("/*", "*/")] {
        if let Some(inner) = s.strip_prefix(open) {
            s = inner.strip_suffix(close).unwrap_or(inner).trim();
        }
    }
    for marker in ["//", "--", "#", ";"] {
        if let Some(inner) = s.strip_prefix(marker) {
            s = inner.trim();
            break;
        }
    }
    s = strip_label(s);
    s = strip_quotes(s.trim());

    if is_known_filename(s) {
        Extraction::Found(s.to_string())
    } else {
        Extraction::NotFound
    }
}
