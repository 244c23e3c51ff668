//! Turns free-form model output into an ordered list of virtual files.
//!
//! Two passes over the text: a complete HTML document is lifted out first and its
//! span removed, then fenced blocks are read from what remains. If neither pass
//! yields a file, the text itself becomes one (recovered HTML or `response.txt`).
//!
//! Only a block explicitly named `index.html` is wrapped in a page skeleton when
//! it lacks a DOCTYPE. An unnamed `html` block becomes `main.html` with its body
//! untouched, like every other unnamed block.
//!
//! Files keep detection order and are never deduplicated by name; two
//! `index.html` entries can both appear and the consumer decides which wins.

pub mod fence;
pub mod html;
pub mod language;

use serde::Serialize;

pub use language::{DEFAULT_LANGUAGE, extension_for, synthesize_filename};

pub const INDEX_HTML: &str = "index.html";
pub const RESPONSE_TXT: &str = "response.txt";

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    Found(T),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
    pub language: String,
}

impl GeneratedFile {
    fn new(name: impl Into<String>, content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            language: language.into(),
        }
    }
}

/// Decoded reply: the untouched model text plus the files found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub generated_text: String,
    pub files: Vec<GeneratedFile>,
}

/// Decode a raw reply. Deterministic, no I/O, always yields at least one file.
pub fn decode(raw: &str) -> GenerationResult {
    let mut files = Vec::new();
    let mut remaining = raw.to_string();

    if let Extraction::Found(span) = html::find_document(raw) {
        files.push(GeneratedFile::new(INDEX_HTML, &raw[span.clone()], "html"));
        remaining.replace_range(span, "");
    }

    for block in fence::scan(&remaining) {
        if let Extraction::Found(file) = file_from_block(block, files.len() + 1) {
            files.push(file);
        }
    }

    if files.is_empty() && !remaining.trim().is_empty() {
        files.push(fallback_file(&remaining));
    }

    // Nothing usable at all (empty reply): still hand back the raw text.
    if files.is_empty() {
        files.push(GeneratedFile::new(RESPONSE_TXT, raw, DEFAULT_LANGUAGE));
    }

    GenerationResult {
        generated_text: raw.to_string(),
        files,
    }
}

/// `position` is the 1-based slot the file would take, used for unnamed blocks.
fn file_from_block(block: fence::FencedBlock, position: usize) -> Extraction<GeneratedFile> {
    if block.content.is_empty() {
        return Extraction::NotFound;
    }

    let (name, language) = match (block.filename, block.language) {
        (Some(name), Some(lang)) => (name, lang),
        (Some(name), None) => {
            let lang = language::language_for_filename(&name).unwrap_or(DEFAULT_LANGUAGE);
            (name, lang.to_string())
        }
        (None, Some(lang)) => (synthesize_filename(&lang), lang),
        (None, None) => (format!("file-{position}.txt"), DEFAULT_LANGUAGE.to_string()),
    };

    let content = if claims_main_page(&name, &language) && !html::contains_doctype(&block.content) {
        html::wrap_in_skeleton(&block.content)
    } else {
        block.content
    };

    Extraction::Found(GeneratedFile::new(name, content, language))
}

fn claims_main_page(name: &str, language: &str) -> bool {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    language.eq_ignore_ascii_case("html") && file.eq_ignore_ascii_case(INDEX_HTML)
}

/// No file was found: recover HTML if the text looks like it, else keep it verbatim.
fn fallback_file(text: &str) -> GeneratedFile {
    if !html::has_html_markers(text) {
        return GeneratedFile::new(RESPONSE_TXT, text, DEFAULT_LANGUAGE);
    }

    let content = match html::find_html_span(text) {
        Extraction::Found(span) => text[span].to_string(),
        Extraction::NotFound => html::wrap_in_skeleton(text),
    };
    GeneratedFile::new(INDEX_HTML, content, "html")
}
