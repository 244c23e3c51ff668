/// Language tag used when nothing better is known.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Extension for a declared language token. Unrecognized tokens map to `txt`.
pub fn extension_for(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "javascript" | "js" => "js",
        "typescript" | "ts" => "ts",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "python" | "py" => "py",
        "java" => "java",
        "c" => "c",
        "cpp" | "c++" => "cpp",
        "csharp" | "cs" => "cs",
        "go" => "go",
        "rust" => "rs",
        "ruby" => "rb",
        "php" => "php",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "markdown" | "md" => "md",
        "sql" => "sql",
        "swift" => "swift",
        "kotlin" => "kt",
        "shell" | "bash" | "sh" => "sh",
        _ => "txt",
    }
}

/// `main.<ext>` for a block that declared a language but no file name.
pub fn synthesize_filename(language: &str) -> String {
    format!("main.{}", extension_for(language))
}

/// Lowercased extension of the last path component, if it has one.
pub fn extension_of(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if ext.is_empty() || (stem.is_empty() && !file.starts_with('.')) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Language tag inferred from a file name's extension.
pub fn language_for_filename(name: &str) -> Option<&'static str> {
    let lang = match extension_of(name)?.as_str() {
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "py" => "python",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "php" => "php",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "less" => "less",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "md" => "markdown",
        "sql" => "sql",
        "swift" => "swift",
        "kt" => "kotlin",
        "sh" => "shell",
        "vue" => "vue",
        "svelte" => "svelte",
        "xml" => "xml",
        "svg" => "svg",
        "toml" => "toml",
        "txt" | "env" | "gitignore" => "text",
        _ => return None,
    };
    Some(lang)
}
