use std::ops::Range;

use crate::decode::Extraction;

const DOCTYPE: &str = "<!doctype";
const DOCTYPE_HTML: &str = "<!doctype html";
const HTML_OPEN: &str = "<html";
const HTML_CLOSE: &str = "</html>";
const BODY_OPEN: &str = "<body";
const BODY_CLOSE: &str = "</body>";

/// ASCII lowercasing keeps byte offsets aligned with the original text.
fn lower(text: &str) -> String {
    text.to_ascii_lowercase()
}

fn span_between(haystack: &str, open: &str, close: &str) -> Extraction<Range<usize>> {
    let Some(start) = haystack.find(open) else {
        return Extraction::NotFound;
    };
    match haystack[start..].find(close) {
        Some(rel) => Extraction::Found(start..start + rel + close.len()),
        None => Extraction::NotFound,
    }
}

/// First complete document, from `<!DOCTYPE html` through the next `</html>`.
pub fn find_document(text: &str) -> Extraction<Range<usize>> {
    span_between(&lower(text), DOCTYPE_HTML, HTML_CLOSE)
}

pub fn contains_doctype(text: &str) -> bool {
    lower(text).contains(DOCTYPE)
}

/// `<html`, `<!DOCTYPE`, or a `<body>` followed by a `</body>`.
pub fn has_html_markers(text: &str) -> bool {
    let haystack = lower(text);
    haystack.contains(HTML_OPEN)
        || haystack.contains(DOCTYPE)
        || matches!(span_between(&haystack, BODY_OPEN, BODY_CLOSE), Extraction::Found(_))
}

/// Loose recovery for text that looked like HTML but held no complete document:
/// any `<!DOCTYPE ...</html>` span, else any `<html ...</html>` span.
pub fn find_html_span(text: &str) -> Extraction<Range<usize>> {
    let haystack = lower(text);
    match span_between(&haystack, DOCTYPE, HTML_CLOSE) {
        Extraction::Found(span) => Extraction::Found(span),
        Extraction::NotFound => span_between(&haystack, HTML_OPEN, HTML_CLOSE),
    }
}

/// Minimal complete document around a fragment.
pub fn wrap_in_skeleton(content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n  \
         <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>Generated Application</title>\n\
         </head>\n\
         <body>\n\
         {content}\n\
         </body>\n\
         </html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_span_is_case_insensitive() {
        let text = "intro <!DocType HTML><HTML><body>x</body></HTML> outro";
        let Extraction::Found(span) = find_document(text) else {
            panic!("expected a document");
        };
        assert_eq!(&text[span], "<!DocType HTML><HTML><body>x</body></HTML>");
    }

    #[test]
    fn unclosed_document_is_not_found() {
        assert!(matches!(
            find_document("<!DOCTYPE html><html><body>"),
            Extraction::NotFound
        ));
    }

    #[test]
    fn body_pair_counts_as_marker_but_lone_body_does_not() {
        assert!(has_html_markers("<body><p>hi</p></body>"));
        assert!(!has_html_markers("</body> then <body>"));
        assert!(!has_html_markers("plain words"));
    }

    #[test]
    fn skeleton_is_complete_document() {
        let page = wrap_in_skeleton("<h1>Hi</h1>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<meta charset=\"UTF-8\">"));
        assert!(page.contains("name=\"viewport\""));
        assert!(page.contains("<title>"));
        assert!(page.contains("<body>\n<h1>Hi</h1>\n</body>"));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
