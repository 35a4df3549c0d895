//! Text extraction from Europe PMC full-text XML documents.

use crate::chunk::normalize_whitespace;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Collect the text of every paragraph element under the `abstract` and
/// `body` sections, join paragraphs with blank lines, and truncate to the
/// first `limit` characters. Returns `None` when no paragraph text is
/// found or the document does not parse.
pub fn extract_text(xml: &str, limit: usize) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buffer = Vec::new();
    let mut section_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"abstract" | b"body" => section_depth += 1,
                b"p" if section_depth > 0 => paragraph_depth += 1,
                _ => {}
            },
            Ok(Event::Text(ref e)) if paragraph_depth > 0 => {
                if let Ok(text) = e.unescape() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(text.trim());
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"abstract" | b"body" => section_depth = section_depth.saturating_sub(1),
                b"p" if paragraph_depth > 0 => {
                    paragraph_depth -= 1;
                    if paragraph_depth == 0 {
                        let text = normalize_whitespace(&current);
                        current.clear();
                        if !text.is_empty() {
                            paragraphs.push(text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buffer.clear();
    }

    if paragraphs.is_empty() {
        return None;
    }
    Some(truncate_chars(&paragraphs.join("\n\n"), limit))
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<article>
  <front>
    <abstract>
      <p>First abstract paragraph.</p>
      <p>Second <italic>abstract</italic> paragraph.</p>
    </abstract>
  </front>
  <body>
    <sec>
      <title>Methods</title>
      <p>Body paragraph one.</p>
    </sec>
  </body>
  <back>
    <ref-list>
      <p>Reference text that must be ignored.</p>
    </ref-list>
  </back>
</article>"#;

    #[test]
    fn collects_abstract_and_body_paragraphs() {
        let text = extract_text(DOC, 2000).unwrap();
        assert_eq!(
            text,
            "First abstract paragraph.\n\nSecond abstract paragraph.\n\nBody paragraph one."
        );
    }

    #[test]
    fn paragraphs_outside_sections_are_ignored() {
        let text = extract_text(DOC, 2000).unwrap();
        assert!(!text.contains("Reference text"));
    }

    #[test]
    fn output_is_truncated_to_the_limit() {
        let long = format!(
            "<article><body><p>{}</p></body></article>",
            "a".repeat(5000)
        );
        let text = extract_text(&long, 2000).unwrap();
        assert_eq!(text.chars().count(), 2000);
    }

    #[test]
    fn documents_without_paragraphs_yield_none() {
        assert!(extract_text("<article><body></body></article>", 2000).is_none());
        assert!(extract_text("<article><p>outside</p></article>", 2000).is_none());
    }
}
