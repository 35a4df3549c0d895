//! Topic discovery: every `<topic>.txt` in the terms directory defines one
//! topic, named by the file stem.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub terms: Vec<String>,
}

/// Terms are separated by `|` or newlines; each is trimmed and lowercased,
/// empties dropped.
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(['|', '\n'])
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

/// Load all topics from the directory, sorted by name for deterministic
/// runs. Topics whose files hold no usable terms are skipped.
pub fn load_topics(dir: &Path) -> std::io::Result<Vec<Topic>> {
    let mut topics = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let terms = parse_terms(&fs::read_to_string(&path)?);
        if terms.is_empty() {
            tracing::warn!(topic = name, "term file is empty, skipping");
            continue;
        }
        topics.push(Topic {
            name: name.to_string(),
            terms,
        });
    }
    topics.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(topics)
}
