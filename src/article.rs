/// Structured view over the raw article generation text.
///
/// The generation is free text that is expected (but not guaranteed) to open
/// with `TITLE:` / `META_DESCRIPTION:` / `KEYWORDS:` marker lines followed by
/// the markdown body. Parsing is tolerant: a missing marker leaves its field
/// empty and never fails the run.
#[derive(Clone, Debug, Default)]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub body: String,
}

const TITLE_MARKER: &str = "TITLE:";
const META_MARKER: &str = "META_DESCRIPTION:";
const KEYWORDS_MARKER: &str = "KEYWORDS:";

impl ArticleDraft {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut draft = ArticleDraft::default();

        for line in &lines {
            if draft.title.is_none() {
                if let Some(rest) = line.strip_prefix(TITLE_MARKER) {
                    let title = rest.trim();
                    if !title.is_empty() {
                        draft.title = Some(title.to_string());
                    }
                    continue;
                }
            }
            if draft.meta_description.is_none() {
                if let Some(rest) = line.strip_prefix(META_MARKER) {
                    let meta = rest.trim();
                    if !meta.is_empty() {
                        draft.meta_description = Some(meta.to_string());
                    }
                }
            }
        }

        // The body starts two lines past the KEYWORDS line, matching the
        // preamble layout the article prompt requests. Without a KEYWORDS
        // line the whole text is taken as the body.
        let mut body_start = 0;
        for (i, line) in lines.iter().enumerate() {
            if let Some(idx) = line.find(KEYWORDS_MARKER) {
                let keywords = &line[idx + KEYWORDS_MARKER.len()..];
                draft.keywords = keywords
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
                body_start = i + 2;
                break;
            }
        }

        draft.body = if body_start < lines.len() {
            lines[body_start..].join("\n")
        } else if body_start == 0 {
            text.to_string()
        } else {
            String::new()
        };

        draft
    }

    /// Title with a generic placeholder when extraction failed.
    pub fn title_or_placeholder(&self) -> &str {
        self.title.as_deref().unwrap_or("Generated Blog Post")
    }
}
