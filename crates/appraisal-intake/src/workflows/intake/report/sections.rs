use serde::Serialize;

/// One `###` block of a generated report. The text before the first
/// heading, when present, becomes a section with an empty title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

pub fn split_sections(markdown: &str) -> Vec<ReportSection> {
    let mut blocks = markdown.split("###");
    let mut sections = Vec::new();

    if let Some(preamble) = blocks.next() {
        let preamble = preamble.trim();
        if !preamble.is_empty() {
            sections.push(ReportSection {
                title: String::new(),
                body: preamble.to_string(),
            });
        }
    }

    for block in blocks {
        let (title, body) = block.split_once('\n').unwrap_or((block, ""));
        sections.push(ReportSection {
            title: title.trim().trim_matches('*').trim().to_string(),
            body: body.trim_end().to_string(),
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_split_into_titled_sections() {
        let markdown = "---\n\n### **PARECER TÉCNICO**\n\n**1. SOLICITANTE**\n- Nome: Ana\n### Anexos\nfotos";
        let sections = split_sections(markdown);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "");
        assert_eq!(sections[0].body, "---");
        assert_eq!(sections[1].title, "PARECER TÉCNICO");
        assert!(sections[1].body.contains("**1. SOLICITANTE**"));
        assert_eq!(sections[2].title, "Anexos");
        assert_eq!(sections[2].body, "fotos");
    }

    #[test]
    fn blank_preamble_is_dropped() {
        let sections = split_sections("  \n### Título");
        assert_eq!(
            sections,
            vec![ReportSection {
                title: "Título".to_string(),
                body: String::new(),
            }]
        );
    }

    #[test]
    fn text_without_headings_is_a_single_section() {
        let sections = split_sections("apenas texto");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "apenas texto");
    }
}
