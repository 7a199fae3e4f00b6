/// File whose presence marks a directory as a skill bundle.
pub const SKILL_FILE: &str = "SKILL.md";

const DELIMITER: &str = "---";

/// The two header fields the catalog consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl SkillMetadata {
    pub fn parse(content: &str) -> Self {
        Self {
            name: extract_field(content, "name"),
            description: extract_field(content, "description"),
        }
    }
}

/// Returns the text between a `---` line at the very start of `content` and
/// the next line consisting solely of `---`.
pub fn header_block(content: &str) -> Option<&str> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }

    None
}

/// Value of `field:` inside the header block, trimmed. Only the first colon
/// splits, so values may contain colons. Empty values count as absent.
pub fn extract_field(content: &str, field: &str) -> Option<String> {
    let header = header_block(content)?;

    header.lines().find_map(|line| {
        let value = line.strip_prefix(field)?.strip_prefix(':')?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\nname: pdf-tools\ndescription: Extract text: tables and forms\n---\n# PDF\nBody text\n";

    #[test]
    fn extracts_fields_from_header() {
        assert_eq!(extract_field(DOC, "name").as_deref(), Some("pdf-tools"));
        assert_eq!(
            extract_field(DOC, "description").as_deref(),
            Some("Extract text: tables and forms")
        );
    }

    #[test]
    fn value_is_trimmed() {
        let doc = "---\nname:    spaced out   \n---\n";
        assert_eq!(extract_field(doc, "name").as_deref(), Some("spaced out"));
    }

    #[test]
    fn header_must_open_the_document() {
        let doc = "\n---\nname: late\n---\n";
        assert!(header_block(doc).is_none());
        assert!(extract_field(doc, "name").is_none());

        let doc = "# Title\n---\nname: late\n---\n";
        assert!(extract_field(doc, "name").is_none());
    }

    #[test]
    fn unclosed_header_is_absent() {
        assert!(extract_field("---\nname: open\n", "name").is_none());
    }

    #[test]
    fn closing_line_must_be_exactly_three_dashes() {
        let doc = "---\nname: a\n----\ndescription: b\n---\nbody";
        assert_eq!(header_block(doc), Some("name: a\n----\ndescription: b\n"));
    }

    #[test]
    fn field_outside_header_is_ignored() {
        let doc = "---\nname: inside\n---\ndescription: outside\n";
        assert!(extract_field(doc, "description").is_none());
    }

    #[test]
    fn field_must_start_the_line() {
        let doc = "---\n  name: indented\nsurname: other\n---\n";
        assert!(extract_field(doc, "name").is_none());
    }

    #[test]
    fn only_first_line_of_value_is_captured() {
        let doc = "---\ndescription: first line\n  continued here\n---\n";
        assert_eq!(
            extract_field(doc, "description").as_deref(),
            Some("first line")
        );
    }

    #[test]
    fn crlf_documents_parse() {
        let doc = "---\r\nname: windows\r\n---\r\nbody";
        assert_eq!(extract_field(doc, "name").as_deref(), Some("windows"));
    }

    #[test]
    fn metadata_parse_reports_missing_fields() {
        let meta = SkillMetadata::parse("---\nname: only-name\n---\n");
        assert_eq!(meta.name.as_deref(), Some("only-name"));
        assert!(meta.description.is_none());
        assert_eq!(SkillMetadata::parse("no header"), SkillMetadata::default());
    }
}
