//! # Ingest Line Parser
//!
//! Bulk text ingest format: one statement per line, `subject,predicate,object`.
//!
//! - Fields are trimmed
//! - The object keeps any further commas (`a,said,hello, world`)
//! - Blank lines and lines with an empty field are skipped silently
//! - No deduplication: repeated lines yield repeated triples

use crate::primitives::{INGEST_FIELD_COUNT, INGEST_FIELD_DELIMITER};

/// One accepted ingest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Parse one line. Returns `None` if it does not have three non-empty fields.
#[must_use]
pub fn parse_line(line: &str) -> Option<Triple> {
    let mut fields = line
        .splitn(INGEST_FIELD_COUNT, INGEST_FIELD_DELIMITER)
        .map(str::trim);
    let subject = fields.next().filter(|s| !s.is_empty())?;
    let predicate = fields.next().filter(|s| !s.is_empty())?;
    let object = fields.next().filter(|s| !s.is_empty())?;
    Some(Triple {
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        object: object.to_string(),
    })
}

/// Parse a whole ingest payload, in input order.
pub fn parse(data: &str) -> impl Iterator<Item = Triple> + '_ {
    data.lines().filter_map(parse_line)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o.to_string(),
        }
    }

    #[test]
    fn parses_and_trims_fields() {
        assert_eq!(parse_line("c, knows , d"), Some(triple("c", "knows", "d")));
    }

    #[test]
    fn skips_lines_without_three_fields() {
        assert_eq!(parse_line("badline"), None);
        assert_eq!(parse_line("a,b"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn skips_lines_with_empty_fields() {
        assert_eq!(parse_line("a,,b"), None);
        assert_eq!(parse_line(" ,likes,b"), None);
        assert_eq!(parse_line("a,likes, "), None);
    }

    #[test]
    fn object_keeps_extra_commas() {
        assert_eq!(
            parse_line("alice,said,hello, world"),
            Some(triple("alice", "said", "hello, world"))
        );
    }

    #[test]
    fn parse_handles_mixed_payload() {
        let triples: Vec<_> = parse("a,likes,b\nbadline\nc, knows , d").collect();
        assert_eq!(
            triples,
            vec![triple("a", "likes", "b"), triple("c", "knows", "d")]
        );
    }

    #[test]
    fn parse_accepts_crlf_and_blank_lines() {
        let triples: Vec<_> = parse("a,likes,b\r\n\r\n\nc,knows,d\r\n").collect();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[1], triple("c", "knows", "d"));
    }

    #[test]
    fn repeated_lines_are_not_deduplicated() {
        assert_eq!(parse("a,likes,b\na,likes,b").count(), 2);
    }
}
