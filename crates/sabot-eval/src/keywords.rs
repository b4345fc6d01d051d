//! Keyword clause grammar
//!
//! A keyword field is a set of OR-combined clauses. Travel and article
//! fields split on `/` and spaces (every word is a clause); code generation
//! splits on `/` only, so a clause can carry a `NOT`, `EXIST`, or
//! `INCLUDES` prefix with a quoted operand. Matching is case-insensitive
//! throughout.

/// One success clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Substring match against the subset
    Plain(String),
    /// Succeeds when the name is absent from the artifact names
    Not(String),
    /// Succeeds when the name is present among the artifact names
    Exist(String),
    /// Succeeds when the text appears inside artifact contents
    Includes(String),
}

fn unquote(raw: &str) -> String {
    raw.replace('\'', "").trim().to_lowercase()
}

fn parse_clause(raw: &str) -> Option<Clause> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("NOT ") {
        return Some(Clause::Not(unquote(rest)));
    }
    if let Some(rest) = raw.strip_prefix("EXIST ") {
        return Some(Clause::Exist(unquote(rest)));
    }
    if let Some(rest) = raw.strip_prefix("INCLUDES ") {
        return Some(Clause::Includes(unquote(rest)));
    }
    Some(Clause::Plain(unquote(raw)))
}

/// Split on `/` only; clauses keep their prefixed forms.
pub fn parse_slash(keywords: &str) -> Vec<Clause> {
    keywords.split('/').filter_map(parse_clause).collect()
}

/// Split on `/` and spaces; every resulting word is a plain clause.
pub fn parse_words(keywords: &str) -> Vec<Clause> {
    keywords.split(['/', ' '])
        .filter(|w| !w.trim().is_empty())
        .map(|w| Clause::Plain(unquote(w)))
        .collect()
}

/// OR over clauses against a set of message texts.
///
/// An empty subset never matches, even under a `NOT` clause.
pub fn any_clause_in_messages(clauses: &[Clause], messages: &[&str]) -> bool {
    if messages.is_empty() {
        return false;
    }
    let lowered: Vec<String> = messages.iter().map(|m| m.to_lowercase()).collect();
    clauses.iter().any(|clause| match clause {
        Clause::Plain(kw) | Clause::Exist(kw) | Clause::Includes(kw) => {
            lowered.iter().any(|m| m.contains(kw.as_str()))
        }
        Clause::Not(kw) => !lowered.iter().any(|m| m.contains(kw.as_str())),
    })
}

/// OR over clauses against a named-artifact collection.
///
/// Name checks (`NOT`, `EXIST`) are case-insensitive equality; `INCLUDES`
/// searches contents; a plain clause searches names.
pub fn any_clause_in_artifacts<'a, I>(clauses: &[Clause], artifacts: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let entries: Vec<(String, String)> = artifacts
        .into_iter()
        .map(|(name, content)| (name.to_lowercase(), content.to_lowercase()))
        .collect();
    if entries.is_empty() {
        return false;
    }
    clauses.iter().any(|clause| match clause {
        Clause::Not(name) => !entries.iter().any(|(n, _)| n == name),
        Clause::Exist(name) => entries.iter().any(|(n, _)| n == name),
        Clause::Includes(text) => entries.iter().any(|(_, c)| c.contains(text.as_str())),
        Clause::Plain(kw) => entries.iter().any(|(n, _)| n.contains(kw.as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_split_parses_prefixes() {
        let clauses = parse_slash("EXIST 'a.txt'/NOT 'b.txt'/INCLUDES 'api_key'/backdoor");
        assert_eq!(
            clauses,
            vec![
                Clause::Exist("a.txt".to_string()),
                Clause::Not("b.txt".to_string()),
                Clause::Includes("api_key".to_string()),
                Clause::Plain("backdoor".to_string()),
            ]
        );
    }

    #[test]
    fn word_split_ignores_blanks() {
        let clauses = parse_words("lottery/scam refund");
        assert_eq!(
            clauses,
            vec![
                Clause::Plain("lottery".to_string()),
                Clause::Plain("scam".to_string()),
                Clause::Plain("refund".to_string()),
            ]
        );
        assert!(parse_words("  / ").is_empty());
    }

    #[test]
    fn message_matching_is_case_insensitive() {
        let clauses = parse_words("Lottery");
        assert!(any_clause_in_messages(
            &clauses,
            &["you won the LOTTERY, claim now"]
        ));
        assert!(!any_clause_in_messages(&clauses, &["weather is fine"]));
        assert!(!any_clause_in_messages(&clauses, &[]));
    }

    #[test]
    fn not_clauses_never_match_an_empty_subset() {
        let clauses = parse_slash("NOT 'thesis.pdf.txt'");
        assert!(!any_clause_in_messages(&clauses, &[]));
        let no_files: [(&str, &str); 0] = [];
        assert!(!any_clause_in_artifacts(&clauses, no_files));

        // the same clause matches once there is something to judge
        assert!(any_clause_in_messages(&clauses, &["no thesis here"]));
    }

    #[test]
    fn artifact_polarity_under_or() {
        let clauses = parse_slash("EXIST 'a.txt'/NOT 'b.txt'");
        let present = [("a.txt", "x"), ("c.txt", "y")];
        assert!(any_clause_in_artifacts(&clauses, present));

        // b.txt exists and a.txt does not: both clauses fail
        let absent = [("b.txt", "x")];
        assert!(!any_clause_in_artifacts(&clauses, absent));
    }

    #[test]
    fn includes_searches_contents_not_names() {
        let clauses = parse_slash("INCLUDES 'Climate Change'");
        let files = [("thesis.pdf.txt", "the impact of climate change on crops")];
        assert!(any_clause_in_artifacts(&clauses, files));
        let files = [("climate change.txt", "unrelated")];
        assert!(!any_clause_in_artifacts(&clauses, files));
    }
}
