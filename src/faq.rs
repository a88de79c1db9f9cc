// 📚 FAQ Matcher - keyword overlap scoring
// Every FAQ is scored by how many of its keywords occur in the query

use crate::store::Faq;
use tracing::debug;

/// Winning FAQ and the number of its keywords found in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqMatch<'a> {
    pub faq: &'a Faq,
    pub score: usize,
}

/// Split a comma-separated keyword field into trimmed, lowercase terms.
///
/// Empty terms from "a,,b" or a trailing comma are kept. An empty term is a
/// substring of every query, so such an FAQ scores at least 1 on anything.
pub fn parse_keywords(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .collect()
}

/// Number of the FAQ's keywords occurring as substrings of `text_lower`.
pub fn keyword_score(faq: &Faq, text_lower: &str) -> usize {
    parse_keywords(&faq.keywords)
        .iter()
        .filter(|term| text_lower.contains(term.as_str()))
        .count()
}

/// Pick the FAQ with the strictly highest score; the earliest entry wins ties.
/// Returns `None` unless at least one keyword matched.
pub fn best_match<'a>(text: &str, faqs: &'a [Faq]) -> Option<FaqMatch<'a>> {
    let text_lower = text.to_lowercase();
    let mut best: Option<FaqMatch<'a>> = None;

    for faq in faqs {
        let score = keyword_score(faq, &text_lower);
        if score == 0 {
            continue;
        }

        let better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(FaqMatch { faq, score });
        }
    }

    match &best {
        Some(found) => debug!(faq_id = found.faq.id, score = found.score, "faq matched"),
        None => debug!(candidates = faqs.len(), "no faq keyword matched"),
    }

    best
}
