//! Deterministic match scoring for investor-facing company search.
//!
//! The score is a pure function of the query and the row: keyword hits
//! weighted by field (name over tagline over description) plus industry
//! overlap, mapped into the 70-99 display range. Same query, same row,
//! same score on every call.

const BASE_SCORE: u32 = 70;
const MAX_SCORE: u32 = 99;

const NAME_WEIGHT: u32 = 10;
const TAGLINE_WEIGHT: u32 = 6;
const DESCRIPTION_WEIGHT: u32 = 3;
const INDUSTRY_WEIGHT: u32 = 5;

pub fn match_score(
    keywords: &[String],
    industry_filter: &[String],
    name: &str,
    tagline: Option<&str>,
    description: Option<&str>,
    company_industries: &[String],
) -> u8 {
    let name = name.to_lowercase();
    let tagline = tagline.map(|s| s.to_lowercase()).unwrap_or_default();
    let description = description.map(|s| s.to_lowercase()).unwrap_or_default();

    let mut raw = 0;
    for keyword in keywords {
        let kw = keyword.to_lowercase();
        if kw.is_empty() {
            continue;
        }
        if name.contains(&kw) {
            raw += NAME_WEIGHT;
        }
        if tagline.contains(&kw) {
            raw += TAGLINE_WEIGHT;
        }
        if description.contains(&kw) {
            raw += DESCRIPTION_WEIGHT;
        }
    }

    let industries: Vec<String> = company_industries
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    for wanted in industry_filter {
        if industries.iter().any(|have| have == &wanted.to_lowercase()) {
            raw += INDUSTRY_WEIGHT;
        }
    }

    (BASE_SCORE + raw).min(MAX_SCORE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn score_is_stable_across_calls() {
        let keywords = kw(&["fintech", "payments"]);
        let first = match_score(&keywords, &[], "Fintech Flow", Some("payments for SMBs"), None, &[]);
        for _ in 0..10 {
            let again =
                match_score(&keywords, &[], "Fintech Flow", Some("payments for SMBs"), None, &[]);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn score_stays_in_display_range() {
        let none = match_score(&[], &[], "Acme", None, None, &[]);
        assert_eq!(none, 70);

        let many = kw(&["a", "b", "c", "d", "e", "f"]);
        let maxed = match_score(
            &many,
            &kw(&["saas", "ai"]),
            "abcdef",
            Some("abcdef"),
            Some("abcdef"),
            &kw(&["saas", "ai"]),
        );
        assert_eq!(maxed, 99);
    }

    #[test]
    fn name_hits_outrank_description_hits() {
        let keywords = kw(&["climate"]);
        let in_name = match_score(&keywords, &[], "Climate Robotics", None, None, &[]);
        let in_description = match_score(&keywords, &[], "Acme", None, Some("climate tooling"), &[]);
        assert!(in_name > in_description);
    }

    #[test]
    fn industry_overlap_counts() {
        let with = match_score(&[], &kw(&["fintech"]), "Acme", None, None, &kw(&["fintech"]));
        let without = match_score(&[], &kw(&["fintech"]), "Acme", None, None, &kw(&["biotech"]));
        assert_eq!(with, 75);
        assert_eq!(without, 70);
    }
}
