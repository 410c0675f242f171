use crate::core::catalog::SpecialtyCatalog;
use crate::domain::model::{MatchMode, Specialty};
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Matcher {
    Substring(String),
    Word(Regex),
}

impl Matcher {
    fn build(term: &str, mode: MatchMode) -> Self {
        let term = term.to_lowercase();
        match mode {
            MatchMode::Substring => Self::Substring(term),
            MatchMode::WordBoundary => {
                match Regex::new(&format!(r"\b{}\b", regex::escape(&term))) {
                    Ok(re) => Self::Word(re),
                    Err(e) => {
                        tracing::warn!(
                            "Falling back to substring matching for '{}': {}",
                            term,
                            e
                        );
                        Self::Substring(term)
                    }
                }
            }
        }
    }

    fn is_match(&self, lowered: &str) -> bool {
        match self {
            Self::Substring(term) => lowered.contains(term.as_str()),
            Self::Word(re) => re.is_match(lowered),
        }
    }
}

/// 從自由文字中找出提及的專科
///
/// 專科名稱本身與關鍵字都會比對，結果取聯集。比對不考慮否定語氣，
/// 例如 "no heart problems" 仍會對應到心臟科。
#[derive(Debug, Clone)]
pub struct SpecialtyExtractor {
    matchers: Vec<(Matcher, Specialty)>,
    mode: MatchMode,
}

impl SpecialtyExtractor {
    pub fn new(catalog: &SpecialtyCatalog, mode: MatchMode) -> Self {
        let labels = catalog
            .specialties()
            .iter()
            .map(|s| (Matcher::build(s.as_str(), mode), s.clone()));
        let keywords = catalog
            .keywords()
            .iter()
            .map(|rule| (Matcher::build(&rule.keyword, mode), rule.specialty.clone()));

        Self {
            matchers: labels.chain(keywords).collect(),
            mode,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn extract(&self, text: &str) -> BTreeSet<Specialty> {
        if text.is_empty() {
            return BTreeSet::new();
        }

        let lowered = text.to_lowercase();
        let found: BTreeSet<Specialty> = self
            .matchers
            .iter()
            .filter(|(matcher, _)| matcher.is_match(&lowered))
            .map(|(_, specialty)| specialty.clone())
            .collect();

        tracing::debug!("Extracted {} specialties from advice text", found.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SpecialtyExtractor {
        SpecialtyExtractor::new(&SpecialtyCatalog::builtin(), MatchMode::Substring)
    }

    fn labels(set: &BTreeSet<Specialty>) -> Vec<&str> {
        set.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_keyword_maps_to_specialty() {
        let found = extractor().extract("I have heart pain and chest tightness");
        assert!(found.contains(&Specialty::new("Cardiologist")));
    }

    #[test]
    fn test_label_and_keyword_union() {
        let found = extractor().extract("Heart issues; consider seeing a Dermatologist too.");
        assert_eq!(labels(&found), vec!["Cardiologist", "Dermatologist"]);
    }

    #[test]
    fn test_case_insensitive() {
        let ex = extractor();
        assert_eq!(ex.extract("HEART pain"), ex.extract("heart pain"));
        assert!(!ex.extract("HEART pain").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let found = extractor().extract("heart, heart, a Cardiologist for the heart");
        assert_eq!(labels(&found), vec!["Cardiologist"]);
    }

    #[test]
    fn test_results_stay_inside_catalog() {
        let catalog = SpecialtyCatalog::builtin();
        let ex = SpecialtyExtractor::new(&catalog, MatchMode::Substring);
        let text = "Brain fog, eye strain, stomach ache, skin rash, bone pain, mental stress, \
                    see an ear nose throat doctor, a physio, a Pulmonologist or an Astrologer";

        for specialty in ex.extract(text) {
            assert!(catalog.specialties().contains(&specialty));
        }
    }

    #[test]
    fn test_substring_mode_keeps_false_positives() {
        // "eye" 為 "eyebrow" 的子字串
        let found = extractor().extract("my eyebrow itches");
        assert!(found.contains(&Specialty::new("Ophthalmologist")));
    }

    #[test]
    fn test_word_boundary_mode_skips_partial_words() {
        let ex = SpecialtyExtractor::new(&SpecialtyCatalog::builtin(), MatchMode::WordBoundary);
        assert!(ex.extract("my eyebrow itches").is_empty());
        assert_eq!(
            labels(&ex.extract("My eye hurts and my HEART races")),
            vec!["Cardiologist", "Ophthalmologist"]
        );
        assert_eq!(
            labels(&ex.extract("see an ENT specialist")),
            vec!["ENT Specialist"]
        );
    }

    #[test]
    fn test_empty_catalog_never_matches() {
        let ex = SpecialtyExtractor::new(&SpecialtyCatalog::default(), MatchMode::Substring);
        assert!(ex.extract("heart brain skin Cardiologist").is_empty());
    }
}
