use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::categories::CategoryConfig;
use crate::constants::OTHER_CATEGORY;
use crate::domain::Level;
use crate::error::{PipelineError, Result};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s/.\-]").unwrap());
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static STOPWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:and|or|with|in|of|the|to|for|by|on|at|from|as|is|are|be|an|a)\b").unwrap()
});

/// Seniority keywords, checked in priority order
const LEVEL_KEYWORDS: &[(Level, &[&str])] = &[
    (Level::Intern, &["intern", "interns", "internship"]),
    (Level::Entry, &["fresher", "freshers", "fresh"]),
    (Level::Junior, &["junior", "jr"]),
    (Level::Senior, &["senior", "sr"]),
    (Level::Manager, &["manager", "lead", "head"]),
];

fn collapse(text: &str) -> String {
    SPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Word-character unigrams of `text` followed by its adjacent bigrams.
pub fn tokenize_ngrams(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();
    let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    tokens.extend(words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    tokens
}

/// Seniority from whole-word keywords in the title, highest priority first.
pub fn seniority(title: &str) -> Option<Level> {
    let lowered = title.to_lowercase();
    let words: HashSet<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();
    LEVEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(level, _)| *level)
}

fn noise_pattern(keywords: &[String]) -> Result<Option<Regex>> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let mut sorted: Vec<&String> = keywords.iter().collect();
    // Longest first so multi-word entries win over their parts
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternation = sorted
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation))
        .map(Some)
        .map_err(|e| PipelineError::Config(format!("invalid noise keyword list: {}", e)))
}

/// Strip board noise (place names, contract terms, languages), punctuation
/// other than `/ . -`, and stopwords from a lower-cased title.
///
/// Applying it to its own output changes nothing.
pub fn clean_title(title: &str, noise: Option<&Regex>) -> String {
    let lowered = title.to_lowercase();
    let stripped = PUNCT_RE.replace_all(&lowered, "");
    let mut text = collapse(&STOPWORD_RE.replace_all(&stripped, ""));

    if let Some(noise) = noise {
        // Removing one keyword can bring the parts of a multi-word keyword together
        loop {
            let next = collapse(&noise.replace_all(&text, ""));
            if next == text {
                break;
            }
            text = next;
        }
    }
    text
}

/// Assigns a category to a job title from the configured keyword tables.
pub struct TitleClassifier<'a> {
    config: &'a CategoryConfig,
    noise: HashMap<String, Regex>,
}

impl<'a> TitleClassifier<'a> {
    pub fn new(config: &'a CategoryConfig) -> Result<Self> {
        let mut noise = HashMap::new();
        for (source, keywords) in &config.noise_keywords {
            if let Some(pattern) = noise_pattern(keywords)? {
                noise.insert(source.clone(), pattern);
            }
        }
        Ok(Self { config, noise })
    }

    /// The text classification actually runs on: cleaned for boards that
    /// carry a noise list, lower-cased otherwise.
    pub fn prepare(&self, title: &str, source: &str) -> String {
        match self.noise.get(source) {
            Some(pattern) => clean_title(title, Some(pattern)),
            None => title.to_lowercase(),
        }
    }

    /// First category, in table order, with a keyword contained in `text`
    pub fn manual_lookup(&self, text: &str) -> Option<&'a str> {
        let lowered = text.to_lowercase();
        self.config
            .manual_lookup
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|entry| entry.category.as_str())
    }

    /// Weighted n-gram scoring; ties go to the category declared first
    pub fn score(&self, text: &str) -> &'a str {
        let tokens = tokenize_ngrams(text);
        let mut best: Option<(&'a str, f64)> = None;

        for entry in &self.config.weights {
            let score: f64 = tokens.iter().filter_map(|t| entry.tokens.get(t)).sum();
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entry.category.as_str(), score));
            }
        }

        match best {
            Some((category, score)) if score >= self.config.threshold => category,
            _ => OTHER_CATEGORY,
        }
    }

    pub fn categorize(&self, title: &str, source: &str) -> &'a str {
        let text = self.prepare(title, source);
        if let Some(category) = self.manual_lookup(&text) {
            debug!("manual lookup: '{}' -> {}", title, category);
            return category;
        }
        let category = self.score(&text);
        debug!("scored: '{}' -> {}", title, category);
        category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CategoryConfig {
        CategoryConfig::builtin().unwrap()
    }

    #[test]
    fn test_manual_lookup_first_match() {
        let config = config();
        let classifier = TitleClassifier::new(&config).unwrap();
        assert_eq!(classifier.categorize("Senior DevOps Engineer", "jobsdbsg"), "Cloud & Devops");
        assert_eq!(classifier.categorize("Android Developer", "jobsdbsg"), "Mobile Development");
        assert_eq!(classifier.categorize("Data Analyst", "jobnetmm"), "Data & Analytics");
    }

    #[test]
    fn test_manual_wins_over_score() {
        let config = config();
        let classifier = TitleClassifier::new(&config).unwrap();
        let text = "data analytics dashboard developer";
        // Scoring alone prefers analytics, the manual table sees "developer"
        assert_eq!(classifier.score(text), "Data & Analytics");
        assert_eq!(classifier.categorize(text, "jobsdbsg"), "Software/Web Development");
    }

    #[test]
    fn test_score_fallback_and_threshold() {
        let config = config();
        let classifier = TitleClassifier::new(&config).unwrap();
        assert_eq!(classifier.categorize("Cisco LAN Specialist", "founditsg"), "Network");
        assert_eq!(classifier.categorize("Barista", "founditsg"), OTHER_CATEGORY);
        // A single 1.5 weight meets the threshold
        assert_eq!(classifier.score("vmware"), "Infra & System");
    }

    #[test]
    fn test_score_tie_goes_to_first_declared() {
        let config = CategoryConfig::from_json(
            r#"{"manual_lookup":[],
                "weights":[{"category":"First","tokens":{"alpha":2}},
                           {"category":"Second","tokens":{"alpha":2}}]}"#,
        )
        .unwrap();
        let classifier = TitleClassifier::new(&config).unwrap();
        assert_eq!(classifier.score("alpha"), "First");
    }

    #[test]
    fn test_bigrams_are_scored() {
        assert_eq!(
            tokenize_ngrams("Machine Learning Engineer"),
            vec!["machine", "learning", "engineer", "machine learning", "learning engineer"]
        );
    }

    #[test]
    fn test_clean_title_strips_noise() {
        let config = config();
        let classifier = TitleClassifier::new(&config).unwrap();
        let cleaned = classifier.prepare("Java Developer (Bangkok, 6 Months Contract) - Thai Speaking!", "jobsdbth");
        assert_eq!(cleaned, "java developer 6 -");
        assert_eq!(classifier.prepare("Java Developer (Bangkok)", "jobsdbsg"), "java developer (bangkok)");
    }

    #[test]
    fn test_clean_title_is_idempotent() {
        let config = config();
        let classifier = TitleClassifier::new(&config).unwrap();
        for title in [
            "Senior Data Engineer @ Kuala the Lumpur",
            "QA/QC Lead - Selangor, Malaysia (Contract 12 months)",
            "IT Support for Asoke office",
        ] {
            let once = classifier.prepare(title, "jobstreetmalay");
            let twice = classifier.prepare(&once, "jobstreetmalay");
            assert_eq!(once, twice, "not idempotent for {:?}", title);
            assert_eq!(
                classifier.categorize(title, "jobstreetmalay"),
                classifier.categorize(&once, "jobstreetmalay")
            );
        }
    }

    #[test]
    fn test_seniority_priority() {
        assert_eq!(seniority("Senior DevOps Engineer"), Some(Level::Senior));
        assert_eq!(seniority("Software Engineer Intern"), Some(Level::Intern));
        assert_eq!(seniority("Fresh Graduate Developer"), Some(Level::Entry));
        assert_eq!(seniority("Jr. Web Developer"), Some(Level::Junior));
        assert_eq!(seniority("Senior Manager, IT"), Some(Level::Senior));
        assert_eq!(seniority("Team Lead"), Some(Level::Manager));
        assert_eq!(seniority("Internal Auditor"), None);
        assert_eq!(seniority("Headless CMS Developer"), None);
    }
}
