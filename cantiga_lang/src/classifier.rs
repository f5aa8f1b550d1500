// Word classifier: assigns each token one grammatical category.
//
// Rules are applied in strict priority order:
// 1. Closed-class exact match (articles, prepositions, pronouns,
//    conjunctions, interjections) from the lexicon. Question words not in
//    any of those classes ("onde", "quanto", "cadê") are adverbs.
// 2. Suffix regexes: adverb ("-mente"), verb (infinitive and common
//    conjugation endings), adjective, noun.
// 3. Context: after an article guess noun (or adjective for long words),
//    after a preposition guess noun, before an article guess verb.
// 4. Heuristic on the raw token: capitalized → noun, very short →
//    preposition, very long → adjective, anything else → noun.
//
// Step 4 always produces a result, so `classify` is total over any token
// that contains at least one letter. A token with no letters at all
// classifies as `Punctuation`.
//
// The compiled regexes are process-wide and built once on first use.

use crate::types::{WordAnalysis, WordCategory};
use crate::{Lexicon, default_lexicon};
use regex::Regex;
use std::sync::OnceLock;

const ADVERB_PATTERN: &str = r"^\p{L}{3,}mente$";

const VERB_PATTERN: &str = concat!(
    r"^(?:",
    r"\p{L}{2,}(?:ar|er|ir)",
    r"|\p{L}+(?:ando|endo|indo)",
    r"|\p{L}{2,}(?:aram|eram|iram|ava|avam|ávamos|íamos|ou)",
    r"|\p{L}+(?:arei|erei|irei|ará|erá|irá|aria|eria|iria)",
    r"|\p{L}{2,}(?:amos|emos|imos)",
    r")$"
);

const ADJECTIVE_PATTERN: &str = concat!(
    r"^\p{L}{2,}(?:",
    r"oso|osa|osos|osas|ivo|iva|ivos|ivas|vel|veis|ante|antes|ente|entes|inte",
    r"|al|ais|ez|iz|ento|enta|udo|uda|ado|ada|ido|ida|ês|esa",
    r")$"
);

const NOUN_PATTERN: &str = concat!(
    r"^\p{L}+(?:",
    r"ção|ções|são|sões|dade|dades|ismo|ista|mento|mentos|agem|eza|ura",
    r"|ância|ência|or|ores|eiro|eira|ia|ema|ite|ude",
    r")$"
);

struct SuffixRules {
    ordered: Vec<(WordCategory, Regex)>,
}

fn suffix_rules() -> &'static SuffixRules {
    static RULES: OnceLock<SuffixRules> = OnceLock::new();
    RULES.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("invalid regex pattern");
        SuffixRules {
            ordered: vec![
                (WordCategory::Adverb, compile(ADVERB_PATTERN)),
                (WordCategory::Verb, compile(VERB_PATTERN)),
                (WordCategory::Adjective, compile(ADJECTIVE_PATTERN)),
                (WordCategory::Noun, compile(NOUN_PATTERN)),
            ],
        }
    })
}

/// Lowercase the token and keep only its letters (accented letters
/// included). Hyphens, digits and punctuation are dropped.
pub fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classifies tokens against a lexicon.
#[derive(Debug, Clone, Copy)]
pub struct WordClassifier<'a> {
    lexicon: &'a Lexicon,
}

impl Default for WordClassifier<'static> {
    fn default() -> Self {
        WordClassifier {
            lexicon: default_lexicon(),
        }
    }
}

impl<'a> WordClassifier<'a> {
    pub fn with_lexicon(lexicon: &'a Lexicon) -> Self {
        WordClassifier { lexicon }
    }

    /// Classify one token given its neighbours. Never fails.
    pub fn classify(&self, word: &str, previous: Option<&str>, next: Option<&str>) -> WordCategory {
        let cleaned = clean_word(word);
        if cleaned.is_empty() {
            return WordCategory::Punctuation;
        }

        if let Some(cat) = self.lexicon.closed_class(&cleaned) {
            return cat;
        }
        if self.lexicon.is_question_word(&cleaned) {
            return WordCategory::Adverb;
        }

        if let Some(cat) = suffix_category(&cleaned) {
            return cat;
        }

        if let Some(cat) = self.contextual_category(&cleaned, previous, next) {
            return cat;
        }

        heuristic_category(word, &cleaned)
    }

    fn contextual_category(
        &self,
        cleaned: &str,
        previous: Option<&str>,
        next: Option<&str>,
    ) -> Option<WordCategory> {
        if let Some(prev) = previous.map(clean_word) {
            if self.lexicon.is_article(&prev) {
                return Some(if cleaned.chars().count() >= 8 {
                    WordCategory::Adjective
                } else {
                    WordCategory::Noun
                });
            }
            if self.lexicon.is_preposition(&prev) {
                return Some(WordCategory::Noun);
            }
        }
        match next.map(clean_word) {
            Some(next) if self.lexicon.is_article(&next) => Some(WordCategory::Verb),
            _ => None,
        }
    }

    /// Build the full `WordAnalysis` record for one token.
    pub fn analyze(
        &self,
        word: &str,
        previous: Option<&str>,
        next: Option<&str>,
        start: usize,
    ) -> WordAnalysis {
        let category = self.classify(word, previous, next);
        WordAnalysis {
            word: word.to_string(),
            cleaned_form: clean_word(word),
            category,
            weight: category.weight(),
            octave_shift: category.octave_shift(),
            emphasis: category.emphasis(),
            start,
            end: start + word.chars().count(),
        }
    }

    /// Split on whitespace and classify every token with its neighbours as
    /// context. Spans are character indices into `text`.
    pub fn analyze_text(&self, text: &str) -> Vec<WordAnalysis> {
        let tokens = tokenize(text);
        tokens
            .iter()
            .enumerate()
            .map(|(i, &(start, token))| {
                let previous = i.checked_sub(1).map(|p| tokens[p].1);
                let next = tokens.get(i + 1).map(|t| t.1);
                self.analyze(token, previous, next, start)
            })
            .collect()
    }
}

/// Whitespace tokenization returning `(char_start, token)` pairs.
fn tokenize(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, usize)> = None; // (char index, byte index)

    for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
        if c.is_whitespace() {
            if let Some((cs, bs)) = current.take() {
                tokens.push((cs, &text[bs..byte_idx]));
            }
        } else if current.is_none() {
            current = Some((char_idx, byte_idx));
        }
    }
    if let Some((cs, bs)) = current {
        tokens.push((cs, &text[bs..]));
    }
    tokens
}

fn suffix_category(cleaned: &str) -> Option<WordCategory> {
    suffix_rules()
        .ordered
        .iter()
        .find(|(_, re)| re.is_match(cleaned))
        .map(|(cat, _)| *cat)
}

fn heuristic_category(raw: &str, cleaned: &str) -> WordCategory {
    let starts_upper = raw
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase);
    let len = cleaned.chars().count();

    if starts_upper {
        WordCategory::Noun
    } else if len <= 2 {
        WordCategory::Preposition
    } else if len >= 9 {
        WordCategory::Adjective
    } else {
        WordCategory::Noun
    }
}

/// Classify with the default lexicon.
pub fn classify(word: &str, previous: Option<&str>, next: Option<&str>) -> WordCategory {
    WordClassifier::default().classify(word, previous, next)
}

/// Tokenize and classify with the default lexicon.
pub fn analyze_text(text: &str) -> Vec<WordAnalysis> {
    WordClassifier::default().analyze_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Emphasis;

    #[test]
    fn test_closed_class_words() {
        assert_eq!(classify("o", None, None), WordCategory::Article);
        assert_eq!(classify("de", None, None), WordCategory::Preposition);
        assert_eq!(classify("você", None, None), WordCategory::Pronoun);
        assert_eq!(classify("mas", None, None), WordCategory::Conjunction);
        assert_eq!(classify("Olá!", None, None), WordCategory::Interjection);
    }

    #[test]
    fn test_question_words() {
        assert_eq!(classify("Onde", None, None), WordCategory::Adverb);
        assert_eq!(classify("quantos", None, None), WordCategory::Adverb);
        assert_eq!(classify("cadê", None, None), WordCategory::Adverb);
        // Closed classes still win for the overlapping ones.
        assert_eq!(classify("quem", None, None), WordCategory::Pronoun);
        assert_eq!(classify("como", None, None), WordCategory::Conjunction);
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(classify("rapidamente", None, None), WordCategory::Adverb);
        assert_eq!(classify("correr", None, None), WordCategory::Verb);
        assert_eq!(classify("cantando", None, None), WordCategory::Verb);
        assert_eq!(classify("estou", None, None), WordCategory::Verb);
        assert_eq!(classify("famoso", None, None), WordCategory::Adjective);
        assert_eq!(classify("feliz", None, None), WordCategory::Adjective);
        assert_eq!(classify("canção", None, None), WordCategory::Noun);
        assert_eq!(classify("cidade", None, None), WordCategory::Noun);
    }

    #[test]
    fn test_adverb_beats_verb_suffix() {
        // "-mente" is checked before anything else in the suffix tier.
        assert_eq!(classify("felizmente", None, None), WordCategory::Adverb);
    }

    #[test]
    fn test_context_after_article() {
        assert_eq!(classify("gato", Some("o"), None), WordCategory::Noun);
        assert_eq!(
            classify("belíssimo", Some("um"), None),
            WordCategory::Adjective
        );
    }

    #[test]
    fn test_context_after_preposition() {
        assert_eq!(classify("bolo", Some("com"), None), WordCategory::Noun);
    }

    #[test]
    fn test_context_before_article() {
        assert_eq!(classify("pega", None, Some("a")), WordCategory::Verb);
    }

    #[test]
    fn test_heuristic_fallback() {
        assert_eq!(classify("Maria", None, None), WordCategory::Noun);
        assert_eq!(classify("xy", None, None), WordCategory::Preposition);
        assert_eq!(classify("gato", None, None), WordCategory::Noun);
    }

    #[test]
    fn test_punctuation_token() {
        assert_eq!(classify("?!", None, None), WordCategory::Punctuation);
        assert_eq!(classify("123", None, None), WordCategory::Punctuation);
        assert_eq!(classify("", None, None), WordCategory::Punctuation);
    }

    #[test]
    fn test_every_alphabetic_word_gets_a_musical_category() {
        let words = [
            "a", "zz", "pássaro", "água", "sol", "qwertyuiop", "hoje", "Lisboa", "ção",
        ];
        for w in words {
            let cat = classify(w, None, None);
            assert!(cat.is_musical(), "'{w}' classified as {cat}");
        }
    }

    #[test]
    fn test_clean_word() {
        assert_eq!(clean_word("Você?"), "você");
        assert_eq!(clean_word("guarda-chuva"), "guardachuva");
        assert_eq!(clean_word("..."), "");
    }

    #[test]
    fn test_analyze_text_spans() {
        let words = analyze_text("  O gato  dorme.");
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].word, "O");
        assert_eq!((words[0].start, words[0].end), (2, 3));
        assert_eq!(words[1].word, "gato");
        assert_eq!((words[1].start, words[1].end), (4, 8));
        assert_eq!(words[2].word, "dorme.");
        assert_eq!(words[2].cleaned_form, "dorme");
        assert_eq!((words[2].start, words[2].end), (10, 16));
    }

    #[test]
    fn test_analyze_text_uses_category_table() {
        let words = analyze_text("o gato");
        assert_eq!(words[0].category, WordCategory::Article);
        assert_eq!(words[0].emphasis, Emphasis::VeryWeak);
        assert_eq!(words[1].category, WordCategory::Noun);
        assert_eq!(words[1].weight, 1.0);
    }

    #[test]
    fn test_analyze_text_multibyte_spans() {
        let words = analyze_text("ação é");
        assert_eq!((words[0].start, words[0].end), (0, 4));
        assert_eq!((words[1].start, words[1].end), (5, 6));
    }

    #[test]
    fn test_analyze_empty_text() {
        assert!(analyze_text("").is_empty());
        assert!(analyze_text("   ").is_empty());
    }
}
