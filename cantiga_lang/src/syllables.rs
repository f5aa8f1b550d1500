// Syllabification and stress detection.
//
// `syllabify` splits a word at syllable boundaries by locating vowel nuclei
// (with diphthong/triphthong lookahead) and deciding where the consonants
// between two nuclei go:
// - none: hiatus, split right before the second nucleus
// - one: the consonant opens the next syllable
// - two: both open the next syllable if they form a valid onset cluster
//   ("br", "tr", "lh", ...), otherwise they split
// - three or more: split after the first
// Words of up to three letters that contain a vowel are a single syllable.
// The concatenation of the returned syllables is always the lowercased input.
//
// `detect_stress` picks the stressed syllable by priority:
// 1. a graphic accent (acute/circumflex), confidence 1.0
// 2. monosyllables: 0.9 for strong ones from the lexicon, 0.3 otherwise
// 3. suffix tables (proparoxytone, oxytone, paroxytone), 0.9
// 4. general ending rule: i/u/r/l/z/im/um... → oxytone (0.8), nasal
//    diphthong endings → paroxytone (0.7)
// 5. default paroxytone, 0.6
//
// `stress_levels` spreads primary/secondary stress across a word's syllables
// for the music crate to turn into velocity and duration.

use crate::classifier::clean_word;
use crate::phonotactics::{
    NASAL_ENDINGS, OXYTONE_ENDINGS, OXYTONE_SUFFIXES, PAROXYTONE_SUFFIXES, PROPAROXYTONE_SUFFIXES,
    ends_with_any, has_stress_accent, is_diphthong, is_onset_cluster, is_triphthong,
};
use crate::types::{StressPattern, StressResult, is_vowel_char};
use crate::{Lexicon, default_lexicon};

/// Stress level of the primary stressed syllable.
pub const PRIMARY_STRESS: f32 = 1.0;
/// Secondary stress two syllables away from the primary.
pub const SECONDARY_STRESS_NEAR: f32 = 0.6;
/// Secondary stress four syllables away from the primary.
pub const SECONDARY_STRESS_FAR: f32 = 0.4;
/// Everything else.
pub const UNSTRESSED: f32 = 0.3;

/// A `u` after `q`/`g` and before another vowel is a glide ("quando",
/// "guerra"), not a syllable nucleus.
fn is_nucleus(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    if !is_vowel_char(c) {
        return false;
    }
    if matches!(c, 'u' | 'ü') && i > 0 && matches!(chars[i - 1], 'q' | 'g') {
        let followed_by_vowel = chars.get(i + 1).is_some_and(|&n| is_vowel_char(n));
        return !followed_by_vowel;
    }
    true
}

/// Locate vowel nuclei as `[start, end)` char ranges.
fn find_nuclei(chars: &[char]) -> Vec<(usize, usize)> {
    let mut nuclei = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !is_nucleus(chars, i) {
            i += 1;
            continue;
        }
        let len = if i + 2 < chars.len() && is_triphthong(chars[i], chars[i + 1], chars[i + 2]) {
            3
        } else if i + 1 < chars.len() && is_diphthong(chars[i], chars[i + 1]) {
            2
        } else {
            1
        };
        nuclei.push((i, i + len));
        i += len;
    }
    nuclei
}

/// Split a word into syllables. The input is lowercased; nothing is
/// dropped, so joining the result gives back the lowercased word.
pub fn syllabify(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= 3 && chars.iter().any(|&c| is_vowel_char(c)) {
        return vec![chars.iter().collect()];
    }

    let nuclei = find_nuclei(&chars);
    if nuclei.is_empty() {
        return vec![chars.iter().collect()];
    }

    let mut boundaries = Vec::with_capacity(nuclei.len() + 1);
    boundaries.push(0);
    for pair in nuclei.windows(2) {
        let (_, end) = pair[0];
        let (next_start, _) = pair[1];
        let split = match next_start - end {
            0 => next_start,
            1 => end,
            2 if is_onset_cluster(chars[end], chars[end + 1]) => end,
            _ => end + 1,
        };
        boundaries.push(split);
    }
    boundaries.push(chars.len());

    boundaries
        .windows(2)
        .map(|w| chars[w[0]..w[1]].iter().collect())
        .collect()
}

fn result(syllables: Vec<String>, pattern: StressPattern, confidence: f32) -> StressResult {
    let stressed_syllable_index = pattern.stressed_index(syllables.len());
    StressResult {
        pattern: StressPattern::from_index(stressed_syllable_index, syllables.len()),
        syllables,
        stressed_syllable_index,
        confidence,
    }
}

/// Detect stress using the default lexicon's strong-monosyllable list.
pub fn detect_stress(word: &str) -> StressResult {
    detect_stress_with(word, default_lexicon())
}

/// Detect the stressed syllable of `word`. Never fails: anything the rules
/// don't recognize is a paroxytone with confidence 0.6.
pub fn detect_stress_with(word: &str, lexicon: &Lexicon) -> StressResult {
    let cleaned = clean_word(word);
    let mut syllables = syllabify(&cleaned);
    if syllables.is_empty() {
        syllables.push(String::new());
    }
    let count = syllables.len();

    if let Some(idx) = syllables.iter().rposition(|s| has_stress_accent(s)) {
        return StressResult {
            pattern: StressPattern::from_index(idx, count),
            syllables,
            stressed_syllable_index: idx,
            confidence: 1.0,
        };
    }

    if count == 1 {
        let confidence = if lexicon.is_strong_monosyllable(&cleaned) {
            0.9
        } else {
            0.3
        };
        return result(syllables, StressPattern::Monosyllable, confidence);
    }

    if count >= 3 && ends_with_any(&cleaned, PROPAROXYTONE_SUFFIXES) {
        return result(syllables, StressPattern::Proparoxytone, 0.9);
    }
    if ends_with_any(&cleaned, OXYTONE_SUFFIXES) {
        return result(syllables, StressPattern::Oxytone, 0.9);
    }
    if ends_with_any(&cleaned, PAROXYTONE_SUFFIXES) {
        return result(syllables, StressPattern::Paroxytone, 0.9);
    }

    if ends_with_any(&cleaned, OXYTONE_ENDINGS) {
        return result(syllables, StressPattern::Oxytone, 0.8);
    }
    if ends_with_any(&cleaned, NASAL_ENDINGS) {
        return result(syllables, StressPattern::Paroxytone, 0.7);
    }

    result(syllables, StressPattern::Paroxytone, 0.6)
}

/// Per-syllable stress level: primary 1.0; in words of more than four
/// syllables, 0.6 at distance 2 and 0.4 at distance 4 from the primary;
/// 0.3 everywhere else.
pub fn stress_levels(stress: &StressResult) -> Vec<f32> {
    let count = stress.syllables.len();
    let primary = stress.stressed_syllable_index;
    (0..count)
        .map(|i| {
            if i == primary {
                PRIMARY_STRESS
            } else if count > 4 {
                match i.abs_diff(primary) {
                    2 => SECONDARY_STRESS_NEAR,
                    4 => SECONDARY_STRESS_FAR,
                    _ => UNSTRESSED,
                }
            } else {
                UNSTRESSED
            }
        })
        .collect()
}

/// Which syllable the `letter_index`-th letter of the cleaned word falls
/// in. Indices past the end map to the last syllable.
pub fn syllable_of_letter(syllables: &[String], letter_index: usize) -> usize {
    let mut seen = 0;
    for (i, syl) in syllables.iter().enumerate() {
        seen += syl.chars().count();
        if letter_index < seen {
            return i;
        }
    }
    syllables.len().saturating_sub(1)
}
