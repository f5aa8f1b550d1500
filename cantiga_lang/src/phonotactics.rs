// Portuguese phonotactic tables: diphthongs, onset clusters, accent marks,
// and the suffix tables used for stress detection.
//
// Everything here is a `const` slice so the tables are fixed at compile time
// and shared by the syllabifier, the stress detector, and the phoneme
// transliterator. Lookups are linear scans; the tables are tiny.

/// Vowel sequences that stay in one syllable (falling diphthongs and the
/// nasal diphthongs). Checked by two-character lookahead.
pub const DIPHTHONGS: &[&str] = &[
    "ai", "ei", "oi", "ui", "au", "eu", "iu", "ou", "ão", "ãe", "õe", "ãi", "éu", "éi", "ói",
    "êi", "ôu",
];

/// Three-vowel sequences kept in one syllable ("Paraguai", "saguão").
pub const TRIPHTHONGS: &[&str] = &["uai", "uei", "uão", "uõe", "uãe", "iai", "iei"];

/// Consonant pairs that can open a syllable together. Two consonants
/// between vowels both move to the next syllable when they appear here;
/// otherwise they split. "qu"/"gu" count because their `u` is a glide.
pub const ONSET_CLUSTERS: &[&str] = &[
    "br", "cr", "dr", "fr", "gr", "pr", "tr", "vr", "bl", "cl", "fl", "gl", "pl", "tl", "ch",
    "lh", "nh", "qu", "gu",
];

/// Vowels carrying a graphic stress accent (acute or circumflex). Grave
/// (crase) and tilde are not stress marks.
pub const STRESS_ACCENTS: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'â', 'ê', 'ô'];

/// Endings that make a word oxytone regardless of the general rule.
pub const OXYTONE_SUFFIXES: &[&str] = &[
    "ção", "ções", "são", "sões", "ar", "er", "ir", "az", "ez", "iz", "oz", "uz",
];

/// Endings that make a word paroxytone.
pub const PAROXYTONE_SUFFIXES: &[&str] = &[
    "dade", "mente", "agem", "ismo", "ista", "eza", "ura", "ante", "ente", "oso", "osa", "ável",
    "ível", "inho", "inha", "eiro", "eira",
];

/// Endings of unaccented proparoxytones (usually typed without the accent:
/// "musica", "pratico"). Only applied to words of three or more syllables.
pub const PROPAROXYTONE_SUFFIXES: &[&str] = &[
    "ica", "ico", "icas", "icos", "ulo", "ula", "issimo", "issima",
];

/// General-rule endings that put stress on the last syllable. Narrower than
/// the textbook rule (final r, l, z, x, i, u, nasal m/n): plain a, e and o,
/// a bare final n and most final m are left out, so words like "homem",
/// "falam" and "item" fall through to the paroxytone default.
pub const OXYTONE_ENDINGS: &[&str] = &[
    "i", "is", "u", "us", "r", "l", "z", "x", "im", "ins", "um", "uns", "om", "ons",
];

/// Nasal-diphthong endings treated as a paroxytone exception.
pub const NASAL_ENDINGS: &[&str] = &["ão", "ãos", "ã", "ãs"];

/// True if `word` ends with any of `suffixes`.
pub fn ends_with_any(word: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| word.ends_with(s))
}

pub fn is_diphthong(a: char, b: char) -> bool {
    DIPHTHONGS.iter().any(|d| {
        let mut chars = d.chars();
        chars.next() == Some(a) && chars.next() == Some(b)
    })
}

pub fn is_triphthong(a: char, b: char, c: char) -> bool {
    TRIPHTHONGS.iter().any(|t| {
        let mut chars = t.chars();
        chars.next() == Some(a) && chars.next() == Some(b) && chars.next() == Some(c)
    })
}

pub fn is_onset_cluster(a: char, b: char) -> bool {
    ONSET_CLUSTERS.iter().any(|t| {
        let mut chars = t.chars();
        chars.next() == Some(a) && chars.next() == Some(b)
    })
}

pub fn has_stress_accent(text: &str) -> bool {
    text.chars().any(|c| STRESS_ACCENTS.contains(&c))
}
