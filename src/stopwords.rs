//! Stopword filtering for derived note names.
//!
//! The built-in set is the classic English function-word list. Contractions
//! are stored apostrophe-free ("dont", "youre") because the tokenizer strips
//! punctuation before filtering, so apostrophe'd entries could never match.

use std::collections::HashSet;

/// Built-in English stopwords, sorted so membership checks can binary-search.
pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an",
    "and", "any", "are", "arent", "as", "at", "be", "because", "been",
    "before", "being", "below", "between", "both", "but", "by", "cannot",
    "cant", "could", "couldnt", "did", "didnt", "do", "does", "doesnt",
    "doing", "dont", "down", "during", "each", "few", "for", "from",
    "further", "had", "hadnt", "has", "hasnt", "have", "havent", "having",
    "he", "hed", "hell", "her", "here", "heres", "hers", "herself", "hes",
    "him", "himself", "his", "how", "hows", "i", "id", "if", "ill", "im",
    "in", "into", "is", "isnt", "it", "its", "itself", "ive", "lets", "me",
    "more", "most", "mustnt", "my", "myself", "no", "nor", "not", "of",
    "off", "on", "once", "only", "or", "other", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shant", "she", "shed",
    "shell", "shes", "should", "shouldnt", "so", "some", "such", "than",
    "that", "thats", "the", "their", "theirs", "them", "themselves", "then",
    "there", "theres", "these", "they", "theyd", "theyll", "theyre",
    "theyve", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "wasnt", "we", "wed", "well", "were", "werent",
    "weve", "what", "whats", "when", "whens", "where", "wheres", "which",
    "while", "who", "whom", "whos", "why", "whys", "with", "wont", "would",
    "wouldnt", "you", "youd", "youll", "your", "youre", "yours", "yourself",
    "yourselves", "youve",
];

/// Check membership in the built-in set. Expects an already-lowercased word.
pub fn is_stopword(word: &str) -> bool {
    ENGLISH.binary_search(&word).is_ok()
}

/// Drop stopwords from `words`, preserving order and duplicates.
///
/// A blank `custom` spec selects the built-in English set; otherwise the
/// whitespace-separated words in `custom` are the complete filter set
/// (they replace the built-in list, not extend it).
pub fn remove_stopwords(words: Vec<String>, custom: &str) -> Vec<String> {
    if custom.trim().is_empty() {
        words.into_iter().filter(|w| !is_stopword(w)).collect()
    } else {
        let set: HashSet<&str> = custom.split_whitespace().collect();
        words
            .into_iter()
            .filter(|w| !set.contains(w.as_str()))
            .collect()
    }
}
