use std::collections::HashSet;

/// Dictionary lookup consumed by the engine. Pure query, no side effects.
pub trait WordValidator: Send + Sync {
    fn is_valid_word(&self, word: &str) -> bool;
}

/// Word list backed by a set, case-insensitive
#[derive(Debug, Clone, Default)]
pub struct DictionaryValidator {
    words: HashSet<String>,
}

impl DictionaryValidator {
    pub fn new(words: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        DictionaryValidator {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordValidator for DictionaryValidator {
    fn is_valid_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_ascii_uppercase())
    }
}
