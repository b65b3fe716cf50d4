//! Word selection and the built-in word bank.

use parlor_protocol::GameMode;
use serde::{Deserialize, Serialize};

/// The two words resolved for a match: everyone's `citizen_word`, and in
/// `BLIND` mode the imposter's different `imposter_word`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub citizen_word: String,
    pub imposter_word: Option<String>,
}

/// A source of category word lists. The built-in [`BuiltinWordBank`] is a
/// small embedded table; a real deployment can swap in a larger or
/// externally-sourced bank behind the same trait.
pub trait WordBank {
    /// Words available for `category`, or `None` if the category is
    /// unknown to this bank.
    fn words(&self, category: &str) -> Option<&[&str]>;

    /// The category names this bank knows about, in a stable order.
    fn categories(&self) -> &[&str];
}

macro_rules! category {
    ($name:expr, [$($word:expr),+ $(,)?]) => {
        ($name, &[$($word),+][..])
    };
}

const CATEGORIES: &[(&str, &[&str])] = &[
    category!(
        "Animals",
        ["Cat", "Dog", "Elephant", "Giraffe", "Penguin", "Dolphin", "Tiger", "Koala"]
    ),
    category!(
        "Food",
        ["Pizza", "Sushi", "Taco", "Pasta", "Burger", "Curry", "Pancake", "Ramen"]
    ),
    category!(
        "Movies",
        ["Inception", "Titanic", "Gladiator", "Matrix", "Avatar", "Jaws", "Up", "Coco"]
    ),
    category!(
        "Sports",
        ["Soccer", "Tennis", "Hockey", "Cricket", "Rugby", "Golf", "Boxing", "Archery"]
    ),
];

/// Word bank embedded in the binary. Covers a handful of categories so the
/// server is runnable without an external content pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinWordBank;

impl WordBank for BuiltinWordBank {
    fn words(&self, category: &str) -> Option<&[&str]> {
        CATEGORIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, words)| *words)
    }

    fn categories(&self) -> &[&str] {
        static NAMES: &[&str] = &["Animals", "Food", "Movies", "Sports"];
        NAMES
    }
}

/// Draws a word pair for `mode` from `word_list` using `rand` (a
/// `[0, 1)`-valued source). `CLASSIC` draws one citizen word and leaves
/// `imposter_word` unset. `BLIND` draws a citizen word, then redraws the
/// imposter word until it differs *by index* from the citizen word — with
/// a one-word list both words are equal, and with a two-word list the
/// imposter always gets the other one.
pub fn select_words_for_mode(
    mode: GameMode,
    word_list: &[&str],
    mut rand: impl FnMut() -> f64,
) -> WordPair {
    assert!(!word_list.is_empty(), "word list must not be empty");
    let citizen_index = (rand() * word_list.len() as f64) as usize;
    let citizen_index = citizen_index.min(word_list.len() - 1);
    let citizen_word = word_list[citizen_index].to_string();

    match mode {
        GameMode::Classic => WordPair { citizen_word, imposter_word: None },
        GameMode::Blind => {
            if word_list.len() == 1 {
                return WordPair {
                    citizen_word: citizen_word.clone(),
                    imposter_word: Some(citizen_word),
                };
            }
            let imposter_index = loop {
                let idx = (rand() * word_list.len() as f64) as usize;
                let idx = idx.min(word_list.len() - 1);
                if idx != citizen_index {
                    break idx;
                }
            };
            WordPair {
                citizen_word,
                imposter_word: Some(word_list[imposter_index].to_string()),
            }
        }
    }
}
