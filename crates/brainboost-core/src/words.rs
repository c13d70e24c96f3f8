//! Noun lists for Associative Chaining.
//!
//! Built-in lists are compiled in; custom lists are plain text files with one
//! noun per line.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;

use crate::error::GameError;
use crate::model::Language;
use crate::recall::payload_size;

const EN_NOUNS: &str = include_str!("../data/en_nouns.txt");
const PL_NOUNS: &str = include_str!("../data/pl_nouns.txt");

/// A de-duplicated, lowercased list of nouns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

/// Which levels a list is large enough for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSupport {
    /// Fewer nouns than the level-1 payload needs.
    None,
    /// Levels `1..=n`.
    UpTo(u32),
    /// Every level: the list covers the capped payload size.
    All,
}

/// A problem found while reading a word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordListWarning {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl WordList {
    /// The compiled-in list for a language.
    pub fn builtin(language: Language) -> Self {
        match language {
            Language::En => Self::from_text(EN_NOUNS),
            Language::Pl => Self::from_text(PL_NOUNS),
        }
    }

    /// Parse newline-separated nouns. Lines are trimmed and lowercased; blank
    /// lines and repeats are dropped.
    pub fn from_text(text: &str) -> Self {
        let mut seen = HashSet::new();
        let words = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .filter(|word| seen.insert(word.clone()))
            .collect();
        Self { words }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text: Vec<String> = words.into_iter().map(|w| w.as_ref().to_string()).collect();
        Self::from_text(&text.join("\n"))
    }

    /// Load a list from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read word list: {}", path.display()))?;
        let warnings = validate_word_text(&content);
        if !warnings.is_empty() {
            tracing::warn!(
                "{}: {} line(s) ignored while loading word list",
                path.display(),
                warnings.len()
            );
        }
        Ok(Self::from_text(&content))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn level_support(&self) -> LevelSupport {
        let len = self.words.len();
        if len >= payload_size(u32::MAX) {
            LevelSupport::All
        } else if len < payload_size(1) {
            LevelSupport::None
        } else {
            // payload_size(level) == 9 + level below the cap
            LevelSupport::UpTo((len - 9) as u32)
        }
    }

    /// Draw `count` distinct nouns in random order.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, GameError> {
        if count > self.words.len() {
            return Err(GameError::PreconditionViolation(format!(
                "word list has {} nouns, {count} requested",
                self.words.len()
            )));
        }
        Ok(rand::seq::index::sample(rng, self.words.len(), count)
            .into_iter()
            .map(|i| self.words[i].clone())
            .collect())
    }
}

/// Report blank lines and repeated nouns in word-list text.
pub fn validate_word_text(text: &str) -> Vec<WordListWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let total = text.lines().count();

    for (idx, line) in text.lines().enumerate() {
        let word = line.trim().to_lowercase();
        if word.is_empty() {
            // trailing blank lines are fine
            if idx + 1 < total {
                warnings.push(WordListWarning {
                    line: idx + 1,
                    message: "blank line".into(),
                });
            }
            continue;
        }
        if word.contains(',') {
            warnings.push(WordListWarning {
                line: idx + 1,
                message: format!("'{word}' contains a comma and can never be answered"),
            });
        }
        if !seen.insert(word.clone()) {
            warnings.push(WordListWarning {
                line: idx + 1,
                message: format!("duplicate noun: {word}"),
            });
        }
    }

    warnings
}
