//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Strips links and noise, lowercases Latin letters
//! - **Dictionary**: Word-frequency entries fed to the segmenter
//! - **Segmenter**: Cuts space-free Chinese/Latin runs into words (jieba)
//! - **Stopwords**: Tokens dropped after segmentation
//! - **Tokenizer**: Chains the stages above into token lists

pub mod dictionary;
pub mod normalizer;
pub mod segmenter;
pub mod stopwords;
pub mod tokenizer;

pub use dictionary::{DictEntry, Dictionary};
pub use normalizer::{NormalizerConfig, TextNormalizer};
pub use segmenter::{JiebaSegmenter, Segmenter};
pub use stopwords::{read_word_list, StopwordSet};
pub use tokenizer::Tokenizer;
