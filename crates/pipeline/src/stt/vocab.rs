//! CTC vocabulary
//!
//! Loads the model's `vocab.json` (token -> id map) and decodes greedy label
//! sequences: consecutive repeats are collapsed, blank/special symbols are
//! dropped, and the word delimiter becomes a space.

use std::collections::HashMap;
use std::path::Path;

use crate::PipelineError;

/// Word boundary symbol in wav2vec2 character vocabularies
const WORD_DELIMITER: &str = "|";

/// CTC vocabulary with greedy decoding
#[derive(Debug, Clone)]
pub struct Vocabulary {
    id_to_token: Vec<Option<String>>,
    blank_id: u32,
}

impl Vocabulary {
    /// Load from a HuggingFace-style vocab.json
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Io(format!("failed to read vocab: {}", e)))?;

        let token_to_id: HashMap<String, u32> = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Stt(format!("failed to parse vocab: {}", e)))?;

        Self::from_map(token_to_id)
    }

    /// Build from a token -> id map
    pub fn from_map(token_to_id: HashMap<String, u32>) -> Result<Self, PipelineError> {
        if token_to_id.is_empty() {
            return Err(PipelineError::Stt("vocabulary is empty".to_string()));
        }

        let max_id = token_to_id.values().copied().max().unwrap_or(0) as usize;
        let mut id_to_token: Vec<Option<String>> = vec![None; max_id + 1];
        for (token, id) in &token_to_id {
            id_to_token[*id as usize] = Some(token.clone());
        }

        // The pad symbol doubles as the CTC blank
        let blank_id = token_to_id.get("<pad>").copied().unwrap_or(0);

        tracing::info!(
            vocab_size = id_to_token.len(),
            blank_id = blank_id,
            "loaded CTC vocabulary"
        );

        Ok(Self {
            id_to_token,
            blank_id,
        })
    }

    /// Number of label ids
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Token text for a label id
    pub fn token(&self, id: u32) -> Option<&str> {
        self.id_to_token
            .get(id as usize)
            .and_then(|t| t.as_deref())
    }

    /// Decode a greedy (per-frame argmax) label sequence into text
    ///
    /// CTC rules: collapse consecutive repeats first, then drop blanks and
    /// other special symbols.
    pub fn decode_greedy(&self, ids: &[u32]) -> String {
        let mut out = String::new();
        let mut prev: Option<u32> = None;

        for &id in ids {
            if prev == Some(id) {
                continue;
            }
            prev = Some(id);

            if id == self.blank_id {
                continue;
            }

            match self.token(id) {
                Some(WORD_DELIMITER) => out.push(' '),
                Some(token) if is_special(token) => {}
                Some(token) => out.push_str(token),
                None => {}
            }
        }

        // Delimiter runs at the edges or back-to-back leave stray spaces
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn is_special(token: &str) -> bool {
    token.starts_with('<') && token.ends_with('>')
}
