//! Short-code generation
//!
//! Codes are derived from a SHA-256 digest of a caller-salted seed rather than
//! drawn at random, so a seed always maps to the same sequence of candidates.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::config::CodeConfig;
use crate::errors::{FilelinkerError, Result};
use crate::storage::{LinkKind, LinkRecord, LinkStore};

/// 进制 36 字母表：0-9a-z
pub const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FILLER: char = '0';

fn to_radix36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Candidate code for `seed` at `attempt`
///
/// SHA-256 of the seed (suffixed with `-{attempt}` after the first try),
/// first 8 hex digits as an integer, rendered in radix 36, then cut or
/// right-padded with `'0'` to `len`.
pub fn derive_code(seed: &str, attempt: u32, len: usize) -> String {
    let input = if attempt > 0 {
        format!("{}-{}", seed, attempt)
    } else {
        seed.to_string()
    };
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    // 前 8 个十六进制字符必然能放进 u32
    let value = u32::from_str_radix(&digest[..8], 16).unwrap_or_default();

    let mut code: String = to_radix36(value).chars().take(len).collect();
    while code.len() < len {
        code.push(FILLER);
    }
    code
}

/// Outcome of [`CodeGenerator::generate`]
#[derive(Debug, Clone, PartialEq)]
pub enum MintedCode {
    /// Nothing is stored under the code yet
    Fresh(String),
    /// The code already holds the same content; the stored record is left as is
    Existing(String, LinkRecord),
}

impl MintedCode {
    pub fn code(&self) -> &str {
        match self {
            MintedCode::Fresh(code) | MintedCode::Existing(code, _) => code,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, MintedCode::Fresh(_))
    }
}

pub struct CodeGenerator {
    store: Arc<LinkStore>,
    config: CodeConfig,
}

impl CodeGenerator {
    pub fn new(store: Arc<LinkStore>, config: CodeConfig) -> Self {
        Self { store, config }
    }

    pub fn length_for(&self, kind: LinkKind) -> usize {
        match kind {
            LinkKind::Folder => self.config.folder_length,
            LinkKind::File => self.config.file_length,
        }
    }

    /// Find a free code for `candidate`
    ///
    /// An occupied code whose record already has the same content comes back
    /// as [`MintedCode::Existing`], so re-submitting identical content is
    /// idempotent.
    pub async fn generate(&self, seed: &str, candidate: &LinkRecord) -> Result<MintedCode> {
        let len = self.length_for(candidate.kind());
        let attempts = self.config.max_attempts.max(1);

        for attempt in 0..attempts {
            let code = derive_code(seed, attempt, len);
            match self.store.get(&code).await {
                Ok(None) => {
                    debug!("Generated code '{}' after {} attempt(s)", code, attempt + 1);
                    return Ok(MintedCode::Fresh(code));
                }
                Ok(Some(existing)) if existing.same_content(candidate) => {
                    debug!("Code '{}' already holds identical content", code);
                    return Ok(MintedCode::Existing(code, existing));
                }
                Ok(Some(_)) | Err(FilelinkerError::Serialization(_)) => {
                    trace!("Code '{}' is taken, retrying", code);
                }
                Err(e) => return Err(e),
            }
        }

        Err(FilelinkerError::code_generation_exhausted(format!(
            "No free code after {} attempts",
            attempts
        )))
    }
}
