//! Feed signatures and cache-key derivation.

use sha2::{Digest, Sha256};

/// Length of the hex signature emitted to loaders.
const SIGNATURE_LEN: usize = 16;

/// Compute the signature of a term's feed from its newest published post.
///
/// `newest` is `(post_id, modified_at)` of the newest post in the term, or
/// `None` when the term has no published posts.
pub fn feed_signature(term_id: i64, newest: Option<(i64, &str)>) -> String {
    let Some((post_id, modified_at)) = newest else {
        return format!("empty-{term_id}");
    };

    let mut hasher = Sha256::new();
    hasher.update(term_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(post_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(modified_at.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(SIGNATURE_LEN);
    digest
}

/// Stable bucket identifier for a taxonomy term.
///
/// Independent of pagination depth: every page of the same term lands in
/// the same bucket.
pub fn cache_key(taxonomy: &str, term_id: i64) -> String {
    let slug: String = taxonomy
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    format!("{slug}-{term_id}")
}
