//! On-disk layout: `<root>/<learner>/<Subject>.json`.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use adaptutor_core::progress::RecordKey;

const MAX_PLAIN_LEN: usize = 64;
const ENCODED_PREFIX: &str = "x-";

/// Directory name for a learner.
///
/// Ids made of lowercase ASCII letters, digits, `-` and `_` are used as-is.
/// Anything else is hex-encoded behind an `x-` prefix, including ids that
/// could be mistaken for an encoded name. Uppercase letters are encoded too,
/// so `Asha` and `asha` stay apart on case-insensitive filesystems.
pub fn learner_dir_name(learner_id: &str) -> String {
    let plain = !learner_id.is_empty()
        && learner_id.len() <= MAX_PLAIN_LEN
        && !learner_id.starts_with(ENCODED_PREFIX)
        && learner_id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if plain {
        return learner_id.to_string();
    }

    let mut encoded = String::with_capacity(ENCODED_PREFIX.len() + learner_id.len() * 2);
    encoded.push_str(ENCODED_PREFIX);
    for b in learner_id.bytes() {
        let _ = write!(encoded, "{b:02x}");
    }
    encoded
}

pub fn record_path(root: &Path, key: &RecordKey) -> PathBuf {
    root.join(learner_dir_name(&key.learner_id))
        .join(format!("{}.json", key.subject))
}
