//! Customer-facing order identifiers: `BM-<epoch millis>-<7 chars>`

use rand::Rng;

const PREFIX: &str = "BM";
const SUFFIX_LEN: usize = 7;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fresh identifier stamped with the current time
pub fn generate_order_id() -> String {
    generate_order_id_at(shared::util::now_millis(), &mut rand::thread_rng())
}

pub fn generate_order_id_at<R: Rng + ?Sized>(millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{PREFIX}-{millis}-{suffix}")
}

/// Matches identifiers minted by [`generate_order_id`]
///
/// Lookups do not gate on it: older identifiers carry shorter suffixes.
pub fn is_order_id(s: &str) -> bool {
    let mut parts = s.splitn(3, '-');
    let (Some(prefix), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == PREFIX
        && !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}
