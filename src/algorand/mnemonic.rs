//! 25-word account mnemonics.
//!
//! The first 24 words carry the 32 byte Ed25519 seed as little-endian 11-bit
//! groups over the BIP-39 English word list. The 25th word is the first 11-bit
//! group of `sha512_256(seed)`.

use bip39::Language;

use crate::error::{AppError, AppResult};

use super::sha512_256;

const KEY_WORDS: usize = 24;
pub const MNEMONIC_WORDS: usize = KEY_WORDS + 1;

/// Decode a 25-word mnemonic into the 32 byte private seed.
pub fn seed_from_mnemonic(mnemonic: &str) -> AppResult<[u8; 32]> {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(AppError::InvalidMnemonic(format!(
            "expected {} words, got {}",
            MNEMONIC_WORDS,
            words.len()
        )));
    }

    let indices = words[..KEY_WORDS]
        .iter()
        .map(|word| word_index(word))
        .collect::<AppResult<Vec<u16>>>()?;

    let bytes = from_u11(&indices);
    // 24 * 11 = 264 bits, so the 33rd byte holds only padding
    if bytes.len() != 33 || bytes[32] != 0 {
        return Err(AppError::InvalidMnemonic("failed to decode seed".to_string()));
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);

    let expected = checksum_word(&seed);
    if !words[KEY_WORDS].eq_ignore_ascii_case(expected) {
        return Err(AppError::InvalidMnemonic("checksum word mismatch".to_string()));
    }

    Ok(seed)
}

/// Encode a 32 byte seed as a 25-word mnemonic.
#[cfg(test)]
pub fn mnemonic_from_seed(seed: &[u8; 32]) -> String {
    let list = Language::English.word_list();
    let mut words: Vec<&str> = to_u11(seed)
        .into_iter()
        .map(|index| list[index as usize])
        .collect();
    words.push(checksum_word(seed));
    words.join(" ")
}

fn word_index(word: &str) -> AppResult<u16> {
    Language::English
        .find_word(&word.to_ascii_lowercase())
        .ok_or_else(|| AppError::InvalidMnemonic(format!("unknown word: {}", word)))
}

fn checksum_word(seed: &[u8; 32]) -> &'static str {
    let digest = sha512_256(seed);
    let first = to_u11(&digest)[0];
    Language::English.word_list()[first as usize]
}

fn to_u11(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / 11 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &byte in bytes {
        acc |= (byte as u32) << bits;
        bits += 8;
        if bits >= 11 {
            out.push((acc & 0x7ff) as u16);
            acc >>= 11;
            bits -= 11;
        }
    }
    if bits > 0 {
        out.push(acc as u16);
    }
    out
}

fn from_u11(groups: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(groups.len() * 11 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &group in groups {
        acc |= (group as u32) << bits;
        bits += 11;
        while bits >= 8 {
            out.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_roundtrip() {
        let seed = [42u8; 32];
        let mnemonic = mnemonic_from_seed(&seed);

        assert_eq!(mnemonic.split(' ').count(), MNEMONIC_WORDS);
        assert_eq!(seed_from_mnemonic(&mnemonic).unwrap(), seed);
    }

    #[test]
    fn test_zero_seed_words() {
        let mnemonic = mnemonic_from_seed(&[0u8; 32]);
        let words: Vec<&str> = mnemonic.split(' ').collect();

        // every 11-bit group of a zero seed is index 0
        assert!(words[..KEY_WORDS].iter().all(|w| *w == "abandon"));
        assert_eq!(seed_from_mnemonic(&mnemonic).unwrap(), [0u8; 32]);
    }

    #[test]
    fn test_accepts_extra_whitespace_and_case() {
        let seed = [7u8; 32];
        let mnemonic = mnemonic_from_seed(&seed).to_uppercase().replace(' ', "  \n");
        assert_eq!(seed_from_mnemonic(&mnemonic).unwrap(), seed);
    }

    #[test]
    fn test_rejects_wrong_checksum() {
        let mnemonic = mnemonic_from_seed(&[3u8; 32]);
        let mut words: Vec<&str> = mnemonic.split(' ').collect();
        let checksum = words[KEY_WORDS];
        words[KEY_WORDS] = if checksum == "zoo" { "abandon" } else { "zoo" };

        let err = seed_from_mnemonic(&words.join(" ")).unwrap_err();
        assert!(matches!(err, AppError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_rejects_word_count_and_unknown_words() {
        assert!(seed_from_mnemonic("abandon abandon abandon").is_err());

        let mnemonic = mnemonic_from_seed(&[5u8; 32]);
        let tampered = mnemonic.replacen(mnemonic.split(' ').next().unwrap(), "notaword", 1);
        assert!(seed_from_mnemonic(&tampered).is_err());
    }

    #[test]
    fn test_u11_packing_is_reversible() {
        let bytes: Vec<u8> = (0u8..32).collect();
        let groups = to_u11(&bytes);
        assert_eq!(groups.len(), KEY_WORDS);
        assert_eq!(&from_u11(&groups)[..32], &bytes[..]);
    }
}
