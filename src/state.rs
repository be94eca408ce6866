use rand::{TryRngCore, rngs::OsRng};

use crate::OAuthError;

pub(crate) const STATE_LENGTH: usize = 32;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draws `length` alphanumeric characters from the OS RNG.
///
/// Bytes outside the largest multiple of the alphabet size are
/// rejected so every character stays equally likely.
pub(crate) fn random_alphanumeric(length: usize) -> Result<String, OAuthError> {
    let limit = u8::MAX - u8::MAX % ALPHABET.len() as u8;
    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];
    while out.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|err| OAuthError::StateGeneration {
                message: err.to_string(),
            })?;
        for &byte in &buf {
            if byte < limit {
                out.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
                if out.len() == length {
                    break;
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{STATE_LENGTH, random_alphanumeric};

    #[test]
    fn generates_requested_length() {
        let state = random_alphanumeric(STATE_LENGTH).unwrap();
        assert_eq!(state.len(), STATE_LENGTH);
    }

    #[test]
    fn stays_within_the_alphanumeric_alphabet() {
        let state = random_alphanumeric(256).unwrap();
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn successive_values_differ() {
        let first = random_alphanumeric(STATE_LENGTH).unwrap();
        let second = random_alphanumeric(STATE_LENGTH).unwrap();
        assert_ne!(first, second);
    }
}
