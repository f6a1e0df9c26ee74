//! Raw identifier generation.
//!
//! These are pure functions of the random source. Uniqueness is not their
//! concern; the directory retries when the store reports a collision.

use imposter_protocol::{JoinCode, PlayerToken, Slug};
use rand::Rng;
use rand::distr::Alphanumeric;

const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
        .collect()
}

/// A lowercase alphanumeric slug of `len` characters.
pub fn generate_slug<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Slug {
    Slug::new(pick(rng, SLUG_ALPHABET, len))
}

/// A six-character uppercase alphanumeric join code.
pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> JoinCode {
    JoinCode::from_generated(pick(rng, CODE_ALPHABET, JoinCode::LEN))
}

/// A mixed-case alphanumeric token of `len` characters.
///
/// At 62 symbols per character, 40 characters carry ~238 bits.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> PlayerToken {
    let token: String = (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    PlayerToken::new(token)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_generate_slug_is_lowercase_alphanumeric() {
        let slug = generate_slug(&mut rng(), 10);
        assert_eq!(slug.as_str().len(), 10);
        assert!(
            slug.as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_join_code_parses_back() {
        let code = generate_join_code(&mut rng());
        assert_eq!(JoinCode::parse(code.as_str()).unwrap(), code);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_token_length_and_alphabet() {
        let token = generate_token(&mut rng(), 40);
        assert_eq!(token.as_str().len(), 40);
        assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_token_many_are_distinct() {
        let mut rng = rng();
        let tokens: HashSet<String> = (0..1000)
            .map(|_| generate_token(&mut rng, 40).as_str().to_string())
            .collect();
        assert_eq!(tokens.len(), 1000);
    }
}
