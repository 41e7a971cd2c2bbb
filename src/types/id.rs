use uuid::Uuid;

/// Every entity id is exactly this long, which keeps ids safe to embed in
/// sort keys and token subjects without escaping.
pub const ID_LENGTH: usize = 22;

/// Generates a fixed-length, token-safe entity id: a random UUID encoded
/// as 22 base62 characters.
#[must_use]
pub fn new_id() -> String {
    encode_base62(Uuid::new_v4().as_u128())
}

// 22 base62 digits cover the full u128 range, so the output width never varies.
fn encode_base62(mut n: u128) -> String {
    const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    let mut buf = [b'0'; ID_LENGTH];
    let mut i = ID_LENGTH;
    while n > 0 {
        i -= 1;
        buf[i] = ALPHABET[(n % 62) as usize];
        n /= 62;
    }
    String::from_utf8(buf.to_vec()).expect("base62 output is ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ids_have_fixed_length() {
        for _ in 0..100 {
            assert_eq!(new_id().len(), ID_LENGTH);
        }
    }

    #[test]
    fn test_ids_are_token_safe() {
        let id = new_id();
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_encode_base62_pads_small_values() {
        assert_eq!(encode_base62(0), "0".repeat(ID_LENGTH));
        assert_eq!(encode_base62(61).len(), ID_LENGTH);
        assert!(encode_base62(61).ends_with('z'));
    }
}
