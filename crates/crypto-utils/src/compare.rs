use subtle::ConstantTimeEq;

/// Compares two byte strings without short-circuiting on the first mismatch.
///
/// Lengths are not secret: slices of different length compare unequal
/// immediately.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices() {
        assert!(ct_eq(b"same bytes", b"same bytes"));
        assert!(ct_eq(&[], &[]));
    }

    #[test]
    fn differing_last_byte() {
        let a = [7u8; 32];
        let mut b = a;
        b[31] ^= 1;
        assert!(!ct_eq(&a, &b));
    }

    #[test]
    fn differing_lengths() {
        assert!(!ct_eq(&[1, 2, 3], &[1, 2]));
    }
}
