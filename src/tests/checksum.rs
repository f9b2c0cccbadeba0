use proptest::prelude::*;

use crate::{checksum, checksum_valid, format_checksum};

fn sentence(body: &str) -> Vec<u8> {
    let (_, cc) = checksum(body);
    format!("${body}*{}\r\n", format_checksum(cc)).into_bytes()
}

#[test]
fn test_known_checksums() {
    assert_eq!(checksum("GPGGA,123456,data").1, 0x41);
    assert_eq!(checksum("GPGLL,4916.45,N,12311.12,W,225444,A,A").1, 0x5C);
    assert!(checksum_valid(b"$GPGLL,4916.45,N,12311.12,W,225444,A,A*5C\r\n"));
}

#[test]
fn test_lowercase_hex_rejected() {
    // The comparison is on the formatted text, which is uppercase
    assert!(checksum_valid(b"$GPGGA,data*6A\r\n"));
    assert!(!checksum_valid(b"$GPGGA,data*6a\r\n"));
}

#[test]
fn test_missing_parts() {
    assert!(!checksum_valid(b""));
    assert!(!checksum_valid(b"$"));
    assert!(!checksum_valid(b"$*"));
    assert!(!checksum_valid(b"GPGGA,data*6A\r\n"));
    // An empty body XORs to zero
    assert!(checksum_valid(b"$*00"));
}

proptest! {
    #[test]
    fn computed_checksum_verifies(body in "[ -)+-~]{0,79}") {
        prop_assert!(checksum_valid(&sentence(&body)));
    }

    #[test]
    fn corrupted_checksum_fails(
        body in "[ -)+-~]{0,79}",
        position in 0usize..2,
        replacement in prop::sample::select(b"0123456789ABCDEF".to_vec()),
    ) {
        let mut frame = sentence(&body);
        let at = frame.len() - 4 + position;
        prop_assume!(frame[at] != replacement);

        frame[at] = replacement;
        prop_assert!(!checksum_valid(&frame));
    }

    #[test]
    fn never_panics(bytes in prop::collection::vec(any::<u8>(), 0..100)) {
        let _ = checksum_valid(&bytes);
    }
}
