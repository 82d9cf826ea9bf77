//! # Sequence Number Allocation
//!
//! Pure arithmetic over the lineage: parse the base, add one, render the
//! directory name. Reservation against concurrent callers is the store's
//! job ([`crate::store::SequenceStore::reserve_next`]), which delegates the
//! increment here; this function is the single definition of "next".

use ectd_core::{SequenceId, SequenceIdError};

/// The sequence that follows `base`, with its directory name.
///
/// # Errors
///
/// [`SequenceIdError::InvalidBaseSequence`] for unparseable input,
/// [`SequenceIdError::SequenceOverflow`] when the lineage is exhausted.
pub fn next_sequence(base: &str) -> Result<(SequenceId, String), SequenceIdError> {
    let base = SequenceId::parse(base)?;
    let next = base.next()?;
    let dir = next.dir_name();
    Ok((next, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_from_padded_base() {
        let (seq, dir) = next_sequence("0003").unwrap();
        assert_eq!(seq.value(), 4);
        assert_eq!(dir, "0004");
    }

    #[test]
    fn test_next_from_unpadded_base() {
        let (seq, dir) = next_sequence("41").unwrap();
        assert_eq!(seq.to_string(), "0042");
        assert_eq!(dir, "0042");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(matches!(
            next_sequence("000x"),
            Err(SequenceIdError::InvalidBaseSequence(_))
        ));
    }

    #[test]
    fn test_overflow_at_lineage_end() {
        assert!(matches!(
            next_sequence("9999"),
            Err(SequenceIdError::SequenceOverflow(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Allocation is base + 1 with a 4-digit directory name, across the
        /// whole non-terminal identifier space.
        #[test]
        fn next_is_base_plus_one(value in 0u32..9999) {
            let (seq, dir) = next_sequence(&value.to_string()).unwrap();
            prop_assert_eq!(seq.value(), value + 1);
            prop_assert_eq!(dir.len(), 4);
            prop_assert_eq!(dir, seq.to_string());
        }

        /// Padded and unpadded spellings of the same base allocate the same
        /// number.
        #[test]
        fn padding_does_not_change_allocation(value in 0u32..9999) {
            let padded = format!("{value:04}");
            let (a, _) = next_sequence(&value.to_string()).unwrap();
            let (b, _) = next_sequence(&padded).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
