//! Invite code format rules.
//!
//! Codes are six ASCII alphanumerics, stored and compared in upper case.
//! The Directory is the only authority on whether a well-formed code actually
//! exists; this module covers format only.

/// Fixed invite code length.
pub const INVITE_CODE_LEN: usize = 6;

/// Normalize a referral code: trim surrounding whitespace and upper-case.
/// Length is left as supplied; `is_well_formed` judges it.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize typed invite input the way the entry field accepts it:
/// `normalize`, then cut to the fixed length as the field does while the
/// user types.
pub fn normalize_draft(raw: &str) -> String {
    normalize(raw).chars().take(INVITE_CODE_LEN).collect()
}

/// Whether a (normalized) code is syntactically a valid invite code.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == INVITE_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize("  ab12cd "), "AB12CD");
    }

    #[test]
    fn test_normalize_keeps_over_length_codes_intact() {
        assert_eq!(normalize("golden7"), "GOLDEN7");
        assert!(!is_well_formed(&normalize("golden7")));
    }

    #[test]
    fn test_draft_input_is_cut_to_field_length() {
        assert_eq!(normalize_draft("abcdef1234"), "ABCDEF");
        assert_eq!(normalize_draft("  ab12cd "), "AB12CD");
    }

    #[test]
    fn test_well_formed_accepts_six_alphanumerics() {
        assert!(is_well_formed("F0M0AB"));
        assert!(is_well_formed("123456"));
    }

    #[test]
    fn test_well_formed_rejects_bad_lengths_and_symbols() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("ABC12"));
        assert!(!is_well_formed("ABC123X"));
        assert!(!is_well_formed("AB-12C"));
    }
}
