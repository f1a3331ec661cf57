//! Regex-based address shape check.
//!
//! Deliberately not an RFC 5322 validator: the pipeline only needs to know
//! that the string splits into a local part and a dotted domain before any
//! network access happens.

use std::sync::OnceLock;

use regex::Regex;

/// One `@`, non-whitespace local part, non-whitespace domain with at least one dot.
const ADDRESS_SHAPE: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn address_regex() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(ADDRESS_SHAPE).expect("address shape pattern compiles"))
}

/// Returns `true` when `address` has the `local@domain.tld` shape.
///
/// Pure and total: no I/O, no failure mode beyond returning `false`.
pub fn is_well_formed(address: &str) -> bool {
    address_regex().is_match(address)
}

/// Splits `address` into `(local, domain)`.
///
/// Returns `None` when the address does not pass [`is_well_formed`]. The
/// character classes in the pattern guarantee a single `@`.
pub fn split_address(address: &str) -> Option<(&str, &str)> {
    if !is_well_formed(address) {
        return None;
    }
    address.split_once('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        assert!(is_well_formed("alice@example.com"));
    }

    #[test]
    fn rejects_missing_at() {
        assert!(!is_well_formed("alice.example.com"));
    }

    #[test]
    fn rejects_second_at() {
        assert!(!is_well_formed("alice@b@example.com"));
    }

    #[test]
    fn rejects_whitespace() {
        assert!(!is_well_formed("al ice@example.com"));
        assert!(!is_well_formed("alice@exa mple.com"));
        assert!(!is_well_formed(" alice@example.com"));
    }

    #[test]
    fn rejects_dotless_domain() {
        assert!(!is_well_formed("alice@localhost"));
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(!is_well_formed("@example.com"));
        assert!(!is_well_formed("alice@"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn split_returns_local_and_domain() {
        assert_eq!(
            split_address("alice@example.com"),
            Some(("alice", "example.com"))
        );
    }

    #[test]
    fn split_rejects_malformed() {
        assert_eq!(split_address("alice"), None);
        assert_eq!(split_address("alice@localhost"), None);
    }

    proptest! {
        #[test]
        fn alnum_addresses_pass(
            local in "[a-z0-9]{1,16}",
            host in "[a-z0-9]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let addr = format!("{}@{}.{}", local, host, tld);
            prop_assert!(is_well_formed(&addr));
        }

        #[test]
        fn strings_without_at_never_pass(s in "[^@]*") {
            prop_assert!(!is_well_formed(&s));
        }
    }
}
