//! OSC address construction and validation

use crate::error::{BindError, Result};

/// Characters with pattern meaning in OSC address matching
const RESERVED_CHARS: &[char] = &['#', '*', ',', '?', '[', ']', '{', '}'];

/// Join segments into a canonical absolute OSC address
///
/// Each segment has its leading and trailing `/` stripped; segments that end
/// up empty are dropped. The result always starts with a single `/`.
///
/// ```
/// use field_osc::create_address;
/// assert_eq!(create_address(["/config/", "age"]), "/config/age");
/// ```
pub fn create_address<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = segments
        .into_iter()
        .filter_map(|segment| {
            let trimmed = segment.as_ref().trim_matches('/');
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join("/");

    format!("/{}", joined)
}

/// Check an address against the OSC address grammar used for endpoints
pub fn validate_address(address: &str) -> Result<()> {
    if !address.starts_with('/') {
        return Err(BindError::invalid_address(address, "must start with '/'"));
    }
    if address.len() == 1 {
        return Err(BindError::invalid_address(address, "has no segments"));
    }
    if address.ends_with('/') {
        return Err(BindError::invalid_address(address, "must not end with '/'"));
    }
    if address[1..].split('/').any(str::is_empty) {
        return Err(BindError::invalid_address(address, "contains an empty segment"));
    }
    if let Some(c) = address
        .chars()
        .find(|c| !c.is_ascii() || c.is_ascii_whitespace() || c.is_ascii_control())
    {
        return Err(BindError::invalid_address(
            address,
            format!("contains invalid character {:?}", c),
        ));
    }
    if let Some(c) = address.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(BindError::invalid_address(
            address,
            format!("contains reserved pattern character '{}'", c),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_address_joins_route_and_field() {
        assert_eq!(create_address(["/config", "age"]), "/config/age");
        assert_eq!(create_address(["config/", "/age/"]), "/config/age");
        assert_eq!(create_address(["/a/b/", "c"]), "/a/b/c");
    }

    #[test]
    fn test_create_address_single_segment() {
        assert_eq!(create_address(["/volume"]), "/volume");
        assert_eq!(create_address(["volume"]), "/volume");
    }

    #[test]
    fn test_create_address_drops_empty_segments() {
        assert_eq!(create_address(["/", "age"]), "/age");
        assert_eq!(create_address(["", "//", "x"]), "/x");
        assert_eq!(create_address(Vec::<&str>::new()), "/");
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("/config/age").is_ok());
        assert!(validate_address("/a_b-c.1").is_ok());

        for bad in ["", "/", "config", "/config/", "/a//b", "/a b", "/a*", "/x{y}", "/ä"] {
            assert!(
                matches!(validate_address(bad), Err(BindError::InvalidAddress { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_created_addresses_are_canonical(segments in prop::collection::vec("/?[a-z0-9]{0,6}/?", 0..6)) {
            let address = create_address(&segments);

            prop_assert!(address.starts_with('/'));
            if address != "/" {
                prop_assert!(!address.starts_with("//"));
                prop_assert!(!address.ends_with('/'));
                prop_assert!(address[1..].split('/').all(|s| !s.is_empty()));
            }
        }

        #[test]
        fn prop_created_addresses_validate(segments in prop::collection::vec("[a-z]{1,6}", 1..5)) {
            let address = create_address(&segments);
            prop_assert!(validate_address(&address).is_ok());
            prop_assert_eq!(address, format!("/{}", segments.join("/")));
        }
    }
}
