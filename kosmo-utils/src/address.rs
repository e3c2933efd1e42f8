use anyhow::Result;
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

/// Number of trailing characters kept by [`short_address`]
pub const SHORT_ADDRESS_LEN: usize = 4;

/// Splits a bech32 address into its human readable prefix and payload bytes.
/// Bech32m checksums are rejected
pub fn decode_address(address: &str) -> Result<(String, Vec<u8>)> {
    let checked = CheckedHrpstring::new::<Bech32>(address)
        .map_err(|_| AddressConversionError::InvalidAddress)?;
    let data = checked.byte_iter().collect();
    Ok((checked.hrp().to_lowercase(), data))
}

/// Encodes payload bytes as a bech32 address with the specified prefix
pub fn encode_address(prefix: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix).map_err(|_| AddressConversionError::InvalidPrefix)?;
    let address = bech32::encode::<Bech32>(hrp, data)
        .map_err(|_| AddressConversionError::InvalidPayload)?;
    Ok(address)
}

/// Re-encodes the address under another prefix.
/// Keeps the original prefix when `prefix` is `None` or empty
pub fn convert_address_prefix(address: &str, prefix: Option<&str>) -> Result<String> {
    let (original_prefix, data) = decode_address(address)?;
    let prefix = match prefix {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => original_prefix.as_str(),
    };
    encode_address(prefix, &data)
}

/// Checks that the string can be used as a bech32 prefix
pub fn validate_prefix(prefix: &str) -> Result<()> {
    Hrp::parse(prefix).map_err(|_| AddressConversionError::InvalidPrefix)?;
    Ok(())
}

/// Last [`SHORT_ADDRESS_LEN`] characters of the address or an empty string for
/// addresses which are not longer than that
pub fn short_address(address: &str) -> String {
    let len = address.chars().count();
    if len > SHORT_ADDRESS_LEN {
        address.chars().skip(len - SHORT_ADDRESS_LEN).collect()
    } else {
        String::new()
    }
}

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum AddressConversionError {
    #[error("Invalid bech32 address")]
    InvalidAddress,
    #[error("Invalid bech32 prefix")]
    InvalidPrefix,
    #[error("Address payload can't be encoded")]
    InvalidPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "8f1e2ab4c0d37e19a6f50b3c42d8e0f9a17c6b55";

    #[test]
    fn reencodes_with_new_prefix() {
        let payload = hex::decode(PAYLOAD).unwrap();
        let cosmos = encode_address("cosmos", &payload).unwrap();
        assert!(cosmos.starts_with("cosmos1"));

        let osmo = convert_address_prefix(&cosmos, Some("osmo")).unwrap();
        assert!(osmo.starts_with("osmo1"));

        let (prefix, data) = decode_address(&osmo).unwrap();
        assert_eq!(prefix, "osmo");
        assert_eq!(data, payload);
    }

    #[test]
    fn keeps_prefix_when_not_specified() {
        let payload = hex::decode(PAYLOAD).unwrap();
        let cosmos = encode_address("cosmos", &payload).unwrap();

        assert_eq!(convert_address_prefix(&cosmos, None).unwrap(), cosmos);
        assert_eq!(convert_address_prefix(&cosmos, Some("")).unwrap(), cosmos);
    }

    #[test]
    fn rejects_malformed_addresses() {
        let err = decode_address("cosmos1abcdxyz").unwrap_err();
        assert_eq!(
            err.downcast_ref::<AddressConversionError>(),
            Some(&AddressConversionError::InvalidAddress)
        );

        assert!(validate_prefix("osmo").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(encode_address("in valid", &[0u8; 20]).is_err());
    }

    #[test]
    fn rejects_bech32m_addresses() {
        let payload = hex::decode(PAYLOAD).unwrap();
        let hrp = Hrp::parse("cosmos").unwrap();
        let address = bech32::encode::<bech32::Bech32m>(hrp, &payload).unwrap();

        let err = convert_address_prefix(&address, Some("osmo")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AddressConversionError>(),
            Some(&AddressConversionError::InvalidAddress)
        );

        let upper = encode_address("cosmos", &payload).unwrap().to_uppercase();
        let (prefix, data) = decode_address(&upper).unwrap();
        assert_eq!(prefix, "cosmos");
        assert_eq!(data, payload);
    }

    #[test]
    fn short_address_takes_last_chars() {
        assert_eq!(short_address("cosmos1abcdxyz"), "dxyz");
        assert_eq!(short_address("abcde"), "bcde");
        assert_eq!(short_address("abcd"), "");
        assert_eq!(short_address("abc"), "");
        assert_eq!(short_address(""), "");
    }
}
