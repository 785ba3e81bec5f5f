use std::{fmt, str::FromStr};

/// A 32-byte on-chain account address (mint, pool, wallet, ...).
///
/// Printed and parsed as base58, matching the wire format of the chains this
/// system targets. The type itself is chain-agnostic: callers decide what an
/// address identifies.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),
    #[error("decoded address has {0} bytes, expected 32")]
    WrongLength(usize),
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec()?;
        let bytes: [u8; 32] = bytes
            .clone()
            .try_into()
            .map_err(|_| AddressError::WrongLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_base58() {
        let addr = Address([7u8; 32]);
        let printed = addr.to_string();
        let parsed: Address = printed.parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn rejects_wrong_length() {
        let short = bs58::encode([1u8; 10]).into_string();
        assert!(matches!(
            short.parse::<Address>(),
            Err(AddressError::WrongLength(10))
        ));
    }
}
