use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueFormat, PgValueRef},
    Decode, Encode, Postgres, Type,
};

/// Fixed-size byte array compatible with sqlx's Postgres `bytea` encoding,
/// used to store a [`domain::Address`]'s 32 raw bytes without re-deriving a
/// chain-specific column type.
#[derive(Clone, Copy, Debug)]
pub struct ByteArray<const N: usize>(pub [u8; N]);

impl ByteArray<32> {
    pub fn from_address(address: domain::Address) -> Self {
        Self(address.0)
    }

    pub fn into_address(self) -> domain::Address {
        domain::Address(self.0)
    }
}

impl<const N: usize> Type<Postgres> for ByteArray<N> {
    fn type_info() -> PgTypeInfo {
        <[u8] as Type<Postgres>>::type_info()
    }
}

impl<const N: usize> PgHasArrayType for ByteArray<N> {
    fn array_type_info() -> PgTypeInfo {
        <[&[u8]] as Type<Postgres>>::type_info()
    }
}

impl<const N: usize> Decode<'_, Postgres> for ByteArray<N> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        let mut bytes = [0u8; N];
        match value.format() {
            PgValueFormat::Binary => {
                bytes = value.as_bytes()?.try_into()?;
            }
            PgValueFormat::Text => {
                let text = value
                    .as_bytes()?
                    .strip_prefix(b"\\x")
                    .ok_or("text does not start with \\x")?;
                hex::decode_to_slice(text, &mut bytes)?
            }
        };
        Ok(Self(bytes))
    }
}

impl<const N: usize> Encode<'_, Postgres> for ByteArray<N> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&[u8] as Encode<Postgres>>::encode(&self.0, buf)
    }
}
