use crate::codec::StateValueCodec;

/// A [`StateValueCodec`] that uses [`serde_json`] for all values.
///
/// Records stored with this codec are flat JSON documents whose field names
/// are readable by any client of the ledger.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct JsonCodec;

impl<V> StateValueCodec<V> for JsonCodec
where
    V: serde::Serialize + for<'a> serde::Deserialize<'a>,
{
    type Error = serde_json::Error;

    fn try_encode_value(&self, value: &V) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }

    fn try_decode_value(&self, bytes: &[u8]) -> Result<V, Self::Error> {
        serde_json::from_slice(bytes)
    }
}
