//! Serialization and deserialization -related logic.

mod borsh_codec;
mod json_codec;

pub use borsh_codec::BorshCodec;
pub use json_codec::JsonCodec;

/// A trait for types that can serialize and deserialize values for storage
/// access.
pub trait StateValueCodec<V> {
    /// Error type that can arise during serialization or deserialization.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serializes a value into a bytes vector.
    ///
    /// # Determinism
    ///
    /// Equal values **MUST** be serialized to the same byte sequence, no matter
    /// where the code runs, since replayed transactions have to produce the same
    /// state.
    fn try_encode_value(&self, value: &V) -> Result<Vec<u8>, Self::Error>;

    /// Tries to deserialize a value from a bytes slice, and returns a
    /// [`Result`] with either the deserialized value or an error.
    fn try_decode_value(&self, bytes: &[u8]) -> Result<V, Self::Error>;
}
