use hashlog_types::{Triple, DIGEST_CAPACITY, MAX_DIGEST_LENGTH, MAX_FUNCTION_CODE};
use unsigned_varint::{decode, encode};

use crate::error::{CodecError, CodecResult};

/// Stateless converter between multihash text and [`Triple`].
///
/// Round-trip law: `decode(&encode(x)?)? == x` for every multihash `x`
/// whose code fits in one byte and whose digest is 1 to
/// [`DIGEST_CAPACITY`] bytes long.
pub struct MultihashCodec;

impl MultihashCodec {
    /// Parse base58 multihash text into a triple.
    pub fn encode(text: &str) -> CodecResult<Triple> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| CodecError::MalformedInput(format!("invalid base58: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Render a triple back into base58 multihash text.
    pub fn decode(triple: &Triple) -> CodecResult<String> {
        let bytes = Self::to_bytes(triple)?;
        Ok(bs58::encode(bytes).into_string())
    }

    /// Parse a raw varint-framed multihash.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Triple> {
        let (hash_function, rest) = read_field(bytes, "hash function code", MAX_FUNCTION_CODE)?;
        let (size, digest) = read_field(rest, "digest length", MAX_DIGEST_LENGTH)?;

        if size as usize != digest.len() {
            return Err(CodecError::MalformedInput(format!(
                "declared digest length {size} but {} bytes follow",
                digest.len()
            )));
        }
        if digest.is_empty() {
            return Err(CodecError::MalformedInput("empty digest".into()));
        }
        if digest.len() > DIGEST_CAPACITY {
            return Err(CodecError::DigestTooLarge {
                size: digest.len(),
                capacity: DIGEST_CAPACITY,
            });
        }

        let mut block = [0u8; DIGEST_CAPACITY];
        block[..digest.len()].copy_from_slice(digest);
        Ok(Triple::new(block, hash_function, size))
    }

    /// Rebuild the raw varint-framed multihash for a triple.
    ///
    /// Padding bytes past `size` are ignored.
    pub fn to_bytes(triple: &Triple) -> CodecResult<Vec<u8>> {
        if triple.is_sentinel() {
            return Err(CodecError::InvalidTriple(
                "sentinel triple carries no multihash".into(),
            ));
        }
        if triple.size == 0 {
            return Err(CodecError::InvalidTriple(format!(
                "zero size with hash function 0x{:02x}",
                triple.hash_function
            )));
        }
        let digest = triple.digest_bytes().ok_or_else(|| {
            CodecError::InvalidTriple(format!(
                "size {} exceeds the {DIGEST_CAPACITY}-byte digest block",
                triple.size
            ))
        })?;

        let mut code_buf = encode::u8_buffer();
        let mut size_buf = encode::u8_buffer();
        let code = encode::u8(triple.hash_function, &mut code_buf);
        let size = encode::u8(triple.size, &mut size_buf);

        let mut out = Vec::with_capacity(code.len() + size.len() + digest.len());
        out.extend_from_slice(code);
        out.extend_from_slice(size);
        out.extend_from_slice(digest);
        Ok(out)
    }
}

/// Read one canonical varint that must not exceed `max` (at most `u8::MAX`).
fn read_field<'a>(input: &'a [u8], field: &str, max: u64) -> CodecResult<(u8, &'a [u8])> {
    let (value, rest) = decode::u64(input)
        .map_err(|e| CodecError::MalformedInput(format!("{field}: {e}")))?;
    if value > max {
        return Err(CodecError::MalformedInput(format!(
            "{field} {value} does not fit in one byte"
        )));
    }
    Ok((value as u8, rest))
}
