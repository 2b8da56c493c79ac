// crates/wordlink-core/src/codec.rs
//
// Binary decoding for the two on-the-wire vector formats:
//
//   - packed IEEE-754 half precision, little-endian, `dims * 2` bytes per
//     word (the sharded format);
//   - the per-word record: `u32` LE element count followed by that many
//     `f32` LE values.

use crate::error::WordlinkError;

/// Widen an IEEE-754 half-precision bit pattern to `f32`.
///
/// Bit-exact for every input: infinities and NaNs keep their payload,
/// subnormals are renormalized into the wider exponent range.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) & 0x1) as u32;
    let mut exponent = ((bits >> 10) & 0x1f) as i32;
    let mut mantissa = (bits & 0x3ff) as u32;

    if exponent == 0x1f {
        // Infinity or NaN.
        exponent = 0xff;
    } else if exponent == 0 {
        if mantissa != 0 {
            // Subnormal: shift until the implicit leading bit appears.
            while mantissa & 0x400 == 0 {
                mantissa <<= 1;
                exponent -= 1;
            }
            mantissa &= 0x3ff;
            exponent += 1;
            exponent += 127 - 15;
        }
        // Signed zero keeps a zero exponent.
    } else {
        exponent += 127 - 15;
    }

    let bits32 = (sign << 31) | ((exponent as u32) << 23) | (mantissa << 13);
    f32::from_bits(bits32)
}

/// Decode a packed little-endian half-precision batch of `dims` values.
pub fn decode_f16_le(bytes: &[u8], dims: usize) -> Result<Vec<f32>, WordlinkError> {
    if bytes.len() != dims * 2 {
        return Err(WordlinkError::MalformedData(format!(
            "expected {} bytes of f16 data, got {}",
            dims * 2,
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f16_to_f32(u16::from_le_bytes([pair[0], pair[1]])))
        .collect())
}

/// Decode a per-word vector record.
///
/// The 4-byte length prefix must agree with both the payload size and the
/// expected dimensionality.
pub fn decode_vector_record(bytes: &[u8], dims: usize) -> Result<Vec<f32>, WordlinkError> {
    if bytes.len() < 4 {
        return Err(WordlinkError::MalformedData(format!(
            "vector record too short: {} bytes",
            bytes.len()
        )));
    }

    let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let body = &bytes[4..];

    if body.len() != count * 4 {
        return Err(WordlinkError::MalformedData(format!(
            "vector record declares {} floats but carries {} bytes",
            count,
            body.len()
        )));
    }
    if count != dims {
        return Err(WordlinkError::MalformedData(format!(
            "vector record has {} dimensions, expected {}",
            count, dims
        )));
    }

    Ok(body
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Encode values in the per-word record layout.
pub fn encode_vector_record(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + values.len() * 4);
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}
