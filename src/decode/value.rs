use alloy_primitives::{Address, I256, U256};

use crate::models::errors::DecodeError;

/// Width of one encoding slot in bytes.
pub const WORD: usize = 32;

/// Closed grammar of decodable parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Bool,
    /// Unsigned integer with declared bit width (8..=256, multiple of 8).
    Uint(usize),
    /// Signed two's-complement integer with declared bit width.
    Int(usize),
    Address,
    /// Fixed-size byte string, 1..=32 bytes.
    FixedBytes(usize),
    Bytes,
    String,
    FixedArray(Box<AbiType>, usize),
    Array(Box<AbiType>),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Dynamic types are referenced from the head region by offset and live
    /// in the trailing tail region.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(members) => members.iter().any(|m| m.is_dynamic()),
            _ => false,
        }
    }

    /// Number of 32-byte head slots this type occupies in its enclosing
    /// region: one per static scalar, one for the offset of a dynamic member.
    pub fn head_words(&self) -> usize {
        if self.is_dynamic() {
            return 1;
        }
        match self {
            AbiType::FixedArray(inner, len) => inner.head_words() * len,
            AbiType::Tuple(members) => members.iter().map(|m| m.head_words()).sum(),
            _ => 1,
        }
    }

    /// Canonical type name as it appears in a canonical signature string.
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Bool => "bool".to_owned(),
            AbiType::Uint(bits) => format!("uint{bits}"),
            AbiType::Int(bits) => format!("int{bits}"),
            AbiType::Address => "address".to_owned(),
            AbiType::FixedBytes(size) => format!("bytes{size}"),
            AbiType::Bytes => "bytes".to_owned(),
            AbiType::String => "string".to_owned(),
            AbiType::FixedArray(inner, len) => format!("{}[{len}]", inner.canonical()),
            AbiType::Array(inner) => format!("{}[]", inner.canonical()),
            AbiType::Tuple(members) => {
                let members = members
                    .iter()
                    .map(|m| m.canonical())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({members})")
            }
        }
    }
}

/// One decoded value. Recursive by construction; integers keep their full
/// 256-bit precision regardless of the declared width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedSolValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<DecodedSolValue>),
    Tuple(Vec<DecodedSolValue>),
}

impl DecodedSolValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedSolValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            DecodedSolValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            DecodedSolValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            DecodedSolValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedSolValue::FixedBytes(b) | DecodedSolValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedSolValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&[DecodedSolValue]> {
        match self {
            DecodedSolValue::Array(v) | DecodedSolValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Re-render every address in the value tree as an EIP-55 checksummed
    /// string. Used when the decoder-level checksum flag is enabled.
    pub(crate) fn into_checksummed(self) -> Self {
        match self {
            DecodedSolValue::Address(addr) => DecodedSolValue::String(addr.to_checksum(None)),
            DecodedSolValue::Array(vals) => DecodedSolValue::Array(
                vals.into_iter().map(|v| v.into_checksummed()).collect(),
            ),
            DecodedSolValue::Tuple(vals) => DecodedSolValue::Tuple(
                vals.into_iter().map(|v| v.into_checksummed()).collect(),
            ),
            other => other,
        }
    }
}

/// Decode an ordered tuple of types laid out at the start of `region`.
/// This is the entry point for event data payloads and call inputs.
pub(crate) fn decode_tuple(
    types: &[AbiType],
    region: &[u8],
) -> Result<Vec<DecodedSolValue>, DecodeError> {
    let mut cursor = 0;
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        out.push(decode_head(ty, region, cursor)?);
        cursor += ty.head_words() * WORD;
    }
    Ok(out)
}

/// Decode one value whose head slot sits at `offset` within `region`.
/// Static values are read in place; dynamic values follow the offset word
/// into the tail region. Offsets are relative to the start of `region`.
pub(crate) fn decode_head(
    ty: &AbiType,
    region: &[u8],
    offset: usize,
) -> Result<DecodedSolValue, DecodeError> {
    if !ty.is_dynamic() {
        return decode_static(ty, region, offset);
    }

    let tail_offset = read_word_as_len(region, offset)?;
    if tail_offset > region.len() {
        return Err(DecodeError::OffsetOutOfBounds {
            offset: tail_offset,
            len: region.len(),
        });
    }
    decode_tail(ty, &region[tail_offset..])
}

fn decode_static(
    ty: &AbiType,
    region: &[u8],
    offset: usize,
) -> Result<DecodedSolValue, DecodeError> {
    match ty {
        AbiType::Bool => {
            let w = word(region, offset)?;
            Ok(DecodedSolValue::Bool(w.iter().any(|&b| b != 0)))
        }
        AbiType::Uint(bits) => {
            let w = word(region, offset)?;
            Ok(DecodedSolValue::Uint(decode_uint(&w, *bits)))
        }
        AbiType::Int(bits) => {
            let w = word(region, offset)?;
            Ok(DecodedSolValue::Int(decode_int(&w, *bits)))
        }
        AbiType::Address => {
            let w = word(region, offset)?;
            Ok(DecodedSolValue::Address(Address::from_slice(&w[12..])))
        }
        AbiType::FixedBytes(size) => {
            let w = word(region, offset)?;
            Ok(DecodedSolValue::FixedBytes(w[..*size].to_vec()))
        }
        AbiType::FixedArray(inner, len) => {
            let stride = inner.head_words() * WORD;
            let mut vals = Vec::with_capacity(*len);
            for i in 0..*len {
                vals.push(decode_head(inner, region, offset + i * stride)?);
            }
            Ok(DecodedSolValue::Array(vals))
        }
        AbiType::Tuple(members) => {
            let mut cursor = offset;
            let mut vals = Vec::with_capacity(members.len());
            for member in members {
                vals.push(decode_head(member, region, cursor)?);
                cursor += member.head_words() * WORD;
            }
            Ok(DecodedSolValue::Tuple(vals))
        }
        // Dynamic variants never reach here, decode_head routes them to the tail.
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => unreachable!(),
    }
}

/// Decode a dynamic value whose encoding starts at the beginning of `tail`.
fn decode_tail(ty: &AbiType, tail: &[u8]) -> Result<DecodedSolValue, DecodeError> {
    match ty {
        AbiType::Bytes => Ok(DecodedSolValue::Bytes(length_prefixed(tail)?.to_vec())),
        AbiType::String => {
            let bytes = length_prefixed(tail)?;
            Ok(DecodedSolValue::String(
                String::from_utf8_lossy(bytes).into_owned(),
            ))
        }
        AbiType::Array(inner) => {
            let len = read_word_as_len(tail, 0)?;
            let elements = tail.get(WORD..).unwrap_or(&[]);
            let stride = inner.head_words() * WORD;
            let mut vals = Vec::with_capacity(len.min(elements.len() / WORD + 1));
            for i in 0..len {
                vals.push(decode_head(inner, elements, i * stride)?);
            }
            Ok(DecodedSolValue::Array(vals))
        }
        AbiType::FixedArray(inner, len) => {
            let stride = inner.head_words() * WORD;
            let mut vals = Vec::with_capacity(*len);
            for i in 0..*len {
                vals.push(decode_head(inner, tail, i * stride)?);
            }
            Ok(DecodedSolValue::Array(vals))
        }
        AbiType::Tuple(members) => {
            let mut cursor = 0;
            let mut vals = Vec::with_capacity(members.len());
            for member in members {
                vals.push(decode_head(member, tail, cursor)?);
                cursor += member.head_words() * WORD;
            }
            Ok(DecodedSolValue::Tuple(vals))
        }
        _ => unreachable!(),
    }
}

/// Truncate the word to the declared width. High bits beyond the declared
/// width are discarded rather than rejected.
fn decode_uint(word: &[u8; WORD], bits: usize) -> U256 {
    let raw = U256::from_be_bytes(*word);
    if bits >= 256 {
        return raw;
    }
    raw & mask(bits)
}

/// Interpret the word as a two's-complement value of the declared width and
/// sign-extend to the full 256 bits. An all-ones word declared `int24`
/// decodes to -1, never to a wrapped unsigned value.
fn decode_int(word: &[u8; WORD], bits: usize) -> I256 {
    let raw = U256::from_be_bytes(*word);
    if bits >= 256 {
        return I256::from_raw(raw);
    }
    let truncated = raw & mask(bits);
    let sign_bit = U256::from(1u8) << (bits - 1);
    if truncated & sign_bit != U256::ZERO {
        I256::from_raw(truncated | (U256::MAX << bits))
    } else {
        I256::from_raw(truncated)
    }
}

fn mask(bits: usize) -> U256 {
    (U256::from(1u8) << bits) - U256::from(1u8)
}

fn word(region: &[u8], offset: usize) -> Result<[u8; WORD], DecodeError> {
    let end = offset.checked_add(WORD).ok_or(DecodeError::Truncated {
        need: WORD,
        offset,
        len: region.len(),
    })?;
    match region.get(offset..end) {
        Some(slice) => {
            let mut out = [0u8; WORD];
            out.copy_from_slice(slice);
            Ok(out)
        }
        None => Err(DecodeError::Truncated {
            need: WORD,
            offset,
            len: region.len(),
        }),
    }
}

/// Read a word and require it to fit a usize (offsets and length prefixes).
fn read_word_as_len(region: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let w = word(region, offset)?;
    let value = U256::from_be_bytes(w);
    usize::try_from(value).map_err(|_| DecodeError::OffsetOutOfBounds {
        offset: usize::MAX,
        len: region.len(),
    })
}

/// Slice the content of a length-prefixed tail encoding.
fn length_prefixed(tail: &[u8]) -> Result<&[u8], DecodeError> {
    let len = read_word_as_len(tail, 0)?;
    let content = tail.get(WORD..).unwrap_or(&[]);
    content.get(..len).ok_or(DecodeError::LengthOutOfBounds {
        declared: len,
        remaining: content.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Build one 32-byte word, left-padded with zeros.
    fn pad(bytes: &[u8]) -> Vec<u8> {
        let mut w = vec![0u8; WORD - bytes.len()];
        w.extend_from_slice(bytes);
        w
    }

    // Build one 32-byte word, right-padded with zeros (bytes/string content).
    fn pad_right(bytes: &[u8]) -> Vec<u8> {
        let mut w = bytes.to_vec();
        w.resize(WORD, 0);
        w
    }

    fn uint_word(v: u64) -> Vec<u8> {
        pad(&v.to_be_bytes())
    }

    fn concat(words: &[Vec<u8>]) -> Vec<u8> {
        words.iter().flatten().copied().collect()
    }

    #[test]
    fn uint_boundaries() {
        let max = [0xffu8; WORD];
        let decoded = decode_head(&AbiType::Uint(256), &max, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Uint(U256::MAX));

        // Declared width truncates, an all-ones word as uint8 is 255.
        let decoded = decode_head(&AbiType::Uint(8), &max, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Uint(U256::from(255u8)));

        let zero = [0u8; WORD];
        let decoded = decode_head(&AbiType::Uint(256), &zero, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Uint(U256::ZERO));
    }

    #[test]
    fn int24_all_ones_is_minus_one() {
        let word = [0xffu8; WORD];
        let decoded = decode_head(&AbiType::Int(24), &word, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Int(I256::MINUS_ONE));
    }

    #[test]
    fn int_boundaries() {
        // int24 minimum: 0x800000 sign-extended.
        let word = pad(&[0x80, 0x00, 0x00]);
        let decoded = decode_head(&AbiType::Int(24), &word, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Int(I256::try_from(-(1i64 << 23)).unwrap())
        );

        // int24 maximum: 0x7fffff.
        let word = pad(&[0x7f, 0xff, 0xff]);
        let decoded = decode_head(&AbiType::Int(24), &word, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Int(I256::try_from((1i64 << 23) - 1).unwrap())
        );

        // int256 minimum.
        let mut word = [0u8; WORD];
        word[0] = 0x80;
        let decoded = decode_head(&AbiType::Int(256), &word, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Int(I256::MIN));
    }

    #[test]
    fn bool_is_permissive() {
        assert_eq!(
            decode_head(&AbiType::Bool, &uint_word(0), 0).unwrap(),
            DecodedSolValue::Bool(false)
        );
        assert_eq!(
            decode_head(&AbiType::Bool, &uint_word(1), 0).unwrap(),
            DecodedSolValue::Bool(true)
        );
        // Any nonzero word is true.
        assert_eq!(
            decode_head(&AbiType::Bool, &uint_word(42), 0).unwrap(),
            DecodedSolValue::Bool(true)
        );
    }

    #[test]
    fn address_takes_low_twenty_bytes() {
        let addr = [0x11u8; 20];
        let word = pad(&addr);
        let decoded = decode_head(&AbiType::Address, &word, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Address(Address::from(addr)));
    }

    #[test]
    fn fixed_bytes_take_leading_bytes() {
        let word = pad_right(&[0xde, 0xad, 0xbe, 0xef]);
        let decoded = decode_head(&AbiType::FixedBytes(4), &word, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef])
        );
    }

    #[test]
    fn dynamic_bytes_and_string() {
        // Head: offset 0x20. Tail: length 5, content "hello".
        let region = concat(&[uint_word(0x20), uint_word(5), pad_right(b"hello")]);

        let decoded = decode_head(&AbiType::Bytes, &region, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Bytes(b"hello".to_vec()));

        let decoded = decode_head(&AbiType::String, &region, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::String("hello".to_owned()));
    }

    #[test]
    fn zero_length_dynamic_array() {
        let region = concat(&[uint_word(0x20), uint_word(0)]);
        let ty = AbiType::Array(Box::new(AbiType::Uint(256)));
        let decoded = decode_head(&ty, &region, 0).unwrap();
        assert_eq!(decoded, DecodedSolValue::Array(Vec::new()));
    }

    #[test]
    fn array_of_uints() {
        let region = concat(&[
            uint_word(0x20),
            uint_word(3),
            uint_word(7),
            uint_word(8),
            uint_word(9),
        ]);
        let ty = AbiType::Array(Box::new(AbiType::Uint(256)));
        let decoded = decode_head(&ty, &region, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Array(vec![
                DecodedSolValue::Uint(U256::from(7u8)),
                DecodedSolValue::Uint(U256::from(8u8)),
                DecodedSolValue::Uint(U256::from(9u8)),
            ])
        );
    }

    #[test]
    fn static_fixed_array_is_inline() {
        let region = concat(&[uint_word(7), uint_word(8)]);
        let ty = AbiType::FixedArray(Box::new(AbiType::Uint(256)), 2);
        assert_eq!(ty.head_words(), 2);
        let decoded = decode_head(&ty, &region, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Array(vec![
                DecodedSolValue::Uint(U256::from(7u8)),
                DecodedSolValue::Uint(U256::from(8u8)),
            ])
        );
    }

    #[test]
    fn tuple_with_dynamic_member() {
        // (uint256, bytes) laid out as a top-level region: head is value then
        // offset, tail holds the bytes.
        let region = concat(&[
            uint_word(99),
            uint_word(0x40),
            uint_word(2),
            pad_right(&[0xab, 0xcd]),
        ]);
        let decoded = decode_tuple(&[AbiType::Uint(256), AbiType::Bytes], &region).unwrap();
        assert_eq!(
            decoded,
            vec![
                DecodedSolValue::Uint(U256::from(99u8)),
                DecodedSolValue::Bytes(vec![0xab, 0xcd]),
            ]
        );
    }

    #[test]
    fn nested_dynamic_tuple_follows_offset_word() {
        // The same tuple one level down: its head slot is an offset into the
        // enclosing region, and member offsets are relative to the tuple's
        // own encoding.
        let region = concat(&[
            uint_word(0x20),
            uint_word(99),
            uint_word(0x40),
            uint_word(2),
            pad_right(&[0xab, 0xcd]),
        ]);
        let ty = AbiType::Tuple(vec![AbiType::Uint(256), AbiType::Bytes]);
        let decoded = decode_head(&ty, &region, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Tuple(vec![
                DecodedSolValue::Uint(U256::from(99u8)),
                DecodedSolValue::Bytes(vec![0xab, 0xcd]),
            ])
        );
    }

    #[test]
    fn array_of_strings() {
        // string[]: element offsets are relative to the element region.
        let region = concat(&[
            uint_word(0x20), // offset of the array encoding
            uint_word(2),    // length
            uint_word(0x40), // offset of "ab" within the element region
            uint_word(0x80), // offset of "cde"
            uint_word(2),
            pad_right(b"ab"),
            uint_word(3),
            pad_right(b"cde"),
        ]);
        let ty = AbiType::Array(Box::new(AbiType::String));
        let decoded = decode_head(&ty, &region, 0).unwrap();
        assert_eq!(
            decoded,
            DecodedSolValue::Array(vec![
                DecodedSolValue::String("ab".to_owned()),
                DecodedSolValue::String("cde".to_owned()),
            ])
        );
    }

    #[test]
    fn truncated_buffer_fails() {
        let short = vec![0u8; 16];
        let err = decode_head(&AbiType::Uint(256), &short, 0).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn offset_out_of_bounds_fails() {
        let region = uint_word(0x1000);
        let err = decode_head(&AbiType::Bytes, &region, 0).unwrap_err();
        assert!(matches!(err, DecodeError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn length_prefix_out_of_bounds_fails() {
        // Claims 64 bytes of content but only one word follows.
        let region = concat(&[uint_word(0x20), uint_word(64), uint_word(0)]);
        let err = decode_head(&AbiType::Bytes, &region, 0).unwrap_err();
        assert!(matches!(err, DecodeError::LengthOutOfBounds { .. }));
    }

    #[test]
    fn failure_in_one_tuple_member_fails_only_that_decode() {
        // First member is fine, second member's offset is broken. The tuple
        // decode fails, but decoding the first member alone still works.
        let region = concat(&[uint_word(1), uint_word(0x1000)]);
        let types = [AbiType::Uint(256), AbiType::Bytes];
        assert!(decode_tuple(&types, &region).is_err());
        assert_eq!(
            decode_head(&types[0], &region, 0).unwrap(),
            DecodedSolValue::Uint(U256::from(1u8))
        );
    }

    #[test]
    fn canonical_names() {
        let ty = AbiType::Array(Box::new(AbiType::Tuple(vec![
            AbiType::Address,
            AbiType::Uint(256),
        ])));
        assert_eq!(ty.canonical(), "(address,uint256)[]");
        assert_eq!(AbiType::FixedBytes(32).canonical(), "bytes32");
        assert_eq!(
            AbiType::FixedArray(Box::new(AbiType::Int(24)), 3).canonical(),
            "int24[3]"
        );
    }

    #[test]
    fn dynamicness_and_head_widths() {
        let static_tuple = AbiType::Tuple(vec![AbiType::Uint(8), AbiType::Bool]);
        assert!(!static_tuple.is_dynamic());
        assert_eq!(static_tuple.head_words(), 2);

        let dynamic_tuple = AbiType::Tuple(vec![AbiType::Uint(8), AbiType::Bytes]);
        assert!(dynamic_tuple.is_dynamic());
        assert_eq!(dynamic_tuple.head_words(), 1);

        let nested = AbiType::FixedArray(Box::new(static_tuple), 3);
        assert!(!nested.is_dynamic());
        assert_eq!(nested.head_words(), 6);
    }
}
