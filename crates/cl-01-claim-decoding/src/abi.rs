//! # ABI String Tuples
//!
//! Reader and writer for the one layout every claim schema uses: a single
//! tuple parameter whose members are all `string`.
//!
//! ```text
//! [0x00] outer offset            = 0x20
//! [0x20] tuple head: offset[0]   = n * 32   (relative to tuple start)
//!        ...
//!        offset[n-1]
//!        tail: len[0] | utf8 bytes, right-padded to 32 | len[1] | ...
//! ```
//!
//! The reader is strict. Canonical encoders always place the first member
//! right after the head, so `offset[0] == n * 32` doubles as an arity
//! signature: a blob written for one member count never decodes as another.

use crate::errors::AbiError;

/// ABI word size in bytes.
pub const WORD: usize = 32;

/// Outer head value for a single dynamic tuple parameter.
const TUPLE_OFFSET: usize = WORD;

/// Reads a word that must hold a `usize` (offsets and lengths).
fn read_usize(buf: &[u8], at: usize) -> Result<usize, AbiError> {
    let end = at.checked_add(WORD).ok_or(AbiError::ValueOverflow { at })?;
    let word = buf.get(at..end).ok_or(AbiError::Truncated {
        needed: end,
        available: buf.len(),
    })?;

    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(AbiError::ValueOverflow { at });
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(raw)).map_err(|_| AbiError::ValueOverflow { at })
}

fn padded_len(len: usize) -> Option<usize> {
    len.checked_add(WORD - 1).map(|n| n / WORD * WORD)
}

/// Decodes a tuple of exactly `arity` strings.
pub fn decode_string_tuple(data: &[u8], arity: usize) -> Result<Vec<String>, AbiError> {
    let outer = read_usize(data, 0)?;
    if outer != TUPLE_OFFSET {
        return Err(AbiError::OuterOffset(outer));
    }

    let tuple = &data[TUPLE_OFFSET..];
    let head_len = arity * WORD;
    if tuple.len() < head_len {
        return Err(AbiError::Truncated {
            needed: TUPLE_OFFSET + head_len,
            available: data.len(),
        });
    }

    let mut members = Vec::with_capacity(arity);
    let mut prev_end = head_len;

    for index in 0..arity {
        let offset = read_usize(tuple, index * WORD)?;
        if index == 0 && offset != head_len {
            return Err(AbiError::HeadSize {
                expected: head_len,
                actual: offset,
            });
        }
        if offset % WORD != 0 {
            return Err(AbiError::Misaligned { index, offset });
        }
        if offset < prev_end {
            return Err(AbiError::Overlapping { index, offset });
        }

        let len = read_usize(tuple, offset)?;
        let start = offset + WORD;
        let end = padded_len(len)
            .and_then(|padded| start.checked_add(padded))
            .ok_or(AbiError::ValueOverflow {
                at: TUPLE_OFFSET + offset,
            })?;
        if end > tuple.len() {
            return Err(AbiError::Truncated {
                needed: TUPLE_OFFSET + end,
                available: data.len(),
            });
        }

        let text = std::str::from_utf8(&tuple[start..start + len])
            .map_err(|_| AbiError::InvalidUtf8 { index })?;
        members.push(text.to_owned());
        prev_end = end;
    }

    Ok(members)
}

/// Encodes strings as a single tuple parameter, canonically.
#[must_use]
pub fn encode_string_tuple<S: AsRef<str>>(members: &[S]) -> Vec<u8> {
    let head_len = members.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for member in members {
        let bytes = member.as_ref().as_bytes();
        head.extend_from_slice(&usize_word(head_len + tail.len()));
        tail.extend_from_slice(&usize_word(bytes.len()));
        tail.extend_from_slice(bytes);
        tail.resize(tail.len() + (WORD - bytes.len() % WORD) % WORD, 0);
    }

    let mut out = Vec::with_capacity(WORD + head.len() + tail.len());
    out.extend_from_slice(&usize_word(TUPLE_OFFSET));
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    out
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}
