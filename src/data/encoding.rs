use super::{DataError, Result};
use encoding_rs::{Encoding, EUC_KR};
use tracing::debug;

pub const DEFAULT_ENCODINGS: [&str; 3] = ["utf-8", "cp949", "euc-kr"];

/// Resolves a label to an encoding. `cp949` is accepted as an alias of the
/// WHATWG `euc-kr` encoding, which is the Windows code page 949 superset.
pub fn resolve_label(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    if trimmed.eq_ignore_ascii_case("cp949") || trimmed.eq_ignore_ascii_case("ms949") {
        return Ok(EUC_KR);
    }
    Encoding::for_label(trimmed.as_bytes())
        .ok_or_else(|| DataError::UnknownEncoding(label.to_string()))
}

/// Decodes `bytes` with the first candidate that yields no malformed sequences.
///
/// A byte-order mark is stripped and its encoding tried first, but only when
/// that encoding is one of the candidates.
pub fn decode<S: AsRef<str>>(bytes: &[u8], candidates: &[S]) -> Result<(String, &'static str)> {
    let encodings = candidates
        .iter()
        .map(|label| resolve_label(label.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let bom = Encoding::for_bom(bytes).filter(|(encoding, _)| encodings.contains(encoding));
    if let Some((encoding, bom_len)) = bom {
        match encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..]) {
            Some(text) => {
                debug!(encoding = encoding.name(), "decoded input after byte-order mark");
                return Ok((text.into_owned(), encoding.name()));
            }
            None => debug!(encoding = encoding.name(), "byte-order mark encoding rejected input"),
        }
    }

    for (label, encoding) in candidates.iter().zip(encodings.iter().copied()) {
        if bom.map_or(false, |(tried, _)| tried == encoding) {
            continue;
        }
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => {
                debug!(label = label.as_ref(), encoding = encoding.name(), "decoded input");
                return Ok((text.into_owned(), encoding.name()));
            }
            None => debug!(label = label.as_ref(), "candidate encoding rejected input"),
        }
    }

    Err(DataError::Encoding {
        attempted: candidates.iter().map(|s| s.as_ref().to_string()).collect(),
    })
}
