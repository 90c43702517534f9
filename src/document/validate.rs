//! Full structural check of encoded documents.

use crate::element::{self, cstring, length_prefix, scan_element};
use crate::error::{Error, Result};
use crate::tag::TypeIdentifier;

/// Checks that `bytes` hold exactly one document and nothing else.
pub(crate) fn validate(bytes: &[u8]) -> Result<()> {
    let len = document(bytes, 0)?;
    if len != bytes.len() {
        return Err(Error::InvalidDocumentLength {
            offset: 0,
            declared: len as i64,
            available: bytes.len(),
        });
    }
    Ok(())
}

/// Checks the document at `at` and everything nested in it. Returns its
/// length.
pub(crate) fn document(bytes: &[u8], at: usize) -> Result<usize> {
    let len = element::document_len(bytes, at)?;
    let end = at + len - 1;
    if bytes[end] != 0 {
        return Err(Error::InvalidDocumentLength {
            offset: at,
            declared: len as i64,
            available: bytes.len() - at,
        });
    }

    let elements = &bytes[..end];
    let mut pos = at + 4;
    while let Some(e) = scan_element(elements, pos)? {
        value(e.ty, elements, e.value)?;
        pos = e.end;
    }
    Ok(len)
}

/// Checks one payload, looking inside strings and embedded documents.
pub(crate) fn value(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<usize> {
    use TypeIdentifier::*;

    match ty {
        Document | Array => document(bytes, at),
        String | JavaScriptCode => Ok(element::string(ty, bytes, at)?.1),
        RegularExpression => {
            let (_, pattern) = cstring(bytes, at)?;
            let (_, options) = cstring(bytes, at + pattern)?;
            Ok(pattern + options)
        }
        Boolean => match element::fixed(ty, bytes, at)?[0] {
            0 | 1 => Ok(1),
            _ => Err(Error::InvalidElementContents {
                offset: at,
                reason: "boolean must be 0x00 or 0x01",
            }),
        },
        JavaScriptCodeWithScope => {
            let total = element::value_len(ty, bytes, at)?;
            let (_, code) = element::string(ty, bytes, at + 4)?;
            let scope = document(bytes, at + 4 + code)?;
            if 4 + code + scope != total {
                return Err(Error::ParseError {
                    offset: at,
                    reason: "code with scope length disagrees with its parts",
                });
            }
            Ok(total)
        }
        Binary => {
            let len = element::value_len(ty, bytes, at)?;
            // The old binary subtype repeats the length inside the payload.
            if bytes[at + 4] == 0x02 && len >= 9 {
                let inner = length_prefix(ty, bytes, at + 5)?;
                if inner as i64 != len as i64 - 9 {
                    return Err(Error::ParseError {
                        offset: at,
                        reason: "old binary length disagrees with its payload",
                    });
                }
            }
            Ok(len)
        }
        _ => element::value_len(ty, bytes, at),
    }
}
