use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// ALPHA, DIGIT, '-', '.', '_', '~' stay as they are; everything else is
// encoded with uppercase hex and space becomes %20 rather than '+'.
const SIGNATURE_TARGETS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const ENCODED_BACKSLASH: &str = "%5C";
// FIXME: the API has always received a backslash as %27 (the single quote
// code). Switching to %5C changes every signature that contains one.
const SIGNED_BACKSLASH: &str = "%27";

/// Percent-encodes `s` for both the signature base string and the query
/// string of the signed URL.
pub fn sig_escape(s: &str) -> String {
    utf8_percent_encode(s, SIGNATURE_TARGETS)
        .map(|chunk| {
            if chunk == ENCODED_BACKSLASH {
                SIGNED_BACKSLASH
            } else {
                chunk
            }
        })
        .collect()
}
