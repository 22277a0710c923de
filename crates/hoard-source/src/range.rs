//! Byte-range helpers shared by the HTTP and S3 sources.

/// `Range` header asking for everything from `offset` to the end.
///
/// No header is sent for offset 0 so that a fresh download is a plain GET.
pub fn range_header(offset: u64) -> Option<String> {
    (offset > 0).then(|| format!("bytes={offset}-"))
}

/// Total object size from a `Content-Range: bytes <start>-<end>/<total>` value.
///
/// Returns `None` for an unknown total (`/*`) or a malformed header.
pub fn content_range_total(header: &str) -> Option<u64> {
    let value = header.trim().strip_prefix("bytes")?.trim_start();
    let (range, total) = value.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    start.trim().parse::<u64>().ok()?;
    end.trim().parse::<u64>().ok()?;
    total.trim().parse().ok()
}

/// Object size from the `Content-Range: bytes */<total>` of a 416 answer.
pub fn unsatisfied_range_total(header: &str) -> Option<u64> {
    header.trim().strip_prefix("bytes")?.trim_start().strip_prefix("*/")?.trim().parse().ok()
}

/// Size of the whole object as seen from one response.
///
/// For a partial response the `Content-Range` total wins, falling back to
/// `offset + body length`; a full response's body length is the size.
pub fn total_size(
    partial: bool,
    offset: u64,
    content_length: Option<u64>,
    content_range: Option<&str>,
) -> Option<u64> {
    if !partial {
        return content_length;
    }
    content_range
        .and_then(content_range_total)
        .or_else(|| content_length.map(|len| offset + len))
}
