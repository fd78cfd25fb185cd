//! HTTP Range header parsing for media streaming.
//!
//! Accepts the two forms video players actually send, `bytes=start-end` and
//! `bytes=start-` (open-ended). Other units, multi-range lists, and
//! malformed numeric fields are rejected as unsatisfiable. An end position
//! past the resource is clamped rather than rejected, matching common HTTP
//! server behavior for slightly-over-long client requests.

use super::StreamError;

/// Validated byte interval requested by the client.
///
/// Both bounds are inclusive and guaranteed to lie within the resource:
/// `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedRange {
    pub start: u64,
    /// Inclusive end; for open-ended requests this is `total_size - 1`
    pub end: u64,
}

impl RequestedRange {
    /// Number of bytes the client asked for. Intervals are non-empty by
    /// construction.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse an HTTP Range header against a known resource size.
///
/// Returns `Ok(None)` when no header was supplied - a whole-resource
/// request is a valid outcome, not an error.
///
/// # Errors
///
/// - `StreamError::RangeNotSatisfiable` - Header is present but malformed,
///   uses a non-byte unit, contains multiple ranges, or starts at or beyond
///   the end of the resource
pub fn parse_range_header(
    header: Option<&str>,
    total_size: u64,
) -> Result<Option<RequestedRange>, StreamError> {
    let Some(raw) = header else {
        return Ok(None);
    };

    let unsatisfiable = StreamError::RangeNotSatisfiable { total_size };

    let Some(spec) = raw.strip_prefix("bytes=") else {
        return Err(unsatisfiable);
    };

    // Multi-range lists are valid HTTP but not supported here
    if spec.contains(',') {
        return Err(unsatisfiable);
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return Err(unsatisfiable);
    };

    let Ok(start) = start_str.trim().parse::<u64>() else {
        return Err(unsatisfiable);
    };

    if start >= total_size {
        return Err(unsatisfiable);
    }

    let end = if end_str.trim().is_empty() {
        total_size - 1
    } else {
        let Ok(end) = end_str.trim().parse::<u64>() else {
            return Err(unsatisfiable);
        };
        if end < start {
            return Err(unsatisfiable);
        }
        // Tolerate clients asking slightly past EOF
        end.min(total_size - 1)
    };

    Ok(Some(RequestedRange { start, end }))
}
