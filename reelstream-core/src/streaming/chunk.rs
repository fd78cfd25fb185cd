//! Chunk planning for bounded partial-content responses.
//!
//! A single response never carries more than the configured maximum chunk
//! size, bounding server-side memory and time per request and forcing
//! clients into successive range requests for large files. This is the
//! mechanism by which seeking and progressive buffering work without
//! loading whole files into memory.
//!
//! Whole-resource policy: a request without a Range header streams the
//! entire file as a plain 200 response, matching standard HTTP server
//! semantics. Explicit client ranges are honored verbatim up to the cap.

use super::range::RequestedRange;

/// Byte interval actually transmitted in one response.
///
/// Invariant: `0 <= start <= end < total_size` and
/// `end - start + 1 <= max_chunk_size` whenever the request was open-ended
/// or exceeded the policy bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServedInterval {
    pub start: u64,
    /// Inclusive end of the interval
    pub end: u64,
    /// Total resource size, advertised in Content-Range
    pub total_size: u64,
}

impl ServedInterval {
    /// Number of bytes this response will carry (the Content-Length).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Content-Range header value for this interval.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// How a single request will be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePlan {
    /// No range requested: stream the entire resource as 200 OK
    Whole {
        /// Total resource size (the Content-Length)
        total_size: u64,
    },
    /// Range requested: serve a bounded interval as 206 Partial Content
    Partial(ServedInterval),
}

/// Converts a validated requested interval into the interval actually served.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPlanner {
    max_chunk_size: u64,
}

impl ChunkPlanner {
    /// Creates a planner enforcing the given per-response byte cap.
    ///
    /// A zero cap would produce empty intervals, so it is raised to one.
    pub fn new(max_chunk_size: u64) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Plans the interval to serve for one request.
    ///
    /// `requested` must already be validated against `total_size` (see
    /// `parse_range_header`); explicit intervals within the cap are served
    /// unmodified, anything larger is cut at `start + max_chunk_size - 1`.
    pub fn plan(&self, requested: Option<RequestedRange>, total_size: u64) -> ServePlan {
        match requested {
            None => ServePlan::Whole { total_size },
            Some(range) => {
                let capped_end = range
                    .end
                    .min(range.start + self.max_chunk_size - 1)
                    .min(total_size - 1);
                ServePlan::Partial(ServedInterval {
                    start: range.start,
                    end: capped_end,
                    total_size,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> ChunkPlanner {
        ChunkPlanner::new(1_000_000)
    }

    #[test]
    fn test_explicit_range_within_cap_served_verbatim() {
        let plan = planner().plan(Some(RequestedRange { start: 100, end: 199 }), 1000);
        assert_eq!(
            plan,
            ServePlan::Partial(ServedInterval {
                start: 100,
                end: 199,
                total_size: 1000
            })
        );
    }

    #[test]
    fn test_open_ended_range_is_capped() {
        // 2 MB resource, 1 MB cap: first chunk is [0, 999999]
        let plan = planner().plan(Some(RequestedRange { start: 0, end: 1_999_999 }), 2_000_000);
        let ServePlan::Partial(interval) = plan else {
            panic!("expected partial plan");
        };
        assert_eq!(interval.start, 0);
        assert_eq!(interval.end, 999_999);
        assert_eq!(interval.len(), 1_000_000);
        assert_eq!(interval.content_range(), "bytes 0-999999/2000000");
    }

    #[test]
    fn test_second_chunk_covers_remainder() {
        let plan = planner().plan(
            Some(RequestedRange {
                start: 1_000_000,
                end: 1_999_999,
            }),
            2_000_000,
        );
        let ServePlan::Partial(interval) = plan else {
            panic!("expected partial plan");
        };
        assert_eq!(interval.content_range(), "bytes 1000000-1999999/2000000");
        assert_eq!(interval.len(), 1_000_000);
    }

    #[test]
    fn test_cap_never_exceeds_resource_end() {
        let plan = ChunkPlanner::new(4096).plan(Some(RequestedRange { start: 10, end: 99 }), 100);
        let ServePlan::Partial(interval) = plan else {
            panic!("expected partial plan");
        };
        assert_eq!(interval.end, 99);
        assert!(interval.end < 100);
    }

    #[test]
    fn test_no_range_streams_whole_resource() {
        let plan = planner().plan(None, 12345);
        assert_eq!(plan, ServePlan::Whole { total_size: 12345 });
    }

    #[test]
    fn test_zero_cap_is_raised_to_one() {
        let plan = ChunkPlanner::new(0).plan(Some(RequestedRange { start: 5, end: 9 }), 100);
        let ServePlan::Partial(interval) = plan else {
            panic!("expected partial plan");
        };
        assert_eq!(interval.len(), 1);
    }

    #[test]
    fn test_planned_intervals_are_never_empty() {
        for start in 0..10u64 {
            for end in start..10u64 {
                let plan =
                    ChunkPlanner::new(3).plan(Some(RequestedRange { start, end }), 10);
                let ServePlan::Partial(interval) = plan else {
                    panic!("expected partial plan");
                };
                assert!(interval.len() >= 1);
                assert!(interval.len() <= 3);
                assert!(interval.end < 10);
                assert_eq!(interval.start, start);
            }
        }
    }
}
