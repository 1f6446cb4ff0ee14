//! `{N}` placeholder templates and cluster ranges.
//!
//! A template is split once into literal text and index tokens, so malformed
//! tokens are rejected up front and rendering is plain concatenation.
//! Supported tokens: `{N}`, `{N+k}`, `{N-k}` where `k` is an integer
//! (`{N+-2}` is the same as `{N-2}`). Any other brace text is literal.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::RackError;

// ─── Template ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Index plus a fixed offset.
    Index(i64),
}

/// A string with zero or more index tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{N(?:\s*([+-])([^{}]*))?\}").expect("placeholder pattern is valid")
    })
}

impl Template {
    /// Split `raw` into literals and index tokens.
    ///
    /// Fails with a configuration error when an offset is not an integer.
    pub fn parse(raw: &str) -> Result<Self, RackError> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in token_regex().captures_iter(raw) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(raw[last..whole.start()].to_string()));
            }
            let offset = match (caps.get(1), caps.get(2)) {
                (Some(sign), Some(digits)) => parse_offset(raw, sign.as_str(), digits.as_str())?,
                _ => 0,
            };
            segments.push(Segment::Index(offset));
            last = whole.end();
        }
        if last < raw.len() {
            segments.push(Segment::Literal(raw[last..].to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn has_placeholder(&self) -> bool {
        self.segments
            .iter()
            .any(|seg| matches!(seg, Segment::Index(_)))
    }

    /// Substitute `index` into every token.
    ///
    /// Fails when `index` plus an offset leaves the `i64` range.
    pub fn render(&self, index: i64) -> Result<String, RackError> {
        let mut out = String::with_capacity(self.raw.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Index(offset) => {
                    let value = index.checked_add(*offset).ok_or_else(|| {
                        RackError::configuration(
                            format!("template '{}'", self.raw),
                            format!("index {index} with offset {offset} overflows"),
                        )
                    })?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }
}

fn parse_offset(raw: &str, sign: &str, digits: &str) -> Result<i64, RackError> {
    let value: i64 = digits.trim().parse().map_err(|_| {
        RackError::configuration(
            format!("template '{raw}'"),
            format!("offset '{}' in placeholder is not an integer", digits.trim()),
        )
    })?;
    if sign == "+" {
        return Ok(value);
    }
    value.checked_neg().ok_or_else(|| {
        RackError::configuration(
            format!("template '{raw}'"),
            format!("offset '-({value})' overflows"),
        )
    })
}

/// Parse and render in one step, for fields that are only used once.
pub fn substitute(raw: &str, index: i64) -> Result<String, RackError> {
    Template::parse(raw)?.render(index)
}

// ─── ClusterRange ────────────────────────────────────────────────────────────

/// Largest number of items one cluster template may expand to.
pub const MAX_CLUSTER_LEN: u64 = 100_000;

/// Inclusive `start..=end` index range of a cluster template.
///
/// Always holds `start <= end` and at most `MAX_CLUSTER_LEN` indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRange {
    start: i64,
    end: i64,
}

impl ClusterRange {
    pub fn new(start: i64, end: i64, context: &str) -> Result<Self, RackError> {
        if end < start {
            return Err(RackError::configuration(
                context,
                format!("cluster end ({end}) is before start ({start})"),
            ));
        }
        if end.abs_diff(start) >= MAX_CLUSTER_LEN {
            return Err(RackError::configuration(
                context,
                format!("cluster {start}..={end} expands to more than {MAX_CLUSTER_LEN} items"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Build a range from optional `start`/`end` keys.
    ///
    /// `Ok(None)` when neither key is present; a lone key is an error.
    pub fn from_keys(
        start: Option<i64>,
        end: Option<i64>,
        context: &str,
    ) -> Result<Option<Self>, RackError> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Self::new(start, end, context).map(Some),
            (Some(_), None) => Err(RackError::configuration(
                context,
                "cluster has 'start' but no 'end'",
            )),
            (None, Some(_)) => Err(RackError::configuration(
                context,
                "cluster has 'end' but no 'start'",
            )),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.end.abs_diff(self.start) as usize + 1
    }

    pub fn indices(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    /// Run `make` once per index, in order. `make` gets the index and its
    /// zero-based step within the range.
    pub fn expand<T, F>(&self, mut make: F) -> Result<Vec<T>, RackError>
    where
        F: FnMut(i64, i64) -> Result<T, RackError>,
    {
        let mut out = Vec::with_capacity(self.len());
        for index in self.indices() {
            out.push(make(index, index - self.start)?);
        }
        Ok(out)
    }
}

/// Top unit of the `step`-th device of a stacked cluster.
///
/// Devices stack downward: each one starts `units + spacing` below the
/// previous one.
pub fn stacked_start_u(
    base_start_u: i64,
    step: i64,
    units: i64,
    spacing: i64,
) -> Result<i64, RackError> {
    units
        .checked_add(spacing)
        .and_then(|pitch| step.checked_mul(pitch))
        .and_then(|drop| base_start_u.checked_sub(drop))
        .ok_or_else(|| {
            RackError::configuration(
                format!("cluster at start_u {base_start_u}"),
                format!("stacking step {step} of {units}U + {spacing} spacing overflows"),
            )
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_names(raw: &str, start: i64, end: i64) -> Vec<String> {
        let tpl = Template::parse(raw).unwrap();
        ClusterRange::new(start, end, "test")
            .unwrap()
            .expand(|i, _| tpl.render(i))
            .unwrap()
    }

    #[test]
    fn test_plain_index() {
        assert_eq!(expand_names("GS{N}", 1, 3), vec!["GS1", "GS2", "GS3"]);
    }

    #[test]
    fn test_positive_offset() {
        assert_eq!(
            expand_names("192.168.2.{N+10}", 1, 2),
            vec!["192.168.2.11", "192.168.2.12"]
        );
    }

    #[test]
    fn test_negative_offset_forms() {
        assert_eq!(substitute("R{N-1}", 5).unwrap(), "R4");
        assert_eq!(substitute("R{N+-2}", 5).unwrap(), "R3");
        assert_eq!(substitute("R{N + 1}", 5).unwrap(), "R6");
    }

    #[test]
    fn test_every_occurrence_substituted() {
        assert_eq!(substitute("{N}-{N+1}-{N}", 7).unwrap(), "7-8-7");
    }

    #[test]
    fn test_no_placeholder_is_literal() {
        let tpl = Template::parse("Graphics Switch").unwrap();
        assert!(!tpl.has_placeholder());
        assert_eq!(tpl.render(9).unwrap(), "Graphics Switch");
    }

    #[test]
    fn test_other_braces_left_alone() {
        assert_eq!(substitute("{X} {N}", 2).unwrap(), "{X} 2");
    }

    #[test]
    fn test_non_integer_offset_fails() {
        let err = Template::parse("GS{N+x}").unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
        assert!(Template::parse("GS{N+1.5}").is_err());
        assert!(Template::parse("GS{N+}").is_err());
    }

    #[test]
    fn test_range_count() {
        for (start, end) in [(1, 1), (1, 13), (-2, 2), (8, 10)] {
            let range = ClusterRange::new(start, end, "test").unwrap();
            let items = range.expand(|i, _| Ok(i)).unwrap();
            assert_eq!(items.len() as i64, end - start + 1);
            assert_eq!(items.len(), range.len());
        }
    }

    #[test]
    fn test_degenerate_range_single_item() {
        assert_eq!(expand_names("Only {N}", 4, 4), vec!["Only 4"]);
    }

    #[test]
    fn test_end_before_start_fails() {
        let err = ClusterRange::new(3, 1, "device 'GS{N}'").unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
    }

    #[test]
    fn test_from_keys() {
        assert_eq!(ClusterRange::from_keys(None, None, "x").unwrap(), None);
        assert!(ClusterRange::from_keys(Some(1), None, "x").is_err());
        assert!(ClusterRange::from_keys(None, Some(1), "x").is_err());
        assert_eq!(
            ClusterRange::from_keys(Some(1), Some(2), "x").unwrap(),
            Some(ClusterRange { start: 1, end: 2 })
        );
        let range = ClusterRange::from_keys(Some(-3), Some(4), "x").unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (-3, 4)
        );
    }

    #[test]
    fn test_expand_passes_step() {
        let steps = ClusterRange::new(5, 7, "x")
            .unwrap()
            .expand(|_, step| Ok(step))
            .unwrap();
        assert_eq!(steps, vec![0, 1, 2]);
    }

    #[test]
    fn test_stacked_start_u() {
        // RVD {N}: start_u 20, units 4, spacing 0 -> 20, 16, 12
        let tops: Vec<i64> = (0..3).map(|s| stacked_start_u(20, s, 4, 0).unwrap()).collect();
        assert_eq!(tops, vec![20, 16, 12]);
        assert_eq!(stacked_start_u(20, 2, 4, 1).unwrap(), 10);
    }

    // ── Overflow ──

    #[test]
    fn test_offset_overflow_is_an_error() {
        let tpl = Template::parse("10.0.0.{N+9223372036854775807}").unwrap();
        assert_eq!(tpl.render(0).unwrap(), "10.0.0.9223372036854775807");
        let err = tpl.render(1).unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
        assert!(substitute("R{N-1}", i64::MIN).is_err());
    }

    #[test]
    fn test_negated_min_offset_is_an_error() {
        let err = Template::parse("R{N--9223372036854775808}").unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
    }

    #[test]
    fn test_stacking_overflow_is_an_error() {
        let err = stacked_start_u(42, 2, 4_611_686_018_427_387_904, 0).unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
        assert!(stacked_start_u(42, 1, i64::MAX, 1).is_err());
        assert!(stacked_start_u(i64::MIN, 1, 1, 0).is_err());
    }

    #[test]
    fn test_oversized_range_is_an_error() {
        let err = ClusterRange::new(i64::MIN, i64::MAX, "device 'X{N}'").unwrap_err();
        assert!(matches!(err, RackError::Configuration { .. }));
        assert!(ClusterRange::new(1, MAX_CLUSTER_LEN as i64 + 1, "x").is_err());
        let widest = ClusterRange::new(1, MAX_CLUSTER_LEN as i64, "x").unwrap();
        assert_eq!(widest.len() as u64, MAX_CLUSTER_LEN);
    }
}
