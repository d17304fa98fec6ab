// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Half-open index ranges with an optional step.

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::str::FromStr;

use remcol_core::{Error, Result};

/// A half-open range `[start, stop)` over a sequence, walked by `step`.
///
/// Bounds may be negative (counted from the end) or absent (the start or
/// end of the sequence). They always select a left-to-right window; a
/// negative step walks that window backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl Slice {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// Every element.
    pub fn full() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// The effective step. Zero is rejected.
    pub fn step(&self) -> Result<isize> {
        match self.step {
            None => Ok(1),
            Some(0) => Err(Error::InvalidStep),
            Some(step) => Ok(step),
        }
    }

    /// Resolves the bounds against a sequence of `len` elements into an
    /// ascending window `[start, stop)` plus the step.
    ///
    /// Bounds always read left to right, whatever the step's sign: the
    /// step only decides how the window is walked (see [`Slice::pick`]).
    /// Out-of-range bounds clamp; a start past the stop yields an empty
    /// window.
    pub fn indices(&self, len: usize) -> Result<(usize, usize, isize)> {
        let step = self.step()?;
        let n = len as isize;
        let resolve = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + n).max(0),
            Some(b) => b.min(n),
        };
        let start = resolve(self.start, 0) as usize;
        let stop = resolve(self.stop, n) as usize;
        Ok((start, stop.max(start), step))
    }

    /// Inclusive store range covering the window, or `None` when it is
    /// empty without asking the store. Resolves to the same window as
    /// [`Slice::indices`] once the store applies the length.
    pub(crate) fn store_bounds(&self) -> Option<(i64, i64)> {
        let start = self.start.unwrap_or(0) as i64;
        match self.stop {
            None => Some((start, -1)),
            Some(0) => None,
            Some(stop) => Some((start, stop as i64 - 1)),
        }
    }

    /// Applies the step to the materialised window. A negative step walks
    /// it from the end.
    pub(crate) fn pick<E>(&self, window: Vec<E>) -> Result<Vec<E>> {
        let step = self.step()?;
        let stride = step.unsigned_abs();
        Ok(if step > 0 {
            window.into_iter().step_by(stride).collect()
        } else {
            window.into_iter().rev().step_by(stride).collect()
        })
    }

    /// Positions selected by the slice, in walk order. Reads and deletes
    /// both select through this rule.
    pub(crate) fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let (start, stop, _) = self.indices(len)?;
        self.pick((start..stop).collect())
    }
}

impl From<Range<isize>> for Slice {
    fn from(range: Range<isize>) -> Self {
        Slice::new(Some(range.start), Some(range.end), None)
    }
}

impl From<RangeFrom<isize>> for Slice {
    fn from(range: RangeFrom<isize>) -> Self {
        Slice::new(Some(range.start), None, None)
    }
}

impl From<RangeTo<isize>> for Slice {
    fn from(range: RangeTo<isize>) -> Self {
        Slice::new(None, Some(range.end), None)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Slice::full()
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |b: Option<isize>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", part(self.start), part(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// Error returned when slice text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slice '{0}'\n  hint: use start:stop or start:stop:step, e.g. 1:4 or ::2")]
pub struct ParseSliceError(pub String);

impl FromStr for Slice {
    type Err = ParseSliceError;

    /// Parses `start:stop[:step]`; each part may be empty.
    fn from_str(s: &str) -> std::result::Result<Self, ParseSliceError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(ParseSliceError(s.to_string()));
        }
        let parse = |part: &str| -> std::result::Result<Option<isize>, ParseSliceError> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse()
                .map(Some)
                .map_err(|_| ParseSliceError(s.to_string()))
        };
        Ok(Slice {
            start: parse(parts[0])?,
            stop: parse(parts[1])?,
            step: match parts.get(2) {
                Some(part) => parse(part)?,
                None => None,
            },
        })
    }
}

#[cfg(test)]
#[path = "slice_tests.rs"]
mod tests;
