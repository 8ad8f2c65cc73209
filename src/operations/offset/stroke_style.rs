use crate::error::{GeometryError, Result};

/// Shape drawn where two stroked segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Extend both outer edges until they meet, up to the miter limit.
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Shape drawn at the two ends of an open sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Square end flush with the endpoint.
    #[default]
    Butt,
    /// Square end extending half the width past the endpoint.
    Square,
    Round,
}

/// Style parameters for stroke outlining.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    width: f64,
    join: LineJoin,
    cap: LineCap,
    miter_limit: f64,
}

impl StrokeStyle {
    /// Creates a new stroke style with miter joins, butt caps and a miter
    /// limit of 4.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidParameter` if `width` is not a positive
    /// finite number.
    pub fn new(width: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(GeometryError::InvalidParameter {
                parameter: "width",
                value: width,
                reason: "stroke width must be positive and finite",
            }
            .into());
        }
        Ok(Self {
            width,
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            miter_limit: 4.0,
        })
    }

    #[must_use]
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Sets the miter limit, the longest allowed miter as a multiple of the
    /// half width.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidParameter` if `limit` is below 1 or not
    /// finite.
    pub fn with_miter_limit(mut self, limit: f64) -> Result<Self> {
        if !(limit.is_finite() && limit >= 1.0) {
            return Err(GeometryError::InvalidParameter {
                parameter: "miter_limit",
                value: limit,
                reason: "miter limit must be at least 1",
            }
            .into());
        }
        self.miter_limit = limit;
        Ok(self)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    #[must_use]
    pub fn join(&self) -> LineJoin {
        self.join
    }

    #[must_use]
    pub fn cap(&self) -> LineCap {
        self.cap
    }

    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }
}
