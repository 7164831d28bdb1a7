//! Marker styling for earthquake events.
//!
//! Magnitude drives the circle radius and depth drives the fill color. The
//! same depth buckets feed the legend so marker colors and legend swatches
//! cannot drift apart.

/// Radius multiplier applied to magnitude.
pub const RADIUS_PER_MAGNITUDE: f64 = 6.0;

/// Circle radius for a magnitude.
///
/// Not clamped: a negative magnitude gives a negative radius.
#[must_use]
pub fn circle_size(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// Fill color for a depth in kilometers.
#[must_use]
pub fn circle_color(depth_km: f64) -> &'static str {
    DepthBucket::for_depth(depth_km).color()
}

/// Depth bands, shallow to deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBucket {
    /// depth <= 10 km, including negative depths
    Shallow,
    /// 10 < depth <= 30
    Upper,
    /// 30 < depth <= 50
    Middle,
    /// 50 < depth <= 70
    Lower,
    /// 70 < depth <= 90
    Deep,
    /// depth > 90
    VeryDeep,
}

/// All buckets in legend order (shallow first).
pub const DEPTH_BUCKETS: [DepthBucket; 6] = [
    DepthBucket::Shallow,
    DepthBucket::Upper,
    DepthBucket::Middle,
    DepthBucket::Lower,
    DepthBucket::Deep,
    DepthBucket::VeryDeep,
];

impl DepthBucket {
    /// Bucket for a depth. Bounds are strict, so a depth sitting exactly on
    /// a bound belongs to the shallower bucket.
    #[must_use]
    pub fn for_depth(depth_km: f64) -> Self {
        match depth_km {
            d if d > 90.0 => Self::VeryDeep,
            d if d > 70.0 => Self::Deep,
            d if d > 50.0 => Self::Lower,
            d if d > 30.0 => Self::Middle,
            d if d > 10.0 => Self::Upper,
            _ => Self::Shallow,
        }
    }

    /// Hex fill color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::VeryDeep => "#ff5f65",
            Self::Deep => "#fca35d",
            Self::Lower => "#fdb72a",
            Self::Middle => "#f7db11",
            Self::Upper => "#dcf400",
            Self::Shallow => "#a3f600",
        }
    }

    /// Legend label text (kilometers).
    ///
    /// The shallow label reads "-10-10" although the bucket has no lower
    /// bound.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shallow => "-10-10",
            Self::Upper => "10-30",
            Self::Middle => "30-50",
            Self::Lower => "50-70",
            Self::Deep => "70-90",
            Self::VeryDeep => "90+",
        }
    }

    /// CSS class used for the legend swatch.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Shallow => "color1",
            Self::Upper => "color2",
            Self::Middle => "color3",
            Self::Lower => "color4",
            Self::Deep => "color5",
            Self::VeryDeep => "color6",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_size_is_linear() {
        for m in [-1.5, -0.0, 0.0, 0.5, 2.5, 4.2, 9.1] {
            assert!((circle_size(m) - 6.0 * m).abs() < 1e-12, "magnitude {m}");
        }
    }

    #[test]
    fn test_negative_magnitude_not_clamped() {
        assert!(circle_size(-0.8) < 0.0);
        assert!(circle_size(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_color_buckets() {
        assert_eq!(circle_color(560.0), "#ff5f65");
        assert_eq!(circle_color(80.0), "#fca35d");
        assert_eq!(circle_color(60.0), "#fdb72a");
        assert_eq!(circle_color(40.0), "#f7db11");
        assert_eq!(circle_color(20.0), "#dcf400");
        assert_eq!(circle_color(5.0), "#a3f600");
        assert_eq!(circle_color(-3.2), "#a3f600");
        assert_eq!(circle_color(-50.0), "#a3f600");
    }

    #[test]
    fn test_boundaries_fall_into_lower_bucket() {
        assert_eq!(circle_color(90.0), "#fca35d");
        assert_eq!(circle_color(70.0), "#fdb72a");
        assert_eq!(circle_color(50.0), "#f7db11");
        assert_eq!(circle_color(30.0), "#dcf400");
        assert_eq!(circle_color(10.0), "#a3f600");

        assert_eq!(circle_color(90.01), "#ff5f65");
        assert_eq!(circle_color(10.01), "#dcf400");
    }

    #[test]
    fn test_bucket_order_is_shallow_to_deep() {
        let depths = [0.0, 20.0, 40.0, 60.0, 80.0, 100.0];
        for (bucket, depth) in DEPTH_BUCKETS.iter().zip(depths) {
            assert_eq!(DepthBucket::for_depth(depth), *bucket);
        }

        let labels: Vec<&str> = DEPTH_BUCKETS.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["-10-10", "10-30", "30-50", "50-70", "70-90", "90+"]);
    }
}
