// Polyline simplification: radial-distance pass followed by Douglas-Peucker

/// A coordinate pair. The reference system is the caller's business:
/// `x` is usually longitude and `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Axis-aligned extent of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// `None` for an empty slice
    pub fn of(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Simplify `points` with the radial pre-pass followed by Douglas-Peucker.
/// `tolerance` is in coordinate units; negative or NaN counts as zero.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    simplify_with(points, tolerance, false)
}

/// Like [`simplify`], but `high_quality` skips the radial pre-pass and
/// runs Douglas-Peucker over every input point.
pub fn simplify_with(points: &[Point], tolerance: f64, high_quality: bool) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = if tolerance.is_nan() { 0.0 } else { tolerance.max(0.0).powi(2) };

    let filtered = if high_quality {
        points.to_vec()
    } else {
        radial_distance(points, sq_tolerance)
    };
    douglas_peucker(&filtered, sq_tolerance)
}

/// Simplify a closed ring (first point repeated at the end). If the
/// result would no longer describe an area (fewer than four points) the
/// ring is returned unchanged. Open paths are simplified as usual.
pub fn simplify_ring(ring: &[Point], tolerance: f64) -> Vec<Point> {
    let closed = ring.len() >= 4 && ring.first() == ring.last();
    let simplified = simplify(ring, tolerance);
    if closed && simplified.len() < 4 {
        return ring.to_vec();
    }
    simplified
}

/// Squared distance from `p` to the segment `a`-`b`. The projection is
/// clamped to the segment, so points beyond an end measure to that end.
pub fn perpendicular_distance_squared(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return p.distance_squared(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(Point::new(a.x + t * dx, a.y + t * dy))
}

fn radial_distance(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    let mut prev = points[0];
    let mut kept = vec![prev];
    let mut last_kept = 0;

    for (i, &p) in points.iter().enumerate().skip(1) {
        if p.distance_squared(prev) > sq_tolerance {
            kept.push(p);
            prev = p;
            last_kept = i;
        }
    }

    if last_kept != points.len() - 1 {
        kept.push(points[points.len() - 1]);
    }
    kept
}

fn douglas_peucker(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // Explicit stack instead of recursion so long tracks cannot blow the
    // call stack. Each entry is a (first, last) segment to examine.
    let mut segments = vec![(0, last)];
    while let Some((first, end)) = segments.pop() {
        let mut max_sq_dist = sq_tolerance;
        let mut index = None;

        for i in (first + 1)..end {
            let sq_dist = perpendicular_distance_squared(points[i], points[first], points[end]);
            if sq_dist > max_sq_dist {
                max_sq_dist = sq_dist;
                index = Some(i);
            }
        }

        if let Some(i) = index {
            keep[i] = true;
            if i - first > 1 {
                segments.push((first, i));
            }
            if end - i > 1 {
                segments.push((i, end));
            }
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}
