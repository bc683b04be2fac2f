//! Rejection-sampled placement of photos on the collage canvas.
//!
//! A candidate box is accepted when, against every box already placed in the
//! same collage, the intersection covers at most `max_overlap_ratio` of the
//! candidate's own area. The measure is deliberately one-sided: a small box
//! dropped inside a large one is judged by the small box's area.

use rand::Rng;

/// Axis-aligned box in canvas pixel coordinates. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PlacedBox {
    pub fn new(left: i64, top: i64, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left + i64::from(width),
            bottom: top + i64::from(height),
        }
    }

    pub fn area(&self) -> i64 {
        (self.right - self.left).max(0) * (self.bottom - self.top).max(0)
    }

    pub fn intersection_area(&self, other: &PlacedBox) -> i64 {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if right > left && bottom > top {
            (right - left) * (bottom - top)
        } else {
            0
        }
    }
}

/// Intersection area divided by the area of `new` (not the union).
pub fn overlap_ratio(new: &PlacedBox, existing: &PlacedBox) -> f64 {
    let area = new.area();
    if area == 0 {
        return 0.0;
    }
    new.intersection_area(existing) as f64 / area as f64
}

/// True when `new` may sit next to `existing`.
pub fn accepts(new: &PlacedBox, existing: &PlacedBox, max_overlap_ratio: f64) -> bool {
    overlap_ratio(new, existing) <= max_overlap_ratio
}

/// Canvas geometry and search limits for one collage.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRules {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub margin: u32,
    pub max_attempts: usize,
    pub max_overlap_ratio: f64,
}

/// Boxes accepted so far in a single collage.
#[derive(Debug)]
pub struct Layout {
    rules: LayoutRules,
    placed: Vec<PlacedBox>,
}

impl Layout {
    pub fn new(rules: LayoutRules) -> Self {
        Self {
            rules,
            placed: Vec::new(),
        }
    }

    pub fn placed(&self) -> &[PlacedBox] {
        &self.placed
    }

    /// Search for a position for a `width` x `height` image and record it.
    ///
    /// Draws up to `max_attempts` top-left corners keeping the image `margin`
    /// pixels inside every canvas edge. Returns `None` when no draw passes the
    /// overlap test, or when the image cannot fit inside the margins at all.
    pub fn try_place<R: Rng + ?Sized>(
        &mut self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Option<PlacedBox> {
        let margin = i64::from(self.rules.margin);
        let max_x = i64::from(self.rules.canvas_width) - i64::from(width) - margin;
        let max_y = i64::from(self.rules.canvas_height) - i64::from(height) - margin;
        if max_x < margin || max_y < margin {
            return None;
        }

        for _ in 0..self.rules.max_attempts {
            let x = rng.random_range(margin..=max_x);
            let y = rng.random_range(margin..=max_y);
            let candidate = PlacedBox::new(x, y, width, height);
            if self
                .placed
                .iter()
                .all(|existing| accepts(&candidate, existing, self.rules.max_overlap_ratio))
            {
                self.placed.push(candidate);
                return Some(candidate);
            }
        }
        None
    }
}

/// Longest side each photo is scaled to, by number of photos in the collage.
pub fn photo_bound(count: usize) -> u32 {
    match count {
        2 => 800,
        3 => 650,
        4 => 550,
        5 => 480,
        _ => 600,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rules(width: u32, height: u32) -> LayoutRules {
        LayoutRules {
            canvas_width: width,
            canvas_height: height,
            margin: 30,
            max_attempts: 500,
            max_overlap_ratio: 0.15,
        }
    }

    #[test]
    fn intersection_of_disjoint_boxes_is_zero() {
        let a = PlacedBox::new(0, 0, 10, 10);
        let b = PlacedBox::new(10, 0, 10, 10);
        assert_eq!(a.intersection_area(&b), 0);
        assert_eq!(overlap_ratio(&a, &b), 0.0);
    }

    #[test]
    fn ratio_uses_new_box_area_only() {
        let big = PlacedBox::new(0, 0, 100, 100);
        let small = PlacedBox::new(10, 10, 20, 20);

        // small fully inside big: judged against its own area -> 1.0
        assert_eq!(overlap_ratio(&small, &big), 1.0);
        // big over small: 400 / 10000 -> 0.04
        assert!((overlap_ratio(&big, &small) - 0.04).abs() < 1e-9);

        assert!(!accepts(&small, &big, 0.15));
        assert!(accepts(&big, &small, 0.15));
    }

    #[test]
    fn threshold_is_inclusive() {
        let existing = PlacedBox::new(0, 0, 100, 100);
        // 15 columns of a 100x100 box overlap -> exactly 0.15
        let new = PlacedBox::new(85, 0, 100, 100);
        assert!((overlap_ratio(&new, &existing) - 0.15).abs() < 1e-9);
        assert!(accepts(&new, &existing, 0.15));

        let new = PlacedBox::new(84, 0, 100, 100);
        assert!(!accepts(&new, &existing, 0.15));
    }

    #[test]
    fn zero_area_candidate_is_accepted() {
        let existing = PlacedBox::new(0, 0, 100, 100);
        let empty = PlacedBox::new(50, 50, 0, 10);
        assert!(accepts(&empty, &existing, 0.15));
    }

    #[test]
    fn placements_stay_inside_margins() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut layout = Layout::new(rules(1080, 1920));
        for _ in 0..4 {
            if let Some(b) = layout.try_place(300, 400, &mut rng) {
                assert!(b.left >= 30 && b.top >= 30);
                assert!(b.right <= 1080 - 30 && b.bottom <= 1920 - 30);
            }
        }
        assert!(!layout.placed().is_empty());
    }

    #[test]
    fn accepted_boxes_respect_overlap_limit() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut layout = Layout::new(rules(1080, 1920));
            for _ in 0..5 {
                layout.try_place(480, 480, &mut rng);
            }
            let placed = layout.placed();
            for (i, new) in placed.iter().enumerate() {
                for existing in &placed[..i] {
                    assert!(overlap_ratio(new, existing) <= 0.15, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn too_large_for_canvas_is_not_placed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layout = Layout::new(rules(400, 400));
        assert!(layout.try_place(800, 600, &mut rng).is_none());
        assert!(layout.placed().is_empty());
    }

    #[test]
    fn gives_up_when_canvas_is_full() {
        let mut rng = StdRng::seed_from_u64(3);
        // Exactly one 100x100 slot fits inside the margins.
        let mut layout = Layout::new(rules(160, 160));
        assert!(layout.try_place(100, 100, &mut rng).is_some());
        assert!(layout.try_place(100, 100, &mut rng).is_none());
        assert_eq!(layout.placed().len(), 1);
    }

    #[test]
    fn same_seed_same_layout() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut layout = Layout::new(rules(1080, 1920));
            for _ in 0..3 {
                layout.try_place(500, 500, &mut rng);
            }
            layout.placed().to_vec()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn bound_table() {
        assert_eq!(photo_bound(2), 800);
        assert_eq!(photo_bound(3), 650);
        assert_eq!(photo_bound(4), 550);
        assert_eq!(photo_bound(5), 480);
        assert_eq!(photo_bound(1), 600);
        assert_eq!(photo_bound(7), 600);
    }
}
