//! The client record for a single managed window
use crate::{
    pure::geometry::Rect,
    x::property::{SizeHints, SizeHintsFlags},
    Xid,
};

/// Maximum number of code units kept from a client title
const MAX_NAME_LEN: usize = 255;

/// One managed top-level X window.
///
/// A client belongs to exactly one [Monitor](crate::pure::Monitor) and
/// appears exactly once in both of that monitor's lists (layout order and
/// focus order). The geometry fields mirror what the X server was last
/// told, with the previous values retained so fullscreen and floating
/// toggles can restore them.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub(crate) win: Xid,
    pub(crate) name: String,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
    pub(crate) old_x: i32,
    pub(crate) old_y: i32,
    pub(crate) old_w: i32,
    pub(crate) old_h: i32,
    pub(crate) bw: i32,
    pub(crate) old_bw: i32,
    pub(crate) tags: u32,
    pub(crate) base_w: i32,
    pub(crate) base_h: i32,
    pub(crate) inc_w: i32,
    pub(crate) inc_h: i32,
    pub(crate) max_w: i32,
    pub(crate) max_h: i32,
    pub(crate) min_w: i32,
    pub(crate) min_h: i32,
    pub(crate) min_a: f32,
    pub(crate) max_a: f32,
    pub(crate) is_fixed: bool,
    pub(crate) is_floating: bool,
    pub(crate) is_urgent: bool,
    pub(crate) never_focus: bool,
    pub(crate) old_state: bool,
    pub(crate) is_fullscreen: bool,
    /// Index of the owning monitor. Re-seated on send-to-monitor, rule
    /// application and monitor removal; never followed after unmanage.
    pub(crate) mon: usize,
}

impl Client {
    pub(crate) fn new(win: Xid, r: Rect, bw: i32) -> Self {
        Self {
            win,
            name: String::new(),
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
            old_x: r.x,
            old_y: r.y,
            old_w: r.w,
            old_h: r.h,
            bw: 0,
            old_bw: bw,
            tags: 0,
            base_w: 0,
            base_h: 0,
            inc_w: 0,
            inc_h: 0,
            max_w: 0,
            max_h: 0,
            min_w: 0,
            min_h: 0,
            min_a: 0.0,
            max_a: 0.0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            mon: 0,
        }
    }

    /// The id of the X window this client wraps.
    pub fn win(&self) -> Xid {
        self.win
    }

    /// The last title this client reported.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current geometry, excluding the border.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Total on-screen width including both border edges.
    pub fn total_w(&self) -> i32 {
        self.w + 2 * self.bw
    }

    /// Total on-screen height including both border edges.
    pub fn total_h(&self) -> i32 {
        self.h + 2 * self.bw
    }

    /// Is this client shown when `tagset` is the active tag mask?
    pub fn is_visible_on(&self, tagset: u32) -> bool {
        self.tags & tagset != 0
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.chars().take(MAX_NAME_LEN).collect();
    }

    pub(crate) fn save_geometry(&mut self) {
        self.old_x = self.x;
        self.old_y = self.y;
        self.old_w = self.w;
        self.old_h = self.h;
    }

    /// Copy a WM_NORMAL_HINTS property onto this client, applying the
    /// ICCCM fallbacks (base size falls back to min size and vice versa)
    /// and deriving the fixed-size flag.
    pub(crate) fn set_size_hints(&mut self, hints: Option<SizeHints>) {
        // A client with no size hints at all is treated as having none set
        let h = hints.unwrap_or_default();
        let f = h.flags;

        (self.base_w, self.base_h) = if f.contains(SizeHintsFlags::P_BASE_SIZE) {
            h.base
        } else if f.contains(SizeHintsFlags::P_MIN_SIZE) {
            h.min
        } else {
            (0, 0)
        };

        (self.inc_w, self.inc_h) = if f.contains(SizeHintsFlags::P_RESIZE_INC) {
            h.inc
        } else {
            (0, 0)
        };

        (self.max_w, self.max_h) = if f.contains(SizeHintsFlags::P_MAX_SIZE) {
            h.max
        } else {
            (0, 0)
        };

        (self.min_w, self.min_h) = if f.contains(SizeHintsFlags::P_MIN_SIZE) {
            h.min
        } else if f.contains(SizeHintsFlags::P_BASE_SIZE) {
            h.base
        } else {
            (0, 0)
        };

        (self.min_a, self.max_a) = if f.contains(SizeHintsFlags::P_ASPECT) {
            let (min_x, min_y) = h.min_aspect;
            let (max_x, max_y) = h.max_aspect;
            let min_a = if min_x > 0 { min_y as f32 / min_x as f32 } else { 0.0 };
            let max_a = if max_y > 0 { max_x as f32 / max_y as f32 } else { 0.0 };

            (min_a, max_a)
        } else {
            (0.0, 0.0)
        };

        self.is_fixed = self.max_w > 0
            && self.max_h > 0
            && self.max_w == self.min_w
            && self.max_h == self.min_h;
    }

    /// Constrain a proposed geometry for this client.
    ///
    /// Implements the ICCCM §4.1.2.3 rules: the proposal is clamped onto
    /// the screen (`interact`, for pointer driven moves) or the monitor
    /// work area `work`, floored at the bar height `bar_h`, and, when
    /// `apply_hints` is set, adjusted for base size, aspect ratio, resize
    /// increments and min/max bounds. The base size is subtracted before
    /// the aspect calculation unless it equals the min size, in which case
    /// it is subtracted after.
    ///
    /// Returns `true` when the constrained proposal differs from the
    /// client's current geometry; callers only need to issue a resize in
    /// that case.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn apply_size_hints(
        &self,
        x: &mut i32,
        y: &mut i32,
        w: &mut i32,
        h: &mut i32,
        work: Rect,
        screen: Rect,
        bar_h: i32,
        apply_hints: bool,
        interact: bool,
    ) -> bool {
        *w = 1.max(*w);
        *h = 1.max(*h);

        if interact {
            if *x > screen.w {
                *x = screen.w - self.total_w();
            }
            if *y > screen.h {
                *y = screen.h - self.total_h();
            }
            if *x + *w + 2 * self.bw < 0 {
                *x = 0;
            }
            if *y + *h + 2 * self.bw < 0 {
                *y = 0;
            }
        } else {
            if *x >= work.right() {
                *x = work.right() - self.total_w();
            }
            if *y >= work.bottom() {
                *y = work.bottom() - self.total_h();
            }
            if *x + *w + 2 * self.bw <= work.x {
                *x = work.x;
            }
            if *y + *h + 2 * self.bw <= work.y {
                *y = work.y;
            }
        }

        if *h < bar_h {
            *h = bar_h;
        }
        if *w < bar_h {
            *w = bar_h;
        }

        if apply_hints {
            let base_is_min = self.base_w == self.min_w && self.base_h == self.min_h;

            if !base_is_min {
                *w -= self.base_w;
                *h -= self.base_h;
            }

            if self.min_a > 0.0 && self.max_a > 0.0 {
                if self.max_a < *w as f32 / *h as f32 {
                    *w = (*h as f32 * self.max_a + 0.5) as i32;
                } else if self.min_a < *h as f32 / *w as f32 {
                    *h = (*w as f32 * self.min_a + 0.5) as i32;
                }
            }

            if base_is_min {
                *w -= self.base_w;
                *h -= self.base_h;
            }

            if self.inc_w > 0 {
                *w -= *w % self.inc_w;
            }
            if self.inc_h > 0 {
                *h -= *h % self.inc_h;
            }

            *w = self.min_w.max(*w + self.base_w);
            *h = self.min_h.max(*h + self.base_h);

            if self.max_w > 0 {
                *w = (*w).min(self.max_w);
            }
            if self.max_h > 0 {
                *h = (*h).min(self.max_h);
            }
        }

        *x != self.x || *y != self.y || *w != self.w || *h != self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;

    const WORK: Rect = Rect::new(0, 0, 1920, 1060);
    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
    const BAR_H: i32 = 20;

    fn client() -> Client {
        Client::new(Xid(1), Rect::new(0, 0, 100, 100), 1)
    }

    fn apply(c: &Client, mut r: Rect, hints: bool, interact: bool) -> (Rect, bool) {
        let changed = c.apply_size_hints(
            &mut r.x, &mut r.y, &mut r.w, &mut r.h, WORK, SCREEN, BAR_H, hints, interact,
        );

        (r, changed)
    }

    #[test]
    fn zero_sizes_are_floored() {
        let (r, _) = apply(&client(), Rect::new(0, 0, 0, 0), false, false);

        // 1-pixel floor, then the bar height floor
        assert_eq!((r.w, r.h), (BAR_H, BAR_H));
    }

    #[test_case(Rect::new(5000, 10, 100, 100); "off the right edge")]
    #[test_case(Rect::new(10, 5000, 100, 100); "off the bottom edge")]
    #[test_case(Rect::new(-5000, 10, 100, 100); "off the left edge")]
    #[test]
    fn tiled_proposals_are_pulled_into_the_work_area(r: Rect) {
        let c = client();
        let (r, _) = apply(&c, r, false, false);

        assert!(r.x + r.w + 2 * c.bw > WORK.x && r.x < WORK.right());
        assert!(r.y + r.h + 2 * c.bw > WORK.y && r.y < WORK.bottom());
    }

    #[test]
    fn increments_round_down() {
        let mut c = client();
        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_RESIZE_INC,
            inc: (7, 13),
            ..Default::default()
        }));

        let (r, _) = apply(&c, Rect::new(0, 0, 100, 100), true, false);

        assert_eq!((r.w, r.h), (98, 91));
    }

    #[test]
    fn base_size_is_excluded_from_increment_rounding() {
        let mut c = client();
        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_RESIZE_INC | SizeHintsFlags::P_BASE_SIZE,
            inc: (10, 10),
            base: (2, 4),
            ..Default::default()
        }));

        let (r, _) = apply(&c, Rect::new(0, 0, 105, 105), true, false);

        // (105 - base) rounded down to the increment, plus base again
        assert_eq!((r.w, r.h), (102, 104));
    }

    #[test]
    fn max_aspect_narrows_wide_proposals() {
        let mut c = client();
        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_ASPECT,
            min_aspect: (2, 1), // h/w >= 0.5
            max_aspect: (1, 1), // w/h <= 1.0
            ..Default::default()
        }));

        let (r, _) = apply(&c, Rect::new(0, 0, 200, 100), true, false);

        assert_eq!((r.w, r.h), (100, 100));
    }

    #[test]
    fn min_max_bounds_clamp() {
        let mut c = client();
        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE,
            min: (50, 60),
            max: (400, 300),
            ..Default::default()
        }));

        let (small, _) = apply(&c, Rect::new(0, 0, 30, 30), true, false);
        let (large, _) = apply(&c, Rect::new(0, 0, 800, 800), true, false);

        assert_eq!((small.w, small.h), (50, 60));
        assert_eq!((large.w, large.h), (400, 300));
    }

    #[test]
    fn fixed_flag_requires_equal_min_and_max() {
        let mut c = client();
        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE,
            min: (120, 80),
            max: (120, 80),
            ..Default::default()
        }));

        assert!(c.is_fixed);

        c.set_size_hints(Some(SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE,
            min: (120, 80),
            max: (240, 80),
            ..Default::default()
        }));

        assert!(!c.is_fixed);
    }

    #[derive(Debug, Clone)]
    struct ArbHints(SizeHints);

    impl Arbitrary for ArbHints {
        // Conformant hints only: ICCCM has max sizes sitting on the
        // base + k*inc grid, and the idempotency property relies on it.
        fn arbitrary(g: &mut Gen) -> Self {
            let dim = |g: &mut Gen| (u32::arbitrary(g) % 500) as i32;
            let min = (dim(g), dim(g));
            let inc = (1 + dim(g) % 32, 1 + dim(g) % 32);

            ArbHints(SizeHints {
                flags: SizeHintsFlags::P_MIN_SIZE
                    | SizeHintsFlags::P_MAX_SIZE
                    | SizeHintsFlags::P_RESIZE_INC
                    | SizeHintsFlags::P_BASE_SIZE,
                min,
                max: (min.0 + inc.0 * (dim(g) % 8), min.1 + inc.1 * (dim(g) % 8)),
                inc,
                base: min,
                ..Default::default()
            })
        }
    }

    // Applying the hints to their own output must report no change.
    #[quickcheck]
    fn size_hint_application_is_idempotent(hints: ArbHints, w: u16, h: u16) -> bool {
        let mut c = client();
        c.set_size_hints(Some(hints.0));

        let proposal = Rect::new(10, 10, w as i32 + 1, h as i32 + 1);
        let (r, _) = apply(&c, proposal, true, false);

        c.x = r.x;
        c.y = r.y;
        c.w = r.w;
        c.h = r.h;

        let (_, changed) = apply(&c, r, true, false);

        !changed
    }
}
