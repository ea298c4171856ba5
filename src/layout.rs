//! The built-in layout algorithms.
//!
//! Arrangers walk the visible, non-floating clients of one monitor in
//! creation order and push each of them a new rectangle through the
//! [resize protocol](crate::core::WindowManager::resize), which applies
//! size hints and the configured window gap. Positions later in the walk
//! use the geometry a client actually ended up with, so hint-constrained
//! clients do not leave holes in a column.
use crate::{
    core::WindowManager,
    draw::Draw,
    pure::{geometry::Rect, monitor::tiled},
    x::XConn,
    Result, Xid,
};

/// The tiling algorithms girih ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangeKind {
    /// Master column on the left, remaining clients stacked on the right
    Tile,
    /// Every visible client occupies the full work area
    Monocle,
    /// Master row across the top, remaining clients side by side below
    BottomStack,
    /// Master row across the top, remaining clients stacked below
    BottomStackHoriz,
}

/// A layout table entry: the bar symbol plus an optional arranger.
///
/// A `None` arranger denotes floating mode: no tiling pass runs and
/// clients keep whatever geometry they have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// The symbol shown in the bar while this layout is active
    pub symbol: &'static str,
    /// The arranger to run, if any
    pub arrange: Option<ArrangeKind>,
}

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    pub(crate) fn run_layout(&mut self, m: usize, kind: ArrangeKind) -> Result<()> {
        match kind {
            ArrangeKind::Tile => self.tile(m),
            ArrangeKind::Monocle => self.monocle(m),
            ArrangeKind::BottomStack => self.bottom_stack(m, false),
            ArrangeKind::BottomStackHoriz => self.bottom_stack(m, true),
        }
    }

    // Masters stacked in a left column taking mfact of the width (all of
    // it if nothing overflows), remaining clients stacked on the right.
    fn tile(&mut self, m: usize) -> Result<()> {
        let mon = &self.state.monitors[m];
        let ws = mon.work;
        let (mfact, nmaster) = (mon.mfact, mon.nmaster as i32);
        let ids = tiled(mon, &self.state.clients);
        let n = ids.len() as i32;

        if n == 0 {
            return Ok(());
        }

        let mw = if n > nmaster {
            if nmaster > 0 {
                (ws.w as f32 * mfact) as i32
            } else {
                0
            }
        } else {
            ws.w
        };

        let (mut my, mut ty) = (0, 0);
        for (i, id) in ids.iter().enumerate() {
            let i = i as i32;
            let bw = self.client_bw(*id);

            if i < nmaster {
                let h = (ws.h - my) / (n.min(nmaster) - i);
                let r = Rect::new(ws.x, ws.y + my, mw - 2 * bw, h - 2 * bw);
                self.resize(*id, r, false)?;
                my += self.client_total_h(*id);
            } else {
                let h = (ws.h - ty) / (n - i);
                let r = Rect::new(ws.x + mw, ws.y + ty, ws.w - mw - 2 * bw, h - 2 * bw);
                self.resize(*id, r, false)?;
                ty += self.client_total_h(*id);
            }
        }

        Ok(())
    }

    // All visible clients occupy the full work area; the layout symbol
    // reports how many windows are stacked on top of one another.
    fn monocle(&mut self, m: usize) -> Result<()> {
        let mon = &self.state.monitors[m];
        let ws = mon.work;
        let tags = mon.visible_tags();
        let n = mon
            .clients
            .iter()
            .filter(|id| {
                self.state
                    .clients
                    .get(*id)
                    .map(|c| c.is_visible_on(tags))
                    .unwrap_or(false)
            })
            .count();

        if n > 0 {
            self.state.monitors[m].lt_symbol = format!("[{n}]");
        }

        for id in tiled(&self.state.monitors[m], &self.state.clients) {
            let bw = self.client_bw(id);
            self.resize(id, Rect::new(ws.x, ws.y, ws.w - 2 * bw, ws.h - 2 * bw), false)?;
        }

        Ok(())
    }

    // Masters in a row across the top; the remaining clients share the
    // bottom region, divided by width (`horiz == false`) or stacked as
    // full width rows (`horiz == true`).
    fn bottom_stack(&mut self, m: usize, horiz: bool) -> Result<()> {
        let mon = &self.state.monitors[m];
        let ws = mon.work;
        let (mfact, nmaster) = (mon.mfact, mon.nmaster as i32);
        let ids = tiled(mon, &self.state.clients);
        let n = ids.len() as i32;

        if n == 0 {
            return Ok(());
        }

        let (mh, tw, th) = if n > nmaster {
            let mh = if nmaster > 0 {
                (ws.h as f32 * mfact) as i32
            } else {
                0
            };
            let tw = if horiz { ws.w } else { ws.w / (n - nmaster) };
            let th = if horiz { (ws.h - mh) / (n - nmaster) } else { 0 };

            (mh, tw, th)
        } else {
            (ws.h, ws.w, ws.h)
        };

        let mut mx = 0;
        let mut tx = ws.x;
        let mut ty = ws.y + mh;

        for (i, id) in ids.iter().enumerate() {
            let i = i as i32;
            let bw = self.client_bw(*id);

            if i < nmaster {
                let w = (ws.w - mx) / (n.min(nmaster) - i);
                let r = Rect::new(ws.x + mx, ws.y, w - 2 * bw, mh - 2 * bw);
                self.resize(*id, r, false)?;
                mx += self.client_total_w(*id);
            } else if horiz {
                let r = Rect::new(tx, ty, ws.w - 2 * bw, th - 2 * bw);
                self.resize(*id, r, false)?;
                if th != ws.h {
                    ty += self.client_total_h(*id);
                }
            } else {
                let h = ws.h - mh;
                let r = Rect::new(tx, ty, tw - 2 * bw, h - 2 * bw);
                self.resize(*id, r, false)?;
                if tw != ws.w {
                    tx += self.client_total_w(*id);
                }
            }
        }

        Ok(())
    }

    fn client_bw(&self, id: Xid) -> i32 {
        self.state.clients.get(&id).map(|c| c.bw).unwrap_or(0)
    }

    fn client_total_w(&self, id: Xid) -> i32 {
        self.state.clients.get(&id).map(|c| c.total_w()).unwrap_or(0)
    }

    fn client_total_h(&self, id: Xid) -> i32 {
        self.state.clients.get(&id).map(|c| c.total_h()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x::mock::test_wm_with_clients;

    // work area is 1920x1080 in the test config (bar hidden)

    #[test]
    fn tile_two_clients_with_gaps() {
        // nmaster=1, mfact=0.55, gap=6, bw=1
        let mut wm = test_wm_with_clients(2);
        let (a, b) = (Xid(1), Xid(2));

        wm.arrange(Some(0)).expect("arrange");

        // oldest client is the master: attach order is reversed so client
        // ids walk newest-first and the master slot goes to Xid(2)
        let master = wm.state().clients[&b].rect();
        let stack = wm.state().clients[&a].rect();

        assert_eq!(master, Rect::new(6, 6, 1042, 1066));
        assert_eq!(stack, Rect::new(1062, 6, 850, 1066));
    }

    #[test]
    fn tile_single_client_fills_the_work_area_borderless() {
        let mut wm = test_wm_with_clients(1);

        wm.arrange(Some(0)).expect("arrange");

        // one tiled client: no gap, no border
        assert_eq!(wm.state().clients[&Xid(1)].rect(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(wm.conn().configured_border(Xid(1)), Some(0));
    }

    #[test]
    fn monocle_single_client_fills_the_work_area_borderless() {
        let mut wm = test_wm_with_clients(1);
        wm.set_layout_by_symbol("[M]");

        wm.arrange(Some(0)).expect("arrange");

        assert_eq!(wm.state().clients[&Xid(1)].rect(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(wm.conn().configured_border(Xid(1)), Some(0));
        assert_eq!(wm.state().monitors()[0].lt_symbol, "[1]");
    }

    #[test]
    fn monocle_stacks_all_clients_on_the_full_work_area() {
        let mut wm = test_wm_with_clients(3);
        wm.set_layout_by_symbol("[M]");

        wm.arrange(Some(0)).expect("arrange");

        for n in 1..=3 {
            assert_eq!(wm.state().clients[&Xid(n)].rect(), Rect::new(0, 0, 1920, 1080));
        }
        assert_eq!(wm.state().monitors()[0].lt_symbol, "[3]");
    }

    #[test]
    fn bottom_stack_splits_masters_above_stack() {
        let mut wm = test_wm_with_clients(3);
        wm.set_layout_by_symbol("TTT");

        wm.arrange(Some(0)).expect("arrange");

        let master = wm.state().clients[&Xid(3)].rect();
        let s1 = wm.state().clients[&Xid(2)].rect();
        let s2 = wm.state().clients[&Xid(1)].rect();

        // master row height is mfact * wh = 594
        assert_eq!(master, Rect::new(6, 6, 1906, 580));
        // stack row shares the remaining height, split across the width
        assert_eq!(s1, Rect::new(6, 600, 946, 472));
        assert_eq!(s2, Rect::new(954, 600, 946, 472));
    }

    #[test]
    fn bottom_stack_horiz_stacks_rows_below_masters() {
        let mut wm = test_wm_with_clients(3);
        wm.set_layout_by_symbol("===");

        wm.arrange(Some(0)).expect("arrange");

        let master = wm.state().clients[&Xid(3)].rect();
        let s1 = wm.state().clients[&Xid(2)].rect();
        let s2 = wm.state().clients[&Xid(1)].rect();

        assert_eq!(master, Rect::new(6, 6, 1906, 580));
        assert_eq!(s1, Rect::new(6, 600, 1906, 229));
        assert_eq!(s2, Rect::new(6, 831, 1906, 229));
    }

    #[test]
    fn tiled_clients_stay_inside_the_gap_expanded_work_area() {
        for (symbol, n) in [("[]=", 5), ("TTT", 4), ("===", 4), ("[M]", 3)] {
            let mut wm = test_wm_with_clients(n);
            wm.set_layout_by_symbol(symbol);

            wm.arrange(Some(0)).expect("arrange");

            let work = wm.state().monitors()[0].work;
            for c in wm.state().clients.values() {
                let r = c.rect();
                // the border that actually went to the server: monocle and
                // single-client tiles are configured borderless
                let bw = wm.conn().configured_border(c.win()).unwrap_or(c.bw);
                assert!(r.x >= work.x, "{symbol}: x {} < {}", r.x, work.x);
                assert!(r.y >= work.y, "{symbol}: y {} < {}", r.y, work.y);
                assert!(
                    r.right() + 2 * bw <= work.right(),
                    "{symbol}: right {} > {}",
                    r.right(),
                    work.right()
                );
                assert!(
                    r.bottom() + 2 * bw <= work.bottom(),
                    "{symbol}: bottom {} > {}",
                    r.bottom(),
                    work.bottom()
                );
            }
        }
    }

    #[test]
    fn tiled_clients_do_not_overlap() {
        for (symbol, n) in [("[]=", 5), ("TTT", 4), ("===", 4)] {
            let mut wm = test_wm_with_clients(n);
            wm.set_layout_by_symbol(symbol);

            wm.arrange(Some(0)).expect("arrange");

            let rects: Vec<Rect> = wm.state().clients.values().map(|c| c.rect()).collect();
            for (i, a) in rects.iter().enumerate() {
                for b in rects.iter().skip(i + 1) {
                    assert_eq!(
                        a.intersection_area(b),
                        0,
                        "{symbol}: {a:?} overlaps {b:?}"
                    );
                }
            }
        }
    }
}
