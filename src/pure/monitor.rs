//! The monitor record and its two client orderings
use crate::{
    pure::{client::Client, geometry::Rect},
    Xid,
};
use std::collections::HashMap;

/// The arena of managed clients, keyed by window id.
///
/// Monitors refer into this map via the ids held in their two lists.
pub type ClientMap = HashMap<Xid, Client>;

/// A physical output, or the whole screen when multi-head is unavailable.
///
/// Each monitor owns two orderings over the same set of clients:
/// `clients` is creation order (new clients are prepended) and drives
/// layout placement, `stack` is most-recently-focused order and drives
/// focus fallback and restacking. Every client of this monitor appears in
/// both exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub(crate) num: i32,
    pub(crate) lt_symbol: String,
    pub(crate) mfact: f32,
    pub(crate) nmaster: u32,
    pub(crate) bar_win: Xid,
    pub(crate) bar_y: i32,
    /// Full output geometry
    pub(crate) screen: Rect,
    /// Output geometry minus the bar
    pub(crate) work: Rect,
    pub(crate) sel_tags: usize,
    pub(crate) sel_lt: usize,
    pub(crate) tagset: [u32; 2],
    pub(crate) show_bar: bool,
    pub(crate) top_bar: bool,
    pub(crate) clients: Vec<Xid>,
    pub(crate) stack: Vec<Xid>,
    pub(crate) sel: Option<Xid>,
    /// Indices into the configured layout table
    pub(crate) lt: [usize; 2],
}

impl Monitor {
    pub(crate) fn new(
        mfact: f32,
        nmaster: u32,
        show_bar: bool,
        top_bar: bool,
        lt_symbol: String,
    ) -> Self {
        Self {
            num: 0,
            lt_symbol,
            mfact,
            nmaster,
            bar_win: Xid(0),
            bar_y: 0,
            screen: Rect::default(),
            work: Rect::default(),
            sel_tags: 0,
            sel_lt: 0,
            tagset: [1, 1],
            show_bar,
            top_bar,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            lt: [0, 1],
        }
    }

    /// The tag mask currently selected for viewing on this monitor.
    pub fn visible_tags(&self) -> u32 {
        self.tagset[self.sel_tags]
    }

    /// The index of the active layout in the configured layout table.
    pub fn layout_index(&self) -> usize {
        self.lt[self.sel_lt]
    }

    /// Prepend a client to the layout-order list.
    pub(crate) fn attach(&mut self, win: Xid) {
        self.clients.insert(0, win);
    }

    /// Remove a client from the layout-order list.
    pub(crate) fn detach(&mut self, win: Xid) {
        self.clients.retain(|&id| id != win);
    }

    /// Prepend a client to the focus-order stack.
    pub(crate) fn attach_stack(&mut self, win: Xid) {
        self.stack.insert(0, win);
    }

    /// Remove a client from the focus-order stack.
    ///
    /// If the removed client was this monitor's selected client, selection
    /// falls back to the first remaining stack entry that `is_visible`
    /// reports as shown, or to nothing.
    pub(crate) fn detach_stack<F>(&mut self, win: Xid, is_visible: F)
    where
        F: Fn(Xid) -> bool,
    {
        self.stack.retain(|&id| id != win);

        if self.sel == Some(win) {
            self.sel = self.stack.iter().copied().find(|&id| is_visible(id));
        }
    }

    /// Recompute the work area and bar position from the screen area.
    pub(crate) fn update_bar_pos(&mut self, bar_h: i32) {
        self.work = self.screen;

        if self.show_bar {
            self.work.h -= bar_h;
            if self.top_bar {
                self.bar_y = self.work.y;
                self.work.y += bar_h;
            } else {
                self.bar_y = self.work.bottom();
            }
        } else {
            self.bar_y = -bar_h;
        }
    }
}

/// The clients a layout arranges: visible and not floating, in creation
/// order.
pub(crate) fn tiled(m: &Monitor, clients: &ClientMap) -> Vec<Xid> {
    m.clients
        .iter()
        .copied()
        .filter(|id| {
            clients
                .get(id)
                .map(|c| !c.is_floating && c.is_visible_on(m.visible_tags()))
                .unwrap_or(false)
        })
        .collect()
}

/// The index of the monitor owning the largest share of `r`.
///
/// Falls back to `default` when nothing overlaps.
pub(crate) fn monitor_at(monitors: &[Monitor], default: usize, r: Rect) -> usize {
    let mut best = default;
    let mut area = 0;

    for (i, m) in monitors.iter().enumerate() {
        let a = m.screen.intersection_area(&r);
        if a > area {
            area = a;
            best = i;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn monitor() -> Monitor {
        let mut m = Monitor::new(0.55, 1, true, true, "[]=".to_string());
        m.screen = Rect::new(0, 0, 1920, 1080);
        m.update_bar_pos(20);

        m
    }

    fn client(win: u32, tags: u32, floating: bool) -> Client {
        let mut c = Client::new(Xid(win), Rect::new(0, 0, 100, 100), 1);
        c.tags = tags;
        c.is_floating = floating;

        c
    }

    #[test]
    fn attach_prepends() {
        let mut m = monitor();
        m.attach(Xid(1));
        m.attach(Xid(2));
        m.attach(Xid(3));

        assert_eq!(m.clients, vec![Xid(3), Xid(2), Xid(1)]);
    }

    #[test]
    fn detach_removes_exactly_one_entry() {
        let mut m = monitor();
        for n in 1..=3 {
            m.attach(Xid(n));
            m.attach_stack(Xid(n));
        }

        m.detach(Xid(2));
        m.detach_stack(Xid(2), |_| true);

        assert_eq!(m.clients, vec![Xid(3), Xid(1)]);
        assert_eq!(m.stack, vec![Xid(3), Xid(1)]);
    }

    #[test]
    fn detach_stack_reselects_first_visible_successor() {
        let mut m = monitor();
        for n in 1..=3 {
            m.attach_stack(Xid(n));
        }
        m.sel = Some(Xid(3));

        // stack is [3, 2, 1] and 2 is not visible
        m.detach_stack(Xid(3), |id| id != Xid(2));

        assert_eq!(m.sel, Some(Xid(1)));
    }

    #[test]
    fn detach_stack_leaves_unrelated_selection_alone() {
        let mut m = monitor();
        for n in 1..=3 {
            m.attach_stack(Xid(n));
        }
        m.sel = Some(Xid(1));

        m.detach_stack(Xid(2), |_| true);

        assert_eq!(m.sel, Some(Xid(1)));
    }

    #[test_case(true, true, 0, Rect::new(0, 20, 1920, 1060); "top bar")]
    #[test_case(true, false, 1060, Rect::new(0, 0, 1920, 1060); "bottom bar")]
    #[test_case(false, true, -20, Rect::new(0, 0, 1920, 1080); "hidden bar")]
    #[test]
    fn bar_position(show: bool, top: bool, expected_bar_y: i32, expected_work: Rect) {
        let mut m = monitor();
        m.show_bar = show;
        m.top_bar = top;

        m.update_bar_pos(20);

        assert_eq!(m.bar_y, expected_bar_y);
        assert_eq!(m.work, expected_work);
    }

    #[test]
    fn tiled_filters_floating_and_invisible() {
        let mut m = monitor();
        let mut cs = ClientMap::new();

        for (n, tags, floating) in [(1, 1, false), (2, 1, true), (3, 2, false), (4, 1, false)] {
            cs.insert(Xid(n), client(n, tags, floating));
            m.attach(Xid(n));
        }

        // attach order reversed: [4, 3, 2, 1]; 2 floats, 3 is on another tag
        assert_eq!(tiled(&m, &cs), vec![Xid(4), Xid(1)]);
    }

    #[test]
    fn monitor_at_picks_largest_overlap() {
        let mut left = monitor();
        left.screen = Rect::new(0, 0, 1920, 1080);
        let mut right = monitor();
        right.screen = Rect::new(1920, 0, 1920, 1080);

        let mons = vec![left, right];

        assert_eq!(monitor_at(&mons, 0, Rect::new(2000, 10, 100, 100)), 1);
        assert_eq!(monitor_at(&mons, 1, Rect::new(10, 10, 100, 100)), 0);
        // straddling: the larger share wins
        assert_eq!(monitor_at(&mons, 0, Rect::new(1870, 0, 200, 100)), 1);
        // no overlap at all: fall back to the default
        assert_eq!(monitor_at(&mons, 1, Rect::new(-500, -500, 10, 10)), 1);
    }
}
