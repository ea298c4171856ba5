//! The command primitives bound to keys and buttons.
use crate::{
    core::WindowManager,
    draw::Draw,
    pure::{geometry::Rect, monitor},
    util,
    x::{Atom, CursorKind, XConn, XEvent},
    Result, Xid,
};
use tracing::{debug, trace};

/// Motion events during interactive move / resize are limited to 60Hz.
const MOTION_INTERVAL_MS: u32 = 1000 / 60;

/// The argument a binding passes to its action.
///
/// Each [Action] documents which variant it consumes; the variance is
/// kept explicit rather than punning one payload through a union.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// No argument
    None,
    /// A signed quantity (directions, deltas)
    Int(i32),
    /// A tag bitmask
    UInt(u32),
    /// A fractional delta or absolute value
    Float(f32),
    /// An index into the layout table
    Layout(usize),
    /// A command vector to spawn
    Cmd(Vec<String>),
}

/// Every command primitive a binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Focus the monitor in the direction of [Arg::Int]
    FocusMon,
    /// Cycle focus among visible clients by [Arg::Int]
    FocusStack,
    /// Adjust the master count by [Arg::Int]
    IncNMaster,
    /// Close the focused client ([Arg::None])
    KillClient,
    /// Interactively move the focused client ([Arg::None])
    MoveMouse,
    /// Terminate the event loop ([Arg::None])
    Quit,
    /// Interactively resize the focused client ([Arg::None])
    ResizeMouse,
    /// Install the layout at [Arg::Layout], or flip between the two most
    /// recent layouts on [Arg::None]
    SetLayout,
    /// Adjust the master factor by [Arg::Float]
    SetMfact,
    /// Run the command in [Arg::Cmd]
    Spawn,
    /// Move the focused client to the tags in [Arg::UInt]
    Tag,
    /// Send the focused client to the monitor in direction [Arg::Int]
    TagMon,
    /// Show / hide the bar on the focused monitor ([Arg::None])
    ToggleBar,
    /// Toggle the floating state of the focused client ([Arg::None])
    ToggleFloating,
    /// XOR the focused client's tags with [Arg::UInt]
    ToggleTag,
    /// XOR the viewed tagset with [Arg::UInt]
    ToggleView,
    /// View the tags in [Arg::UInt] (0 swaps to the previous view)
    View,
    /// Promote the focused client to master ([Arg::None])
    Zoom,
}

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    pub(crate) fn run_action(&mut self, action: Action, arg: &Arg) -> Result<()> {
        trace!(?action, ?arg, "running bound action");

        match (action, arg) {
            (Action::FocusMon, Arg::Int(i)) => self.focus_mon(*i),
            (Action::FocusStack, Arg::Int(i)) => self.focus_stack(*i),
            (Action::IncNMaster, Arg::Int(i)) => self.inc_nmaster(*i),
            (Action::KillClient, _) => self.kill_client(),
            (Action::MoveMouse, _) => self.move_mouse(),
            (Action::Quit, _) => self.quit(),
            (Action::ResizeMouse, _) => self.resize_mouse(),
            (Action::SetLayout, Arg::Layout(i)) => self.set_layout(Some(*i)),
            (Action::SetLayout, _) => self.set_layout(None),
            (Action::SetMfact, Arg::Float(f)) => self.set_mfact(*f),
            (Action::Spawn, Arg::Cmd(cmd)) => self.spawn(cmd.clone()),
            (Action::Tag, Arg::UInt(mask)) => self.tag(*mask),
            (Action::TagMon, Arg::Int(i)) => self.tag_mon(*i),
            (Action::ToggleBar, _) => self.toggle_bar(),
            (Action::ToggleFloating, _) => self.toggle_floating(),
            (Action::ToggleTag, Arg::UInt(mask)) => self.toggle_tag(*mask),
            (Action::ToggleView, Arg::UInt(mask)) => self.toggle_view(*mask),
            (Action::View, Arg::UInt(mask)) => self.view(*mask),
            (Action::Zoom, _) => self.zoom(),
            (action, arg) => {
                debug!(?action, ?arg, "action called with an argument it does not consume");
                Ok(())
            }
        }
    }

    /// Swap the current tagset for `mask`, or for the previous view when
    /// `mask` is zero.
    pub fn view(&mut self, mask: u32) -> Result<()> {
        let tm = self.tag_mask();
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];

        if (mask & tm) == mon.visible_tags() {
            return Ok(());
        }

        mon.sel_tags ^= 1;
        if mask & tm != 0 {
            mon.tagset[mon.sel_tags] = mask & tm;
        }

        self.focus(None)?;
        self.arrange(Some(m))
    }

    /// XOR the current tagset with `mask`, refusing to empty it.
    pub fn toggle_view(&mut self, mask: u32) -> Result<()> {
        let tm = self.tag_mask();
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];
        let newtags = mon.visible_tags() ^ (mask & tm);

        if newtags == 0 {
            return Ok(());
        }

        let sel_tags = mon.sel_tags;
        mon.tagset[sel_tags] = newtags;
        self.focus(None)?;
        self.arrange(Some(m))
    }

    /// Replace the focused client's tags with `mask`.
    pub fn tag(&mut self, mask: u32) -> Result<()> {
        let tm = self.tag_mask();
        let m = self.state.sel_mon;

        if let Some(sel) = self.state.monitors[m].sel {
            if mask & tm != 0 {
                if let Some(c) = self.state.clients.get_mut(&sel) {
                    c.tags = mask & tm;
                }
                self.focus(None)?;
                self.arrange(Some(m))?;
            }
        }

        Ok(())
    }

    /// XOR the focused client's tags with `mask`; a client always keeps at
    /// least one tag.
    pub fn toggle_tag(&mut self, mask: u32) -> Result<()> {
        let tm = self.tag_mask();
        let m = self.state.sel_mon;
        let Some(sel) = self.state.monitors[m].sel else {
            return Ok(());
        };

        let Some(c) = self.state.clients.get_mut(&sel) else {
            return Ok(());
        };

        let newtags = c.tags ^ (mask & tm);
        if newtags != 0 {
            c.tags = newtags;
            self.focus(None)?;
            self.arrange(Some(m))?;
        }

        Ok(())
    }

    /// Cycle focus through the visible clients of the selected monitor in
    /// client list order.
    pub fn focus_stack(&mut self, dir: i32) -> Result<()> {
        let m = self.state.sel_mon;
        let mon = &self.state.monitors[m];
        let Some(sel) = mon.sel else {
            return Ok(());
        };

        let tags = mon.visible_tags();
        let visible: Vec<Xid> = mon
            .clients
            .iter()
            .copied()
            .filter(|id| {
                self.state
                    .clients
                    .get(id)
                    .map(|c| c.is_visible_on(tags))
                    .unwrap_or(false)
            })
            .collect();

        let Some(pos) = visible.iter().position(|&id| id == sel) else {
            return Ok(());
        };

        let len = visible.len();
        let next = if dir > 0 {
            visible[(pos + 1) % len]
        } else {
            visible[(pos + len - 1) % len]
        };

        self.focus(Some(next))?;
        self.restack(m)
    }

    /// Adjust how many clients the master area holds.
    pub fn inc_nmaster(&mut self, delta: i32) -> Result<()> {
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];
        mon.nmaster = 0.max(mon.nmaster as i32 + delta) as u32;

        self.arrange(Some(m))
    }

    /// Adjust the master area factor.
    ///
    /// A fractional argument is a delta (positive grows the master area);
    /// `1.0 + f` sets the factor to `f` absolutely. The result is clamped
    /// to [0.10, 0.90]. No-op under a floating layout.
    pub fn set_mfact(&mut self, f: f32) -> Result<()> {
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];

        if self.state.config.layouts[mon.lt[mon.sel_lt]].arrange.is_none() {
            return Ok(());
        }

        let f = if f < 1.0 { mon.mfact + f } else { f - 1.0 };
        mon.mfact = f.clamp(0.1, 0.9);

        self.arrange(Some(m))
    }

    /// Install the layout at index `lt`, or flip back to the previous
    /// layout when `lt` is `None`.
    pub fn set_layout(&mut self, lt: Option<usize>) -> Result<()> {
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];

        if lt.is_none() || lt != Some(mon.layout_index()) {
            mon.sel_lt ^= 1;
        }
        if let Some(i) = lt {
            if i < self.state.config.layouts.len() {
                let sel_lt = mon.sel_lt;
                mon.lt[sel_lt] = i;
            }
        }
        let mon = &mut self.state.monitors[m];
        mon.lt_symbol = self.state.config.layouts[mon.layout_index()].symbol.to_string();

        if self.state.monitors[m].sel.is_some() {
            self.arrange(Some(m))
        } else {
            self.draw_bar(m)
        }
    }

    /// Promote the focused client (or its successor if it already is the
    /// master) to the head of the client list.
    pub fn zoom(&mut self) -> Result<()> {
        let m = self.state.sel_mon;
        let mon = &self.state.monitors[m];
        let Some(sel) = mon.sel else {
            return Ok(());
        };

        let floating_layout = self.state.config.layouts[mon.layout_index()].arrange.is_none();
        let sel_floating = self
            .state
            .clients
            .get(&sel)
            .map(|c| c.is_floating)
            .unwrap_or(false);

        if floating_layout || sel_floating {
            return Ok(());
        }

        let tiled = monitor::tiled(mon, &self.state.clients);
        let target = if tiled.first() == Some(&sel) {
            match tiled.get(1) {
                Some(&id) => id,
                None => return Ok(()),
            }
        } else {
            sel
        };

        self.pop(target)
    }

    /// Politely ask the focused client to close, killing it through the
    /// server if it does not speak WM_DELETE_WINDOW.
    pub fn kill_client(&mut self) -> Result<()> {
        let Some(sel) = self.state.monitors[self.state.sel_mon].sel else {
            return Ok(());
        };

        if self.x.supports_protocol(sel, Atom::WmDeleteWindow)? {
            self.x.send_protocol_message(sel, Atom::WmDeleteWindow)
        } else {
            self.x.kill_client(sel)
        }
    }

    /// Show or hide the bar on the selected monitor.
    pub fn toggle_bar(&mut self) -> Result<()> {
        let bh = self.state.bar_height;
        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];

        mon.show_bar = !mon.show_bar;
        mon.update_bar_pos(bh);
        let r = Rect::new(mon.work.x, mon.bar_y, mon.work.w, bh);
        let bar_win = mon.bar_win;
        self.x.move_resize_window(bar_win, r)?;

        self.arrange(Some(m))
    }

    /// Toggle the floating state of the focused client. Refused for
    /// fullscreen clients; fixed-size clients always float.
    pub fn toggle_floating(&mut self) -> Result<()> {
        let m = self.state.sel_mon;
        let Some(sel) = self.state.monitors[m].sel else {
            return Ok(());
        };

        let Some(c) = self.state.clients.get_mut(&sel) else {
            return Ok(());
        };

        if c.is_fullscreen {
            return Ok(());
        }

        c.is_floating = !c.is_floating || c.is_fixed;
        if c.is_floating {
            let r = c.rect();
            self.resize(sel, r, false)?;
        }

        self.arrange(Some(m))
    }

    /// Switch selection to the monitor in direction `dir`.
    pub fn focus_mon(&mut self, dir: i32) -> Result<()> {
        if self.state.monitors.len() <= 1 {
            return Ok(());
        }

        let m = self.dir_to_monitor(dir);
        if m == self.state.sel_mon {
            return Ok(());
        }

        if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
            self.unfocus(sel, false)?;
        }
        self.state.sel_mon = m;
        self.focus(None)?;
        self.warp_to_selected()
    }

    /// Send the focused client to the monitor in direction `dir`.
    pub fn tag_mon(&mut self, dir: i32) -> Result<()> {
        if self.state.monitors.len() <= 1 {
            return Ok(());
        }

        if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
            let target = self.dir_to_monitor(dir);
            self.send_to_monitor(sel, target)?;
        }

        Ok(())
    }

    /// Run an external command, detached from the window manager.
    ///
    /// Spawning the configured launcher appends the selected monitor
    /// number so that its menu opens on the right output.
    pub fn spawn(&mut self, mut cmd: Vec<String>) -> Result<()> {
        if cmd == self.state.config.launcher {
            let num = self.state.monitors[self.state.sel_mon].num;
            cmd.push("-m".to_string());
            cmd.push(num.to_string());
        }

        util::spawn(&cmd)
    }

    /// Flag the event loop to terminate cleanly.
    pub fn quit(&mut self) -> Result<()> {
        self.state.running = false;

        Ok(())
    }

    // Directional cyclic monitor lookup: +1 is the next monitor, -1 the
    // previous one.
    fn dir_to_monitor(&self, dir: i32) -> usize {
        let len = self.state.monitors.len();
        let m = self.state.sel_mon;

        if dir > 0 {
            (m + 1) % len
        } else {
            (m + len - 1) % len
        }
    }

    /// Drag the focused client with the pointer, snapping to the work
    /// area edges and pulling tiled clients out into the floating layer
    /// once they move far enough.
    pub fn move_mouse(&mut self) -> Result<()> {
        let m = self.state.sel_mon;
        let Some(id) = self.state.monitors[m].sel else {
            return Ok(());
        };

        let Some((ocx, ocy)) = self
            .state
            .clients
            .get(&id)
            .filter(|c| !c.is_fullscreen)
            .map(|c| (c.x, c.y))
        else {
            return Ok(());
        };

        self.restack(m)?;

        if !self.x.grab_pointer(CursorKind::Move)? {
            return Ok(());
        }

        let origin = self.x.cursor_position()?;
        let mut last_motion = 0u32;

        loop {
            match self.x.next_event()? {
                XEvent::ConfigureRequest(e) => self.configure_request(&e)?,
                XEvent::Expose(e) => self.expose(&e)?,
                XEvent::MapRequest(w) => self.map_request(w)?,
                XEvent::Motion(ev) => {
                    if ev.time.wrapping_sub(last_motion) <= MOTION_INTERVAL_MS {
                        continue;
                    }
                    last_motion = ev.time;

                    let Some(c) = self.state.clients.get(&id) else {
                        break;
                    };

                    let snap = self.state.config.snap;
                    let work = self.state.monitors[self.state.sel_mon].work;
                    let mut nx = ocx + (ev.abs.x - origin.x);
                    let mut ny = ocy + (ev.abs.y - origin.y);

                    if (work.x - nx).abs() < snap {
                        nx = work.x;
                    } else if ((work.right()) - (nx + c.total_w())).abs() < snap {
                        nx = work.right() - c.total_w();
                    }
                    if (work.y - ny).abs() < snap {
                        ny = work.y;
                    } else if ((work.bottom()) - (ny + c.total_h())).abs() < snap {
                        ny = work.bottom() - c.total_h();
                    }

                    let tiled_drag = !c.is_floating
                        && self.active_arranger().is_some()
                        && ((nx - c.x).abs() > snap || (ny - c.y).abs() > snap);
                    if tiled_drag {
                        self.toggle_floating()?;
                    }

                    let Some(c) = self.state.clients.get(&id) else {
                        break;
                    };
                    if self.active_arranger().is_none() || c.is_floating {
                        let (w, h) = (c.w, c.h);
                        self.resize(id, Rect::new(nx, ny, w, h), true)?;
                    }
                }
                XEvent::ButtonRelease(_) => break,
                _ => (),
            }
        }

        self.x.ungrab_pointer()?;
        self.drop_on_monitor(id)
    }

    /// Resize the focused client by dragging its bottom-right corner.
    pub fn resize_mouse(&mut self) -> Result<()> {
        let m = self.state.sel_mon;
        let Some(id) = self.state.monitors[m].sel else {
            return Ok(());
        };

        let Some((ocx, ocy)) = self
            .state
            .clients
            .get(&id)
            .filter(|c| !c.is_fullscreen)
            .map(|c| (c.x, c.y))
        else {
            return Ok(());
        };

        self.restack(m)?;

        if !self.x.grab_pointer(CursorKind::Resize)? {
            return Ok(());
        }
        self.warp_to_resize_corner(id)?;

        let mut last_motion = 0u32;

        loop {
            match self.x.next_event()? {
                XEvent::ConfigureRequest(e) => self.configure_request(&e)?,
                XEvent::Expose(e) => self.expose(&e)?,
                XEvent::MapRequest(w) => self.map_request(w)?,
                XEvent::Motion(ev) => {
                    if ev.time.wrapping_sub(last_motion) <= MOTION_INTERVAL_MS {
                        continue;
                    }
                    last_motion = ev.time;

                    let Some(c) = self.state.clients.get(&id) else {
                        break;
                    };

                    let nw = 1.max(ev.abs.x - ocx - 2 * c.bw + 1);
                    let nh = 1.max(ev.abs.y - ocy - 2 * c.bw + 1);

                    let sel_work = self.state.monitors[self.state.sel_mon].work;
                    let mon_work = self.state.monitors[c.mon].work;
                    let inside = mon_work.x + nw >= sel_work.x
                        && mon_work.x + nw <= sel_work.right()
                        && mon_work.y + nh >= sel_work.y
                        && mon_work.y + nh <= sel_work.bottom();

                    let snap = self.state.config.snap;
                    if inside
                        && !c.is_floating
                        && self.active_arranger().is_some()
                        && ((nw - c.w).abs() > snap || (nh - c.h).abs() > snap)
                    {
                        self.toggle_floating()?;
                    }

                    let Some(c) = self.state.clients.get(&id) else {
                        break;
                    };
                    if self.active_arranger().is_none() || c.is_floating {
                        let (x, y) = (c.x, c.y);
                        self.resize(id, Rect::new(x, y, nw, nh), true)?;
                    }
                }
                XEvent::ButtonRelease(_) => break,
                _ => (),
            }
        }

        self.warp_to_resize_corner(id)?;
        self.x.ungrab_pointer()?;
        self.x.drain_crossing_events()?;
        self.drop_on_monitor(id)
    }

    fn warp_to_resize_corner(&mut self, id: Xid) -> Result<()> {
        if let Some(c) = self.state.clients.get(&id) {
            self.x
                .warp_pointer(id, (c.w + c.bw - 1) as i16, (c.h + c.bw - 1) as i16)?;
        }

        Ok(())
    }

    // A drag may have moved the client onto a different monitor: transfer
    // it and follow with selection if so.
    fn drop_on_monitor(&mut self, id: Xid) -> Result<()> {
        let Some(c) = self.state.clients.get(&id) else {
            return Ok(());
        };

        let r = c.rect();
        let target = monitor::monitor_at(&self.state.monitors, self.state.sel_mon, r);
        if target != self.state.sel_mon {
            self.send_to_monitor(id, target)?;
            self.state.sel_mon = target;
            self.focus(None)?;
        }

        Ok(())
    }

    pub(crate) fn active_arranger(&self) -> Option<crate::layout::ArrangeKind> {
        let mon = &self.state.monitors[self.state.sel_mon];

        self.state.config.layouts[mon.layout_index()].arrange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x::mock::test_wm_with_clients;

    #[test]
    fn view_then_view_back_restores_tagset_and_selection() {
        let mut wm = test_wm_with_clients(2);
        let before_tags = wm.state().monitors()[0].visible_tags();
        let before_sel = wm.state().focused_client();

        wm.view(1 << 3).expect("view");

        assert_eq!(wm.state().monitors()[0].visible_tags(), 1 << 3);
        assert_eq!(wm.state().focused_client(), None);

        // a zero mask swaps back to the previous view
        wm.view(0).expect("view back");

        assert_eq!(wm.state().monitors()[0].visible_tags(), before_tags);
        assert_eq!(wm.state().focused_client(), before_sel);
    }

    #[test]
    fn viewing_the_current_tagset_is_a_noop() {
        let mut wm = test_wm_with_clients(1);
        let sel_tags = wm.state().monitors()[0].sel_tags;

        wm.view(1).expect("view");

        assert_eq!(wm.state().monitors()[0].sel_tags, sel_tags);
    }

    #[test]
    fn toggle_view_refuses_to_empty_the_tagset() {
        let mut wm = test_wm_with_clients(1);

        wm.toggle_view(1).expect("toggle");

        assert_eq!(wm.state().monitors()[0].visible_tags(), 1);
    }

    #[test]
    fn set_mfact_zero_is_a_noop() {
        let mut wm = test_wm_with_clients(2);
        let before = wm.state().monitors()[0].mfact;

        wm.set_mfact(0.0).expect("set_mfact");

        assert!((wm.state().monitors()[0].mfact - before).abs() < 1e-6);
    }

    #[test]
    fn set_mfact_round_trips_when_unclamped() {
        let mut wm = test_wm_with_clients(2);
        let before = wm.state().monitors()[0].mfact;

        wm.set_mfact(0.2).expect("grow");
        wm.set_mfact(-0.2).expect("shrink");

        assert!((wm.state().monitors()[0].mfact - before).abs() < 1e-5);
    }

    #[test]
    fn set_mfact_sets_absolutely_past_one() {
        let mut wm = test_wm_with_clients(2);

        wm.set_mfact(1.0 + 0.3).expect("set absolute");

        assert!((wm.state().monitors()[0].mfact - 0.3).abs() < 1e-6);
    }

    #[test]
    fn set_mfact_clamps_to_bounds() {
        let mut wm = test_wm_with_clients(2);

        wm.set_mfact(-0.9).expect("shrink far");
        assert!((wm.state().monitors()[0].mfact - 0.1).abs() < 1e-6);

        wm.set_mfact(0.95).expect("grow far");
        assert!((wm.state().monitors()[0].mfact - 0.9).abs() < 1e-6);
    }

    #[test]
    fn zoom_promotes_the_focused_client_to_master() {
        let mut wm = test_wm_with_clients(3);

        wm.focus(Some(Xid(1))).expect("focus");
        wm.zoom().expect("zoom");

        assert_eq!(wm.state().monitors()[0].clients[0], Xid(1));
        assert_eq!(wm.state().focused_client(), Some(Xid(1)));
    }

    #[test]
    fn zoom_on_the_master_promotes_its_successor() {
        let mut wm = test_wm_with_clients(3);

        // creation order attach means the client list is [3, 2, 1] and
        // the freshly managed client 3 is both master and focused
        assert_eq!(wm.state().focused_client(), Some(Xid(3)));
        wm.zoom().expect("zoom");

        assert_eq!(wm.state().monitors()[0].clients, vec![Xid(2), Xid(3), Xid(1)]);
        assert_eq!(wm.state().focused_client(), Some(Xid(2)));
    }

    #[test]
    fn focus_stack_cycles_visible_clients() {
        let mut wm = test_wm_with_clients(3);

        assert_eq!(wm.state().focused_client(), Some(Xid(3)));

        wm.focus_stack(1).expect("next");
        assert_eq!(wm.state().focused_client(), Some(Xid(2)));

        wm.focus_stack(-1).expect("prev");
        assert_eq!(wm.state().focused_client(), Some(Xid(3)));

        wm.focus_stack(-1).expect("wrap");
        assert_eq!(wm.state().focused_client(), Some(Xid(1)));
    }

    #[test]
    fn inc_nmaster_floors_at_zero() {
        let mut wm = test_wm_with_clients(1);

        wm.inc_nmaster(-5).expect("dec");
        assert_eq!(wm.state().monitors()[0].nmaster, 0);

        wm.inc_nmaster(2).expect("inc");
        assert_eq!(wm.state().monitors()[0].nmaster, 2);
    }

    #[test]
    fn toggle_tag_keeps_at_least_one_tag() {
        let mut wm = test_wm_with_clients(1);

        wm.toggle_tag(1).expect("toggle only tag");

        assert_eq!(wm.state().clients[&Xid(1)].tags, 1);
    }

    #[test]
    fn tag_retags_the_focused_client() {
        let mut wm = test_wm_with_clients(2);

        wm.tag(1 << 2).expect("tag");

        // the previously focused client is no longer visible so focus
        // falls back to the remaining one
        assert_eq!(wm.state().clients[&Xid(2)].tags, 1 << 2);
        assert_eq!(wm.state().focused_client(), Some(Xid(1)));
    }

    #[test]
    fn set_layout_none_flips_between_recent_layouts() {
        let mut wm = test_wm_with_clients(1);

        wm.set_layout(Some(2)).expect("monocle");
        assert_eq!(wm.state().monitors()[0].lt_symbol, "[1]");

        wm.set_layout(None).expect("flip back");
        assert_eq!(wm.state().monitors()[0].layout_index(), 0);
    }
}
