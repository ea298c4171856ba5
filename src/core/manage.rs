//! Establishing and maintaining window manager state for client windows.
use crate::{
    core::{
        bindings::{ClickZone, KeyCode, ANY_MODIFIER, LOCK_MASK},
        WindowManager,
    },
    draw::Draw,
    pure::{
        client::Client,
        geometry::{Point, Rect},
        monitor::{monitor_at, tiled, Monitor},
    },
    x::{
        property::{WmHintsFlags, WmState},
        Atom, ClientAttr, Prop, WinType, XConn, XConnExt,
    },
    Result, Xid,
};
use tracing::{debug, info, trace};

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    /// The bitmask covering every configured tag.
    pub(crate) fn tag_mask(&self) -> u32 {
        (1 << self.state.config.tags.len()) - 1
    }

    pub(crate) fn is_managed(&self, win: Xid) -> bool {
        self.state.clients.contains_key(&win)
    }

    /// The monitor a given window belongs to.
    ///
    /// The root window resolves by pointer position, bar windows to their
    /// monitor, managed clients to theirs; anything else falls back to
    /// the selected monitor.
    pub(crate) fn window_to_monitor(&self, win: Xid) -> usize {
        if win == self.x.root() {
            if let Ok(p) = self.x.cursor_position() {
                return monitor_at(
                    &self.state.monitors,
                    self.state.sel_mon,
                    Rect::new(p.x, p.y, 1, 1),
                );
            }
        }

        if let Some(i) = self.state.monitors.iter().position(|m| m.bar_win == win) {
            return i;
        }

        self.state
            .clients
            .get(&win)
            .map(|c| c.mon)
            .unwrap_or(self.state.sel_mon)
    }

    /// Establish window manager state for a new client window.
    pub(crate) fn manage(&mut self, win: Xid) -> Result<()> {
        trace!(%win, "managing new client");
        let (r, old_bw) = self.x.client_geometry(win)?;
        let mut c = Client::new(win, r, old_bw);
        let name = self.x.window_title(win);
        c.set_name(&name);

        let trans = self.x.transient_for(win)?.filter(|t| self.is_managed(*t));
        match trans {
            Some(t) => {
                let tc = &self.state.clients[&t];
                c.mon = tc.mon;
                c.tags = tc.tags;
            }
            None => {
                c.mon = self.state.sel_mon;
                self.apply_rules(&mut c)?;
            }
        }

        // keep the starting geometry on the assigned monitor, clear of
        // the bar when the window's center sits over the work area
        let mon = &self.state.monitors[c.mon];
        if c.x + c.total_w() > mon.screen.right() {
            c.x = mon.screen.right() - c.total_w();
        }
        if c.y + c.total_h() > mon.screen.bottom() {
            c.y = mon.screen.bottom() - c.total_h();
        }
        c.x = c.x.max(mon.screen.x);
        let over_bar = mon.bar_y == mon.screen.y
            && c.x + c.w / 2 >= mon.work.x
            && c.x + c.w / 2 < mon.work.right();
        c.y = c.y.max(if over_bar {
            mon.screen.y + self.state.bar_height
        } else {
            mon.screen.y
        });
        c.bw = self.state.config.border_px;

        let m = c.mon;
        let rect = c.rect();
        let bw = c.bw;
        self.state.clients.insert(win, c);

        self.x.position_client(win, rect, bw)?;
        let border = self.state.config.normal_scheme.border.rgb_u32();
        self.x
            .set_client_attributes(win, &[ClientAttr::BorderColor(border)])?;
        self.x.send_configure_notify(win, rect, bw)?;
        self.update_window_type(win)?;
        self.update_size_hints(win)?;
        self.update_wm_hints(win)?;
        self.x
            .set_client_attributes(win, &[ClientAttr::ClientEventMask])?;
        self.grab_buttons(win, false)?;

        if let Some(c) = self.state.clients.get_mut(&win) {
            if !c.is_floating {
                c.is_floating = trans.is_some() || c.is_fixed;
                c.old_state = c.is_floating;
            }
            if c.is_floating {
                self.x.raise(win)?;
            }
        }

        self.state.monitors[m].attach(win);
        self.state.monitors[m].attach_stack(win);
        self.x
            .append_window_prop(self.x.root(), Atom::NetClientList, win)?;

        // park the window off screen until the arrange below places it,
        // accommodating clients that redraw on their initial geometry
        if let Some(c) = self.state.clients.get(&win) {
            let sw = self.state.screen.w;
            self.x.move_window(win, c.x + 2 * sw, c.y)?;
        }
        self.x.set_wm_state(win, WmState::Normal)?;

        if m == self.state.sel_mon {
            if let Some(sel) = self.state.monitors[m].sel {
                self.unfocus(sel, false)?;
            }
        }
        self.state.monitors[m].sel = Some(win);
        self.arrange(Some(m))?;
        self.x.map(win)?;
        self.focus(None)
    }

    /// Remove all window manager state for a client window. `destroyed`
    /// windows are already gone on the server side; for the rest we
    /// restore what we changed at manage time.
    pub(crate) fn unmanage(&mut self, win: Xid, destroyed: bool) -> Result<()> {
        let Some(c) = self.state.clients.get(&win) else {
            return Ok(());
        };

        trace!(%win, destroyed, "unmanaging client");
        let m = c.mon;
        let old_bw = c.old_bw;

        self.detach_client(win);
        self.state.clients.remove(&win);

        if !destroyed {
            self.x.release_client(win, old_bw)?;
        }

        self.focus(None)?;
        self.update_client_list()?;
        self.arrange(Some(m))
    }

    // Remove a client from both lists of its monitor, reselecting within
    // the stack if it was selected there.
    pub(crate) fn detach_client(&mut self, win: Xid) {
        let Some(c) = self.state.clients.get(&win) else {
            return;
        };
        let m = c.mon;

        let crate::core::State {
            monitors, clients, ..
        } = &mut self.state;

        let tags = monitors[m].visible_tags();
        monitors[m].detach(win);
        monitors[m].detach_stack(win, |id| {
            clients
                .get(&id)
                .map(|c| c.is_visible_on(tags))
                .unwrap_or(false)
        });
    }

    /// Focus the given client, or the most recently focused visible
    /// client of the selected monitor when passed `None`.
    pub(crate) fn focus(&mut self, target: Option<Xid>) -> Result<()> {
        let m = self.state.sel_mon;

        let visible = |id: &Xid| {
            self.state
                .clients
                .get(id)
                .map(|c| c.is_visible_on(self.state.monitors[c.mon].visible_tags()))
                .unwrap_or(false)
        };

        let target = match target.filter(|id| visible(id)) {
            Some(id) => Some(id),
            None => self.state.monitors[m].stack.iter().copied().find(|id| visible(id)),
        };

        if let Some(cur) = self.state.monitors[m].sel {
            if target != Some(cur) {
                self.unfocus(cur, false)?;
            }
        }

        if let Some(id) = target {
            let cm = self.state.clients[&id].mon;
            if cm != self.state.sel_mon {
                self.state.sel_mon = cm;
            }

            if self.state.clients[&id].is_urgent {
                self.set_urgent(id, false)?;
            }

            let crate::core::State {
                monitors, clients, ..
            } = &mut self.state;
            let tags = monitors[cm].visible_tags();
            monitors[cm].detach_stack(id, |other| {
                clients
                    .get(&other)
                    .map(|c| c.is_visible_on(tags))
                    .unwrap_or(false)
            });
            monitors[cm].attach_stack(id);

            self.grab_buttons(id, true)?;
            let border = self.state.config.selected_scheme.border.rgb_u32();
            self.x
                .set_client_attributes(id, &[ClientAttr::BorderColor(border)])?;
            self.give_input_focus(id)?;
        } else {
            self.x.focus_root()?;
            self.x.delete_prop(self.x.root(), Atom::NetActiveWindow)?;
        }

        let m = self.state.sel_mon;
        self.state.monitors[m].sel = target;
        self.draw_bars()
    }

    pub(crate) fn unfocus(&mut self, win: Xid, set_focus_root: bool) -> Result<()> {
        if !self.is_managed(win) {
            return Ok(());
        }

        self.grab_buttons(win, false)?;
        let border = self.state.config.normal_scheme.border.rgb_u32();
        self.x
            .set_client_attributes(win, &[ClientAttr::BorderColor(border)])?;

        if set_focus_root {
            self.x.focus_root()?;
            self.x.delete_prop(self.x.root(), Atom::NetActiveWindow)?;
        }

        Ok(())
    }

    // The X side of focusing: input focus (unless the client asked never
    // to receive it), WM_TAKE_FOCUS when supported, _NET_ACTIVE_WINDOW.
    pub(crate) fn give_input_focus(&mut self, win: Xid) -> Result<()> {
        let never_focus = self
            .state
            .clients
            .get(&win)
            .map(|c| c.never_focus)
            .unwrap_or(false);

        if !never_focus {
            self.x.focus_client(win)?;
            self.x
                .replace_prop(self.x.root(), Atom::NetActiveWindow, Prop::Window(vec![win]))?;
        }

        if self.x.supports_protocol(win, Atom::WmTakeFocus)? {
            self.x.send_protocol_message(win, Atom::WmTakeFocus)?;
        }

        Ok(())
    }

    pub(crate) fn set_urgent(&mut self, win: Xid, urgent: bool) -> Result<()> {
        if let Some(c) = self.state.clients.get_mut(&win) {
            c.is_urgent = urgent;
        }

        self.x.set_urgency_hint(win, urgent)
    }

    /// Re-impose the stacking order on a monitor: bar above tiles, tiled
    /// clients in focus-stack order below it, floating clients (and the
    /// selection in floating mode) raised on top.
    pub(crate) fn restack(&mut self, m: usize) -> Result<()> {
        self.draw_bar(m)?;

        let mon = &self.state.monitors[m];
        let Some(sel) = mon.sel else {
            return Ok(());
        };

        let floating_mode = self.state.config.layouts[mon.layout_index()].arrange.is_none();
        let sel_floating = self
            .state
            .clients
            .get(&sel)
            .map(|c| c.is_floating)
            .unwrap_or(false);

        if sel_floating || floating_mode {
            self.x.raise(sel)?;
        }

        if !floating_mode {
            let mon = &self.state.monitors[m];
            let tags = mon.visible_tags();
            let mut sibling = mon.bar_win;
            let stacked: Vec<Xid> = mon
                .stack
                .iter()
                .copied()
                .filter(|id| {
                    self.state
                        .clients
                        .get(id)
                        .map(|c| !c.is_floating && c.is_visible_on(tags))
                        .unwrap_or(false)
                })
                .collect();

            for id in stacked {
                self.x.stack_below(id, sibling)?;
                sibling = id;
            }
        }

        // restacking shuffles windows under the pointer: drop the crossing
        // events it generated so focus stays put
        self.x.drain_crossing_events()?;

        if m == self.state.sel_mon {
            self.warp_to_selected()?;
        }

        Ok(())
    }

    // Warp the pointer to the selected client (or work area center) when
    // it is not already inside it and not on the bar.
    pub(crate) fn warp_to_selected(&mut self) -> Result<()> {
        if !self.state.config.warp_pointer {
            return Ok(());
        }

        let m = self.state.sel_mon;
        let mon = &self.state.monitors[m];

        let Some(sel) = mon.sel else {
            let mid = mon.work.midpoint();
            return self.x.warp_pointer(self.x.root(), mid.x as i16, mid.y as i16);
        };

        let Some(c) = self.state.clients.get(&sel) else {
            return Ok(());
        };

        let Point { x, y } = self.x.cursor_position()?;
        let inside = x > c.x - c.bw
            && y > c.y - c.bw
            && x < c.x + c.w + 2 * c.bw
            && y < c.y + c.h + 2 * c.bw;
        let on_bar = y > mon.bar_y && y < mon.bar_y + self.state.bar_height;

        if inside || on_bar {
            return Ok(());
        }

        self.x.warp_pointer(sel, (c.w / 2) as i16, (c.h / 2) as i16)
    }

    /// Re-run visibility and layout for one monitor, or for all of them.
    pub fn arrange(&mut self, target: Option<usize>) -> Result<()> {
        match target {
            Some(m) => {
                self.show_hide(m)?;
                self.arrange_monitor(m)?;
                self.restack(m)
            }
            None => {
                for m in 0..self.state.monitors.len() {
                    self.show_hide(m)?;
                }
                for m in 0..self.state.monitors.len() {
                    self.arrange_monitor(m)?;
                }

                Ok(())
            }
        }
    }

    fn arrange_monitor(&mut self, m: usize) -> Result<()> {
        let mon = &mut self.state.monitors[m];
        let layout = self.state.config.layouts[mon.layout_index()];
        mon.lt_symbol = layout.symbol.to_string();

        match layout.arrange {
            Some(kind) => self.run_layout(m, kind),
            None => Ok(()),
        }
    }

    // Move visible clients into place (top of the focus stack first) and
    // park the hidden ones off screen, bottom of the stack first.
    fn show_hide(&mut self, m: usize) -> Result<()> {
        let stack = self.state.monitors[m].stack.clone();
        let tags = self.state.monitors[m].visible_tags();
        let floating_mode = {
            let mon = &self.state.monitors[m];
            self.state.config.layouts[mon.layout_index()].arrange.is_none()
        };

        for &id in &stack {
            let Some(c) = self.state.clients.get(&id) else {
                continue;
            };
            if !c.is_visible_on(tags) {
                continue;
            }

            self.x.move_window(id, c.x, c.y)?;
            let c = &self.state.clients[&id];
            if (floating_mode || c.is_floating) && !c.is_fullscreen {
                let r = c.rect();
                self.resize(id, r, false)?;
            }
        }

        for &id in stack.iter().rev() {
            let Some(c) = self.state.clients.get(&id) else {
                continue;
            };
            if c.is_visible_on(tags) {
                continue;
            }

            self.x.move_window(id, -2 * c.total_w(), c.y)?;
        }

        Ok(())
    }

    /// Propose a new geometry for a client. Size hints are applied and an
    /// X resize is only issued when the constrained result differs from
    /// the client's current geometry.
    pub(crate) fn resize(&mut self, win: Xid, r: Rect, interact: bool) -> Result<()> {
        let (mut x, mut y, mut w, mut h) = (r.x, r.y, r.w, r.h);

        let changed = {
            let Some(c) = self.state.clients.get(&win) else {
                return Ok(());
            };
            let mon = &self.state.monitors[c.mon];
            let apply_hints = self.state.config.resize_hints
                || c.is_floating
                || self.state.config.layouts[mon.layout_index()].arrange.is_none();

            c.apply_size_hints(
                &mut x,
                &mut y,
                &mut w,
                &mut h,
                mon.work,
                self.state.screen,
                self.state.bar_height,
                apply_hints,
                interact,
            )
        };

        if changed {
            self.resize_client(win, Rect::new(x, y, w, h))?;
        }

        Ok(())
    }

    /// Commit a new geometry for a client, applying the window gap.
    ///
    /// Tiled clients are inset by the configured gap; under monocle, or
    /// when only one client is tiled, both the gap and the border are
    /// dropped so the window spans the full work area. Floating clients
    /// and floating mode are left untouched.
    pub(crate) fn resize_client(&mut self, win: Xid, r: Rect) -> Result<()> {
        let (gap_offset, gap_incr, wire_bw) = {
            let Some(c) = self.state.clients.get(&win) else {
                return Ok(());
            };
            let mon = &self.state.monitors[c.mon];
            let layout = self.state.config.layouts[mon.layout_index()];
            let g = self.state.config.window_gap;

            if c.is_floating || layout.arrange.is_none() {
                (0, 0, c.bw)
            } else if layout.arrange == Some(crate::layout::ArrangeKind::Monocle)
                || tiled(mon, &self.state.clients).len() == 1
            {
                (0, -2 * self.state.config.border_px, 0)
            } else {
                (g, 2 * g, c.bw)
            }
        };

        let Some(c) = self.state.clients.get_mut(&win) else {
            return Ok(());
        };

        c.save_geometry();
        c.x = r.x + gap_offset;
        c.y = r.y + gap_offset;
        c.w = r.w - gap_incr;
        c.h = r.h - gap_incr;
        let rect = c.rect();

        self.x.position_client(win, rect, wire_bw)?;
        self.x.send_configure_notify(win, rect, wire_bw)?;
        self.x.sync()
    }

    /// Detach a client and re-attach it at the head of its monitor's
    /// client list, focusing it.
    pub(crate) fn pop(&mut self, win: Xid) -> Result<()> {
        let Some(c) = self.state.clients.get(&win) else {
            return Ok(());
        };
        let m = c.mon;

        self.state.monitors[m].detach(win);
        self.state.monitors[m].attach(win);
        self.focus(Some(win))?;
        self.arrange(Some(m))
    }

    /// Move a client to another monitor, assigning it that monitor's
    /// current tagset.
    pub(crate) fn send_to_monitor(&mut self, win: Xid, target: usize) -> Result<()> {
        let Some(c) = self.state.clients.get(&win) else {
            return Ok(());
        };
        if c.mon == target || target >= self.state.monitors.len() {
            return Ok(());
        }

        self.unfocus(win, true)?;
        self.detach_client(win);

        if let Some(c) = self.state.clients.get_mut(&win) {
            c.mon = target;
            c.tags = self.state.monitors[target].visible_tags();
        }
        self.state.monitors[target].attach(win);
        self.state.monitors[target].attach_stack(win);

        self.focus(None)?;
        self.arrange(None)
    }

    /// Enter or leave the fullscreen state, per _NET_WM_STATE semantics.
    pub(crate) fn set_fullscreen(&mut self, win: Xid, fullscreen: bool) -> Result<()> {
        let Some(c) = self.state.clients.get(&win) else {
            return Ok(());
        };

        if fullscreen && !c.is_fullscreen {
            self.x.replace_prop(
                win,
                Atom::NetWmState,
                Prop::Atoms(vec![Atom::NetWmStateFullscreen.as_ref().to_string()]),
            )?;

            let m = c.mon;
            let screen = self.state.monitors[m].screen;
            let c = self.state.clients.get_mut(&win).expect("checked above");
            c.is_fullscreen = true;
            c.old_state = c.is_floating;
            c.old_bw = c.bw;
            c.bw = 0;
            c.is_floating = true;

            self.resize_client(win, screen)?;
            self.x.raise(win)?;
        } else if !fullscreen && c.is_fullscreen {
            self.x
                .replace_prop(win, Atom::NetWmState, Prop::Atoms(vec![]))?;

            let c = self.state.clients.get_mut(&win).expect("checked above");
            c.is_fullscreen = false;
            c.is_floating = c.old_state;
            c.bw = c.old_bw;
            c.x = c.old_x;
            c.y = c.old_y;
            c.w = c.old_w;
            c.h = c.old_h;
            let (m, r) = (c.mon, c.rect());

            self.resize_client(win, r)?;
            self.arrange(Some(m))?;
        }

        Ok(())
    }

    // Apply the static rule table to a freshly created client. Every
    // matching rule contributes; the final tag mask falls back to the
    // assigned monitor's current view when no rule set one.
    pub(crate) fn apply_rules(&mut self, c: &mut Client) -> Result<()> {
        c.is_floating = false;
        c.tags = 0;

        let (instance, class) = self
            .x
            .window_class(c.win)?
            .unwrap_or_else(|| ("broken".to_string(), "broken".to_string()));

        for r in &self.state.config.rules {
            let matches = r.title.map(|t| c.name.contains(t)).unwrap_or(true)
                && r.class.map(|cl| class.contains(cl)).unwrap_or(true)
                && r.instance.map(|i| instance.contains(i)).unwrap_or(true);

            if matches {
                debug!(win = %c.win, ?r, "window rule matched");
                c.is_floating = r.is_floating;
                c.tags |= r.tags;
                if let Some(mi) = r.monitor {
                    if mi < self.state.monitors.len() {
                        c.mon = mi;
                    }
                }
            }
        }

        let tm = self.tag_mask();
        c.tags = if c.tags & tm != 0 {
            c.tags & tm
        } else {
            self.state.monitors[c.mon].visible_tags()
        };

        Ok(())
    }

    /// Rebuild the monitor list from the currently reported outputs.
    ///
    /// Duplicate output geometries collapse into one monitor. Monitors
    /// that disappear migrate their clients to the first monitor. Returns
    /// whether anything changed.
    pub(crate) fn update_geometry(&mut self) -> Result<bool> {
        let mut dirty = false;
        let bh = self.state.bar_height;

        let mut unique: Vec<Rect> = Vec::new();
        for r in self.x.screen_details()? {
            if !unique.contains(&r) {
                unique.push(r);
            }
        }

        let n = self.state.monitors.len();

        for _ in n..unique.len() {
            let config = &self.state.config;
            let mon = Monitor::new(
                config.mfact,
                config.nmaster,
                config.show_bar,
                config.top_bar,
                config.layouts[0].symbol.to_string(),
            );
            self.state.monitors.push(mon);
        }

        for (i, r) in unique.iter().enumerate() {
            let mon = &mut self.state.monitors[i];
            if i >= n || mon.screen != *r {
                dirty = true;
                mon.num = i as i32;
                mon.screen = *r;
                mon.update_bar_pos(bh);
            }
        }

        while self.state.monitors.len() > unique.len() {
            dirty = true;
            let mon = self.state.monitors.pop().expect("len checked above");
            info!(num = mon.num, "removing monitor, migrating clients");

            for id in mon.clients {
                if let Some(c) = self.state.clients.get_mut(&id) {
                    c.mon = 0;
                }
                self.state.monitors[0].attach(id);
                self.state.monitors[0].attach_stack(id);
            }

            if mon.bar_win != Xid(0) {
                self.x.destroy_window(mon.bar_win)?;
            }
            if self.state.sel_mon >= self.state.monitors.len() {
                self.state.sel_mon = 0;
            }
        }

        if dirty {
            self.state.sel_mon = 0;
            self.state.sel_mon = self.window_to_monitor(self.x.root());
        }

        Ok(dirty)
    }

    /// Create bar windows for monitors that do not have one yet.
    pub(crate) fn update_bars(&mut self) -> Result<()> {
        let bh = self.state.bar_height;

        for m in 0..self.state.monitors.len() {
            if self.state.monitors[m].bar_win != Xid(0) {
                continue;
            }

            let mon = &self.state.monitors[m];
            let r = Rect::new(mon.work.x, mon.bar_y, mon.work.w, bh);
            let win = self.x.create_window(WinType::Bar, r)?;
            self.x.map(win)?;
            self.x.raise(win)?;
            self.state.monitors[m].bar_win = win;
        }

        Ok(())
    }

    /// Re-read the status text from the root window name.
    pub(crate) fn update_status(&mut self) -> Result<()> {
        self.state.status = self
            .x
            .text_prop(self.x.root(), Atom::WmName.as_ref())?
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("girih-{}", crate::VERSION));

        self.draw_bar(self.state.sel_mon)
    }

    pub(crate) fn update_title(&mut self, win: Xid) {
        let name = self.x.window_title(win);
        if let Some(c) = self.state.clients.get_mut(&win) {
            c.set_name(&name);
        }
    }

    /// Pick up _NET_WM_STATE fullscreen and dialog window types.
    pub(crate) fn update_window_type(&mut self, win: Xid) -> Result<()> {
        let state = self.x.atom_prop(win, Atom::NetWmState.as_ref())?;
        let wtype = self.x.atom_prop(win, Atom::NetWmWindowType.as_ref())?;

        if state.as_deref() == Some(Atom::NetWmStateFullscreen.as_ref()) {
            self.set_fullscreen(win, true)?;
        }
        if wtype.as_deref() == Some(Atom::NetWindowTypeDialog.as_ref()) {
            if let Some(c) = self.state.clients.get_mut(&win) {
                c.is_floating = true;
            }
        }

        Ok(())
    }

    /// Pick up urgency and input-focus preferences from WM_HINTS.
    ///
    /// An urgency hint on the focused client is cleared at the source
    /// rather than recorded: the user is already looking at it.
    pub(crate) fn update_wm_hints(&mut self, win: Xid) -> Result<()> {
        let Some(hints) = self.x.wm_hints(win) else {
            return Ok(());
        };

        let is_sel = self.state.monitors[self.state.sel_mon].sel == Some(win);
        if is_sel && hints.urgent {
            self.x.set_urgency_hint(win, false)?;
        } else if let Some(c) = self.state.clients.get_mut(&win) {
            c.is_urgent = hints.urgent;
        }

        if let Some(c) = self.state.clients.get_mut(&win) {
            c.never_focus = if hints.flags.contains(WmHintsFlags::INPUT_HINT) {
                !hints.accepts_input
            } else {
                false
            };
        }

        Ok(())
    }

    pub(crate) fn update_size_hints(&mut self, win: Xid) -> Result<()> {
        let hints = self.x.size_hints(win);
        if let Some(c) = self.state.clients.get_mut(&win) {
            c.set_size_hints(hints);
        }

        Ok(())
    }

    /// Rebuild _NET_CLIENT_LIST from the ground truth of the monitor
    /// client lists.
    pub(crate) fn update_client_list(&mut self) -> Result<()> {
        let root = self.x.root();
        self.x.delete_prop(root, Atom::NetClientList)?;

        let wins: Vec<Xid> = self
            .state
            .monitors
            .iter()
            .flat_map(|m| m.clients.iter().copied())
            .collect();
        for win in wins {
            self.x.append_window_prop(root, Atom::NetClientList, win)?;
        }

        Ok(())
    }

    /// Find which modifier bit NumLock currently lives on.
    pub(crate) fn update_numlock_mask(&mut self) -> Result<()> {
        self.state.numlock_mask = 0;

        let Some(&numlock) = self.code_map.get("Num_Lock") else {
            return Ok(());
        };

        for (i, group) in self.x.modifier_mapping()?.iter().enumerate() {
            if group.contains(&numlock) {
                self.state.numlock_mask = 1 << i;
            }
        }

        Ok(())
    }

    /// Grab every bound key combination, with and without Lock / NumLock.
    pub(crate) fn grab_keys(&mut self) -> Result<()> {
        self.update_numlock_mask()?;
        self.x.ungrab_keys()?;

        let numlock = self.state.numlock_mask;
        for kb in &self.keys {
            for extra in [0, LOCK_MASK, numlock, numlock | LOCK_MASK] {
                self.x.grab_key(KeyCode {
                    mask: kb.code.mask | extra,
                    code: kb.code.code,
                })?;
            }
        }

        Ok(())
    }

    /// Install the button grabs for a client window.
    ///
    /// Unfocused clients additionally get a catch-all synchronous grab so
    /// that the click which focuses them can be replayed to the client.
    pub(crate) fn grab_buttons(&mut self, win: Xid, focused: bool) -> Result<()> {
        self.update_numlock_mask()?;
        self.x.ungrab_buttons(win)?;

        if !focused {
            self.x.grab_button(win, 0, ANY_MODIFIER, true)?;
        }

        let numlock = self.state.numlock_mask;
        for mb in &self.buttons {
            if mb.zone != ClickZone::ClientWin {
                continue;
            }
            for extra in [0, LOCK_MASK, numlock, numlock | LOCK_MASK] {
                self.x.grab_button(win, mb.button, mb.mask | extra, false)?;
            }
        }

        Ok(())
    }
}
