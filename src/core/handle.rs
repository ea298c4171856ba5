//! XEvent handlers for the main event loop.
//!
//! One method per event kind; [WindowManager::handle_event] is the
//! exhaustive dispatch table.
use crate::{
    core::{
        actions::Arg,
        bindings::{clean_mask, ClickZone, KeyCode},
        WindowManager,
    },
    draw::Draw,
    pure::{geometry::Rect, monitor::monitor_at},
    x::{
        event::{
            ClientMessage, ConfigureEvent, ConfigureMask, ConfigureRequest, CrossingEvent,
            ExposeEvent, MotionEvent, MouseEvent, PropertyEvent,
        },
        Atom, WmState, XConn, XConnExt, XEvent,
    },
    Result, Xid,
};
use std::str::FromStr;
use tracing::trace;

// _NET_WM_STATE client message actions
const NET_WM_STATE_ADD: u32 = 1;
const NET_WM_STATE_TOGGLE: u32 = 2;

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    pub(crate) fn handle_event(&mut self, event: XEvent) -> Result<()> {
        match event {
            XEvent::ButtonPress(e) => self.button_press(&e),
            XEvent::ButtonRelease(_) => Ok(()), // only meaningful inside drag loops
            XEvent::ClientMessage(m) => self.client_message(&m),
            XEvent::ConfigureNotify(e) => self.configure_notify(&e),
            XEvent::ConfigureRequest(e) => self.configure_request(&e),
            XEvent::Destroy(id) => self.destroy_notify(id),
            XEvent::Enter(e) => self.enter_notify(&e),
            XEvent::Expose(e) => self.expose(&e),
            XEvent::FocusIn(id) => self.focus_in(id),
            XEvent::KeyPress(k) => self.key_press(k),
            XEvent::MappingNotify { keyboard } => self.mapping_notify(keyboard),
            XEvent::MapRequest(id) => self.map_request(id),
            XEvent::Motion(e) => self.motion_notify(&e),
            XEvent::PropertyNotify(e) => self.property_notify(&e),
            XEvent::UnmapNotify { id, synthetic } => self.unmap_notify(id, synthetic),
        }
    }

    /// Classify the click into a zone, then run every binding matching
    /// (zone, button, modifiers). Tag cell clicks substitute the clicked
    /// cell's mask for a zero argument.
    pub(crate) fn button_press(&mut self, e: &MouseEvent) -> Result<()> {
        let mut click = ClickZone::RootWin;
        let mut clicked_tag = 0u32;

        let m = self.window_to_monitor(e.id);
        if m != self.state.sel_mon {
            if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
                self.unfocus(sel, true)?;
            }
            self.state.sel_mon = m;
            self.focus(None)?;
        }

        if e.id == self.state.monitors[self.state.sel_mon].bar_win {
            (click, clicked_tag) = self.bar_click_zone(self.state.sel_mon, e.relative.x)?;
        } else if self.is_managed(e.id) {
            self.focus(Some(e.id))?;
            self.restack(self.state.sel_mon)?;
            self.x.allow_pointer_replay()?;
            click = ClickZone::ClientWin;
        }

        let numlock = self.state.numlock_mask;
        let clean = clean_mask(e.mask, numlock);
        let matching: Vec<_> = self
            .buttons
            .iter()
            .filter(|b| {
                b.zone == click && b.button == e.button && clean_mask(b.mask, numlock) == clean
            })
            .cloned()
            .collect();

        for b in matching {
            let arg = match (&b.zone, &b.arg) {
                (ClickZone::TagBar, Arg::UInt(0)) => Arg::UInt(clicked_tag),
                _ => b.arg.clone(),
            };
            self.run_action(b.action, &arg)?;
        }

        Ok(())
    }

    /// Fullscreen requests and activation requests from pagers and the
    /// clients themselves.
    pub(crate) fn client_message(&mut self, msg: &ClientMessage) -> Result<()> {
        if !self.is_managed(msg.id) {
            return Ok(());
        }

        trace!(id = %msg.id, dtype = %msg.dtype, data = ?msg.data, "client message");

        match Atom::from_str(&msg.dtype) {
            Ok(Atom::NetWmState) => {
                let fullscreen = self.x.known_atom(Atom::NetWmStateFullscreen);
                if msg.data[1] == fullscreen || msg.data[2] == fullscreen {
                    let currently = self
                        .state
                        .clients
                        .get(&msg.id)
                        .map(|c| c.is_fullscreen)
                        .unwrap_or(false);
                    let enable = msg.data[0] == NET_WM_STATE_ADD
                        || (msg.data[0] == NET_WM_STATE_TOGGLE && !currently);

                    self.set_fullscreen(msg.id, enable)?;
                }

                Ok(())
            }

            // make the client visible on its monitor and promote it
            Ok(Atom::NetActiveWindow) => {
                let Some(c) = self.state.clients.get(&msg.id) else {
                    return Ok(());
                };
                let (cm, tags) = (c.mon, c.tags);

                self.state.sel_mon = cm;
                let mon = &mut self.state.monitors[cm];
                if tags & mon.visible_tags() == 0 {
                    mon.sel_tags ^= 1;
                    let sel_tags = mon.sel_tags;
                    mon.tagset[sel_tags] = tags;
                }

                self.pop(msg.id)
            }

            _ => Ok(()),
        }
    }

    /// Only the root window is interesting here: a new root size means
    /// the output topology changed.
    pub(crate) fn configure_notify(&mut self, e: &ConfigureEvent) -> Result<()> {
        if !e.is_root {
            return Ok(());
        }

        let dirty = self.state.screen.w != e.r.w || self.state.screen.h != e.r.h;
        self.state.screen.w = e.r.w;
        self.state.screen.h = e.r.h;

        if self.update_geometry()? || dirty {
            let (sw, bh) = (self.state.screen.w, self.state.bar_height);
            self.draw.resize(sw, bh)?;
            self.update_bars()?;

            let fullscreen: Vec<(Xid, Rect)> = self
                .state
                .monitors
                .iter()
                .flat_map(|m| {
                    m.clients.iter().filter_map(|id| {
                        self.state
                            .clients
                            .get(id)
                            .filter(|c| c.is_fullscreen)
                            .map(|_| (*id, m.screen))
                    })
                })
                .collect();
            for (id, r) in fullscreen {
                self.resize_client(id, r)?;
            }

            for m in 0..self.state.monitors.len() {
                let mon = &self.state.monitors[m];
                let r = Rect::new(mon.work.x, mon.bar_y, mon.work.w, bh);
                let bar_win = mon.bar_win;
                self.x.move_resize_window(bar_win, r)?;
            }

            self.focus(None)?;
            self.arrange(None)?;
        }

        Ok(())
    }

    /// Managed floating clients get their request honoured (with a pull
    /// back on screen for over-sized requests); tiled clients just get a
    /// synthetic notify restating the geometry the layout gave them;
    /// unmanaged windows have the request forwarded verbatim.
    pub(crate) fn configure_request(&mut self, e: &ConfigureRequest) -> Result<()> {
        if let Some(c) = self.state.clients.get(&e.id) {
            let m = c.mon;
            let floating_mode = {
                let mon = &self.state.monitors[m];
                self.state.config.layouts[mon.layout_index()].arrange.is_none()
            };

            if e.mask.contains(ConfigureMask::BORDER_WIDTH) {
                if let Some(c) = self.state.clients.get_mut(&e.id) {
                    c.bw = e.border_width;
                }
            } else if c.is_floating || floating_mode {
                let screen = self.state.monitors[m].screen;
                let Some(c) = self.state.clients.get_mut(&e.id) else {
                    return Ok(());
                };

                if e.mask.contains(ConfigureMask::X) {
                    c.old_x = c.x;
                    c.x = screen.x + e.x;
                }
                if e.mask.contains(ConfigureMask::Y) {
                    c.old_y = c.y;
                    c.y = screen.y + e.y;
                }
                if e.mask.contains(ConfigureMask::WIDTH) {
                    c.old_w = c.w;
                    c.w = e.w;
                }
                if e.mask.contains(ConfigureMask::HEIGHT) {
                    c.old_h = c.h;
                    c.h = e.h;
                }

                if c.x + c.w > screen.right() && c.is_floating {
                    c.x = screen.x + (screen.w / 2 - c.total_w() / 2);
                }
                if c.y + c.h > screen.bottom() && c.is_floating {
                    c.y = screen.y + (screen.h / 2 - c.total_h() / 2);
                }

                let (rect, bw) = (c.rect(), c.bw);
                let visible = {
                    let c = &self.state.clients[&e.id];
                    c.is_visible_on(self.state.monitors[m].visible_tags())
                };

                if e.mask.intersects(ConfigureMask::X | ConfigureMask::Y)
                    && !e.mask.intersects(ConfigureMask::WIDTH | ConfigureMask::HEIGHT)
                {
                    self.x.send_configure_notify(e.id, rect, bw)?;
                }
                if visible {
                    self.x.position_client(e.id, rect, bw)?;
                }
            } else {
                let (rect, bw) = (c.rect(), c.bw);
                self.x.send_configure_notify(e.id, rect, bw)?;
            }
        } else {
            self.x.forward_configure_request(e)?;
        }

        self.x.sync()
    }

    pub(crate) fn destroy_notify(&mut self, id: Xid) -> Result<()> {
        if self.is_managed(id) {
            self.unmanage(id, true)?;
        }

        Ok(())
    }

    /// Focus follows the mouse into managed clients, ignoring the crossing
    /// noise generated by grabs and child windows.
    pub(crate) fn enter_notify(&mut self, e: &CrossingEvent) -> Result<()> {
        if (!e.normal_mode || e.inferior) && !e.is_root {
            return Ok(());
        }

        let managed = self.is_managed(e.id);
        let m = self.window_to_monitor(e.id);

        if m != self.state.sel_mon {
            if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
                self.unfocus(sel, true)?;
            }
            self.state.sel_mon = m;
        } else if !managed || Some(e.id) == self.state.monitors[m].sel {
            return Ok(());
        }

        self.focus(managed.then_some(e.id))
    }

    pub(crate) fn expose(&mut self, e: &ExposeEvent) -> Result<()> {
        if e.count == 0 {
            let m = self.window_to_monitor(e.id);
            self.draw_bar(m)?;
        }

        Ok(())
    }

    /// Some clients reassert input focus behind our back; put it back on
    /// the selected client.
    pub(crate) fn focus_in(&mut self, id: Xid) -> Result<()> {
        if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
            if sel != id {
                self.give_input_focus(sel)?;
            }
        }

        Ok(())
    }

    pub(crate) fn key_press(&mut self, k: KeyCode) -> Result<()> {
        let numlock = self.state.numlock_mask;
        let clean = clean_mask(k.mask, numlock);
        let matching: Vec<_> = self
            .keys
            .iter()
            .filter(|b| b.code.code == k.code && clean_mask(b.code.mask, numlock) == clean)
            .cloned()
            .collect();

        for b in matching {
            self.run_action(b.action, &b.arg)?;
        }

        Ok(())
    }

    /// The keyboard was remapped: resolve the key table against the new
    /// mapping and grab it again.
    pub(crate) fn mapping_notify(&mut self, keyboard: bool) -> Result<()> {
        if keyboard {
            self.refresh_key_bindings()?;
            self.grab_keys()?;
        }

        Ok(())
    }

    pub(crate) fn map_request(&mut self, id: Xid) -> Result<()> {
        // the window may be gone again already: that race is benign
        let Ok(attrs) = self.x.get_window_attributes(id) else {
            return Ok(());
        };

        if !attrs.override_redirect && !self.is_managed(id) {
            self.manage(id)?;
        }

        Ok(())
    }

    /// Track the selected monitor as the pointer crosses outputs.
    pub(crate) fn motion_notify(&mut self, e: &MotionEvent) -> Result<()> {
        if !e.is_root {
            return Ok(());
        }

        let m = monitor_at(
            &self.state.monitors,
            self.state.sel_mon,
            Rect::new(e.abs.x, e.abs.y, 1, 1),
        );

        if Some(m) != self.state.motion_mon && self.state.motion_mon.is_some() {
            if let Some(sel) = self.state.monitors[self.state.sel_mon].sel {
                self.unfocus(sel, true)?;
            }
            self.state.sel_mon = m;
            self.focus(None)?;
        }
        self.state.motion_mon = Some(m);

        Ok(())
    }

    pub(crate) fn property_notify(&mut self, e: &PropertyEvent) -> Result<()> {
        if e.is_root && e.atom == Atom::WmName.as_ref() {
            return self.update_status();
        }

        if e.deleted || !self.is_managed(e.id) {
            return Ok(());
        }

        match Atom::from_str(&e.atom) {
            Ok(Atom::WmTransientFor) => {
                let floating = self
                    .state
                    .clients
                    .get(&e.id)
                    .map(|c| c.is_floating)
                    .unwrap_or(true);

                if !floating {
                    let trans = self.x.transient_for(e.id)?.filter(|t| self.is_managed(*t));
                    if trans.is_some() {
                        let m = {
                            let c = self.state.clients.get_mut(&e.id).expect("checked above");
                            c.is_floating = true;
                            c.mon
                        };
                        self.arrange(Some(m))?;
                    }
                }
            }

            Ok(Atom::WmNormalHints) => self.update_size_hints(e.id)?,

            Ok(Atom::WmHints) => {
                self.update_wm_hints(e.id)?;
                self.draw_bars()?;
            }

            _ => (),
        }

        if e.atom == Atom::WmName.as_ref() || e.atom == Atom::NetWmName.as_ref() {
            self.update_title(e.id);
            if let Some(c) = self.state.clients.get(&e.id) {
                let m = c.mon;
                if self.state.monitors[m].sel == Some(e.id) {
                    self.draw_bar(m)?;
                }
            }
        }

        if e.atom == Atom::NetWmWindowType.as_ref() {
            self.update_window_type(e.id)?;
        }

        Ok(())
    }

    /// A synthetic unmap is the ICCCM way for a client to ask for the
    /// Withdrawn state; a real one means the window went away.
    pub(crate) fn unmap_notify(&mut self, id: Xid, synthetic: bool) -> Result<()> {
        if !self.is_managed(id) {
            return Ok(());
        }

        if synthetic {
            self.x.set_wm_state(id, WmState::Withdrawn)
        } else {
            self.unmanage(id, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{actions::Action, bindings::KeyBinding},
        x::mock::test_wm_with_clients,
    };

    #[test]
    fn net_active_window_for_an_invisible_client_reveals_and_pops_it() {
        let mut wm = test_wm_with_clients(2);

        // park client 1 on tag 4 so it is invisible on the default view
        wm.state.clients.get_mut(&Xid(1)).expect("client").tags = 1 << 3;
        wm.focus(None).expect("focus");
        assert_eq!(wm.state().focused_client(), Some(Xid(2)));

        let msg = ClientMessage {
            id: Xid(1),
            dtype: Atom::NetActiveWindow.as_ref().to_string(),
            data: [0; 5],
        };
        wm.client_message(&msg).expect("client message");

        let mon = &wm.state().monitors()[0];
        assert_eq!(mon.sel_tags, 1, "the alternate tagset is now selected");
        assert_eq!(mon.visible_tags(), 1 << 3);
        assert_eq!(mon.sel, Some(Xid(1)));
        assert_eq!(mon.clients[0], Xid(1), "activated client is the new head");
        assert_eq!(mon.stack[0], Xid(1));
    }

    #[test]
    fn net_active_window_for_a_visible_client_just_pops_it() {
        let mut wm = test_wm_with_clients(2);

        let msg = ClientMessage {
            id: Xid(1),
            dtype: Atom::NetActiveWindow.as_ref().to_string(),
            data: [0; 5],
        };
        wm.client_message(&msg).expect("client message");

        let mon = &wm.state().monitors()[0];
        assert_eq!(mon.sel_tags, 0, "the view is untouched");
        assert_eq!(mon.sel, Some(Xid(1)));
        assert_eq!(mon.clients[0], Xid(1));
    }

    #[test]
    fn net_wm_state_toggle_flips_fullscreen() {
        let mut wm = test_wm_with_clients(1);
        let fullscreen = wm.conn().known_atom(Atom::NetWmStateFullscreen);

        let mut msg = ClientMessage {
            id: Xid(1),
            dtype: Atom::NetWmState.as_ref().to_string(),
            data: [NET_WM_STATE_TOGGLE, fullscreen, 0, 0, 0],
        };

        wm.client_message(&msg).expect("toggle on");
        assert!(wm.state().clients[&Xid(1)].is_fullscreen);

        wm.client_message(&msg).expect("toggle off");
        assert!(!wm.state().clients[&Xid(1)].is_fullscreen);

        msg.data[0] = NET_WM_STATE_ADD;
        wm.client_message(&msg).expect("add");
        wm.client_message(&msg).expect("add again");
        assert!(wm.state().clients[&Xid(1)].is_fullscreen);
    }

    #[test]
    fn synthetic_unmaps_withdraw_without_unmanaging() {
        let mut wm = test_wm_with_clients(1);

        wm.unmap_notify(Xid(1), true).expect("synthetic unmap");
        assert!(wm.is_managed(Xid(1)));

        wm.unmap_notify(Xid(1), false).expect("real unmap");
        assert!(!wm.is_managed(Xid(1)));
    }

    #[test]
    fn destroy_notify_unmanages() {
        let mut wm = test_wm_with_clients(2);

        wm.destroy_notify(Xid(2)).expect("destroy");

        assert!(!wm.is_managed(Xid(2)));
        assert_eq!(wm.state().focused_client(), Some(Xid(1)));
    }

    #[test]
    fn enter_notify_moves_focus_to_the_entered_client() {
        let mut wm = test_wm_with_clients(2);
        assert_eq!(wm.state().focused_client(), Some(Xid(2)));

        let e = CrossingEvent {
            id: Xid(1),
            abs: crate::pure::geometry::Point::new(10, 10),
            is_root: false,
            normal_mode: true,
            inferior: false,
        };
        wm.enter_notify(&e).expect("enter");

        assert_eq!(wm.state().focused_client(), Some(Xid(1)));
    }

    #[test]
    fn grab_generated_crossings_are_ignored() {
        let mut wm = test_wm_with_clients(2);

        let e = CrossingEvent {
            id: Xid(1),
            abs: crate::pure::geometry::Point::new(10, 10),
            is_root: false,
            normal_mode: false,
            inferior: false,
        };
        wm.enter_notify(&e).expect("enter");

        assert_eq!(wm.state().focused_client(), Some(Xid(2)));
    }

    #[test]
    fn key_presses_dispatch_ignoring_lock_masks() {
        use crate::core::bindings::{KeyCode, LOCK_MASK, MOD4_MASK};

        let mut wm = test_wm_with_clients(1);
        wm.keys = vec![KeyBinding {
            code: KeyCode { mask: MOD4_MASK, code: 24 },
            action: Action::Quit,
            arg: Arg::None,
        }];

        wm.key_press(KeyCode { mask: MOD4_MASK | LOCK_MASK, code: 24 })
            .expect("keypress");

        assert!(!wm.state().running);
    }

    #[test]
    fn root_wm_name_updates_the_status_text() {
        let mut wm = test_wm_with_clients(0);
        let root = wm.conn().root();
        wm.conn().set_prop(
            root,
            Atom::WmName.as_ref(),
            crate::x::Prop::UTF8String(vec!["battery 93%".to_string()]),
        );

        let e = PropertyEvent {
            id: root,
            atom: Atom::WmName.as_ref().to_string(),
            is_root: true,
            deleted: false,
        };
        wm.property_notify(&e).expect("property");

        assert_eq!(wm.state.status, "battery 93%");
    }
}
