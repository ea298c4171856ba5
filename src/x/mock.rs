//! Stub X conn / draw implementations for testing manager logic without
//! a running X server.
//!
//! Implement [StubXConn] and override the `mock_*` methods a test cares
//! about: every type implementing it gets a blanket [XConn] impl with
//! benign defaults for the rest.
use crate::{
    config::Config,
    core::{bindings::KeyCode, WindowManager},
    draw::Draw,
    pure::geometry::{Point, Rect},
    x::{
        event::ConfigureRequest,
        property::{MapState, WindowAttributes, WmState},
        Atom, ClientAttr, CursorKind, Prop, WinType, XConn, XEvent,
    },
    ColorScheme, Error, Result, Xid,
};
use std::{cell::RefCell, collections::HashMap};
use strum::IntoEnumIterator;

/// The root window id used by stub connections.
pub const MOCK_ROOT: Xid = Xid(1_000_000);

pub trait StubXConn {
    fn mock_root(&self) -> Xid {
        MOCK_ROOT
    }

    fn mock_screen_size(&self) -> (i32, i32) {
        (1920, 1080)
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Ok(vec![Rect::new(0, 0, 1920, 1080)])
    }

    fn mock_cursor_position(&self) -> Result<Point> {
        Ok(Point::new(0, 0))
    }

    fn mock_warp_pointer(&self, _: Xid, _: i16, _: i16) -> Result<()> {
        Ok(())
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::Connection(
            ::x11rb::errors::ConnectionError::UnknownError,
        ))
    }

    fn mock_become_wm(&self) -> Result<()> {
        Ok(())
    }

    fn mock_create_window(&self, _: WinType, _: Rect) -> Result<Xid> {
        Ok(Xid(7777))
    }

    fn mock_destroy_window(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_map(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_move_window(&self, _: Xid, _: i32, _: i32) -> Result<()> {
        Ok(())
    }

    fn mock_move_resize_window(&self, _: Xid, _: Rect) -> Result<()> {
        Ok(())
    }

    fn mock_position_client(&self, _: Xid, _: Rect, _: i32) -> Result<()> {
        Ok(())
    }

    fn mock_raise(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_stack_below(&self, _: Xid, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_forward_configure_request(&self, _: &ConfigureRequest) -> Result<()> {
        Ok(())
    }

    fn mock_send_configure_notify(&self, _: Xid, _: Rect, _: i32) -> Result<()> {
        Ok(())
    }

    fn mock_get_window_attributes(&self, _: Xid) -> Result<WindowAttributes> {
        Ok(WindowAttributes {
            override_redirect: false,
            map_state: MapState::Viewable,
        })
    }

    fn mock_client_geometry(&self, _: Xid) -> Result<(Rect, i32)> {
        Ok((Rect::new(20, 20, 640, 480), 1))
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(vec![])
    }

    fn mock_known_atom(&self, atom: Atom) -> u32 {
        Atom::iter().position(|a| a == atom).unwrap_or(0) as u32 + 1000
    }

    fn mock_get_prop(&self, _: Xid, _: &str) -> Result<Option<Prop>> {
        Ok(None)
    }

    fn mock_replace_prop(&self, _: Xid, _: Atom, _: Prop) -> Result<()> {
        Ok(())
    }

    fn mock_append_window_prop(&self, _: Xid, _: Atom, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_delete_prop(&self, _: Xid, _: Atom) -> Result<()> {
        Ok(())
    }

    fn mock_text_prop(&self, _: Xid, _: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn mock_atom_prop(&self, _: Xid, _: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn mock_get_wm_state(&self, _: Xid) -> Result<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, _: Xid, _: WmState) -> Result<()> {
        Ok(())
    }

    fn mock_set_urgency_hint(&self, _: Xid, _: bool) -> Result<()> {
        Ok(())
    }

    fn mock_supports_protocol(&self, _: Xid, _: Atom) -> Result<bool> {
        Ok(false)
    }

    fn mock_send_protocol_message(&self, _: Xid, _: Atom) -> Result<()> {
        Ok(())
    }

    fn mock_set_client_attributes(&self, _: Xid, _: &[ClientAttr]) -> Result<()> {
        Ok(())
    }

    fn mock_focus_client(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_focus_root(&self) -> Result<()> {
        Ok(())
    }

    fn mock_kill_client(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_release_client(&self, _: Xid, _: i32) -> Result<()> {
        Ok(())
    }

    fn mock_grab_key(&self, _: KeyCode) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_keys(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_button(&self, _: Xid, _: u8, _: u16, _: bool) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_buttons(&self, _: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_allow_pointer_replay(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer(&self, _: CursorKind) -> Result<bool> {
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_modifier_mapping(&self) -> Result<Vec<Vec<u8>>> {
        Ok(vec![Vec::new(); 8])
    }
}

impl<T> XConn for T
where
    T: StubXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn screen_size(&self) -> (i32, i32) {
        self.mock_screen_size()
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }

    fn cursor_position(&self) -> Result<Point> {
        self.mock_cursor_position()
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.mock_warp_pointer(id, x, y)
    }

    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }

    fn flush(&self) {}

    fn sync(&self) -> Result<()> {
        Ok(())
    }

    fn drain_crossing_events(&self) -> Result<()> {
        Ok(())
    }

    fn become_wm(&self) -> Result<()> {
        self.mock_become_wm()
    }

    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        self.mock_create_window(ty, r)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.mock_destroy_window(id)
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.mock_map(id)
    }

    fn move_window(&self, id: Xid, x: i32, y: i32) -> Result<()> {
        self.mock_move_window(id, x, y)
    }

    fn move_resize_window(&self, id: Xid, r: Rect) -> Result<()> {
        self.mock_move_resize_window(id, r)
    }

    fn position_client(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        self.mock_position_client(id, r, bw)
    }

    fn raise(&self, id: Xid) -> Result<()> {
        self.mock_raise(id)
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        self.mock_stack_below(id, sibling)
    }

    fn forward_configure_request(&self, ev: &ConfigureRequest) -> Result<()> {
        self.mock_forward_configure_request(ev)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        self.mock_send_configure_notify(id, r, bw)
    }

    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        self.mock_get_window_attributes(id)
    }

    fn client_geometry(&self, id: Xid) -> Result<(Rect, i32)> {
        self.mock_client_geometry(id)
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        self.mock_existing_clients()
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        self.mock_known_atom(atom)
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        self.mock_get_prop(id, name)
    }

    fn replace_prop(&self, id: Xid, prop: Atom, val: Prop) -> Result<()> {
        self.mock_replace_prop(id, prop, val)
    }

    fn append_window_prop(&self, id: Xid, prop: Atom, win: Xid) -> Result<()> {
        self.mock_append_window_prop(id, prop, win)
    }

    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()> {
        self.mock_delete_prop(id, prop)
    }

    fn text_prop(&self, id: Xid, name: &str) -> Result<Option<String>> {
        self.mock_text_prop(id, name)
    }

    fn atom_prop(&self, id: Xid, name: &str) -> Result<Option<String>> {
        self.mock_atom_prop(id, name)
    }

    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        self.mock_get_wm_state(id)
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(id, state)
    }

    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        self.mock_set_urgency_hint(id, urgent)
    }

    fn supports_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        self.mock_supports_protocol(id, proto)
    }

    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<()> {
        self.mock_send_protocol_message(id, proto)
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        self.mock_set_client_attributes(id, attrs)
    }

    fn focus_client(&self, id: Xid) -> Result<()> {
        self.mock_focus_client(id)
    }

    fn focus_root(&self) -> Result<()> {
        self.mock_focus_root()
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.mock_kill_client(id)
    }

    fn release_client(&self, id: Xid, old_bw: i32) -> Result<()> {
        self.mock_release_client(id, old_bw)
    }

    fn grab_key(&self, code: KeyCode) -> Result<()> {
        self.mock_grab_key(code)
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.mock_ungrab_keys()
    }

    fn grab_button(&self, id: Xid, button: u8, mask: u16, sync: bool) -> Result<()> {
        self.mock_grab_button(id, button, mask, sync)
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.mock_ungrab_buttons(id)
    }

    fn allow_pointer_replay(&self) -> Result<()> {
        self.mock_allow_pointer_replay()
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        self.mock_grab_pointer(cursor)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.mock_ungrab_pointer()
    }

    fn modifier_mapping(&self) -> Result<Vec<Vec<u8>>> {
        self.mock_modifier_mapping()
    }
}

/// A stub conn that records the geometry and border width last configured
/// for each window, with configurable outputs and window properties.
#[derive(Debug, Default)]
pub struct RecordingXConn {
    /// Override for the reported output geometries
    pub screens: Vec<Rect>,
    /// Per-window property overrides, keyed by (window, property name)
    pub props: RefCell<HashMap<(Xid, String), Prop>>,
    /// The last (geometry, border) configured per window
    pub configured: RefCell<HashMap<Xid, (Rect, i32)>>,
    /// Every urgency hint rewrite issued, in order
    pub urgency: RefCell<Vec<(Xid, bool)>>,
}

impl RecordingXConn {
    pub fn with_screens(screens: Vec<Rect>) -> Self {
        Self {
            screens,
            ..Default::default()
        }
    }

    /// Set a property override visible to subsequent get_prop calls.
    pub fn set_prop(&self, id: Xid, name: &str, prop: Prop) {
        self.props.borrow_mut().insert((id, name.to_string()), prop);
    }

    /// The border width last sent to the server for `id`.
    pub fn configured_border(&self, id: Xid) -> Option<i32> {
        self.configured.borrow().get(&id).map(|(_, bw)| *bw)
    }
}

impl StubXConn for RecordingXConn {
    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        if self.screens.is_empty() {
            Ok(vec![Rect::new(0, 0, 1920, 1080)])
        } else {
            Ok(self.screens.clone())
        }
    }

    fn mock_get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        Ok(self.props.borrow().get(&(id, name.to_string())).cloned())
    }

    fn mock_text_prop(&self, id: Xid, name: &str) -> Result<Option<String>> {
        match self.props.borrow().get(&(id, name.to_string())) {
            Some(Prop::UTF8String(strs)) => Ok(strs.first().cloned()),
            _ => Ok(None),
        }
    }

    fn mock_position_client(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        self.configured.borrow_mut().insert(id, (r, bw));

        Ok(())
    }

    fn mock_set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        self.urgency.borrow_mut().push((id, urgent));

        Ok(())
    }
}

/// A draw stub with fixed glyph metrics: 8px per byte, 16px font height.
#[derive(Debug, Default)]
pub struct StubDraw;

impl Draw for StubDraw {
    fn font_height(&self) -> i32 {
        16
    }

    fn resize(&mut self, _: i32, _: i32) -> Result<()> {
        Ok(())
    }

    fn set_scheme(&mut self, _: ColorScheme) {}

    fn text_width(&mut self, text: &str) -> Result<i32> {
        Ok(8 * text.len() as i32 + self.font_height())
    }

    fn text(
        &mut self,
        x: i32,
        _: i32,
        w: i32,
        _: i32,
        _: i32,
        _: &str,
        _: bool,
    ) -> Result<i32> {
        Ok(x + w)
    }

    fn rect(&mut self, _: i32, _: i32, _: i32, _: i32, _: bool, _: bool) -> Result<()> {
        Ok(())
    }

    fn map(&mut self, _: Xid, _: i32, _: i32, _: i32, _: i32) -> Result<()> {
        Ok(())
    }
}

/// A manager over stub connections with `n` managed clients (window ids
/// `1..=n`), one 1920x1080 monitor and the bar hidden so the work area is
/// the full screen.
pub fn test_wm_with_clients(n: u32) -> WindowManager<RecordingXConn, StubDraw> {
    test_wm(RecordingXConn::default(), n)
}

/// As [test_wm_with_clients] but with explicit output geometries.
pub fn test_wm_with_screens(screens: Vec<Rect>, n: u32) -> WindowManager<RecordingXConn, StubDraw> {
    test_wm(RecordingXConn::with_screens(screens), n)
}

pub fn test_wm(conn: RecordingXConn, n: u32) -> WindowManager<RecordingXConn, StubDraw> {
    let config = Config {
        show_bar: false,
        ..Config::default()
    };

    let mut wm = WindowManager::new(config, vec![], vec![], conn, StubDraw);
    wm.update_geometry().expect("stub geometry");

    for i in 1..=n {
        wm.manage(Xid(i)).expect("manage stub client");
    }

    wm
}
