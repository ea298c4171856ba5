//! API wrapper for talking to the X server using x11rb
use crate::{
    core::bindings::KeyCode,
    pure::geometry::{Point, Rect},
    x::{
        event::{
            ClientMessage, ConfigureEvent, ConfigureMask, ConfigureRequest, CrossingEvent,
            ExposeEvent, MotionEvent, MouseEvent, PropertyEvent,
        },
        property::{MapState, Prop, SizeHints, WindowAttributes, WmHints, WmState},
        Atom, ClientAttr, CursorKind, WinType, XConn, XEvent,
    },
    Error, Result, Xid,
};
use ::x11rb::{
    connection::Connection,
    protocol::{
        xinerama::ConnectionExt as _,
        xproto::{
            Allow, AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent,
            CloseDown, ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, Grab, GrabMode, GrabStatus, InputFocus,
            MapState as XMapState, Mapping, ModMask, NotifyDetail, NotifyMode, PropMode, Property,
            StackMode, Window, WindowClass,
            CLIENT_MESSAGE_EVENT, CONFIGURE_NOTIFY_EVENT, CONFIGURE_WINDOW_REQUEST,
            COPY_AREA_REQUEST, GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST, IMAGE_TEXT8_REQUEST,
            POLY_FILL_RECTANGLE_REQUEST, POLY_SEGMENT_REQUEST, POLY_TEXT8_REQUEST,
            SET_INPUT_FOCUS_REQUEST,
        },
        ErrorKind, Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fmt,
    str::FromStr,
};
use strum::IntoEnumIterator;
use tracing::{debug, error, trace};

// Cursor font glyph indices for the shapes we use
const XC_LEFT_PTR: u16 = 68;
const XC_SIZING: u16 = 120;
const XC_FLEUR: u16 = 52;

const URGENCY_HINT: u32 = 1 << 8;

/// Handles communication with an X server via the x11rb crate.
pub struct RustConn {
    conn: RustConnection,
    root: Window,
    sw: i32,
    sh: i32,
    atoms: HashMap<Atom, u32>,
    cursors: HashMap<CursorKind, u32>,
    // events pulled off the wire while draining crossings, waiting to be
    // handed to the main loop
    pending: RefCell<VecDeque<XEvent>>,
}

impl fmt::Debug for RustConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustConn").field("root", &self.root).finish()
    }
}

impl RustConn {
    /// Establish a new connection to the running X server.
    ///
    /// All known atoms are interned up front (requests first, replies
    /// after, so it is a single round trip) along with the cursors used
    /// for normal operation and the interactive drags.
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let (sw, sh) = (
            screen.width_in_pixels as i32,
            screen.height_in_pixels as i32,
        );

        let cookies: Vec<_> = Atom::iter()
            .map(|a| conn.intern_atom(false, a.as_ref().as_bytes()).map(|c| (a, c)))
            .collect::<std::result::Result<_, _>>()?;
        let mut atoms = HashMap::new();
        for (a, cookie) in cookies {
            atoms.insert(a, cookie.reply()?.atom);
        }

        let cursor_font = conn.generate_id()?;
        conn.open_font(cursor_font, b"cursor")?;
        let mut cursors = HashMap::new();
        for (kind, glyph) in [
            (CursorKind::Normal, XC_LEFT_PTR),
            (CursorKind::Resize, XC_SIZING),
            (CursorKind::Move, XC_FLEUR),
        ] {
            let cid = conn.generate_id()?;
            conn.create_glyph_cursor(
                cid,
                cursor_font,
                cursor_font,
                glyph,
                glyph + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )?;
            cursors.insert(kind, cid);
        }
        conn.flush()?;

        Ok(Self {
            conn,
            root,
            sw,
            sh,
            atoms,
            cursors,
            pending: RefCell::new(VecDeque::new()),
        })
    }

    fn known(&self, atom: Atom) -> u32 {
        // the atom table is fully populated at construction time
        self.atoms.get(&atom).copied().unwrap_or(NONE)
    }

    fn intern(&self, name: &str) -> Result<u32> {
        if let Ok(atom) = Atom::from_str(name) {
            return Ok(self.known(atom));
        }

        Ok(self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
    }

    fn atom_name(&self, id: u32) -> Result<String> {
        if let Some((atom, _)) = self.atoms.iter().find(|(_, &v)| v == id) {
            return Ok(atom.as_ref().to_string());
        }

        let reply = self.conn.get_atom_name(id)?.reply()?;

        Ok(String::from_utf8(reply.name)?)
    }

    // Benign errors are races against clients coming and going, grabs
    // held elsewhere and drawing to windows that died: drop them. The
    // rest is reported and the event loop keeps running.
    fn handle_x_error(&self, e: ::x11rb::x11_utils::X11Error) {
        let kind = e.error_kind;
        let req = e.major_opcode;

        let benign = matches!(kind, ErrorKind::Window)
            || (matches!(kind, ErrorKind::Match)
                && [SET_INPUT_FOCUS_REQUEST, CONFIGURE_WINDOW_REQUEST].contains(&req))
            || (matches!(kind, ErrorKind::Drawable)
                && [
                    POLY_TEXT8_REQUEST,
                    IMAGE_TEXT8_REQUEST,
                    POLY_FILL_RECTANGLE_REQUEST,
                    POLY_SEGMENT_REQUEST,
                    COPY_AREA_REQUEST,
                ]
                .contains(&req))
            || (matches!(kind, ErrorKind::Access)
                && [GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST].contains(&req));

        if benign {
            trace!(?kind, request = req, "ignoring benign X error");
        } else {
            error!(?kind, request = req, sequence = e.sequence, "unexpected X error");
        }
    }

    fn convert_event(&self, event: Event) -> Result<Option<XEvent>> {
        let converted = match event {
            Event::Error(e) => {
                self.handle_x_error(e);
                None
            }

            Event::KeyPress(e) => Some(XEvent::KeyPress(KeyCode {
                mask: u16::from(e.state),
                code: e.detail,
            })),

            Event::ButtonPress(e) => Some(XEvent::ButtonPress(MouseEvent {
                id: Xid(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                relative: Point::new(e.event_x as i32, e.event_y as i32),
                mask: u16::from(e.state),
                button: e.detail,
                time: e.time,
            })),

            Event::ButtonRelease(e) => Some(XEvent::ButtonRelease(MouseEvent {
                id: Xid(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                relative: Point::new(e.event_x as i32, e.event_y as i32),
                mask: u16::from(e.state),
                button: e.detail,
                time: e.time,
            })),

            Event::MotionNotify(e) => Some(XEvent::Motion(MotionEvent {
                id: Xid(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                time: e.time,
                is_root: e.event == self.root,
            })),

            Event::EnterNotify(e) => Some(XEvent::Enter(CrossingEvent {
                id: Xid(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                is_root: e.event == self.root,
                normal_mode: e.mode == NotifyMode::NORMAL,
                inferior: e.detail == NotifyDetail::INFERIOR,
            })),

            Event::FocusIn(e) => Some(XEvent::FocusIn(Xid(e.event))),

            Event::Expose(e) => Some(XEvent::Expose(ExposeEvent {
                id: Xid(e.window),
                count: e.count as usize,
            })),

            Event::DestroyNotify(e) => Some(XEvent::Destroy(Xid(e.window))),

            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify {
                id: Xid(e.window),
                synthetic: e.response_type & 0x80 != 0,
            }),

            Event::MapRequest(e) => Some(XEvent::MapRequest(Xid(e.window))),

            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify(ConfigureEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as i32, e.y as i32, e.width as i32, e.height as i32),
                is_root: e.window == self.root,
            })),

            Event::ConfigureRequest(e) => Some(XEvent::ConfigureRequest(ConfigureRequest {
                id: Xid(e.window),
                x: e.x as i32,
                y: e.y as i32,
                w: e.width as i32,
                h: e.height as i32,
                border_width: e.border_width as i32,
                sibling: Xid(e.sibling),
                stack_mode: u32::from(e.stack_mode) as u8,
                mask: ConfigureMask::from_bits_truncate(u16::from(e.value_mask)),
            })),

            Event::PropertyNotify(e) => Some(XEvent::PropertyNotify(PropertyEvent {
                id: Xid(e.window),
                atom: self.atom_name(e.atom)?,
                is_root: e.window == self.root,
                deleted: e.state == Property::DELETE,
            })),

            Event::ClientMessage(e) => Some(XEvent::ClientMessage(ClientMessage {
                id: Xid(e.window),
                dtype: self.atom_name(e.type_)?,
                data: e.data.as_data32(),
            })),

            Event::MappingNotify(e) => Some(XEvent::MappingNotify {
                keyboard: e.request == Mapping::KEYBOARD,
            }),

            _ => None,
        };

        Ok(converted)
    }
}

impl XConn for RustConn {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn screen_size(&self) -> (i32, i32) {
        (self.sw, self.sh)
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        let active = self.conn.xinerama_is_active()?.reply()?.state != 0;
        if !active {
            return Ok(vec![Rect::new(0, 0, self.sw, self.sh)]);
        }

        let screens = self.conn.xinerama_query_screens()?.reply()?.screen_info;

        Ok(screens
            .iter()
            .map(|s| {
                Rect::new(
                    s.x_org as i32,
                    s.y_org as i32,
                    s.width as i32,
                    s.height as i32,
                )
            })
            .collect())
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;

        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(NONE, *id, 0, 0, 0, 0, x, y)?;

        Ok(())
    }

    fn next_event(&self) -> Result<XEvent> {
        if let Some(event) = self.pending.borrow_mut().pop_front() {
            return Ok(event);
        }

        loop {
            let event = self.conn.wait_for_event()?;
            if let Some(converted) = self.convert_event(event)? {
                return Ok(converted);
            }
        }
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }

    fn sync(&self) -> Result<()> {
        // a round trip forces everything queued to be processed
        self.conn.get_input_focus()?.reply()?;

        Ok(())
    }

    fn drain_crossing_events(&self) -> Result<()> {
        self.sync()?;

        let mut dropped = 0;
        while let Some(event) = self.conn.poll_for_event()? {
            match event {
                Event::EnterNotify(_) | Event::LeaveNotify(_) => dropped += 1,
                other => {
                    if let Some(converted) = self.convert_event(other)? {
                        self.pending.borrow_mut().push_back(converted);
                    }
                }
            }
        }

        if dropped > 0 {
            trace!(dropped, "discarded crossing events after restack");
        }

        Ok(())
    }

    fn become_wm(&self) -> Result<()> {
        let aux =
            ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT);

        self.conn
            .change_window_attributes(self.root, &aux)?
            .check()
            .map_err(|_| Error::OtherWmRunning)
    }

    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid> {
        let id = self.conn.generate_id()?;

        let aux = match ty {
            WinType::CheckWin => CreateWindowAux::new().override_redirect(1),
            WinType::Bar => CreateWindowAux::new()
                .override_redirect(1)
                .background_pixel(0)
                .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE)
                .cursor(self.cursors[&CursorKind::Normal]),
        };

        self.conn.create_window(
            0, // copy depth from parent
            id,
            self.root,
            r.x as i16,
            r.y as i16,
            r.w.max(1) as u16,
            r.h.max(1) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            0, // copy visual from parent
            &aux,
        )?;

        Ok(Xid(id))
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.conn.destroy_window(*id)?;

        Ok(())
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id)?;

        Ok(())
    }

    fn move_window(&self, id: Xid, x: i32, y: i32) -> Result<()> {
        let aux = ConfigureWindowAux::new().x(x).y(y);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn move_resize_window(&self, id: Xid, r: Rect) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w.max(1) as u32)
            .height(r.h.max(1) as u32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn position_client(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w.max(1) as u32)
            .height(r.h.max(1) as u32)
            .border_width(bw.max(0) as u32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn raise(&self, id: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .sibling(*sibling)
            .stack_mode(StackMode::BELOW);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn forward_configure_request(&self, ev: &ConfigureRequest) -> Result<()> {
        let mut aux = ConfigureWindowAux::new();

        if ev.mask.contains(ConfigureMask::X) {
            aux = aux.x(ev.x);
        }
        if ev.mask.contains(ConfigureMask::Y) {
            aux = aux.y(ev.y);
        }
        if ev.mask.contains(ConfigureMask::WIDTH) {
            aux = aux.width(ev.w.max(1) as u32);
        }
        if ev.mask.contains(ConfigureMask::HEIGHT) {
            aux = aux.height(ev.h.max(1) as u32);
        }
        if ev.mask.contains(ConfigureMask::BORDER_WIDTH) {
            aux = aux.border_width(ev.border_width.max(0) as u32);
        }
        if ev.mask.contains(ConfigureMask::SIBLING) {
            aux = aux.sibling(*ev.sibling);
        }
        if ev.mask.contains(ConfigureMask::STACK_MODE) {
            aux = aux.stack_mode(StackMode::from(ev.stack_mode));
        }

        self.conn.configure_window(*ev.id, &aux)?;

        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w.max(1) as u16,
            height: r.h.max(1) as u16,
            border_width: bw.max(0) as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)?;

        Ok(())
    }

    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(*id)?.reply()?;

        let map_state = match reply.map_state {
            XMapState::UNMAPPED => MapState::Unmapped,
            XMapState::UNVIEWABLE => MapState::UnViewable,
            _ => MapState::Viewable,
        };

        Ok(WindowAttributes {
            override_redirect: reply.override_redirect,
            map_state,
        })
    }

    fn client_geometry(&self, id: Xid) -> Result<(Rect, i32)> {
        let geo = self.conn.get_geometry(*id)?.reply()?;

        Ok((
            Rect::new(geo.x as i32, geo.y as i32, geo.width as i32, geo.height as i32),
            geo.border_width as i32,
        ))
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(self.root)?.reply()?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        self.known(atom)
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        let atom = self.intern(name)?;

        if name == Atom::WmHints.as_ref() {
            let reply = self
                .conn
                .get_property(false, *id, atom, AtomEnum::WM_HINTS, 0, 9)?
                .reply()?;
            let raw: Vec<u32> = match reply.value32() {
                Some(vals) => vals.collect(),
                None => return Ok(None),
            };

            return Ok(Some(Prop::WmHints(WmHints::try_from_bytes(&raw)?)));
        }

        if name == Atom::WmNormalHints.as_ref() {
            let reply = self
                .conn
                .get_property(false, *id, atom, AtomEnum::WM_SIZE_HINTS, 0, 18)?
                .reply()?;
            let raw: Vec<u32> = match reply.value32() {
                Some(vals) => vals.collect(),
                None => return Ok(None),
            };

            return Ok(Some(Prop::SizeHints(SizeHints::try_from_bytes(&raw)?)));
        }

        let reply = self
            .conn
            .get_property(false, *id, atom, AtomEnum::ANY, 0, 1024)?
            .reply()?;

        if reply.type_ == NONE {
            return Ok(None);
        }

        let prop = if reply.type_ == u32::from(AtomEnum::ATOM) {
            let names = reply
                .value32()
                .into_iter()
                .flatten()
                .map(|v| self.atom_name(v))
                .collect::<Result<Vec<String>>>()?;
            Prop::Atoms(names)
        } else if reply.type_ == u32::from(AtomEnum::WINDOW) {
            Prop::Window(reply.value32().into_iter().flatten().map(Xid).collect())
        } else if reply.type_ == u32::from(AtomEnum::CARDINAL) {
            Prop::Cardinal(reply.value32().into_iter().flatten().collect())
        } else if reply.type_ == u32::from(AtomEnum::STRING)
            || reply.type_ == self.known(Atom::UTF8String)
        {
            let value = String::from_utf8_lossy(&reply.value);
            Prop::UTF8String(value.split('\0').map(|s| s.to_string()).collect())
        } else {
            Prop::Bytes(reply.value32().into_iter().flatten().collect())
        };

        Ok(Some(prop))
    }

    fn replace_prop(&self, id: Xid, prop: Atom, val: Prop) -> Result<()> {
        let atom = self.known(prop);

        match val {
            Prop::Window(ids) => {
                let raw: Vec<u32> = ids.iter().map(|x| **x).collect();
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::WINDOW, &raw)?;
            }

            Prop::Cardinal(vals) => {
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::CARDINAL, &vals)?;
            }

            Prop::Atoms(names) => {
                let raw: Vec<u32> = names
                    .iter()
                    .map(|n| self.intern(n))
                    .collect::<Result<_>>()?;
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::ATOM, &raw)?;
            }

            Prop::UTF8String(strs) => {
                self.conn.change_property8(
                    PropMode::REPLACE,
                    *id,
                    atom,
                    self.known(Atom::UTF8String),
                    strs.join("\0").as_bytes(),
                )?;
            }

            val => debug!(?val, "unhandled property payload type"),
        }

        Ok(())
    }

    fn append_window_prop(&self, id: Xid, prop: Atom, win: Xid) -> Result<()> {
        self.conn.change_property32(
            PropMode::APPEND,
            *id,
            self.known(prop),
            AtomEnum::WINDOW,
            &[*win],
        )?;

        Ok(())
    }

    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()> {
        self.conn.delete_property(*id, self.known(prop))?;

        Ok(())
    }

    fn text_prop(&self, id: Xid, name: &str) -> Result<Option<String>> {
        let atom = self.intern(name)?;
        let reply = self
            .conn
            .get_property(false, *id, atom, AtomEnum::ANY, 0, 1024)?
            .reply()?;

        if reply.type_ == NONE || reply.value.is_empty() || reply.format != 8 {
            return Ok(None);
        }

        let s = String::from_utf8_lossy(&reply.value);
        let first = s.split('\0').next().unwrap_or_default().to_string();

        Ok(Some(first))
    }

    fn atom_prop(&self, id: Xid, name: &str) -> Result<Option<String>> {
        let atom = self.intern(name)?;
        let reply = self
            .conn
            .get_property(false, *id, atom, AtomEnum::ATOM, 0, 32)?
            .reply()?;

        let result = match reply.value32().into_iter().flatten().next() {
            Some(v) => Ok(Some(self.atom_name(v)?)),
            None => Ok(None),
        };
        result
    }

    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        let atom = self.known(Atom::WmState);
        let reply = self
            .conn
            .get_property(false, *id, atom, atom, 0, 2)?
            .reply()?;

        let state = match reply.value32().into_iter().flatten().next() {
            Some(0) => Some(WmState::Withdrawn),
            Some(1) => Some(WmState::Normal),
            Some(3) => Some(WmState::Iconic),
            _ => None,
        };

        Ok(state)
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        let atom = self.known(Atom::WmState);
        // state followed by the icon window we never use
        let data = [u32::from(state), NONE];
        self.conn
            .change_property32(PropMode::REPLACE, *id, atom, atom, &data)?;

        Ok(())
    }

    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        let atom = self.known(Atom::WmHints);
        let reply = self
            .conn
            .get_property(false, *id, atom, AtomEnum::WM_HINTS, 0, 9)?
            .reply()?;

        let mut raw: Vec<u32> = reply.value32().into_iter().flatten().collect();
        if raw.len() != 9 {
            return Ok(());
        }

        if urgent {
            raw[0] |= URGENCY_HINT;
        } else {
            raw[0] &= !URGENCY_HINT;
        }

        self.conn
            .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::WM_HINTS, &raw)?;

        Ok(())
    }

    fn supports_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        let protocols = self.known(Atom::WmProtocols);
        let reply = self
            .conn
            .get_property(false, *id, protocols, AtomEnum::ATOM, 0, 32)?
            .reply()?;

        let wanted = self.known(proto);

        let result = reply.value32().into_iter().flatten().any(|v| v == wanted);
        Ok(result)
    }

    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: *id,
            type_: self.known(Atom::WmProtocols),
            data: [self.known(proto), CURRENT_TIME, 0, 0, 0].into(),
        };
        self.conn
            .send_event(false, *id, EventMask::NO_EVENT, event)?;

        Ok(())
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        let mut aux = ChangeWindowAttributesAux::new();

        for attr in attrs {
            aux = match attr {
                ClientAttr::BorderColor(color) => aux.border_pixel(*color),

                ClientAttr::ClientEventMask => aux.event_mask(
                    EventMask::ENTER_WINDOW
                        | EventMask::FOCUS_CHANGE
                        | EventMask::PROPERTY_CHANGE
                        | EventMask::STRUCTURE_NOTIFY,
                ),

                ClientAttr::RootEventMask => aux
                    .event_mask(
                        EventMask::SUBSTRUCTURE_REDIRECT
                            | EventMask::SUBSTRUCTURE_NOTIFY
                            | EventMask::BUTTON_PRESS
                            | EventMask::POINTER_MOTION
                            | EventMask::ENTER_WINDOW
                            | EventMask::LEAVE_WINDOW
                            | EventMask::STRUCTURE_NOTIFY
                            | EventMask::PROPERTY_CHANGE,
                    )
                    .cursor(self.cursors[&CursorKind::Normal]),
            };
        }

        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn focus_client(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *id, CURRENT_TIME)?;

        Ok(())
    }

    fn focus_root(&self) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;

        Ok(())
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        let _guard = ServerGuard::new(&self.conn)?;

        let _ = self.conn.set_close_down_mode(CloseDown::DESTROY_ALL);
        let _ = self.conn.kill_client(*id);

        self.sync()
    }

    fn release_client(&self, id: Xid, old_bw: i32) -> Result<()> {
        let _guard = ServerGuard::new(&self.conn)?;

        // the window may already be half gone: errors here are expected
        let aux = ConfigureWindowAux::new().border_width(old_bw.max(0) as u32);
        let _ = self.conn.configure_window(*id, &aux);
        let _ = self
            .conn
            .ungrab_button(ButtonIndex::ANY, *id, ModMask::ANY);
        let atom = self.known(Atom::WmState);
        let _ = self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            atom,
            atom,
            &[u32::from(WmState::Withdrawn), NONE],
        );

        self.sync()
    }

    fn grab_key(&self, code: KeyCode) -> Result<()> {
        self.conn.grab_key(
            true, // pass events on to the client as normal
            self.root,
            ModMask::from(code.mask),
            code.code,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )?;

        Ok(())
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;

        Ok(())
    }

    fn grab_button(&self, id: Xid, button: u8, mask: u16, sync: bool) -> Result<()> {
        let (pointer_mode, keyboard_mode) = if sync {
            (GrabMode::SYNC, GrabMode::SYNC)
        } else {
            (GrabMode::ASYNC, GrabMode::SYNC)
        };

        self.conn.grab_button(
            false,
            *id,
            EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
            pointer_mode,
            keyboard_mode,
            NONE, // don't confine the pointer
            NONE, // keep the current cursor
            ButtonIndex::from(button),
            ModMask::from(mask),
        )?;

        Ok(())
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.conn
            .ungrab_button(ButtonIndex::ANY, *id, ModMask::ANY)?;

        Ok(())
    }

    fn allow_pointer_replay(&self) -> Result<()> {
        self.conn.allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)?;
        self.conn.flush()?;

        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE
                    | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursors[&cursor],
                CURRENT_TIME,
            )?
            .reply()?;

        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;

        Ok(())
    }

    fn modifier_mapping(&self) -> Result<Vec<Vec<u8>>> {
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        let per = (reply.keycodes.len() / 8).max(1);

        Ok(reply.keycodes.chunks(per).map(|c| c.to_vec()).collect())
    }
}

// Paired server grab / ungrab with guaranteed release on all exit paths.
struct ServerGuard<'a> {
    conn: &'a RustConnection,
}

impl<'a> ServerGuard<'a> {
    fn new(conn: &'a RustConnection) -> Result<Self> {
        conn.grab_server()?;

        Ok(Self { conn })
    }
}

impl<'a> Drop for ServerGuard<'a> {
    fn drop(&mut self) {
        let _ = self.conn.ungrab_server();
        let _ = self.conn.flush();
    }
}
