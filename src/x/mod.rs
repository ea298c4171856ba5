//! Logic for interacting with the X server
use crate::{
    core::bindings::KeyCode,
    pure::geometry::{Point, Rect},
    Result, Xid,
};

pub mod atom;
pub mod event;
pub mod property;

#[cfg(test)]
pub mod mock;

pub use atom::Atom;
pub use event::XEvent;
pub use property::{Prop, SizeHints, WindowAttributes, WmHints, WmState};

/// A window type to be specified when creating a new window in the X server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WinType {
    /// A simple hidden stub window for facilitating other API calls
    CheckWin,
    /// An override-redirect window drawn above clients (the bar)
    Bar,
}

/// Attributes that can be set on an X client window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientAttr {
    /// Border color as an 0xRRGGBB pixel value
    BorderColor(u32),
    /// Set the pre-defined event mask for a managed client
    ClientEventMask,
    /// Set the pre-defined root window event mask and root cursor
    RootEventMask,
}

/// The cursor shapes used by the window manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// The default pointer
    Normal,
    /// Shown while interactively resizing a client
    Resize,
    /// Shown while interactively moving a client
    Move,
}

/// A handle on a running X11 connection that we can use for issuing X
/// requests.
///
/// XConn is an abstraction layer between the window manager core and the
/// concrete mechanism used for talking to the display server. The core
/// mutates its [pure state](crate::pure) and then issues requests through
/// this trait; a stub implementation is enough to exercise the manager
/// logic in tests.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;
    /// The dimensions of the root window at connection time.
    fn screen_size(&self) -> (i32, i32);
    /// The geometry of each physical output currently available.
    ///
    /// Duplicates are reported as-is: deduplication is model logic.
    fn screen_details(&self) -> Result<Vec<Rect>>;
    /// The current (x, y) coordinate of the mouse cursor.
    fn cursor_position(&self) -> Result<Point>;
    /// Reposition the mouse cursor within the given window.
    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()>;

    /// Block and wait for the next event from the X server.
    fn next_event(&self) -> Result<XEvent>;
    /// Flush any pending requests to the X server.
    fn flush(&self);
    /// Flush and wait for the server to have processed everything sent.
    fn sync(&self) -> Result<()>;
    /// Sync with the server and then discard any queued pointer-crossing
    /// events, so that restacks do not generate spurious focus changes.
    fn drain_crossing_events(&self) -> Result<()>;

    /// Claim the substructure redirect selection on the root window.
    ///
    /// # Errors
    /// Returns [Error::OtherWmRunning](crate::Error::OtherWmRunning) if
    /// another window manager currently owns it.
    fn become_wm(&self) -> Result<()>;

    /// Create a new window of the requested type.
    fn create_window(&self, ty: WinType, r: Rect) -> Result<Xid>;
    /// Destroy a window created by [XConn::create_window].
    fn destroy_window(&self, id: Xid) -> Result<()>;
    /// Map the given window, making it visible.
    fn map(&self, id: Xid) -> Result<()>;
    /// Move a window without resizing it.
    fn move_window(&self, id: Xid, x: i32, y: i32) -> Result<()>;
    /// Move and resize a window (used for the bar, which has no border).
    fn move_resize_window(&self, id: Xid, r: Rect) -> Result<()>;
    /// Set the position, size and border width of a client window.
    fn position_client(&self, id: Xid, r: Rect, bw: i32) -> Result<()>;
    /// Raise a window to the top of the stacking order.
    fn raise(&self, id: Xid) -> Result<()>;
    /// Stack a window directly below the given sibling.
    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()>;
    /// Forward a configure request for an unmanaged window verbatim.
    fn forward_configure_request(&self, ev: &event::ConfigureRequest) -> Result<()>;
    /// Send a synthetic ConfigureNotify for the current client geometry.
    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()>;

    /// Request the [WindowAttributes] for a window.
    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes>;
    /// Current geometry and border width of a window.
    fn client_geometry(&self, id: Xid) -> Result<(Rect, i32)>;
    /// IDs of all current children of the root window.
    fn existing_clients(&self) -> Result<Vec<Xid>>;

    /// The server-side id interned for a known [Atom].
    fn known_atom(&self, atom: Atom) -> u32;
    /// Look up a property on a window by atom name.
    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>>;
    /// Replace a property on a window.
    fn replace_prop(&self, id: Xid, prop: Atom, val: Prop) -> Result<()>;
    /// Append a window id to a WINDOW list property.
    fn append_window_prop(&self, id: Xid, prop: Atom, win: Xid) -> Result<()>;
    /// Delete a property from a window.
    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()>;
    /// Read a text property, trying UTF8 then legacy encodings.
    fn text_prop(&self, id: Xid, name: &str) -> Result<Option<String>>;
    /// Read a single-atom property, returning the atom's name.
    fn atom_prop(&self, id: Xid, name: &str) -> Result<Option<String>>;
    /// The ICCCM WM_STATE of a window, if set.
    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>>;
    /// Set the ICCCM WM_STATE of a window.
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;
    /// Rewrite WM_HINTS with the urgency bit set or cleared.
    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()>;
    /// Does the window advertise the given protocol in WM_PROTOCOLS?
    fn supports_protocol(&self, id: Xid, proto: Atom) -> Result<bool>;
    /// Send a WM_PROTOCOLS client message (WM_DELETE_WINDOW etc).
    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<()>;

    /// Set one or more [ClientAttr] on a window.
    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()>;
    /// Give X input focus to the given window.
    fn focus_client(&self, id: Xid) -> Result<()>;
    /// Return X input focus to the root / pointer root.
    fn focus_root(&self) -> Result<()>;
    /// Forcibly kill a client via the server.
    fn kill_client(&self, id: Xid) -> Result<()>;
    /// Release a window we are no longer managing: restore its border,
    /// drop our button grabs and mark it withdrawn. Runs under a server
    /// grab and ignores errors from the individual requests, as the
    /// window may be going away underneath us.
    fn release_client(&self, id: Xid, old_bw: i32) -> Result<()>;

    /// Grab the given key code + modifier combination on the root window.
    fn grab_key(&self, code: KeyCode) -> Result<()>;
    /// Release all key grabs on the root window.
    fn ungrab_keys(&self) -> Result<()>;
    /// Grab a button + modifier combination on the given window.
    ///
    /// `button` 0 grabs any button, [ANY_MODIFIER][1] any modifier state.
    /// A `sync` grab freezes event delivery until the pointer is allowed
    /// to replay (see [XConn::allow_pointer_replay]).
    ///
    /// [1]: crate::core::bindings::ANY_MODIFIER
    fn grab_button(&self, id: Xid, button: u8, mask: u16, sync: bool) -> Result<()>;
    /// Release all button grabs on the given window.
    fn ungrab_buttons(&self, id: Xid) -> Result<()>;
    /// Replay a sync-grabbed button press to the client it landed on.
    fn allow_pointer_replay(&self) -> Result<()>;
    /// Actively grab the pointer, showing the given cursor shape.
    ///
    /// Returns false if the grab could not be acquired.
    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool>;
    /// Release an active pointer grab.
    fn ungrab_pointer(&self) -> Result<()>;
    /// The server's modifier mapping: eight groups of key codes, one per
    /// modifier bit.
    fn modifier_mapping(&self) -> Result<Vec<Vec<u8>>>;
}

/// Derived helpers for all [XConn] impls.
pub trait XConnExt: XConn + Sized {
    /// Request the title of a given window following EWMH then ICCCM
    /// conventions, falling back to a fixed sentinel for windows whose
    /// title is unset or undecodable.
    fn window_title(&self, id: Xid) -> String {
        let net = self.text_prop(id, Atom::NetWmName.as_ref());
        let icccm = || self.text_prop(id, Atom::WmName.as_ref());

        match net.ok().flatten().or_else(|| icccm().ok().flatten()) {
            Some(s) if !s.is_empty() => s,
            _ => "broken".to_string(),
        }
    }

    /// The window this one is transient for, if any.
    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        match self.get_prop(id, Atom::WmTransientFor.as_ref())? {
            Some(Prop::Window(ids)) => Ok(ids.first().copied()),
            _ => Ok(None),
        }
    }

    /// The (instance, class) pair from WM_CLASS, when set.
    fn window_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        match self.get_prop(id, Atom::WmClass.as_ref())? {
            Some(Prop::UTF8String(strs)) if strs.len() >= 2 => {
                Ok(Some((strs[0].clone(), strs[1].clone())))
            }
            _ => Ok(None),
        }
    }

    /// The WM_HINTS property of a window, when set and well formed.
    fn wm_hints(&self, id: Xid) -> Option<WmHints> {
        match self.get_prop(id, Atom::WmHints.as_ref()) {
            Ok(Some(Prop::WmHints(hints))) => Some(hints),
            _ => None,
        }
    }

    /// The WM_NORMAL_HINTS property of a window, when set and well formed.
    fn size_hints(&self, id: Xid) -> Option<SizeHints> {
        match self.get_prop(id, Atom::WmNormalHints.as_ref()) {
            Ok(Some(Prop::SizeHints(hints))) => Some(hints),
            _ => None,
        }
    }
}

// Auto impl XConnExt for all XConn impls
impl<T> XConnExt for T where T: XConn {}
