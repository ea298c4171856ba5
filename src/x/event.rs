//! Data types for working with X events
use crate::{
    core::bindings::KeyCode,
    pure::geometry::{Point, Rect},
    Xid,
};
use bitflags::bitflags;

/// Wrapper around the low level X event types that correspond to request /
/// response data when communicating with the X server itself.
///
/// The variant names and payloads have developed with the x11rb reference
/// implementation in mind but should be applicable for all back ends.
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    /// A mouse button was pressed
    ButtonPress(MouseEvent),
    /// A mouse button was released
    ButtonRelease(MouseEvent),
    /// A message has been sent to a particular client
    ClientMessage(ClientMessage),
    /// Client config has changed in some way
    ConfigureNotify(ConfigureEvent),
    /// A client is requesting to be repositioned
    ConfigureRequest(ConfigureRequest),
    /// A client window has been closed
    Destroy(Xid),
    /// The mouse pointer has entered a new window
    Enter(CrossingEvent),
    /// A part or all of a window has become visible
    Expose(ExposeEvent),
    /// A client should have focus
    FocusIn(Xid),
    /// A grabbed key combination has been entered by the user
    KeyPress(KeyCode),
    /// Keyboard or pointer mappings have changed
    MappingNotify {
        /// Was it the keyboard mapping that changed?
        keyboard: bool,
    },
    /// A client window is requesting to be positioned and rendered on the
    /// screen.
    MapRequest(Xid),
    /// The mouse pointer has moved
    Motion(MotionEvent),
    /// A property has changed in some way
    PropertyNotify(PropertyEvent),
    /// A client is being unmapped
    UnmapNotify {
        /// The window being unmapped
        id: Xid,
        /// Was this a synthetic event sent by the client itself?
        synthetic: bool,
    },
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;

        match self {
            ButtonPress(_) => write!(f, "ButtonPress"),
            ButtonRelease(_) => write!(f, "ButtonRelease"),
            ClientMessage(_) => write!(f, "ClientMessage"),
            ConfigureNotify(_) => write!(f, "ConfigureNotify"),
            ConfigureRequest(_) => write!(f, "ConfigureRequest"),
            Destroy(_) => write!(f, "Destroy"),
            Enter(_) => write!(f, "Enter"),
            Expose(_) => write!(f, "Expose"),
            FocusIn(_) => write!(f, "FocusIn"),
            KeyPress(_) => write!(f, "KeyPress"),
            MappingNotify { .. } => write!(f, "MappingNotify"),
            MapRequest(_) => write!(f, "MapRequest"),
            Motion(_) => write!(f, "Motion"),
            PropertyNotify(_) => write!(f, "PropertyNotify"),
            UnmapNotify { .. } => write!(f, "UnmapNotify"),
        }
    }
}

/// A mouse button press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// The window that contained the click
    pub id: Xid,
    /// Absolute coordinate of the event
    pub abs: Point,
    /// Coordinate of the event relative to top-left of the window itself
    pub relative: Point,
    /// The raw modifier state held at the time of the event
    pub mask: u16,
    /// The raw button number (1..=5 for real buttons)
    pub button: u8,
    /// The server timestamp of the event
    pub time: u32,
}

/// The pointer has moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionEvent {
    /// The window the motion was reported against
    pub id: Xid,
    /// Absolute coordinate of the pointer
    pub abs: Point,
    /// The server timestamp of the event
    pub time: u32,
    /// Was this reported against the root window?
    pub is_root: bool,
}

/// The pointer has crossed a window boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrossingEvent {
    /// The window that was entered
    pub id: Xid,
    /// Absolute coordinate of the event
    pub abs: Point,
    /// Was the crossing into the root window?
    pub is_root: bool,
    /// Was this a normal-mode crossing (not a grab side effect)?
    pub normal_mode: bool,
    /// Was the crossing from a child of the entered window?
    pub inferior: bool,
}

/// A notification that a window has become visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExposeEvent {
    /// The window that has become exposed
    pub id: Xid,
    /// How many following expose events are pending
    pub count: usize,
}

/// A property change on a window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyEvent {
    /// The window that had a property changed
    pub id: Xid,
    /// The property that changed, by atom name
    pub atom: String,
    /// Is this the root window?
    pub is_root: bool,
    /// Was the property deleted rather than replaced?
    pub deleted: bool,
}

/// A notification that a window changed position or size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigureEvent {
    /// The window that was configured
    pub id: Xid,
    /// The new window size and position
    pub r: Rect,
    /// Is this the root window?
    pub is_root: bool,
}

bitflags! {
    /// Which fields of a [ConfigureRequest] the client actually asked for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConfigureMask: u16 {
        /// x position requested
        const X            = 1 << 0;
        /// y position requested
        const Y            = 1 << 1;
        /// width requested
        const WIDTH        = 1 << 2;
        /// height requested
        const HEIGHT       = 1 << 3;
        /// border width requested
        const BORDER_WIDTH = 1 << 4;
        /// stacking sibling requested
        const SIBLING      = 1 << 5;
        /// stacking mode requested
        const STACK_MODE   = 1 << 6;
    }
}

/// A client request to be repositioned, resized or restacked.
///
/// The raw fields are retained so that requests for unmanaged windows can
/// be forwarded to the server verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigureRequest {
    /// The window making the request
    pub id: Xid,
    /// Requested x position
    pub x: i32,
    /// Requested y position
    pub y: i32,
    /// Requested width
    pub w: i32,
    /// Requested height
    pub h: i32,
    /// Requested border width
    pub border_width: i32,
    /// Requested stacking sibling
    pub sibling: Xid,
    /// Requested stacking mode (raw protocol value)
    pub stack_mode: u8,
    /// Which of the fields above were requested
    pub mask: ConfigureMask,
}

/// A message sent to a window, parsed and handled based on its type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientMessage {
    /// The target window of the message
    pub id: Xid,
    /// The message type, by atom name
    pub dtype: String,
    /// The message payload as 32-bit words
    pub data: [u32; 5],
}
