//! girih: a dynamic tiling window manager in the spirit of dwm.
//!
//! girih manages top-level client windows across one or more monitors,
//! tiling them according to a small set of layout algorithms and a
//! per-monitor tag bitmask that decides which clients are visible. The
//! pure data model (clients, monitors, tags, layouts) lives under
//! [`pure`], communication with the X server is abstracted behind the
//! [`x::XConn`] trait with a concrete [x11rb](::x11rb) based
//! implementation in [`x11rb`], and the manager logic itself is driven
//! by a single blocking event loop in [`core::WindowManager`].
#![warn(clippy::all)]

pub mod bar;
mod color;
pub mod config;
pub mod core;
pub mod draw;
pub mod layout;
pub mod pure;
pub mod util;
pub mod x;
pub mod x11rb;

use std::ops::Deref;

pub use color::{Color, ColorScheme};

/// The crate version, used for the status fallback and `-v` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A Result type for fallible methods within girih itself.
pub type Result<T> = std::result::Result<T, Error>;

/// Error variants from the core window manager and its X transport.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection broke
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get an X11 request reply
    #[error(transparent)]
    Reply(#[from] ::x11rb::errors::ReplyError),

    /// Could not get an X11 request reply or generate a new resource id
    #[error(transparent)]
    ReplyOrId(#[from] ::x11rb::errors::ReplyOrIdError),

    /// Another window manager already owns the substructure redirect
    /// selection on the root window.
    #[error("another window manager is already running")]
    OtherWmRunning,

    /// A hex color string was not of the form #RRGGBB or #RRGGBBAA
    #[error("invalid hex color code: {0}")]
    InvalidHexColor(String),

    /// WM_HINTS / WM_NORMAL_HINTS data from the server was malformed
    #[error("invalid window hints property: {0}")]
    InvalidHints(String),

    /// None of the configured fonts could be opened on the X server
    #[error("no usable font: tried {0:?}")]
    NoUsableFont(Vec<String>),

    /// A key pattern referenced a key name missing from the current keymap
    #[error("'{0}' is not a known key name")]
    UnknownKeyName(String),

    /// A key pattern used an unknown modifier prefix
    #[error("invalid key binding modifier: {0}")]
    UnknownModifier(String),

    /// An error while running an external helper command
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Helper command output was not valid utf8
    #[error(transparent)]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// An X11 ID for a given resource
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub(crate) u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}
