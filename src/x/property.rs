//! Data types for working with X window properties
use crate::{Error, Result, Xid};
use bitflags::bitflags;

/// Known property types that should be returnable by XConn impls when they
/// check window properties.
#[derive(Debug, PartialEq, Clone)]
pub enum Prop {
    /// One or more X Atoms, by name
    Atoms(Vec<String>),
    /// Raw 32 bit words for when the prop type is non-standard
    Bytes(Vec<u32>),
    /// One or more cardinal numbers
    Cardinal(Vec<u32>),
    /// UTF-8 encoded string data
    UTF8String(Vec<String>),
    /// One or more X window IDs
    Window(Vec<Xid>),
    /// The WM_HINTS properties for this window
    WmHints(WmHints),
    /// The WM_NORMAL_HINTS properties for this window
    SizeHints(SizeHints),
}

bitflags! {
    /// Possible flags that can be set in a WM_HINTS client property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmHintsFlags: u32 {
        /// Input hint is set
        const INPUT_HINT         = 0b0000000001;
        /// State hint is set
        const STATE_HINT         = 0b0000000010;
        /// Icon pixmap hint is set
        const ICON_PIXMAP_HINT   = 0b0000000100;
        /// Icon window hint is set
        const ICON_WINDOW_HINT   = 0b0000001000;
        /// Icon position hint is set
        const ICON_POSITION_HINT = 0b0000010000;
        /// Icon mask hint is set
        const ICON_MASK_HINT     = 0b0000100000;
        /// Window group hint is set
        const WINDOW_GROUP_HINT  = 0b0001000000;
        // unused                  0b0010000000;
        /// Urgency hint is set
        const URGENCY_HINT       = 0b0100000000;
    }
}

bitflags! {
    /// Possible flags that can be set in a WM_NORMAL_HINTS client property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SizeHintsFlags: u32 {
        /// User-specified x, y
        const U_POSITION    = 0b0000000001;
        /// User-specified width, height
        const U_SIZE        = 0b0000000010;
        /// Program-specified position
        const P_POSITION    = 0b0000000100;
        /// Program-specified size
        const P_SIZE        = 0b0000001000;
        /// Program-specified minimum size
        const P_MIN_SIZE    = 0b0000010000;
        /// Program-specified maximum size
        const P_MAX_SIZE    = 0b0000100000;
        /// Program-specified resize increments
        const P_RESIZE_INC  = 0b0001000000;
        /// Program-specified min and max aspect ratios
        const P_ASPECT      = 0b0010000000;
        /// Program-specified base size
        const P_BASE_SIZE   = 0b0100000000;
        /// Program-specified window gravity
        const P_WIN_GRAVITY = 0b1000000000;
    }
}

/// Possible valid values for setting the `WM_STATE` property on a client.
///
/// See the [ICCCM docs][1] for more information.
///
/// [1]: https://tronche.com/gui/x/icccm/sec-4.html#s-4.1.3.1
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WmState {
    /// Window is not visible
    Withdrawn,
    /// Window is visible
    Normal,
    /// Window is iconified
    Iconic,
}

impl From<WmState> for u32 {
    fn from(s: WmState) -> u32 {
        match s {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

/// The mapping states a window can be in
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MapState {
    /// The window is unmapped
    Unmapped,
    /// The window is never viewable
    UnViewable,
    /// The window is currently viewable
    Viewable,
}

/// The window attributes honoured by girih.
///
/// Only a small subset of X window attributes are checked when deciding
/// whether a window should be managed.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct WindowAttributes {
    /// Does the window manage its own placement (popups, menus...)?
    pub override_redirect: bool,
    /// Current mapping state
    pub map_state: MapState,
}

/// Client requested hints about information other than window geometry.
///
/// See the ICCCM [spec][1] for further details.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_hints_property
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct WmHints {
    /// Which fields below were actually set by the client
    pub flags: WmHintsFlags,
    /// Does this client rely on the window manager for keyboard input?
    pub accepts_input: bool,
    /// Is the urgency hint currently set?
    pub urgent: bool,
}

impl WmHints {
    /// Try to construct a [WmHints] instance from raw 32-bit words.
    ///
    /// This method expects a slice of 9 u32s corresponding to the C struct
    /// layout shown below.
    ///
    /// ```C
    /// typedef struct {
    ///     long flags;          /* marks which fields in this structure are defined */
    ///     Bool input;          /* does this application rely on the window manager to
    ///                             get keyboard input? */
    ///     int initial_state;   /* see below */
    ///     Pixmap icon_pixmap;  /* pixmap to be used as icon */
    ///     Window icon_window;  /* window to be used as icon */
    ///     int icon_x, icon_y;  /* initial position of icon */
    ///     Pixmap icon_mask;    /* pixmap to be used as mask for icon_pixmap */
    ///     XID window_group;    /* id of related window group */
    /// } XWMHints;
    /// ```
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 9 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 9] for WM_HINTS, got [u32; {}]",
                raw.len()
            )));
        }

        let flags = WmHintsFlags::from_bits_truncate(raw[0]);
        let accepts_input = !flags.contains(WmHintsFlags::INPUT_HINT) || raw[1] > 0;
        let urgent = flags.contains(WmHintsFlags::URGENCY_HINT);

        Ok(Self {
            flags,
            accepts_input,
            urgent,
        })
    }
}

/// Client requested hints about window geometry.
///
/// The fields are kept in their raw ICCCM form: which of them are
/// meaningful depends on `flags`, and the derivations the manager needs
/// (base falling back to min and vice versa, aspect ratios as floats) are
/// applied when the hints are copied onto a
/// [Client](crate::pure::Client).
///
/// See the ICCCM [spec][1] for further details.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_normal_hints_property
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SizeHints {
    /// Which fields below were actually set by the client
    pub flags: SizeHintsFlags,
    /// Program specified minimum size
    pub min: (i32, i32),
    /// Program specified maximum size
    pub max: (i32, i32),
    /// Program specified resize increments
    pub inc: (i32, i32),
    /// Minimum aspect ratio as a (numerator, denominator) pair
    pub min_aspect: (i32, i32),
    /// Maximum aspect ratio as a (numerator, denominator) pair
    pub max_aspect: (i32, i32),
    /// Program specified base size
    pub base: (i32, i32),
}

impl SizeHints {
    /// Try to construct a [SizeHints] instance from raw 32-bit words.
    ///
    /// This method expects a slice of 18 u32s corresponding to the C struct
    /// layout shown below.
    ///
    /// ```C
    /// typedef struct {
    ///     long flags;                /* marks which fields in this structure are defined */
    ///     int x, y;                  /* Obsolete */
    ///     int width, height;         /* Obsolete */
    ///     int min_width, min_height;
    ///     int max_width, max_height;
    ///     int width_inc, height_inc;
    ///     struct {
    ///            int x;              /* numerator */
    ///            int y;              /* denominator */
    ///     } min_aspect, max_aspect;
    ///     int base_width, base_height;
    ///     int win_gravity;
    /// } XSizeHints;
    /// ```
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 18 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 18] for WM_NORMAL_HINTS, got [u32; {}]",
                raw.len()
            )));
        }

        let flags = SizeHintsFlags::from_bits_truncate(raw[0]);
        let i = |n: u32| n as i32;

        Ok(Self {
            flags,
            min: (i(raw[5]), i(raw[6])),
            max: (i(raw[7]), i(raw[8])),
            inc: (i(raw[9]), i(raw[10])),
            min_aspect: (i(raw[11]), i(raw[12])),
            max_aspect: (i(raw[13]), i(raw[14])),
            base: (i(raw[15]), i(raw[16])),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wm_hints_urgency_and_input() {
        let raw = [
            (WmHintsFlags::INPUT_HINT | WmHintsFlags::URGENCY_HINT).bits(),
            0, // input = false
            1,
            0,
            0,
            0,
            0,
            0,
            0,
        ];
        let hints = WmHints::try_from_bytes(&raw).expect("valid wm hints");

        assert!(hints.urgent);
        assert!(!hints.accepts_input);
    }

    #[test]
    fn wm_hints_input_defaults_to_true() {
        let hints = WmHints::try_from_bytes(&[0; 9]).expect("valid wm hints");

        assert!(hints.accepts_input);
        assert!(!hints.urgent);
    }

    #[test]
    fn wm_hints_wrong_length_is_an_error() {
        assert!(matches!(
            WmHints::try_from_bytes(&[0; 4]),
            Err(Error::InvalidHints(_))
        ));
    }

    #[test]
    fn size_hints_fields_land_in_the_right_place() {
        let mut raw = [0u32; 18];
        raw[0] = (SizeHintsFlags::P_MIN_SIZE
            | SizeHintsFlags::P_RESIZE_INC
            | SizeHintsFlags::P_BASE_SIZE)
            .bits();
        raw[5] = 20; // min w
        raw[6] = 10; // min h
        raw[9] = 7; // inc w
        raw[10] = 13; // inc h
        raw[15] = 2; // base w
        raw[16] = 4; // base h

        let hints = SizeHints::try_from_bytes(&raw).expect("valid size hints");

        assert_eq!(hints.min, (20, 10));
        assert_eq!(hints.inc, (7, 13));
        assert_eq!(hints.base, (2, 4));
        assert!(hints.flags.contains(SizeHintsFlags::P_MIN_SIZE));
        assert!(!hints.flags.contains(SizeHintsFlags::P_MAX_SIZE));
    }

    #[test]
    fn size_hints_wrong_length_is_an_error() {
        assert!(matches!(
            SizeHints::try_from_bytes(&[0; 9]),
            Err(Error::InvalidHints(_))
        ));
    }
}
