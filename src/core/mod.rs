//! Core data structures and the window manager runtime.
use crate::{
    config::Config,
    core::bindings::{
        keycodes_from_xmodmap, resolve_buttons, resolve_keys, ButtonSpec, CodeMap, KeyBinding,
        KeySpec, MouseBinding,
    },
    draw::Draw,
    pure::{
        client::Client,
        geometry::Rect,
        monitor::Monitor,
    },
    x::{
        atom::EWMH_SUPPORTED_ATOMS,
        property::{MapState, WmState},
        Atom, ClientAttr, Prop, WinType, XConn, XConnExt,
    },
    Error, Result, Xid,
};
use nix::{
    libc,
    sys::{
        signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
        wait::{waitpid, WaitPidFlag, WaitStatus},
    },
};
use std::collections::HashMap;
use tracing::{error, info, span, trace, Level};

pub mod actions;
pub mod bindings;
mod handle;
mod manage;

/// The single context record holding all mutable window manager state.
///
/// Everything the event handlers touch lives here and is passed around
/// explicitly; there is no global state.
#[derive(Debug)]
pub struct State {
    /// The user supplied configuration
    pub config: Config,
    pub(crate) clients: HashMap<Xid, Client>,
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) sel_mon: usize,
    /// Root window geometry
    pub(crate) screen: Rect,
    pub(crate) bar_height: i32,
    /// Status text shown at the right edge of the selected monitor's bar
    pub(crate) status: String,
    pub(crate) numlock_mask: u16,
    /// The monitor the pointer was last seen on
    pub(crate) motion_mon: Option<usize>,
    pub(crate) running: bool,
}

impl State {
    /// The monitors currently being managed.
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Index of the monitor key bindings currently act on.
    pub fn selected_monitor(&self) -> usize {
        self.sel_mon
    }

    /// The client currently holding focus, if any.
    pub fn focused_client(&self) -> Option<Xid> {
        self.monitors[self.sel_mon].sel
    }
}

/// A top level struct holding everything needed to run as an X11 window
/// manager: the X connection, the drawing surface for the bars, the
/// resolved binding tables and the mutable [State].
#[derive(Debug)]
pub struct WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    pub(crate) x: X,
    pub(crate) draw: D,
    pub(crate) state: State,
    pub(crate) keys: Vec<KeyBinding>,
    pub(crate) buttons: Vec<MouseBinding>,
    pub(crate) key_specs: Vec<KeySpec>,
    pub(crate) button_specs: Vec<ButtonSpec>,
    pub(crate) code_map: CodeMap,
    pub(crate) check_win: Xid,
}

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    /// Construct a new [WindowManager] with the provided config, binding
    /// tables, X connection and drawing surface.
    ///
    /// Key patterns are resolved against the live keymap when [run] is
    /// called (and again on keyboard remaps), not here.
    ///
    /// [run]: WindowManager::run
    pub fn new(
        config: Config,
        key_specs: Vec<KeySpec>,
        button_specs: Vec<ButtonSpec>,
        x: X,
        draw: D,
    ) -> Self {
        let (sw, sh) = x.screen_size();
        let bar_height = draw.font_height() + 2;

        let state = State {
            config,
            clients: HashMap::new(),
            monitors: Vec::new(),
            sel_mon: 0,
            screen: Rect::new(0, 0, sw, sh),
            bar_height,
            status: format!("girih-{}", crate::VERSION),
            numlock_mask: 0,
            motion_mon: None,
            running: true,
        };

        Self {
            x,
            draw,
            state,
            keys: Vec::new(),
            buttons: Vec::new(),
            key_specs,
            button_specs,
            code_map: CodeMap::new(),
            check_win: Xid(0),
        }
    }

    /// A view of the current manager state.
    pub fn state(&self) -> &State {
        &self.state
    }

    pub(crate) fn conn(&self) -> &X {
        &self.x
    }

    /// Start managing windows and run until told to quit.
    ///
    /// Claims WM responsibilities on the root window, adopts any windows
    /// that are already mapped and then blocks on the X event stream.
    pub fn run(mut self) -> Result<()> {
        trace!("registering SIGCHLD handler");
        register_sigchld_reaper()?;

        self.setup()?;
        self.scan()?;

        info!("entering the main event loop");
        while self.state.running {
            match self.x.next_event() {
                Ok(event) => {
                    let span = span!(target: "girih", Level::DEBUG, "XEvent", %event);
                    let _enter = span.enter();
                    trace!(details = ?event, "event details");

                    if let Err(error) = self.handle_event(event) {
                        error!(%error, "error handling event");
                    }
                    self.x.flush();
                }

                // nothing more will arrive on a broken connection
                Err(e @ Error::Connection(_)) => return Err(e),
                Err(e) => error!(%e, "error pulling next x event"),
            }
        }

        self.cleanup()
    }

    fn setup(&mut self) -> Result<()> {
        self.update_geometry()?;
        self.x
            .set_client_attributes(self.x.root(), &[ClientAttr::RootEventMask])?;

        let (sw, bh) = (self.state.screen.w, self.state.bar_height);
        self.draw.resize(sw, bh)?;
        self.update_bars()?;
        self.update_status()?;

        // EWMH bookkeeping: the supported atom list and the check window
        // that tells clients a compliant wm is running
        let root = self.x.root();
        let check = self.x.create_window(WinType::CheckWin, Rect::new(0, 0, 1, 1))?;
        self.check_win = check;
        self.x
            .replace_prop(check, Atom::NetSupportingWmCheck, Prop::Window(vec![check]))?;
        self.x.replace_prop(
            check,
            Atom::NetWmName,
            Prop::UTF8String(vec!["girih".to_string()]),
        )?;
        self.x
            .replace_prop(root, Atom::NetSupportingWmCheck, Prop::Window(vec![check]))?;
        let supported = EWMH_SUPPORTED_ATOMS
            .iter()
            .map(|a| a.as_ref().to_string())
            .collect();
        self.x
            .replace_prop(root, Atom::NetSupported, Prop::Atoms(supported))?;
        self.x.delete_prop(root, Atom::NetClientList)?;

        self.refresh_key_bindings()?;
        self.grab_keys()?;
        self.focus(None)
    }

    /// Adopt windows that were mapped before we started: regular windows
    /// first, transients after their parents are known.
    fn scan(&mut self) -> Result<()> {
        let windows = self.x.existing_clients()?;
        let mut transients = Vec::new();

        for win in windows {
            let Ok(attrs) = self.x.get_window_attributes(win) else {
                continue;
            };
            if attrs.override_redirect {
                continue;
            }
            if self.x.transient_for(win)?.is_some() {
                transients.push(win);
                continue;
            }

            if attrs.map_state == MapState::Viewable
                || self.x.get_wm_state(win)? == Some(WmState::Iconic)
            {
                self.manage(win)?;
            }
        }

        for win in transients {
            let Ok(attrs) = self.x.get_window_attributes(win) else {
                continue;
            };
            if attrs.map_state == MapState::Viewable
                || self.x.get_wm_state(win)? == Some(WmState::Iconic)
            {
                self.manage(win)?;
            }
        }

        Ok(())
    }

    /// Resolve the configured binding patterns against the current keymap.
    pub(crate) fn refresh_key_bindings(&mut self) -> Result<()> {
        self.code_map = keycodes_from_xmodmap()?;
        self.keys = resolve_keys(&self.key_specs, &self.code_map)?;
        self.buttons = resolve_buttons(&self.button_specs)?;

        Ok(())
    }

    /// Release every client and X resource we hold, in stack order, and
    /// hand input focus back to the root window.
    fn cleanup(&mut self) -> Result<()> {
        info!("cleaning up");
        self.view(!0)?;

        for m in 0..self.state.monitors.len() {
            while let Some(&id) = self.state.monitors[m].stack.first() {
                self.unmanage(id, false)?;
            }
        }

        self.x.ungrab_keys()?;

        let bars: Vec<Xid> = self.state.monitors.iter().map(|m| m.bar_win).collect();
        for win in bars {
            if win != Xid(0) {
                self.x.destroy_window(win)?;
            }
        }
        if self.check_win != Xid(0) {
            self.x.destroy_window(self.check_win)?;
        }

        self.x.focus_root()?;
        self.x.delete_prop(self.x.root(), Atom::NetActiveWindow)?;
        self.x.sync()
    }

    #[cfg(test)]
    pub(crate) fn set_layout_by_symbol(&mut self, symbol: &str) {
        let i = self
            .state
            .config
            .layouts
            .iter()
            .position(|l| l.symbol == symbol)
            .expect("symbol in layout table");

        let m = self.state.sel_mon;
        let mon = &mut self.state.monitors[m];
        let sel_lt = mon.sel_lt;
        mon.lt[sel_lt] = i;
        mon.lt_symbol = symbol.to_string();
    }
}

extern "C" fn reap_children(_: libc::c_int) {
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => (),
        }
    }
}

// Children double-fork conceptually: spawned processes call setsid and we
// reap whatever terminates so nothing is left as a zombie.
fn register_sigchld_reaper() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(reap_children),
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe { sigaction(Signal::SIGCHLD, &action) }
        .map(|_| ())
        .map_err(|e| Error::Io(std::io::Error::from_raw_os_error(e as i32)))
}
