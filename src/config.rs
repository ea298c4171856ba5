//! The read-only configuration record and the default binding tables.
//!
//! Everything the core consumes is gathered here: appearance, tag names,
//! the rule / layout / key / button tables and the default launcher and
//! terminal commands. The tables are compiled in; rebuild to change them.
use crate::{
    core::{
        actions::{Action, Arg},
        bindings::{ButtonSpec, ClickZone, KeySpec, ModifierKey, MouseButton},
    },
    layout::{ArrangeKind, Layout},
    ColorScheme,
};

/// The tag labels shown in the bar.
pub const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

// Tags are a bitmask: keep a compile-time guarantee that they fit.
const _: () = assert!(TAGS.len() < 32);

/// The bitmask covering every configured tag.
pub const TAG_MASK: u32 = (1 << TAGS.len()) - 1;

/// The layout table. The first entry is the startup layout, the second is
/// the startup toggle target.
pub const LAYOUTS: [Layout; 5] = [
    Layout { symbol: "[]=", arrange: Some(ArrangeKind::Tile) },
    Layout { symbol: "><>", arrange: None },
    Layout { symbol: "[M]", arrange: Some(ArrangeKind::Monocle) },
    Layout { symbol: "TTT", arrange: Some(ArrangeKind::BottomStack) },
    Layout { symbol: "===", arrange: Some(ArrangeKind::BottomStackHoriz) },
];

/// A static window rule, applied once when a client is first managed.
///
/// The class / instance / title fields are substring matches against the
/// client's WM_CLASS and title; `None` fields always match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Substring to find in the WM_CLASS class field
    pub class: Option<&'static str>,
    /// Substring to find in the WM_CLASS instance field
    pub instance: Option<&'static str>,
    /// Substring to find in the window title
    pub title: Option<&'static str>,
    /// Tag mask to assign (0 keeps the monitor's current tagset)
    pub tags: u32,
    /// Should the client start floating?
    pub is_floating: bool,
    /// Monitor index to assign the client to, when it exists
    pub monitor: Option<usize>,
}

/// The default rule table.
pub const RULES: [Rule; 2] = [
    Rule {
        class: Some("Gimp"),
        instance: None,
        title: None,
        tags: 0,
        is_floating: true,
        monitor: None,
    },
    Rule {
        class: Some("Firefox"),
        instance: None,
        title: None,
        tags: 1 << 8,
        is_floating: false,
        monitor: None,
    },
];

/// The read-only record of everything user-tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Font names tried in order for the bar
    pub fonts: Vec<String>,
    /// Window border width in pixels
    pub border_px: i32,
    /// Edge snap distance for interactive moves, in pixels
    pub snap: i32,
    /// Gap between tiled windows, in pixels
    pub window_gap: i32,
    /// Show the bar on new monitors?
    pub show_bar: bool,
    /// Put the bar at the top of the screen?
    pub top_bar: bool,
    /// Warp the pointer to the focused client?
    pub warp_pointer: bool,
    /// Respect size hints in tiled resizals?
    pub resize_hints: bool,
    /// Default master area factor
    pub mfact: f32,
    /// Default number of clients in the master area
    pub nmaster: u32,
    /// Tag labels
    pub tags: Vec<String>,
    /// Scheme for unfocused elements
    pub normal_scheme: ColorScheme,
    /// Scheme for the focused element
    pub selected_scheme: ColorScheme,
    /// The window rule table
    pub rules: Vec<Rule>,
    /// The layout table
    pub layouts: Vec<Layout>,
    /// The modifier all default bindings hang off
    pub modkey: ModifierKey,
    /// The launcher command; the selected monitor number is appended as
    /// `-m <n>` when it is spawned
    pub launcher: Vec<String>,
    /// The terminal command
    pub terminal: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let strings = |slice: &[&str]| slice.iter().map(|s| s.to_string()).collect();

        Config {
            fonts: strings(&[
                "-*-fixed-medium-r-*-*-13-*-*-*-*-*-*-*",
                "fixed",
            ]),
            border_px: 1,
            snap: 32,
            window_gap: 6,
            show_bar: true,
            top_bar: true,
            warp_pointer: true,
            resize_hints: true,
            mfact: 0.55,
            nmaster: 1,
            tags: strings(&TAGS),
            normal_scheme: ColorScheme::try_new("#bbbbbb", "#222222", "#444444")
                .expect("valid hex code"),
            selected_scheme: ColorScheme::try_new("#eeeeee", "#005577", "#005577")
                .expect("valid hex code"),
            rules: RULES.to_vec(),
            layouts: LAYOUTS.to_vec(),
            modkey: ModifierKey::Meta,
            launcher: strings(&["dmenu_run"]),
            terminal: strings(&["st"]),
        }
    }
}

impl Config {
    /// Index of the floating (null arranger) entry in the layout table.
    pub fn floating_layout(&self) -> usize {
        self.layouts
            .iter()
            .position(|l| l.arrange.is_none())
            .unwrap_or(0)
    }
}

/// Build the default key binding table.
///
/// Patterns are resolved against the running keymap when the manager
/// starts and again whenever the keyboard mapping changes.
pub fn key_bindings(config: &Config) -> Vec<KeySpec> {
    let md = config.modkey.prefix();
    let spawn = |cmd: &[String]| Arg::Cmd(cmd.to_vec());
    let key = |pattern: String, action, arg| KeySpec {
        pattern,
        action,
        arg,
    };

    let mut keys = vec![
        key(format!("{md}-p"), Action::Spawn, spawn(&config.launcher)),
        key(format!("{md}-S-Return"), Action::Spawn, spawn(&config.terminal)),
        key(format!("{md}-b"), Action::ToggleBar, Arg::None),
        key(format!("{md}-j"), Action::FocusStack, Arg::Int(1)),
        key(format!("{md}-k"), Action::FocusStack, Arg::Int(-1)),
        key(format!("{md}-i"), Action::IncNMaster, Arg::Int(1)),
        key(format!("{md}-d"), Action::IncNMaster, Arg::Int(-1)),
        key(format!("{md}-h"), Action::SetMfact, Arg::Float(-0.05)),
        key(format!("{md}-l"), Action::SetMfact, Arg::Float(0.05)),
        key(format!("{md}-Return"), Action::Zoom, Arg::None),
        key(format!("{md}-Tab"), Action::View, Arg::UInt(0)),
        key(format!("{md}-S-c"), Action::KillClient, Arg::None),
        key(format!("{md}-t"), Action::SetLayout, Arg::Layout(0)),
        key(format!("{md}-f"), Action::SetLayout, Arg::Layout(1)),
        key(format!("{md}-m"), Action::SetLayout, Arg::Layout(2)),
        key(format!("{md}-u"), Action::SetLayout, Arg::Layout(3)),
        key(format!("{md}-o"), Action::SetLayout, Arg::Layout(4)),
        key(format!("{md}-space"), Action::SetLayout, Arg::None),
        key(format!("{md}-S-space"), Action::ToggleFloating, Arg::None),
        key(format!("{md}-0"), Action::View, Arg::UInt(!0)),
        key(format!("{md}-S-0"), Action::Tag, Arg::UInt(!0)),
        key(format!("{md}-comma"), Action::FocusMon, Arg::Int(-1)),
        key(format!("{md}-period"), Action::FocusMon, Arg::Int(1)),
        key(format!("{md}-S-comma"), Action::TagMon, Arg::Int(-1)),
        key(format!("{md}-S-period"), Action::TagMon, Arg::Int(1)),
        key(format!("{md}-S-q"), Action::Quit, Arg::None),
    ];

    for (i, tag) in config.tags.iter().enumerate() {
        let mask = 1 << i;
        keys.push(key(format!("{md}-{tag}"), Action::View, Arg::UInt(mask)));
        keys.push(key(format!("{md}-C-{tag}"), Action::ToggleView, Arg::UInt(mask)));
        keys.push(key(format!("{md}-S-{tag}"), Action::Tag, Arg::UInt(mask)));
        keys.push(key(format!("{md}-C-S-{tag}"), Action::ToggleTag, Arg::UInt(mask)));
    }

    keys
}

/// Build the default mouse binding table.
pub fn mouse_bindings(config: &Config) -> Vec<ButtonSpec> {
    let md = config.modkey.prefix();
    let button = |zone, mods: &str, button, action, arg| ButtonSpec {
        zone,
        mods: mods.to_string(),
        button,
        action,
        arg,
    };

    vec![
        button(ClickZone::LtSymbol, "", MouseButton::Left, Action::SetLayout, Arg::None),
        button(ClickZone::LtSymbol, "", MouseButton::Right, Action::SetLayout, Arg::Layout(2)),
        button(ClickZone::WinTitle, "", MouseButton::Middle, Action::Zoom, Arg::None),
        button(
            ClickZone::StatusText,
            "",
            MouseButton::Middle,
            Action::Spawn,
            Arg::Cmd(config.terminal.clone()),
        ),
        button(ClickZone::ClientWin, md, MouseButton::Left, Action::MoveMouse, Arg::None),
        button(ClickZone::ClientWin, md, MouseButton::Middle, Action::ToggleFloating, Arg::None),
        button(ClickZone::ClientWin, md, MouseButton::Right, Action::ResizeMouse, Arg::None),
        // a zero tag argument is replaced with the mask of the clicked cell
        button(ClickZone::TagBar, "", MouseButton::Left, Action::View, Arg::UInt(0)),
        button(ClickZone::TagBar, "", MouseButton::Right, Action::ToggleView, Arg::UInt(0)),
        button(ClickZone::TagBar, md, MouseButton::Left, Action::Tag, Arg::UInt(0)),
        button(ClickZone::TagBar, md, MouseButton::Right, Action::ToggleTag, Arg::UInt(0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_mask_covers_all_tags() {
        assert_eq!(TAG_MASK, 0b1_1111_1111);
    }

    #[test]
    fn default_layout_table_starts_tiled_with_floating_fallback() {
        let config = Config::default();

        assert_eq!(config.layouts[0].arrange, Some(ArrangeKind::Tile));
        assert_eq!(config.floating_layout(), 1);
    }

    #[test]
    fn every_tag_gets_four_bindings() {
        let config = Config::default();
        let keys = key_bindings(&config);

        for (i, tag) in config.tags.iter().enumerate() {
            let mask = 1 << i;
            let for_tag: Vec<_> = keys
                .iter()
                .filter(|k| k.pattern.ends_with(&format!("-{tag}")) && k.arg == Arg::UInt(mask))
                .collect();

            assert_eq!(for_tag.len(), 4, "tag {tag}");
        }
    }
}
