//! A minimal drawing abstraction for rendering the bar.
//!
//! The window manager core only needs a very small surface: measure text,
//! draw text and rectangles into an off-screen surface using the current
//! color scheme, and copy a region of that surface onto a window. [XDraw]
//! implements it with core-protocol server side fonts over its own X
//! connection, so that rendering traffic is independent of the event
//! connection the manager blocks on.
use crate::{Color, ColorScheme, Error, Result, Xid};
use ::x11rb::{
    connection::Connection,
    protocol::xproto::{
        Char2b, ChangeGCAux, ConnectionExt as _, CreateGCAux, Fontable, Gcontext, Pixmap,
        Rectangle, Screen,
    },
    rust_connection::RustConnection,
};
use tracing::{debug, info};

/// The drawing surface consumed by the [bar](crate::bar).
pub trait Draw {
    /// The pixel height of the tallest glyph row of the loaded font.
    fn font_height(&self) -> i32;
    /// Resize the off-screen surface to at least the given dimensions.
    fn resize(&mut self, w: i32, h: i32) -> Result<()>;
    /// Set the color scheme used by subsequent text / rect calls.
    fn set_scheme(&mut self, scheme: ColorScheme);
    /// The horizontal extent of `text` plus the standard padding.
    fn text_width(&mut self, text: &str) -> Result<i32>;
    /// Render `text` into the region `(x, y, w, h)` of the surface with
    /// `lpad` pixels of leading space. `invert` swaps foreground and
    /// background. Returns the x coordinate just past the drawn region.
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        lpad: i32,
        text: &str,
        invert: bool,
    ) -> Result<i32>;
    /// Render a rectangle, filled or as an outline.
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool, invert: bool) -> Result<()>;
    /// Copy the region `(x, y, w, h)` of the surface onto the window.
    fn map(&mut self, win: Xid, x: i32, y: i32, w: i32, h: i32) -> Result<()>;
}

/// A core-protocol implementation of [Draw].
///
/// Text is rendered with a server side font into a pixmap which is then
/// copied onto the target window. Pixel values are derived directly from
/// the configured colors, which assumes the common true color visual.
#[derive(Debug)]
pub struct XDraw {
    conn: RustConnection,
    pixmap: Pixmap,
    gc: Gcontext,
    font: Fontable,
    ascent: i32,
    descent: i32,
    w: i32,
    h: i32,
    scheme: ColorScheme,
    root: u32,
    depth: u8,
}

impl XDraw {
    /// Open a dedicated drawing connection and load the first usable font
    /// from `fonts`.
    pub fn new(fonts: &[String], scheme: ColorScheme) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let screen: &Screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let depth = screen.root_depth;

        let font = conn.generate_id()?;
        let mut loaded = None;
        for name in fonts {
            if conn.open_font(font, name.as_bytes())?.check().is_ok() {
                loaded = Some(name.clone());
                break;
            }
        }

        let name = loaded.ok_or_else(|| Error::NoUsableFont(fonts.to_vec()))?;
        info!(%name, "loaded bar font");

        let reply = conn.query_font(font)?.reply()?;
        let (ascent, descent) = (reply.font_ascent as i32, reply.font_descent as i32);

        let pixmap = conn.generate_id()?;
        conn.create_pixmap(depth, pixmap, root, 1, 1)?;

        let gc = conn.generate_id()?;
        let aux = CreateGCAux::new().font(font).graphics_exposures(0u32);
        conn.create_gc(gc, pixmap, &aux)?;
        conn.flush()?;

        Ok(Self {
            conn,
            pixmap,
            gc,
            font,
            ascent,
            descent,
            w: 1,
            h: 1,
            scheme,
            root,
            depth,
        })
    }

    fn colors(&self, invert: bool) -> (Color, Color) {
        if invert {
            (self.scheme.bg, self.scheme.fg)
        } else {
            (self.scheme.fg, self.scheme.bg)
        }
    }

    fn raw_text_width(&self, text: &str) -> Result<i32> {
        let chars: Vec<Char2b> = text
            .bytes()
            .map(|b| Char2b { byte1: 0, byte2: b })
            .collect();

        let reply = self.conn.query_text_extents(self.font, &chars)?.reply()?;

        Ok(reply.overall_width)
    }

    // Truncate to whole characters that fit within `max` pixels.
    fn fitting<'a>(&self, text: &'a str, max: i32) -> Result<&'a str> {
        let mut end = text.len();
        while end > 0 && self.raw_text_width(&text[..end])? > max {
            end -= 1;
            while end > 0 && !text.is_char_boundary(end) {
                end -= 1;
            }
        }

        Ok(&text[..end])
    }
}

impl Draw for XDraw {
    fn font_height(&self) -> i32 {
        self.ascent + self.descent
    }

    fn resize(&mut self, w: i32, h: i32) -> Result<()> {
        if (w, h) == (self.w, self.h) {
            return Ok(());
        }

        debug!(w, h, "resizing drawing surface");
        self.conn.free_pixmap(self.pixmap)?;
        self.conn
            .create_pixmap(self.depth, self.pixmap, self.root, w as u16, h as u16)?;
        self.w = w;
        self.h = h;

        Ok(())
    }

    fn set_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme;
    }

    fn text_width(&mut self, text: &str) -> Result<i32> {
        Ok(self.raw_text_width(text)? + self.font_height())
    }

    fn text(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        lpad: i32,
        text: &str,
        invert: bool,
    ) -> Result<i32> {
        let (fg, bg) = self.colors(invert);

        // background for the full cell
        let aux = ChangeGCAux::new().foreground(bg.rgb_u32());
        self.conn.change_gc(self.gc, &aux)?;
        let cell = Rectangle {
            x: x as i16,
            y: y as i16,
            width: w as u16,
            height: h as u16,
        };
        self.conn.poly_fill_rectangle(self.pixmap, self.gc, &[cell])?;

        let visible = self.fitting(text, w - lpad)?;
        let baseline = y + (h - self.font_height()) / 2 + self.ascent;
        let aux = ChangeGCAux::new()
            .foreground(fg.rgb_u32())
            .background(bg.rgb_u32());
        self.conn.change_gc(self.gc, &aux)?;
        self.conn.image_text8(
            self.pixmap,
            self.gc,
            (x + lpad) as i16,
            baseline as i16,
            visible.as_bytes(),
        )?;

        Ok(x + w)
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool, invert: bool) -> Result<()> {
        let (fg, _) = self.colors(invert);
        let aux = ChangeGCAux::new().foreground(fg.rgb_u32());
        self.conn.change_gc(self.gc, &aux)?;

        let r = Rectangle {
            x: x as i16,
            y: y as i16,
            width: w as u16,
            height: h as u16,
        };

        if filled {
            self.conn.poly_fill_rectangle(self.pixmap, self.gc, &[r])?;
        } else {
            self.conn.poly_rectangle(self.pixmap, self.gc, &[r])?;
        }

        Ok(())
    }

    fn map(&mut self, win: Xid, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        self.conn.copy_area(
            self.pixmap,
            *win,
            self.gc,
            x as i16,
            y as i16,
            x as i16,
            y as i16,
            w as u16,
            h as u16,
        )?;
        self.conn.flush()?;

        Ok(())
    }
}
