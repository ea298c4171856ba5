//! Rendering the per-monitor bar and classifying clicks on it.
//!
//! The bar shows, left to right: one cell per tag (marked when occupied,
//! inverted when a client on it is urgent), the layout symbol, the title
//! of the focused client, and the status text on the selected monitor.
//! Click classification walks the same widths the renderer draws with so
//! the two can never drift apart.
use crate::{
    core::{bindings::ClickZone, WindowManager},
    draw::Draw,
    x::XConn,
    Result,
};

impl<X, D> WindowManager<X, D>
where
    X: XConn,
    D: Draw,
{
    /// Redraw the bar of every monitor.
    pub(crate) fn draw_bars(&mut self) -> Result<()> {
        for m in 0..self.state.monitors.len() {
            self.draw_bar(m)?;
        }

        Ok(())
    }

    /// Redraw the bar of one monitor.
    pub(crate) fn draw_bar(&mut self, m: usize) -> Result<()> {
        let Self { draw, state, .. } = self;

        let mon = &state.monitors[m];
        if !mon.show_bar || mon.bar_win == crate::Xid(0) {
            return Ok(());
        }

        let bh = state.bar_height;
        let ww = mon.work.w;
        let lrpad = draw.font_height();
        let boxs = draw.font_height() / 9;
        let boxw = draw.font_height() / 6 + 2;
        let is_sel = m == state.sel_mon;

        // status is only drawn on the selected monitor
        let mut status_w = 0;
        if is_sel {
            status_w = draw.text_width(&state.status)? - lrpad + 2;
            draw.set_scheme(state.config.normal_scheme);
            draw.text(ww - status_w, 0, status_w, bh, 0, &state.status, false)?;
        }

        let (mut occupied, mut urgent) = (0u32, 0u32);
        for id in &mon.clients {
            if let Some(c) = state.clients.get(id) {
                occupied |= c.tags;
                if c.is_urgent {
                    urgent |= c.tags;
                }
            }
        }

        let sel_tags = mon.sel_tags;
        let focused_tags = mon
            .sel
            .and_then(|id| state.clients.get(&id))
            .map(|c| c.tags)
            .unwrap_or(0);

        let mut x = 0;
        for (i, tag) in state.config.tags.iter().enumerate() {
            let mask = 1 << i;
            let w = draw.text_width(tag)?;
            let scheme = if mon.tagset[sel_tags] & mask != 0 {
                state.config.selected_scheme
            } else {
                state.config.normal_scheme
            };
            draw.set_scheme(scheme);

            let invert = urgent & mask != 0;
            draw.text(x, 0, w, bh, lrpad / 2, tag, invert)?;

            if occupied & mask != 0 {
                let filled = is_sel && focused_tags & mask != 0;
                draw.rect(x + boxs, boxs, boxw, boxw, filled, invert)?;
            }

            x += w;
        }

        let sym_w = draw.text_width(&mon.lt_symbol)?;
        draw.set_scheme(state.config.normal_scheme);
        x = draw.text(x, 0, sym_w, bh, lrpad / 2, &mon.lt_symbol, false)?;

        let title_w = ww - status_w - x;
        if title_w > bh {
            match mon.sel.and_then(|id| state.clients.get(&id)) {
                Some(c) => {
                    let scheme = if is_sel {
                        state.config.selected_scheme
                    } else {
                        state.config.normal_scheme
                    };
                    draw.set_scheme(scheme);
                    draw.text(x, 0, title_w, bh, lrpad / 2, c.name(), false)?;
                    if c.is_floating {
                        draw.rect(x + boxs, boxs, boxw, boxw, c.is_fixed, false)?;
                    }
                }
                None => {
                    draw.set_scheme(state.config.normal_scheme);
                    draw.rect(x, 0, title_w, bh, true, true)?;
                }
            }
        }

        draw.map(mon.bar_win, 0, 0, ww, bh)
    }

    /// Which bar element a click at `click_x` landed on. For tag cells
    /// the cell's bit mask is returned as well.
    pub(crate) fn bar_click_zone(&mut self, m: usize, click_x: i32) -> Result<(ClickZone, u32)> {
        let Self { draw, state, .. } = self;
        let mon = &state.monitors[m];
        let lrpad = draw.font_height();

        let mut x = 0;
        for (i, tag) in state.config.tags.iter().enumerate() {
            x += draw.text_width(tag)?;
            if click_x < x {
                return Ok((ClickZone::TagBar, 1 << i));
            }
        }

        x += draw.text_width(&mon.lt_symbol)?;
        if click_x < x {
            return Ok((ClickZone::LtSymbol, 0));
        }

        let status_w = draw.text_width(&state.status)? - lrpad + 2;
        if click_x > mon.work.w - status_w {
            return Ok((ClickZone::StatusText, 0));
        }

        Ok((ClickZone::WinTitle, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x::mock::test_wm_with_clients;

    // The stub draw reports every glyph as 8px wide with a 16px font
    // height, so each single character tag cell is 24px wide.

    #[test]
    fn clicks_on_tag_cells_return_the_cell_mask() {
        let mut wm = test_wm_with_clients(1);

        let (zone, mask) = wm.bar_click_zone(0, 3).expect("zone");
        assert_eq!((zone, mask), (ClickZone::TagBar, 1 << 0));

        let (zone, mask) = wm.bar_click_zone(0, 24 * 4 + 1).expect("zone");
        assert_eq!((zone, mask), (ClickZone::TagBar, 1 << 4));
    }

    #[test]
    fn clicks_past_the_tags_hit_the_layout_symbol() {
        let mut wm = test_wm_with_clients(1);

        // 9 tag cells at 24px, then the 3 char layout symbol (8*3+16)
        let (zone, _) = wm.bar_click_zone(0, 24 * 9 + 5).expect("zone");

        assert_eq!(zone, ClickZone::LtSymbol);
    }

    #[test]
    fn clicks_at_the_right_edge_hit_the_status() {
        let mut wm = test_wm_with_clients(1);

        let ww = wm.state().monitors()[0].work.w;
        let (zone, _) = wm.bar_click_zone(0, ww - 1).expect("zone");

        assert_eq!(zone, ClickZone::StatusText);
    }

    #[test]
    fn clicks_in_the_middle_hit_the_title() {
        let mut wm = test_wm_with_clients(1);

        let (zone, _) = wm.bar_click_zone(0, 600).expect("zone");

        assert_eq!(zone, ClickZone::WinTitle);
    }
}
