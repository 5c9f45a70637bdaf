use super::surface::CairoSurface;
use super::{CORNER_RADIUS, FOCUS_RING_WIDTH, ITEM_HEIGHT, Rect, USP_LINE_HEIGHT};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use palette::Srgba;
use servstack::LoopingStackSelector;
use servstack::detail::DetailContent;
use servstack::item::VirtualItem;
use std::f64::consts::PI;
use std::time::Instant;

fn set_color(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

fn rounded_rect(cr: &Context, rect: &Rect, radius: f64) {
    let r = radius.min(rect.height / 2.0).min(rect.width / 2.0);
    cr.new_sub_path();
    cr.arc(rect.x + rect.width - r, rect.y + r, r, -PI / 2.0, 0.0);
    cr.arc(rect.x + rect.width - r, rect.y + rect.height - r, r, 0.0, PI / 2.0);
    cr.arc(rect.x + r, rect.y + rect.height - r, r, PI / 2.0, PI);
    cr.arc(rect.x + r, rect.y + r, r, PI, 1.5 * PI);
    cr.close_path();
}

fn draw_text(cr: &Context, text: &str, x: f64, y: f64, size: f64, bold: bool) -> Result<(), cairo::Error> {
    let weight = if bold {
        cairo::FontWeight::Bold
    } else {
        cairo::FontWeight::Normal
    };
    cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
    cr.set_font_size(size);
    cr.move_to(x, y);
    cr.show_text(text)
}

struct ItemRenderer<'a> {
    surface: &'a CairoSurface,
    colors: &'a ThemeColors,
}

impl ItemRenderer<'_> {
    fn draw(
        &self,
        cr: &Context,
        item: &VirtualItem,
        label: &str,
        icon: &str,
    ) -> Result<(), cairo::Error> {
        let rect = self.surface.item_rect(item.virtual_index as isize);
        let (_, height) = self.surface.size();
        if rect.y + rect.height < 0.0 || rect.y > height {
            return Ok(());
        }

        let active = self.surface.active() == Some(item.original_index);
        let fill = if active {
            self.colors.active
        } else {
            self.colors.item
        };
        set_color(cr, fill, 1.0);
        rounded_rect(cr, &rect, CORNER_RADIUS);
        cr.fill()?;

        if self.surface.focused() == Some(item.virtual_index as isize) && !self.surface.close_focused() {
            set_color(cr, self.colors.focus, 1.0);
            cr.set_line_width(FOCUS_RING_WIDTH);
            rounded_rect(cr, &rect, CORNER_RADIUS);
            cr.stroke()?;
        }

        set_color(cr, self.colors.text, if active { 1.0 } else { 0.7 });
        let baseline = rect.y + ITEM_HEIGHT / 2.0 + 8.0;
        draw_text(cr, icon, rect.x + 24.0, baseline, 22.0, false)?;
        draw_text(cr, label, rect.x + 64.0, baseline - 2.0, 18.0, active)
    }
}

fn draw_thumb(cr: &Context, surface: &CairoSurface, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let Some(thumb) = surface.thumb() else {
        return Ok(());
    };
    let rail = surface.thumb_rail();
    set_color(cr, colors.rail, 1.0);
    rounded_rect(cr, &rail, rail.width / 2.0);
    cr.fill()?;

    let thumb_rect = Rect::new(
        rail.x,
        rail.y + rail.height * thumb.offset_percent / 100.0,
        rail.width,
        rail.height * thumb.size_percent / 100.0,
    );
    set_color(cr, colors.active, 1.0);
    rounded_rect(cr, &thumb_rect, rail.width / 2.0);
    cr.fill()
}

fn draw_detail(
    cr: &Context,
    surface: &CairoSurface,
    content: &DetailContent,
    colors: &ThemeColors,
    now: Instant,
) -> Result<(), cairo::Error> {
    let opacity = surface.detail_opacity();
    let card = surface.detail_card();

    set_color(cr, colors.card, opacity);
    rounded_rect(cr, &card, CORNER_RADIUS);
    cr.fill()?;

    let close = surface.close_button();
    let (cx, cy) = (close.x + close.width / 2.0, close.y + close.height / 2.0);
    set_color(cr, colors.item, opacity);
    cr.arc(cx, cy, close.width / 2.0, 0.0, 2.0 * PI);
    cr.fill()?;
    set_color(cr, colors.text, opacity);
    cr.set_line_width(2.0);
    let arm = close.width / 6.0;
    cr.move_to(cx - arm, cy - arm);
    cr.line_to(cx + arm, cy + arm);
    cr.move_to(cx + arm, cy - arm);
    cr.line_to(cx - arm, cy + arm);
    cr.stroke()?;
    if surface.close_focused() {
        set_color(cr, colors.focus, opacity);
        cr.set_line_width(FOCUS_RING_WIDTH);
        cr.arc(cx, cy, close.width / 2.0 + 3.0, 0.0, 2.0 * PI);
        cr.stroke()?;
    }

    let left = card.x + super::DETAIL_PADDING;
    let mut y = card.y + super::DETAIL_PADDING + 48.0;
    set_color(cr, colors.text, opacity);
    draw_text(cr, content.icon.as_str(), left, y, 44.0, false)?;
    y += 52.0;
    draw_text(cr, content.title.as_str(), left, y, 24.0, true)?;
    y += 20.0;

    for usp in &content.usps {
        y += USP_LINE_HEIGHT;
        let alpha = surface.usp_alpha(usp, now);
        // entries slide up while fading in
        let offset = (1.0 - alpha) * 8.0;
        set_color(cr, colors.active, opacity * alpha);
        cr.arc(left + 4.0, y - 5.0 + offset, 3.0, 0.0, 2.0 * PI);
        cr.fill()?;
        set_color(cr, colors.text, opacity * alpha);
        draw_text(cr, &usp.text, left + 18.0, y + offset, 15.0, false)?;
    }
    Ok(())
}

pub fn draw(
    cr: &Context,
    selector: &LoopingStackSelector<CairoSurface>,
    colors: &ThemeColors,
    now: Instant,
) -> Result<(), cairo::Error> {
    let surface = selector.surface();

    set_color(cr, colors.backdrop, 1.0);
    cr.paint()?;

    if let Some(track) = selector.track() {
        let renderer = ItemRenderer { surface, colors };
        for item in track.virtual_items() {
            let source = &track.items()[item.original_index];
            renderer.draw(cr, item, source.label.as_str(), source.icon.as_str())?;
        }
        draw_thumb(cr, surface, colors)?;
    }

    if surface.detail_opacity() > 0.0
        && let Some(content) = surface.detail()
    {
        draw_detail(cr, surface, content, colors, now)?;
    }
    Ok(())
}
