use ratatui::style::Color;

use crate::model::UiConfig;

/// Colors used by the goal list, header and status row. Each slot can be
/// overridden from `[ui.colors]` by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub bright: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
    pub done: Color,
    pub cursor_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x11, 0x16, 0x1F),
            text: Color::Rgb(0xC8, 0xD0, 0xDC),
            bright: Color::Rgb(0xF5, 0xF7, 0xFA),
            accent: Color::Rgb(0x4F, 0xB3, 0xF6),
            muted: Color::Rgb(0x6B, 0x76, 0x87),
            error: Color::Rgb(0xF2, 0x5C, 0x54),
            warning: Color::Rgb(0xF4, 0xC4, 0x30),
            done: Color::Rgb(0x5C, 0xC8, 0x7A),
            cursor_bg: Color::Rgb(0x22, 0x30, 0x44),
        }
    }
}

/// `#RRGGBB` or the `#RGB` shorthand
fn parse_color(value: &str) -> Option<Color> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = u32::from_str_radix(digits, 16).ok()?;
    match digits.len() {
        6 => Some(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)),
        3 => {
            let widen = |n: u32| ((n & 0xF) * 0x11) as u8;
            Some(Color::Rgb(widen(rgb >> 8), widen(rgb >> 4), widen(rgb)))
        }
        _ => None,
    }
}

impl Theme {
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (slot, value) in &ui.colors {
            let Some(target) = theme.slot_mut(slot) else {
                tracing::warn!(slot = %slot, "ignoring unknown color slot");
                continue;
            };
            match parse_color(value) {
                Some(color) => *target = color,
                None => tracing::warn!(slot = %slot, value = %value, "ignoring malformed color"),
            }
        }
        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        let slot = match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "bright" => &mut self.bright,
            "accent" => &mut self.accent,
            "muted" => &mut self.muted,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            "done" => &mut self.done,
            "cursor_bg" => &mut self.cursor_bg,
            _ => return None,
        };
        Some(slot)
    }

    /// Checkbox color for a task
    pub fn checkbox_color(&self, is_done: bool) -> Color {
        if is_done { self.done } else { self.text }
    }
}
