//! Theme and style resolution for order lines.
//!
//! A [`Theme`] holds one style table per side, keyed by [`OrderKind`].
//! Only the entry style is mandatory; any kind missing from a side's table
//! falls back to that side's entry style. Two built-in presets are
//! provided (light, dark) and partial overrides merge field-by-field via
//! [`Theme::apply`].
//!
//! The theme is plain injectable state owned by the engine — there is no
//! process-wide singleton.

use crate::domain::{OrderKind, OrderSide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RGB color, serialized as `"#RRGGBB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ColorParseError(pub String);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        if hex.len() != 6 {
            return Err(ColorParseError(s.to_string()));
        }
        let parse =
            |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()));
        Ok(Self {
            r: parse(0)?,
            g: parse(2)?,
            b: parse(4)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Resolved visual attributes for one (side, kind) combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub line_color: Color,
    pub text_color: Color,
    pub background_color: Color,
    pub border_color: Color,
    pub line_width: u8,
    pub font_size: u8,
    /// Whether the line may be repositioned by dragging. The engine
    /// additionally gates this off for non-pending orders.
    pub draggable: bool,
    /// Whether the line shows a cancel affordance.
    pub show_cancel: bool,
}

/// Field-level override for a [`LineStyle`]. Absent fields keep the base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_cancel: Option<bool>,
}

impl LineStyle {
    /// Overwrite every field present in the patch; keep the rest.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(c) = patch.line_color {
            self.line_color = c;
        }
        if let Some(c) = patch.text_color {
            self.text_color = c;
        }
        if let Some(c) = patch.background_color {
            self.background_color = c;
        }
        if let Some(c) = patch.border_color {
            self.border_color = c;
        }
        if let Some(w) = patch.line_width {
            self.line_width = w;
        }
        if let Some(s) = patch.font_size {
            self.font_size = s;
        }
        if let Some(d) = patch.draggable {
            self.draggable = d;
        }
        if let Some(s) = patch.show_cancel {
            self.show_cancel = s;
        }
    }
}

/// Style table for one order side. `entry` is the fallback for every kind
/// not present in `overrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideTheme {
    pub entry: LineStyle,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<OrderKind, LineStyle>,
}

impl SideTheme {
    pub fn style(&self, kind: OrderKind) -> &LineStyle {
        self.overrides.get(&kind).unwrap_or(&self.entry)
    }

    fn apply(&mut self, patch: &SideThemePatch) {
        for (kind, style_patch) in &patch.0 {
            if *kind == OrderKind::Entry {
                self.entry.apply(style_patch);
                continue;
            }
            // Patching a kind with no explicit style materializes it from
            // the entry fallback first, so other kinds are untouched.
            let base = self.entry;
            self.overrides
                .entry(*kind)
                .or_insert(base)
                .apply(style_patch);
        }
    }
}

/// Per-kind style overrides for one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideThemePatch(pub BTreeMap<OrderKind, StylePatch>);

/// Partial theme override: only the targeted (side, kind) fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePatch {
    #[serde(default)]
    pub buy: SideThemePatch,
    #[serde(default)]
    pub sell: SideThemePatch,
}

/// Visual theme for every order line the engine draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub buy: SideTheme,
    pub sell: SideTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark preset: teal buys, red sells, charcoal surfaces.
    pub fn dark() -> Self {
        let background = Color::rgb(0x1E, 0x22, 0x2D);
        let border = Color::rgb(0x2A, 0x2E, 0x39);
        let text = Color::rgb(0xD1, 0xD4, 0xDC);
        Self {
            buy: side(Color::rgb(0x26, 0xA6, 0x9A), text, background, border),
            sell: side(Color::rgb(0xEF, 0x53, 0x50), text, background, border),
        }
    }

    /// Light preset: blue buys, red sells, white surfaces.
    pub fn light() -> Self {
        let background = Color::rgb(0xFF, 0xFF, 0xFF);
        let border = Color::rgb(0xE0, 0xE3, 0xEB);
        let text = Color::rgb(0x13, 0x17, 0x22);
        Self {
            buy: side(Color::rgb(0x29, 0x62, 0xFF), text, background, border),
            sell: side(Color::rgb(0xF2, 0x36, 0x45), text, background, border),
        }
    }

    /// Resolve the style for a (side, kind) pair, falling back to the
    /// side's entry style for kinds the theme does not name.
    pub fn style(&self, side: OrderSide, kind: OrderKind) -> &LineStyle {
        match side {
            OrderSide::Buy => self.buy.style(kind),
            OrderSide::Sell => self.sell.style(kind),
        }
    }

    /// Merge a partial override into this theme, field by field.
    pub fn apply(&mut self, patch: &ThemePatch) {
        self.buy.apply(&patch.buy);
        self.sell.apply(&patch.sell);
    }
}

/// Build one side's table: stop-loss and take-profit get their own accents,
/// market and limit fall back to the entry style.
fn side(line: Color, text: Color, background: Color, border: Color) -> SideTheme {
    let entry = LineStyle {
        line_color: line,
        text_color: text,
        background_color: background,
        border_color: border,
        line_width: 1,
        font_size: 12,
        draggable: true,
        show_cancel: true,
    };
    let mut overrides = BTreeMap::new();
    overrides.insert(
        OrderKind::StopLoss,
        LineStyle {
            line_color: Color::rgb(0xFF, 0x98, 0x00),
            ..entry
        },
    );
    overrides.insert(
        OrderKind::TakeProfit,
        LineStyle {
            line_color: Color::rgb(0x4C, 0xAF, 0x50),
            ..entry
        },
    );
    SideTheme { entry, overrides }
}
