//! Price ↔ terminal-row mapping for the chart panel.
//!
//! Rows map linearly onto the visible price band: row 0 is the top of the
//! band, the last row is the bottom. Mouse hit-testing and rendering share
//! this one mapping so a click always lands where the line is drawn.

/// Visible price band for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min: f64,
    pub max: f64,
    pub rows: u16,
}

impl Viewport {
    /// Fit a band around everything on screen: price history plus every
    /// order line, padded 5% so lines never sit on the border.
    pub fn fit(prices: impl Iterator<Item = f64>, rows: u16) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in prices.filter(|p| p.is_finite()) {
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || rows == 0 {
            return None;
        }
        let span = (max - min).max(min * 0.001).max(f64::EPSILON);
        let padding = span * 0.05;
        Some(Self {
            min: min - padding,
            max: max + padding,
            rows,
        })
    }

    /// Terminal row for a price; None when outside the band.
    pub fn price_to_row(&self, price: f64) -> Option<u16> {
        if !price.is_finite() || price < self.min || price > self.max || self.rows == 0 {
            return None;
        }
        let t = (self.max - price) / (self.max - self.min);
        let row = (t * (self.rows.saturating_sub(1)) as f64).round() as u16;
        Some(row.min(self.rows - 1))
    }

    /// Price at the center of a terminal row.
    pub fn row_to_price(&self, row: u16) -> f64 {
        let row = row.min(self.rows.saturating_sub(1));
        let t = if self.rows <= 1 {
            0.5
        } else {
            row as f64 / (self.rows - 1) as f64
        };
        self.max - t * (self.max - self.min)
    }

    /// One row's worth of price movement — the keyboard cursor step.
    pub fn row_step(&self) -> f64 {
        (self.max - self.min) / self.rows.max(1) as f64
    }
}
