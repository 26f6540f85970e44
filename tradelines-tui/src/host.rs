//! Terminal implementation of the core's rendering surface.
//!
//! The engine talks to this exactly like it would to a browser chart: it
//! creates, overwrites, and removes price-anchored primitives by handle.
//! Rendering happens later, from the retained table, inside `ui::draw`.

use std::collections::BTreeMap;

use tradelines_core::{Anchor, HostError, OverlayHandle, OverlayPayload, RenderSurface};

/// One retained primitive: where it sits and everything needed to draw it.
#[derive(Debug, Clone)]
pub struct OverlayLine {
    pub anchor: Anchor,
    pub payload: OverlayPayload,
}

/// Retained-mode surface backing the chart panel.
#[derive(Debug, Default)]
pub struct ChartSurface {
    next_handle: u64,
    lines: BTreeMap<OverlayHandle, OverlayLine>,
}

impl ChartSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live primitives in handle order (stable across frames).
    pub fn lines(&self) -> impl Iterator<Item = (OverlayHandle, &OverlayLine)> {
        self.lines.iter().map(|(h, l)| (*h, l))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl RenderSurface for ChartSurface {
    fn create_overlay(
        &mut self,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<OverlayHandle, HostError> {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.lines.insert(handle, OverlayLine { anchor, payload });
        Ok(handle)
    }

    fn update_overlay(
        &mut self,
        handle: OverlayHandle,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<(), HostError> {
        match self.lines.get_mut(&handle) {
            Some(line) => {
                line.anchor = anchor;
                line.payload = payload;
                Ok(())
            }
            None => Err(HostError::UnknownHandle(handle)),
        }
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) -> Result<(), HostError> {
        match self.lines.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(HostError::UnknownHandle(handle)),
        }
    }
}
