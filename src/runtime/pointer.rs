//! Terminal pointer source.
//!
//! Converts crossterm left-button mouse events into the normalised
//! down / delta / release stream the drag engine consumes. Cell coordinates
//! are scaled by the configured cell size so zones can be measured in the
//! same units.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed at absolute `(x, y)`.
    Down { x: f64, y: f64 },
    /// Movement since the press.
    Move { dx: f64, dy: f64 },
    Up { dx: f64, dy: f64 },
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    cell_width: f64,
    cell_height: f64,
    origin: Option<(u16, u16)>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl PointerTracker {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
            origin: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.origin.is_some()
    }

    pub fn translate(&mut self, event: &MouseEvent) -> Option<PointerEvent> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((event.column, event.row));
                Some(PointerEvent::Down {
                    x: f64::from(event.column) * self.cell_width,
                    y: f64::from(event.row) * self.cell_height,
                })
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (dx, dy) = self.delta(event)?;
                Some(PointerEvent::Move { dx, dy })
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (dx, dy) = self.delta(event)?;
                self.origin = None;
                Some(PointerEvent::Up { dx, dy })
            }
            _ => None,
        }
    }

    fn delta(&self, event: &MouseEvent) -> Option<(f64, f64)> {
        let (col, row) = self.origin?;
        let dx = (f64::from(event.column) - f64::from(col)) * self.cell_width;
        let dy = (f64::from(event.row) - f64::from(row)) * self.cell_height;
        Some((dx, dy))
    }
}
