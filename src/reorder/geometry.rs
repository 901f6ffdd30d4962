//! Pointer position → insertion index, with no rendering involved.

use ratatui::layout::Rect;

/// Vertical extent of one rendered item, relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemBounds {
    /// Position of the item in the full, unfiltered list.
    pub index: usize,
    pub top: u16,
    pub height: u16,
}

impl ItemBounds {
    /// Bounds of `rect` measured from the top of `container`.
    pub fn from_rect(index: usize, rect: Rect, container: Rect) -> Self {
        Self {
            index,
            top: rect.y.saturating_sub(container.y),
            height: rect.height,
        }
    }

    pub fn bottom(&self) -> u16 {
        self.top.saturating_add(self.height)
    }

    fn contains(&self, y: u16) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Pointer offset from the container's top edge, clamped to `[0, height]`.
pub fn clamp_pointer(container: Rect, y: u16) -> u16 {
    y.saturating_sub(container.y).min(container.height)
}

/// Insertion index for the dragged item whose top edge is at `y`.
///
/// Siblings are walked in list order, skipping the dragged item. A position in
/// the gap above a sibling inserts before it; a position inside a sibling
/// splits at its midpoint (top half before, bottom half after). Anything below
/// every sibling inserts just after the last laid-out item.
///
/// The result is an index into the list *before* the dragged item is taken
/// out, in `0..=len`.
pub fn drop_index(bounds: &[ItemBounds], dragged: usize, y: u16) -> usize {
    let mut prev_bottom = 0u16;
    for item in bounds.iter().filter(|b| b.index != dragged) {
        if y >= prev_bottom && y < item.top {
            return item.index;
        }
        if item.contains(y) {
            let into = u32::from(y - item.top) * 2;
            return if into < u32::from(item.height) {
                item.index
            } else {
                item.index + 1
            };
        }
        prev_bottom = item.bottom();
    }
    // Just past the last laid-out item, which may sit anywhere in a longer list.
    bounds.iter().map(|b| b.index + 1).max().unwrap_or(0)
}

/// Final position of the dragged item once it is removed from `source` and
/// re-inserted at `drop`.
pub fn landing_index(source: usize, drop: usize, len: usize) -> usize {
    let target = if drop > source { drop - 1 } else { drop };
    target.min(len.saturating_sub(1))
}
