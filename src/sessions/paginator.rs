//! Paged list view.

use crate::gateway::{ComponentEvent, Control, RenderedMessage};
use crate::sessions::view::{View, ViewAction};

/// Control ids of the navigation row.
const FIRST: &str = "first";
const PREVIOUS: &str = "previous";
const STOP: &str = "stop";
const NEXT: &str = "next";
const LAST: &str = "last";

/// Positions of the current page within the full item list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageIndices {
    /// Index of the first item on the page.
    pub start: usize,
    /// One past the last item on the page.
    pub end: usize,
}

/// Renders the current page slice into a message body.
pub type PageRenderer<T> = Box<dyn Fn(PageIndices, &[T]) -> String + Send + Sync>;

/// A view paging through a list of items.
///
/// The page index is clamped to `[0, page_count - 1]`; navigation
/// controls at a boundary are rendered disabled so the UI reflects
/// unavailability instead of silently ignoring presses. The stop control
/// disables every control, renders once more and ends the session.
pub struct Paginator<T> {
    items: Vec<T>,
    items_per_page: usize,
    page: usize,
    stopped: bool,
    render_page: PageRenderer<T>,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, items_per_page: usize, render_page: PageRenderer<T>) -> Self {
        Paginator {
            items,
            // A zero chunk size would make the page count meaningless.
            items_per_page: items_per_page.max(1),
            page: 0,
            stopped: false,
            render_page,
        }
    }

    /// Number of pages; at least 1 even for an empty item list.
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.items_per_page).max(1)
    }

    /// Current page index.
    pub fn page(&self) -> usize {
        self.page
    }

    fn indices(&self) -> PageIndices {
        let start = self.page * self.items_per_page;
        PageIndices {
            start,
            end: (start + self.items_per_page).min(self.items.len()),
        }
    }

    fn navigation(&self) -> Vec<Control> {
        let at_start = self.page == 0;
        let at_end = self.page == self.page_count() - 1;

        let mut controls = vec![
            Control::button(FIRST, "\u{23EE}"),
            Control::button(PREVIOUS, "\u{25C0}"),
            Control::button(STOP, "\u{274C}"),
            Control::button(NEXT, "\u{25B6}"),
            Control::button(LAST, "\u{23ED}"),
        ];
        for control in &mut controls {
            control.disabled = self.stopped
                || match control.id.as_str() {
                    FIRST | PREVIOUS => at_start,
                    NEXT | LAST => at_end,
                    _ => false,
                };
        }
        controls
    }
}

impl<T: Send> View for Paginator<T> {
    fn render(&self) -> RenderedMessage {
        let indices = self.indices();
        let body = (self.render_page)(indices, &self.items[indices.start..indices.end]);
        RenderedMessage {
            body,
            controls: self.navigation(),
        }
    }

    fn handle(&mut self, event: &ComponentEvent) -> ViewAction {
        if self.stopped {
            return ViewAction::None;
        }
        match event.control_id.as_str() {
            FIRST => {
                self.page = 0;
                ViewAction::Render
            }
            PREVIOUS => {
                self.page = self.page.saturating_sub(1);
                ViewAction::Render
            }
            NEXT => {
                self.page = (self.page + 1).min(self.page_count() - 1);
                ViewAction::Render
            }
            LAST => {
                self.page = self.page_count() - 1;
                ViewAction::Render
            }
            STOP => {
                self.stopped = true;
                ViewAction::Stop
            }
            _ => ViewAction::None,
        }
    }
}
