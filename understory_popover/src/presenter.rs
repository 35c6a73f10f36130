// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel presenter: what the panel shows, focus on open, and copy-to-clipboard.
//!
//! ## View
//!
//! [`PanelPresenter::view`] is the single place where content is matched:
//! text becomes a preformatted, labelled block; templates receive the
//! instance's data payload; components are passed through untouched. The
//! host renders the resulting [`PanelView`] however it likes.
//!
//! ## Copy
//!
//! Copying text tries the host's asynchronous clipboard first. If that path
//! is unavailable right away, or later settles with an error, the presenter
//! falls back to the host's selection-based legacy copy. Either success
//! announces [`COPIED_MESSAGE`] in the polite live region; double failure
//! announces [`COPY_FAILED_MESSAGE`]. The message clears after
//! [`LIVE_REGION_CLEAR`].

use alloc::string::String;
use core::fmt;
use core::time::Duration;

use crate::config::{PopoverConfig, PopoverData, PopoverRole};
use crate::content::PopoverContent;
use crate::error::ClipboardError;
use crate::host::{ClipboardTicket, FocusTrapId, Host};
use crate::timer::Timer;

/// How long a live-region message stays before it is cleared.
pub const LIVE_REGION_CLEAR: Duration = Duration::from_millis(1200);

/// Announced after a successful copy.
pub const COPIED_MESSAGE: &str = "Copied to clipboard";

/// Announced when every copy path failed.
pub const COPY_FAILED_MESSAGE: &str = "Copy failed";

/// Accessible label of the text block.
pub const TEXT_CONTENT_LABEL: &str = "Popover content";

/// The body of a panel view.
#[derive(Debug)]
pub enum PanelBody<'a, T, C> {
    /// Preformatted text with an accessible label.
    Text {
        /// The text.
        text: &'a str,
        /// Accessible label for the block.
        label: &'static str,
    },
    /// Template to instantiate with `data` as its context.
    Template {
        /// The template.
        template: &'a T,
        /// The instance's payload, if any.
        data: Option<&'a PopoverData>,
    },
    /// Component to instantiate.
    Component(&'a C),
}

/// Everything the host needs to render a panel.
#[derive(Debug)]
pub struct PanelView<'a, T, C> {
    /// Panel element id.
    pub panel_id: &'a str,
    /// ARIA role.
    pub role: PopoverRole,
    /// Header text, when the header row is shown.
    pub header: Option<&'a str>,
    /// Panel body.
    pub body: PanelBody<'a, T, C>,
    /// Render the copy button.
    pub show_copy: bool,
    /// Render the close button.
    pub show_close: bool,
    /// Render the arrow.
    pub show_arrow: bool,
    /// Current live-region message.
    pub live_message: Option<&'static str>,
}

/// Result of [`PopoverController::copy`](crate::controller::PopoverController::copy).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CopyStatus {
    /// Copied; the success message was announced.
    Copied,
    /// Every path failed; the failure message was announced.
    Failed,
    /// An asynchronous write is in flight.
    Pending(ClipboardTicket),
    /// The content is not text.
    NotCopyable,
}

/// Presents one popover's panel.
pub struct PanelPresenter<H: Host> {
    panel_id: String,
    pane: H::Element,
    role: PopoverRole,
    content: PopoverContent<H::Template, H::Component>,
    header: Option<String>,
    data: Option<PopoverData>,
    show_copy: bool,
    show_close: bool,
    show_arrow: bool,
    trap_focus: bool,
    moves_focus: bool,
    focus_trap: Option<FocusTrapId>,
    pending_copy: Option<ClipboardTicket>,
    live_message: Option<&'static str>,
    live_clear: Timer,
}

impl<H: Host> fmt::Debug for PanelPresenter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelPresenter")
            .field("panel_id", &self.panel_id)
            .field("pane", &self.pane)
            .field("role", &self.role)
            .field("content", &self.content)
            .field("focus_trap", &self.focus_trap)
            .field("pending_copy", &self.pending_copy)
            .field("live_message", &self.live_message)
            .finish_non_exhaustive()
    }
}

impl<H: Host> PanelPresenter<H> {
    pub(crate) fn new(
        panel_id: String,
        pane: H::Element,
        content: PopoverContent<H::Template, H::Component>,
        config: &PopoverConfig,
    ) -> Self {
        Self {
            panel_id,
            pane,
            role: config.role,
            content,
            header: config
                .show_header
                .then(|| config.header.clone().unwrap_or_default()),
            data: config.data.clone(),
            show_copy: config.show_copy,
            show_close: config.show_close,
            show_arrow: config.show_arrow,
            trap_focus: config.trap_focus,
            moves_focus: config.moves_focus(),
            focus_trap: None,
            pending_copy: None,
            live_message: None,
            live_clear: Timer::new(),
        }
    }

    /// Panel element id.
    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    /// The overlay pane hosting the panel.
    pub fn pane(&self) -> H::Element {
        self.pane
    }

    /// The content.
    pub fn content(&self) -> &PopoverContent<H::Template, H::Component> {
        &self.content
    }

    /// The active focus trap, if any.
    pub fn focus_trap(&self) -> Option<FocusTrapId> {
        self.focus_trap
    }

    /// Current live-region message.
    pub fn live_message(&self) -> Option<&'static str> {
        self.live_message
    }

    /// True if an asynchronous clipboard write is in flight.
    pub fn is_copy_pending(&self) -> bool {
        self.pending_copy.is_some()
    }

    /// Build the view for the host to render.
    pub fn view(&self) -> PanelView<'_, H::Template, H::Component> {
        let body = match &self.content {
            PopoverContent::Text(text) => PanelBody::Text {
                text,
                label: TEXT_CONTENT_LABEL,
            },
            PopoverContent::Template(template) => PanelBody::Template {
                template,
                data: self.data.as_ref(),
            },
            PopoverContent::Component(component) => PanelBody::Component(component),
        };
        PanelView {
            panel_id: &self.panel_id,
            role: self.role,
            header: self.header.as_deref(),
            show_copy: self.show_copy && matches!(body, PanelBody::Text { .. }),
            body,
            show_close: self.show_close,
            show_arrow: self.show_arrow,
            live_message: self.live_message,
        }
    }

    /// Move focus into the panel once it is attached.
    ///
    /// Hover popovers without a focus trap leave focus where it is.
    pub(crate) fn ready(&mut self, host: &mut H) {
        if !self.moves_focus {
            return;
        }
        if self.trap_focus {
            if self.focus_trap.is_none() {
                self.focus_trap = Some(host.activate_focus_trap(self.pane));
            }
            if host.focus_first_focusable(self.pane) {
                return;
            }
        }
        host.set_attribute(self.pane, "tabindex", "-1");
        host.focus(self.pane);
    }

    /// Copy text content to the clipboard.
    pub(crate) fn copy(&mut self, host: &mut H, now: Duration) -> CopyStatus {
        let Some(text) = self.content.as_text() else {
            return CopyStatus::NotCopyable;
        };
        if let Some(ticket) = self.pending_copy {
            return CopyStatus::Pending(ticket);
        }
        match host.write_clipboard(text) {
            Ok(ticket) => {
                log::trace!("{}: clipboard write {ticket:?} pending", self.panel_id);
                self.pending_copy = Some(ticket);
                CopyStatus::Pending(ticket)
            }
            Err(err) => {
                log::debug!("{}: clipboard write rejected ({err}), falling back", self.panel_id);
                self.fallback_copy(host, now)
            }
        }
    }

    /// Resolve a pending write. Returns false if `ticket` is not the one in flight.
    pub(crate) fn clipboard_settled(
        &mut self,
        host: &mut H,
        ticket: ClipboardTicket,
        result: Result<(), ClipboardError>,
        now: Duration,
    ) -> Option<CopyStatus> {
        if self.pending_copy != Some(ticket) {
            return None;
        }
        self.pending_copy = None;
        Some(match result {
            Ok(()) => {
                self.announce(host, COPIED_MESSAGE, now);
                CopyStatus::Copied
            }
            Err(err) => {
                log::debug!("{}: clipboard write failed ({err}), falling back", self.panel_id);
                self.fallback_copy(host, now)
            }
        })
    }

    fn fallback_copy(&mut self, host: &mut H, now: Duration) -> CopyStatus {
        let result = match self.content.as_text() {
            Some(text) => host.legacy_copy(text),
            None => return CopyStatus::NotCopyable,
        };
        match result {
            Ok(()) => {
                self.announce(host, COPIED_MESSAGE, now);
                CopyStatus::Copied
            }
            Err(err) => {
                log::warn!("{}: copy failed: {err}", self.panel_id);
                self.announce(host, COPY_FAILED_MESSAGE, now);
                CopyStatus::Failed
            }
        }
    }

    fn announce(&mut self, host: &mut H, message: &'static str, now: Duration) {
        self.live_message = Some(message);
        host.announce(self.pane, Some(message));
        self.live_clear.arm(now, LIVE_REGION_CLEAR);
    }

    /// Clear the live region when its time is up.
    pub(crate) fn advance(&mut self, host: &mut H, now: Duration) {
        if self.live_clear.fire(now) {
            self.live_message = None;
            host.announce(self.pane, None);
        }
    }

    /// Next time [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.live_clear.due()
    }

    /// Drop the focus trap and pending work.
    pub(crate) fn release(&mut self, host: &mut H) {
        if let Some(trap) = self.focus_trap.take() {
            host.deactivate_focus_trap(trap);
        }
        self.live_clear.cancel();
        self.live_message = None;
        self.pending_copy = None;
    }
}
