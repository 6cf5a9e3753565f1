//! Browser shell: toolbar handlers wired to the embedded view.
//!
//! The shell never talks to Servo directly. It drives an [`EmbeddedView`],
//! which the front end implements for a Servo `WebView` (see
//! [`crate::servo_glue::ServoView`]).

use std::rc::Rc;

use tracing::{debug, info};

use crate::config::{Config, SearchConfig};
use crate::filter::{AdFilter, RequestFilter};
use crate::privacy::FilterListEngine;
use crate::searchbar::SearchField;
use crate::theme::{ShellStyle, Theme};
use crate::toolbar::Control;

/// The embedded engine, as seen by the shell.
///
/// All calls are fire-and-forget: failures are rendered by the engine.
pub trait EmbeddedView {
    fn navigate(&self, address: &str);
    fn go_back(&self);
    fn go_forward(&self);
    fn reload(&self);
    /// Replaces (or clears, with `None`) the active request filter.
    fn set_request_filter(&self, filter: Option<Rc<dyn RequestFilter>>);
}

/// Shell state and handlers.
pub struct Shell<V: EmbeddedView> {
    view: V,
    field: SearchField,
    theme: Theme,
    adblock_enabled: bool,
    home_url: String,
    search: SearchConfig,
    filter_lists: Option<Rc<FilterListEngine>>,
}

impl<V: EmbeddedView> Shell<V> {
    pub fn new(view: V, config: &Config) -> Self {
        Self {
            view,
            field: SearchField::new(),
            theme: Theme::Light,
            adblock_enabled: false,
            home_url: config.general.home_url.clone(),
            search: config.search.clone(),
            filter_lists: None,
        }
    }

    /// Filter lists consulted by the ad filter after its substring policy.
    pub fn with_filter_lists(mut self, lists: Option<FilterListEngine>) -> Self {
        self.filter_lists = lists.map(Rc::new);
        self
    }

    // ── Dispatch ───────────────────────────────────────────────────────

    /// Runs the handler bound to a toolbar control.
    pub fn activate(&mut self, control: Control) {
        debug!(?control, "Toolbar control activated");
        match control {
            Control::Back => self.back(),
            Control::Forward => self.forward(),
            Control::Reload => self.reload(),
            Control::Home => self.home(),
            Control::SearchField => self.field.focus(),
            Control::Search => self.search(),
            Control::AdBlock => self.set_adblock(!self.adblock_enabled),
            Control::DarkTheme => self.set_dark_theme(!self.theme.is_dark()),
        }
    }

    // ── Navigation ─────────────────────────────────────────────────────

    pub fn back(&self) {
        self.view.go_back();
    }

    pub fn forward(&self) {
        self.view.go_forward();
    }

    pub fn reload(&self) {
        self.view.reload();
    }

    pub fn home(&self) {
        self.view.navigate(&self.home_url);
    }

    /// Submits the field: navigates to the resolved address, then the field
    /// is empty whatever the outcome.
    pub fn search(&mut self) {
        if let Some(address) = self.field.submit(&self.search) {
            debug!(address, "Search bar dispatch");
            self.view.navigate(&address);
        }
    }

    // ── Toggles ────────────────────────────────────────────────────────

    pub fn set_adblock(&mut self, enabled: bool) {
        self.adblock_enabled = enabled;
        if enabled {
            let filter = AdFilter::with_lists(self.filter_lists.clone());
            self.view.set_request_filter(Some(Rc::new(filter)));
        } else {
            self.view.set_request_filter(None);
        }
        info!(enabled, "Ad-block toggled");
    }

    pub fn set_dark_theme(&mut self, dark: bool) {
        self.theme = Theme::from_dark_flag(dark);
        info!(dark, "Theme toggled");
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn is_checked(&self, control: Control) -> bool {
        match control {
            Control::AdBlock => self.adblock_enabled,
            Control::DarkTheme => self.theme.is_dark(),
            _ => false,
        }
    }

    pub fn adblock_enabled(&self) -> bool {
        self.adblock_enabled
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn style(&self) -> ShellStyle {
        self.theme.style()
    }

    pub fn field(&self) -> &SearchField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut SearchField {
        &mut self.field
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}
