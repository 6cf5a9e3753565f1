//! Toolbar controls, their geometry and their keyboard bindings.
//!
//! Left to right: Back, Forward, Reload, Home, search field, Search,
//! Ad-block toggle, Dark-theme toggle. Buttons have a fixed width, the field
//! takes whatever is left.

use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::config::ToolbarConfig;
use crate::searchbar::FieldEdit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Back,
    Forward,
    Reload,
    Home,
    SearchField,
    Search,
    AdBlock,
    DarkTheme,
}

impl Control {
    /// Every control, in toolbar order.
    pub const ALL: [Control; 8] = [
        Control::Back,
        Control::Forward,
        Control::Reload,
        Control::Home,
        Control::SearchField,
        Control::Search,
        Control::AdBlock,
        Control::DarkTheme,
    ];

    /// Short label drawn on the control.
    pub fn label(self) -> &'static str {
        match self {
            Control::Back => "<",
            Control::Forward => ">",
            Control::Reload => "R",
            Control::Home => "H",
            Control::SearchField => "",
            Control::Search => "Go",
            Control::AdBlock => "AB",
            Control::DarkTheme => "D",
        }
    }
}

/// Axis-aligned rectangle, top-left origin, physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Positions of all controls for a given window width.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarLayout {
    slots: Vec<(Control, Rect)>,
    height: f32,
}

impl ToolbarLayout {
    pub fn compute(window_width: u32, config: &ToolbarConfig) -> Self {
        let width = window_width as f32;
        let height = config.height as f32;
        let m = config.margin;
        let bw = config.button_width;
        let y = m;
        let h = (height - 2.0 * m).max(0.0);

        let mut slots = Vec::with_capacity(Control::ALL.len());
        let mut x = m;
        for control in [Control::Back, Control::Forward, Control::Reload, Control::Home] {
            slots.push((control, Rect { x, y, w: bw, h }));
            x += bw + m;
        }
        let field_x = x;

        let right = [
            (Control::Search, config.search_button_width),
            (Control::AdBlock, bw),
            (Control::DarkTheme, bw),
        ];
        let right_width: f32 = right.iter().map(|(_, w)| w + m).sum();
        let field_w = (width - field_x - right_width).max(0.0);
        slots.push((
            Control::SearchField,
            Rect {
                x: field_x,
                y,
                w: field_w,
                h,
            },
        ));

        let mut x = field_x + field_w + m;
        for (control, w) in right {
            slots.push((control, Rect { x, y, w, h }));
            x += w + m;
        }

        Self { slots, height }
    }

    /// Control under the pointer, if any.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Control> {
        if y < 0.0 || y >= self.height {
            return None;
        }
        self.slots
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|&(control, _)| control)
    }

    pub fn rect(&self, control: Control) -> Rect {
        self.slots
            .iter()
            .find(|(c, _)| *c == control)
            .map(|&(_, rect)| rect)
            .unwrap_or(Rect {
                x: 0.0,
                y: 0.0,
                w: 0.0,
                h: 0.0,
            })
    }

    pub fn slots(&self) -> &[(Control, Rect)] {
        &self.slots
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clavier
// ─────────────────────────────────────────────────────────────────────────────

/// What a pressed key does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Activate(Control),
    Edit(FieldEdit),
    /// Swallowed by the focused field.
    Ignore,
    /// Goes to the engine.
    Forward,
}

/// Maps a key press to an action. Shortcuts win over the field, and keys the
/// field does not handle never reach the engine while it has focus.
pub fn key_action(key: &Key, mods: ModifiersState, field_focused: bool) -> KeyAction {
    if let Some(control) = shortcut(key, mods) {
        return KeyAction::Activate(control);
    }
    if !field_focused {
        return KeyAction::Forward;
    }

    let ctrl = mods.control_key();
    let edit = match key {
        Key::Named(NamedKey::Enter) => return KeyAction::Activate(Control::Search),
        Key::Named(NamedKey::Escape) => FieldEdit::Unfocus,
        Key::Named(NamedKey::Backspace) => FieldEdit::Backspace,
        Key::Named(NamedKey::Delete) => FieldEdit::Delete,
        Key::Named(NamedKey::ArrowLeft) => FieldEdit::Left,
        Key::Named(NamedKey::ArrowRight) => FieldEdit::Right,
        Key::Named(NamedKey::Home) => FieldEdit::Home,
        Key::Named(NamedKey::End) => FieldEdit::End,
        Key::Named(NamedKey::Space) => FieldEdit::Insert(" ".to_string()),
        Key::Character(c) if ctrl && c.eq_ignore_ascii_case("a") => FieldEdit::SelectAll,
        Key::Character(c) if !ctrl && !mods.alt_key() => FieldEdit::Insert(c.to_string()),
        _ => return KeyAction::Ignore,
    };
    KeyAction::Edit(edit)
}

fn shortcut(key: &Key, mods: ModifiersState) -> Option<Control> {
    let ctrl = mods.control_key();
    let alt = mods.alt_key();
    match key {
        Key::Character(c) if ctrl && c.eq_ignore_ascii_case("l") => Some(Control::SearchField),
        Key::Character(c) if ctrl && c.eq_ignore_ascii_case("r") => Some(Control::Reload),
        Key::Named(NamedKey::F5) => Some(Control::Reload),
        Key::Named(NamedKey::ArrowLeft) if alt => Some(Control::Back),
        Key::Named(NamedKey::ArrowRight) if alt => Some(Control::Forward),
        Key::Named(NamedKey::Home) if alt => Some(Control::Home),
        _ => None,
    }
}
