//! Champ de recherche / navigation — machine à états d'édition de texte.
//!
//! Gère le texte saisi, la position du curseur et le focus, ainsi que la
//! résolution de la saisie en adresse (domaine ou requête de recherche).
//!
//! Aucune dépendance graphique — ce module est purement logique.

use crate::config::SearchConfig;

/// État du focus du champ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFocus {
    /// Pas de focus — les événements clavier vont à Servo.
    Unfocused,
    /// Vient d'être focusé (Ctrl+L ou clic) — tout le texte est sélectionné.
    /// La prochaine frappe remplace tout le contenu.
    Focused,
    /// Édition caractère par caractère.
    Editing,
}

/// Champ de saisie mono-ligne de la barre d'outils.
#[derive(Debug)]
pub struct SearchField {
    text: String,
    /// Position du curseur en offset d'octets dans `text`.
    cursor: usize,
    focus: FieldFocus,
}

impl Default for SearchField {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchField {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            focus: FieldFocus::Unfocused,
        }
    }

    /// Focus le champ. Sélectionne tout le texte.
    pub fn focus(&mut self) {
        self.focus = FieldFocus::Focused;
        self.cursor = self.text.len();
    }

    /// Retire le focus. Le texte saisi est conservé.
    pub fn unfocus(&mut self) {
        self.focus = FieldFocus::Unfocused;
    }

    /// Vide le champ.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// En mode Focused (tout sélectionné), la prochaine édition efface tout.
    fn take_selection(&mut self) -> bool {
        if self.focus == FieldFocus::Focused {
            self.clear();
            self.focus = FieldFocus::Editing;
            return true;
        }
        false
    }

    /// Insère un caractère à la position du curseur.
    pub fn insert_char(&mut self, c: char) {
        self.take_selection();
        self.focus = FieldFocus::Editing;
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    /// Supprime le caractère avant le curseur (Backspace).
    pub fn backspace(&mut self) {
        if self.take_selection() {
            return;
        }
        if let Some(prev) = self.prev_boundary() {
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    /// Supprime le caractère après le curseur (Delete).
    pub fn delete(&mut self) {
        if self.take_selection() {
            return;
        }
        if let Some(next) = self.next_boundary() {
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.focus == FieldFocus::Focused {
            self.focus = FieldFocus::Editing;
            self.cursor = 0;
            return;
        }
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.focus == FieldFocus::Focused {
            // Curseur déjà en fin de texte.
            self.focus = FieldFocus::Editing;
            return;
        }
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        if self.focus == FieldFocus::Focused {
            self.focus = FieldFocus::Editing;
        }
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        if self.focus == FieldFocus::Focused {
            self.focus = FieldFocus::Editing;
        }
        self.cursor = self.text.len();
    }

    /// Sélectionne tout le texte (Ctrl+A).
    pub fn select_all(&mut self) {
        self.focus();
    }

    /// Valide la saisie. Retourne l'adresse vers laquelle naviguer, ou `None`
    /// si la saisie est vide. Le champ est vidé dans tous les cas.
    pub fn submit(&mut self, search: &SearchConfig) -> Option<String> {
        let target = resolve_input(&self.text, search);
        self.clear();
        self.focus = FieldFocus::Unfocused;
        target
    }

    pub fn is_focused(&self) -> bool {
        self.focus != FieldFocus::Unfocused
    }

    pub fn focus_state(&self) -> FieldFocus {
        self.focus
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Nombre de caractères avant le curseur (pour le rendu).
    pub fn cursor_char_offset(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        let c = self.text[self.cursor..].chars().next()?;
        Some(self.cursor + c.len_utf8())
    }
}

/// Édition demandée par le clavier, appliquée via [`SearchField::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    SelectAll,
    Unfocus,
}

impl SearchField {
    pub fn apply(&mut self, edit: &FieldEdit) {
        match edit {
            FieldEdit::Insert(s) => self.insert_str(s),
            FieldEdit::Backspace => self.backspace(),
            FieldEdit::Delete => self.delete(),
            FieldEdit::Left => self.move_cursor_left(),
            FieldEdit::Right => self.move_cursor_right(),
            FieldEdit::Home => self.home(),
            FieldEdit::End => self.end(),
            FieldEdit::SelectAll => self.select_all(),
            FieldEdit::Unfocus => self.unfocus(),
        }
    }
}

/// Résout la saisie en adresse.
///
/// - Saisie vide (après trim) : `None`.
/// - Contient un `.` : traitée comme une adresse ; `http://` est ajouté si
///   elle ne commence ni par `http://` ni par `https://`.
/// - Sinon : requête de recherche, ajoutée telle quelle à l'URL du moteur
///   (encodée seulement si `percent_encode_query` est activé).
pub fn resolve_input(input: &str, search: &SearchConfig) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains('.') {
        if input.starts_with("http://") || input.starts_with("https://") {
            return Some(input.to_string());
        }
        return Some(format!("http://{input}"));
    }

    let query = if search.percent_encode_query {
        url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
    } else {
        input.to_string()
    };
    Some(format!("{}{query}", search.engine_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search() -> SearchConfig {
        SearchConfig::default()
    }

    #[test]
    fn test_domain_gets_http_prefix() {
        assert_eq!(
            resolve_input("  openai.com  ", &search()).as_deref(),
            Some("http://openai.com")
        );
    }

    #[test]
    fn test_existing_scheme_unchanged() {
        assert_eq!(
            resolve_input("https://openai.com", &search()).as_deref(),
            Some("https://openai.com")
        );
        assert_eq!(
            resolve_input("http://example.org/a.b", &search()).as_deref(),
            Some("http://example.org/a.b")
        );
    }

    #[test]
    fn test_text_without_dot_is_raw_search() {
        assert_eq!(
            resolve_input("hello world", &search()).as_deref(),
            Some("https://www.google.com/search?q=hello world")
        );
    }

    #[test]
    fn test_special_characters_passed_through() {
        assert_eq!(
            resolve_input("rock & roll #1", &search()).as_deref(),
            Some("https://www.google.com/search?q=rock & roll #1")
        );
    }

    #[test]
    fn test_scheme_without_dot_is_a_search() {
        // Only the dot decides; "http://localhost" has none.
        assert_eq!(
            resolve_input("http://localhost", &search()).as_deref(),
            Some("https://www.google.com/search?q=http://localhost")
        );
    }

    #[test]
    fn test_dot_with_spaces_is_an_address() {
        assert_eq!(
            resolve_input("what is 1.5", &search()).as_deref(),
            Some("http://what is 1.5")
        );
    }

    #[test]
    fn test_whitespace_only_resolves_to_nothing() {
        assert_eq!(resolve_input("   ", &search()), None);
        assert_eq!(resolve_input("", &search()), None);
    }

    #[test]
    fn test_encoded_query_when_enabled() {
        let cfg = SearchConfig {
            percent_encode_query: true,
            ..SearchConfig::default()
        };
        assert_eq!(
            resolve_input("hello world&x", &cfg).as_deref(),
            Some("https://www.google.com/search?q=hello+world%26x")
        );
    }

    #[test]
    fn test_submit_always_clears() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("hello");
        assert!(field.submit(&search()).is_some());
        assert_eq!(field.text(), "");
        assert!(!field.is_focused());

        field.focus();
        field.insert_str("   ");
        assert_eq!(field.submit(&search()), None);
        assert_eq!(field.text(), "");
    }

    #[test]
    fn test_focus_then_typing_replaces_text() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("abc");
        field.focus();
        field.insert_char('x');
        assert_eq!(field.text(), "x");
        assert_eq!(field.focus_state(), FieldFocus::Editing);
    }

    #[test]
    fn test_backspace_and_delete_respect_utf8() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("héé");
        field.backspace();
        assert_eq!(field.text(), "hé");
        field.home();
        field.delete();
        assert_eq!(field.text(), "é");
        assert_eq!(field.cursor_char_offset(), 0);
    }

    #[test]
    fn test_cursor_movement() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("abcd");
        field.move_cursor_left();
        field.move_cursor_left();
        assert_eq!(field.cursor_char_offset(), 2);
        field.insert_char('X');
        assert_eq!(field.text(), "abXcd");
        field.end();
        assert_eq!(field.cursor_char_offset(), 5);
        field.move_cursor_right();
        assert_eq!(field.cursor_char_offset(), 5);
    }

    #[test]
    fn test_select_all_then_backspace_empties() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("openai.com");
        field.select_all();
        field.backspace();
        assert_eq!(field.text(), "");
    }

    #[test]
    fn test_unfocus_keeps_text() {
        let mut field = SearchField::new();
        field.focus();
        field.insert_str("draft");
        field.unfocus();
        assert_eq!(field.text(), "draft");
        assert!(!field.is_focused());
    }

    #[test]
    fn test_apply_edits_in_sequence() {
        let mut field = SearchField::new();
        field.focus();
        for edit in [
            FieldEdit::Insert("rust".to_string()),
            FieldEdit::Home,
            FieldEdit::Delete,
            FieldEdit::End,
            FieldEdit::Backspace,
            FieldEdit::Left,
            FieldEdit::Insert("-".to_string()),
            FieldEdit::Right,
        ] {
            field.apply(&edit);
        }
        assert_eq!(field.text(), "u-s");
        assert_eq!(field.cursor_char_offset(), 3);

        field.apply(&FieldEdit::SelectAll);
        assert_eq!(field.focus_state(), FieldFocus::Focused);
        field.apply(&FieldEdit::Unfocus);
        assert!(!field.is_focused());
        assert_eq!(field.text(), "u-s");
    }
}
