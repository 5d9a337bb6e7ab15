//! Single-line text fields: key mapping onto `tui-input` and a bordered
//! field renderer shared by the search box and the product form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tui_input::{Input, InputRequest};

use crate::theme;

/// Map a key press to an edit request. Keys with no editing meaning
/// (Tab, Enter, Esc, most Ctrl chords) return `None` so callers can use them.
pub fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Backspace if ctrl || alt => Some(InputRequest::DeletePrevWord),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
        _ => None,
    }
}

/// Apply a key to `input`. Returns `true` when the text changed.
pub fn edit(input: &mut Input, key: KeyEvent) -> bool {
    input_request(key)
        .and_then(|req| input.handle(req))
        .is_some_and(|changed| changed.value)
}

/// Insert pasted text at the cursor, dropping line breaks.
pub fn paste(input: &mut Input, text: &str) -> bool {
    let mut changed = false;
    for c in text.chars().filter(|c| !c.is_control()) {
        changed |= input
            .handle(InputRequest::InsertChar(c))
            .is_some_and(|s| s.value);
    }
    changed
}

/// What to draw for one field.
pub struct FieldView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    /// Cursor column (in chars) when the field has focus.
    pub cursor: Option<usize>,
    pub error: Option<String>,
    /// Extra text after the label, e.g. the id check status.
    pub note: Option<Span<'a>>,
    pub disabled: bool,
}

impl<'a> FieldView<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            cursor: None,
            error: None,
            note: None,
            disabled: false,
        }
    }
}

/// Height a field needs: label, bordered box, error line.
pub const FIELD_HEIGHT: u16 = 5;

/// Label line, a rounded box with the value, and the error beneath.
pub fn render_input_field(frame: &mut Frame, area: Rect, field: &FieldView<'_>) {
    if area.height < 4 {
        return;
    }
    let active = field.cursor.is_some();

    let label_style = if field.disabled {
        theme::disabled()
    } else if active {
        Style::default().fg(theme::SKY_BLUE)
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    let mut label = vec![Span::styled(field.label, label_style)];
    if let Some(ref note) = field.note {
        label.push(Span::raw("  "));
        label.push(note.clone());
    }
    frame.render_widget(
        Paragraph::new(Line::from(label)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let border = if field.error.is_some() {
        theme::border_error()
    } else if active {
        theme::border_focused()
    } else {
        theme::border_default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let box_area = Rect::new(area.x, area.y + 1, area.width, 3);
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    frame.render_widget(
        Paragraph::new(value_line(field, usize::from(inner.width))),
        inner,
    );

    if let Some(ref error) = field.error {
        if area.height > 4 {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), theme::field_error())),
                Rect::new(area.x + 1, area.y + 4, area.width.saturating_sub(1), 1),
            );
        }
    }
}

/// The visible slice of the value with a block cursor, scrolled so the
/// cursor stays inside `width` columns.
fn value_line<'a>(field: &FieldView<'a>, width: usize) -> Line<'a> {
    let text_style = if field.disabled {
        theme::disabled()
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };

    let Some(cursor) = field.cursor else {
        if field.value.is_empty() {
            return Line::from(Span::styled(field.placeholder, theme::key_hint()));
        }
        return Line::from(Span::styled(field.value.to_owned(), text_style));
    };

    let chars: Vec<char> = field.value.chars().collect();
    let cursor = cursor.min(chars.len());
    let scroll = (cursor + 1).saturating_sub(width.max(1));
    let before: String = chars[scroll..cursor].iter().collect();
    let under = chars.get(cursor).map_or_else(|| " ".to_owned(), char::to_string);
    let after: String = chars.iter().skip(cursor + 1).collect();

    Line::from(vec![
        Span::styled(before, text_style),
        Span::styled(under, text_style.add_modifier(Modifier::REVERSED)),
        Span::styled(after, text_style),
    ])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_keys_insert() {
        let mut input = Input::default();
        assert!(edit(&mut input, key(KeyCode::Char('a'), KeyModifiers::NONE)));
        assert!(edit(&mut input, key(KeyCode::Char('B'), KeyModifiers::SHIFT)));
        assert_eq!(input.value(), "aB");
    }

    #[test]
    fn control_chords_are_left_to_the_caller() {
        assert!(input_request(key(KeyCode::Char('s'), KeyModifiers::CONTROL)).is_none());
        assert!(input_request(key(KeyCode::Char('r'), KeyModifiers::CONTROL)).is_none());
        assert!(input_request(key(KeyCode::Tab, KeyModifiers::NONE)).is_none());
        assert!(input_request(key(KeyCode::Enter, KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn cursor_moves_do_not_count_as_edits() {
        let mut input = Input::new("abc".into());
        assert!(!edit(&mut input, key(KeyCode::Left, KeyModifiers::NONE)));
        assert!(edit(&mut input, key(KeyCode::Backspace, KeyModifiers::NONE)));
        assert_eq!(input.value(), "ac");
    }

    #[test]
    fn paste_drops_line_breaks() {
        let mut input = Input::default();
        assert!(paste(&mut input, "2025-\n01-01\r"));
        assert_eq!(input.value(), "2025-01-01");
    }

    #[test]
    fn long_values_scroll_to_keep_the_cursor_visible() {
        let mut view = FieldView::new("Nombre", "abcdefghij");
        view.cursor = Some(10);
        let line = value_line(&view, 5);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "ghij ");
    }
}
