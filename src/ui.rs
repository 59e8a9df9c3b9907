use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use crate::app::{App, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, form, list, footer
    let [header_area, form_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_form(app, frame, form_area);

    if app.loading {
        render_loading(app, frame, list_area);
    } else {
        render_list(app, frame, list_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let count_indicator = if app.items.is_empty() {
        String::new()
    } else {
        format!(" [{} items]", app.items.len())
    };

    let title = Line::from(vec![
        Span::styled(" Catalog ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(count_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_form(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.input_mode == InputMode::Editing;

    let title = match &app.editing {
        Some(draft) => format!(" Edit item #{} ", draft.id),
        None => " New item ".to_string(),
    };

    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let input = Paragraph::new(app.active_input())
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    // Show cursor when the form is focused
    if focused {
        let cursor_x = app
            .active_input()
            .chars()
            .take(app.input_cursor)
            .count() as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Items ");

    let dots = ".".repeat(app.animation_frame as usize + 1);
    let loading = Paragraph::new(format!("Loading items{dots}"))
        .style(Style::default().fg(Color::Gray))
        .block(block);

    frame.render_widget(loading, area);
}

fn render_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Items ({}) ", app.items.len()));

    if app.items.is_empty() {
        let empty = Paragraph::new("No items. Press 'a' to add one.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:>4} ", item.id), Style::default().fg(Color::Gray)),
                Span::raw(item.name.clone()),
            ]))
        })
        .collect();

    let list = List::new(rows)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.input_mode, &app.editing) {
        (InputMode::Editing, Some(_)) => " EDIT ",
        (InputMode::Editing, None) => " ADD ",
        (InputMode::Normal, _) => " LIST ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" a ", key_style),
            Span::styled(" add ", label_style),
            Span::styled(" e ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" d ", key_style),
            Span::styled(" delete ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Editing => {
            let submit_label = if app.editing.is_some() { " update " } else { " add " };
            let esc_label = if app.editing.is_some() { " cancel " } else { " close " };
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(submit_label, label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(esc_label, label_style),
            ]
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CatalogClient, Item, NetEvent};
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = CatalogClient::new("http://127.0.0.1:1/products");
        App::new(client, tx)
    }

    // The debug form of the buffer carries every rendered line.
    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        format!("{:?}", terminal.backend().buffer())
    }

    #[test]
    fn loading_screen_shows_indicator() {
        let mut app = test_app();

        let screen = draw(&mut app);

        assert!(screen.contains("Catalog"));
        assert!(screen.contains("Loading items"));
    }

    #[test]
    fn loaded_screen_shows_rows_and_count() {
        let mut app = test_app();
        app.apply_net(NetEvent::Listed(Ok(vec![
            Item { id: 1, name: "Backpack".to_string() },
            Item { id: 2, name: "T-Shirt".to_string() },
        ])));

        let screen = draw(&mut app);

        assert!(screen.contains("Items (2)"));
        assert!(screen.contains("Backpack"));
        assert!(screen.contains("T-Shirt"));
    }

    #[test]
    fn form_title_follows_edit_state() {
        let mut app = test_app();
        app.apply_net(NetEvent::Listed(Ok(vec![
            Item { id: 9, name: "Backpack".to_string() },
        ])));

        assert!(draw(&mut app).contains("New item"));

        app.begin_editing();
        assert!(draw(&mut app).contains("Edit item #9"));
    }
}
