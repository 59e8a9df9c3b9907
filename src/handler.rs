use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::api::NetEvent;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Net(net) => app.apply_net(net),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit, regardless of mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_input_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // List navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') => app.select_first(),
        KeyCode::Char('G') => app.select_last(),

        // Form entry: 'a' adds, 'e'/Enter edits the selected item
        KeyCode::Char('a') | KeyCode::Char('i') => app.focus_input(),
        KeyCode::Char('e') | KeyCode::Enter => app.begin_editing(),

        KeyCode::Char('d') => {
            if let Some(item) = app.selected_item() {
                spawn_delete(app, item.id);
            }
        }

        KeyCode::Char('r') => {
            app.loading = true;
            spawn_list(app);
        }

        _ => {}
    }
}

fn handle_input_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Leaving the form while editing is Cancel
        KeyCode::Esc => {
            if app.editing.is_some() {
                app.cancel_editing();
            }
            app.input_mode = InputMode::Normal;
        }

        KeyCode::Enter => submit(app),

        KeyCode::Backspace => app.delete_back(),
        KeyCode::Delete => app.delete_forward(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),

        _ => {}
    }
}

/// Create or update depending on whether an edit copy exists. An empty
/// name never leaves the form.
fn submit(app: &mut App) {
    if app.active_input().is_empty() {
        return;
    }

    match app.editing.clone() {
        Some(draft) => spawn_update(app, draft.id, draft.name),
        None => spawn_create(app, app.draft.clone()),
    }

    app.input_mode = InputMode::Normal;
}

// Each request runs on its own task and reports back through the event
// channel. Nothing is locked while a request is in flight; completions
// land in arrival order.

pub fn spawn_list(app: &App) {
    debug!("fetching item list");
    let client = app.client.clone();
    let tx = app.events.clone();
    tokio::spawn(async move {
        let result = client.list().await;
        let _ = tx.send(AppEvent::Net(NetEvent::Listed(result)));
    });
}

fn spawn_create(app: &App, name: String) {
    debug!("creating item {name:?}");
    let client = app.client.clone();
    let tx = app.events.clone();
    tokio::spawn(async move {
        let result = client.create(&name).await;
        let _ = tx.send(AppEvent::Net(NetEvent::Created(result)));
    });
}

fn spawn_update(app: &App, id: u64, name: String) {
    debug!("updating item {id} to {name:?}");
    let client = app.client.clone();
    let tx = app.events.clone();
    tokio::spawn(async move {
        let result = client.update(id, &name).await;
        let _ = tx.send(AppEvent::Net(NetEvent::Updated(result)));
    });
}

fn spawn_delete(app: &App, id: u64) {
    debug!("deleting item {id}");
    let client = app.client.clone();
    let tx = app.events.clone();
    tokio::spawn(async move {
        let outcome = client.delete(id).await;
        let _ = tx.send(AppEvent::Net(NetEvent::Deleted { id, outcome }));
    });
}
