use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::api::{CatalogClient, Item, NetEvent};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// By-value copy of the item being edited. `None` on the `App` means the
/// form creates a new item instead of updating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: u64,
    pub name: String,
}

/// Convert a character index to a byte index for UTF-8 safe string edits
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub loading: bool,

    // Mirrored server state
    pub items: Vec<Item>,
    pub list_state: ListState,

    // Form state: the new-item draft survives independently of the
    // optional edit copy, so cancelling an edit restores the draft
    pub draft: String,
    pub editing: Option<EditDraft>,
    pub input_cursor: usize,

    // Animation state
    pub animation_frame: u8,

    // Collaborators
    pub client: CatalogClient,
    pub events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(client: CatalogClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            loading: true,

            items: Vec::new(),
            list_state: ListState::default(),

            draft: String::new(),
            editing: None,
            input_cursor: 0,

            animation_frame: 0,

            client,
            events,
        }
    }

    // List navigation

    pub fn selected_item(&self) -> Option<&Item> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    pub fn select_next(&mut self) {
        let len = self.items.len();
        if len > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn select_prev(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.items.len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    // Form state

    /// The buffer the form edits: the edit copy when one exists, the
    /// new-item draft otherwise.
    pub fn active_input(&self) -> &str {
        match &self.editing {
            Some(draft) => &draft.name,
            None => &self.draft,
        }
    }

    fn active_input_mut(&mut self) -> &mut String {
        match &mut self.editing {
            Some(draft) => &mut draft.name,
            None => &mut self.draft,
        }
    }

    pub fn focus_input(&mut self) {
        self.input_mode = InputMode::Editing;
        self.input_cursor = self.active_input().chars().count();
    }

    /// Copy the selected item into the form and focus it.
    pub fn begin_editing(&mut self) {
        if let Some(item) = self.selected_item() {
            self.editing = Some(EditDraft {
                id: item.id,
                name: item.name.clone(),
            });
            self.focus_input();
        }
    }

    /// Drop the edit copy without touching the network. The new-item
    /// draft reappears in the form.
    pub fn cancel_editing(&mut self) {
        self.editing = None;
        self.input_cursor = self.draft.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.input_cursor;
        let buffer = self.active_input_mut();
        let byte_pos = char_to_byte_index(buffer, cursor);
        buffer.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let cursor = self.input_cursor;
            let buffer = self.active_input_mut();
            let byte_pos = char_to_byte_index(buffer, cursor);
            buffer.remove(byte_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        let cursor = self.input_cursor;
        let buffer = self.active_input_mut();
        if cursor < buffer.chars().count() {
            let byte_pos = char_to_byte_index(buffer, cursor);
            buffer.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.active_input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.active_input().chars().count();
    }

    /// Tick animation frame while a fetch is outstanding
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Reducer: one network completion in, one state transition out. The
    // list is replaced wholesale or rebuilt per transition, never patched
    // in place. Failures log and leave the list as it was.

    pub fn apply_net(&mut self, event: NetEvent) {
        match event {
            NetEvent::Listed(Ok(items)) => {
                info!("loaded {} items", items.len());
                self.items = items;
                self.loading = false;
                if self.list_state.selected().is_none() && !self.items.is_empty() {
                    self.list_state.select(Some(0));
                }
                self.clamp_selection();
            }
            NetEvent::Listed(Err(err)) => {
                error!("error fetching items: {err:#}");
                self.loading = false;
            }
            NetEvent::Created(Ok(item)) => {
                info!("created item {} ({})", item.id, item.name);
                let mut items = self.items.clone();
                items.push(item);
                self.items = items;
                self.draft.clear();
                if self.editing.is_none() {
                    self.input_cursor = 0;
                }
                if self.list_state.selected().is_none() {
                    self.list_state.select(Some(0));
                }
            }
            NetEvent::Created(Err(err)) => {
                error!("error creating item: {err:#}");
            }
            NetEvent::Updated(Ok(item)) => {
                info!("updated item {} ({})", item.id, item.name);
                self.items = self
                    .items
                    .iter()
                    .map(|p| if p.id == item.id { item.clone() } else { p.clone() })
                    .collect();
                self.editing = None;
                self.input_cursor = self.draft.chars().count();
            }
            NetEvent::Updated(Err(err)) => {
                error!("error updating item: {err:#}");
            }
            NetEvent::Deleted { id, outcome: Ok(()) } => {
                info!("deleted item {id}");
                self.items = self
                    .items
                    .iter()
                    .filter(|p| p.id != id)
                    .cloned()
                    .collect();
                self.clamp_selection();
            }
            NetEvent::Deleted { id, outcome: Err(err) } => {
                error!("error deleting item {id}: {err:#}");
            }
        }
    }

    fn clamp_selection(&mut self) {
        match self.list_state.selected() {
            Some(_) if self.items.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.items.len() => {
                self.list_state.select(Some(self.items.len() - 1));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn app() -> (App, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = CatalogClient::new("http://127.0.0.1:1/products");
        (App::new(client, tx), rx)
    }

    fn item(id: u64, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
        }
    }

    fn ten_items() -> Vec<Item> {
        (1..=10).map(|id| item(id, &format!("Product {id}"))).collect()
    }

    #[test]
    fn listed_replaces_list_and_clears_loading() {
        let (mut app, _rx) = app();
        assert!(app.loading);

        app.apply_net(NetEvent::Listed(Ok(ten_items())));

        assert!(!app.loading);
        assert_eq!(app.items.len(), 10);
        let mut ids: Vec<u64> = app.items.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn failed_list_clears_loading_and_keeps_items() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));

        app.apply_net(NetEvent::Listed(Err(anyhow!("connection refused"))));

        assert!(!app.loading);
        assert_eq!(app.items.len(), 10);
    }

    #[test]
    fn created_appends_and_clears_draft() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.draft = "Widget".to_string();
        app.input_cursor = 6;

        app.apply_net(NetEvent::Created(Ok(item(21, "Widget"))));

        assert_eq!(app.items.len(), 11);
        assert_eq!(app.items.last().unwrap(), &item(21, "Widget"));
        assert!(app.draft.is_empty());
        assert_eq!(app.input_cursor, 0);
    }

    #[test]
    fn failed_create_keeps_draft_and_list() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.draft = "Widget".to_string();

        app.apply_net(NetEvent::Created(Err(anyhow!("500"))));

        assert_eq!(app.items.len(), 10);
        assert_eq!(app.draft, "Widget");
    }

    #[test]
    fn updated_replaces_matching_entry_and_exits_edit_mode() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.list_state.select(Some(2));
        app.begin_editing();
        assert_eq!(app.editing.as_ref().unwrap().id, 3);

        app.apply_net(NetEvent::Updated(Ok(item(3, "Widget"))));

        assert_eq!(app.items.len(), 10);
        assert_eq!(app.items[2], item(3, "Widget"));
        assert_eq!(app.items[3], item(4, "Product 4"));
        assert!(app.editing.is_none());
    }

    #[test]
    fn updated_for_absent_id_leaves_list_unchanged() {
        // An update that lost the race against a delete resolves against
        // a list with no matching id; the map is a no-op.
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.apply_net(NetEvent::Deleted { id: 3, outcome: Ok(()) });

        app.apply_net(NetEvent::Updated(Ok(item(3, "Widget"))));

        assert_eq!(app.items.len(), 9);
        assert!(app.items.iter().all(|i| i.id != 3));
    }

    #[test]
    fn failed_update_keeps_edit_mode_and_list() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.list_state.select(Some(2));
        app.begin_editing();

        app.apply_net(NetEvent::Updated(Err(anyhow!("timeout"))));

        assert_eq!(app.items[2], item(3, "Product 3"));
        assert!(app.editing.is_some());
    }

    #[test]
    fn deleted_removes_exactly_the_matching_entry() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));

        app.apply_net(NetEvent::Deleted { id: 7, outcome: Ok(()) });

        assert_eq!(app.items.len(), 9);
        assert!(app.items.iter().all(|i| i.id != 7));
        assert!(app.items.iter().any(|i| i.id == 6));
        assert!(app.items.iter().any(|i| i.id == 8));
    }

    #[test]
    fn failed_delete_keeps_list() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));

        app.apply_net(NetEvent::Deleted { id: 7, outcome: Err(anyhow!("404")) });

        assert_eq!(app.items.len(), 10);
    }

    #[test]
    fn deleting_last_entry_clamps_selection() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.select_last();

        app.apply_net(NetEvent::Deleted { id: 10, outcome: Ok(()) });

        assert_eq!(app.list_state.selected(), Some(8));
    }

    #[test]
    fn cancel_editing_clears_copy_without_network_call() {
        let (mut app, mut rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.draft = "half-typed".to_string();
        app.list_state.select(Some(0));
        app.begin_editing();

        app.cancel_editing();

        assert!(app.editing.is_none());
        assert_eq!(app.active_input(), "half-typed");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn editing_buffer_is_a_copy_of_the_item() {
        let (mut app, _rx) = app();
        app.apply_net(NetEvent::Listed(Ok(ten_items())));
        app.list_state.select(Some(4));
        app.begin_editing();

        app.insert_char('!');

        assert_eq!(app.active_input(), "Product 5!");
        assert_eq!(app.items[4].name, "Product 5");
    }

    #[test]
    fn input_editing_is_utf8_safe() {
        let (mut app, _rx) = app();
        app.focus_input();
        for c in "héllo".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.cursor_left();
        app.delete_back();

        assert_eq!(app.draft, "hélo");
        assert_eq!(app.input_cursor, 2);
    }

    #[test]
    fn char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 0), 0);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 9), 6);
    }
}
