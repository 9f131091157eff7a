use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{Client, ClientStatus};
use crate::store::ClientStore;

// Represents the state of the clients list screen
pub struct ClientsState {
    list_state: ListState,
    search: String,
    searching: bool,
    show_delete_confirmation: bool,
}

impl ClientsState {
    pub fn new(client_count: usize) -> Self {
        let mut list_state = ListState::default();
        if client_count > 0 {
            list_state.select(Some(0));
        }

        Self {
            list_state,
            search: String::new(),
            searching: false,
            show_delete_confirmation: false,
        }
    }

    /// Clients matching the current search filter, in display order
    pub fn filtered<'a>(&self, clients: &'a [Client]) -> Vec<&'a Client> {
        if self.search.is_empty() {
            return clients.iter().collect();
        }
        let needle = self.search.to_lowercase();
        clients
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_client_id(&self, clients: &[Client]) -> Option<i64> {
        let filtered = self.filtered(clients);
        self.list_state
            .selected()
            .and_then(|i| filtered.get(i))
            .map(|c| c.id)
    }

    fn clamp_selection(&mut self, len: usize) {
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }
}

pub enum ClientAction {
    Exit,
    NewClient,
    EditClient(i64),  // Contains client_id
    DeleteClient(i64), // Contains client_id
    Refresh,
}

fn status_style(status: ClientStatus) -> Style {
    match status {
        ClientStatus::New => Style::default().fg(Color::Cyan),
        ClientStatus::Active => Style::default().fg(Color::Green),
        ClientStatus::Blocked => Style::default().fg(Color::Red),
    }
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, store: &ClientStore, state: &mut ClientsState) {
    let size = frame.size();

    // Create the layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let filtered = state.filtered(store.clients());
    state.clamp_selection(filtered.len());

    // Create and render the clients list
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|client| {
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<28}", client.name)),
                Span::raw(format!("{:<28}", client.email)),
                Span::raw(format!("{:<22}", client.phone)),
                Span::styled(format!("{:<9}", client.status.label()), status_style(client.status)),
                Span::raw(client.created_at.format("%Y-%m-%d").to_string()),
            ]))
        })
        .collect();

    let title = if store.loading() {
        "Clients (loading...)".to_string()
    } else if state.search.is_empty() {
        format!("Clients ({})", filtered.len())
    } else {
        format!("Clients ({}) — filter: {}", filtered.len(), state.search)
    };

    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(clients_list, chunks[0], &mut state.list_state);

    // Footer: last error wins over the key hints
    let footer_text = if let Some(error) = store.error() {
        error.to_string()
    } else if state.searching {
        format!("Search: {}| <Enter> Apply | <Esc> Clear", state.search)
    } else if state.list_state.selected().is_some() {
        "<N> New | <E> Edit | <D> Delete | </> Search | <R> Refresh | <Q> Quit".to_string()
    } else {
        "<N> New | </> Search | <R> Refresh | <Q> Quit".to_string()
    };

    let footer_style = if store.error().is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::TOP))
        .style(footer_style);

    frame.render_widget(footer, chunks[1]);

    // Render delete confirmation popup if needed
    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(store: &ClientStore, state: &mut ClientsState) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        if state.searching {
            match key.code {
                KeyCode::Enter => state.searching = false,
                KeyCode::Esc => {
                    state.searching = false;
                    state.search.clear();
                }
                KeyCode::Backspace => {
                    state.search.pop();
                }
                KeyCode::Char(c) => state.search.push(c),
                _ => {}
            }
            return Ok(None);
        }

        let filtered_len = state.filtered(store.clients()).len();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else if !state.search.is_empty() {
                    state.search.clear();
                } else {
                    return Ok(Some(ClientAction::Exit));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.searching = true;
                }
            }
            KeyCode::Char('n') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ClientAction::NewClient));
                }
            }
            KeyCode::Char('r') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(ClientAction::Refresh));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id(store.clients()) {
                        return Ok(Some(ClientAction::EditClient(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation
                    && state.selected_client_id(store.clients()).is_some()
                {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id(store.clients()) {
                        state.toggle_delete_confirmation();
                        return Ok(Some(ClientAction::DeleteClient(id)));
                    }
                }
            }
            KeyCode::Down => {
                if !state.show_delete_confirmation {
                    state.next(filtered_len);
                }
            }
            KeyCode::Up => {
                if !state.show_delete_confirmation {
                    state.previous(filtered_len);
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::seed_clients;

    #[test]
    fn filter_matches_name_and_email_case_insensitive() {
        let clients = seed_clients();
        let mut state = ClientsState::new(clients.len());

        state.search = "ИВАН".to_string();
        let by_name = state.filtered(&clients);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 1);

        state.search = "maria@".to_string();
        let by_email = state.filtered(&clients);
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id, 2);
    }

    #[test]
    fn selection_wraps_around() {
        let clients = seed_clients();
        let mut state = ClientsState::new(clients.len());
        let len = clients.len();

        state.previous(len);
        assert_eq!(state.selected_client_id(&clients), Some(12));
        state.next(len);
        assert_eq!(state.selected_client_id(&clients), Some(1));
    }

    #[test]
    fn selection_clamps_after_filtering() {
        let clients = seed_clients();
        let mut state = ClientsState::new(clients.len());
        for _ in 0..11 {
            state.next(clients.len());
        }

        state.search = "ivan@".to_string();
        let len = state.filtered(&clients).len();
        state.clamp_selection(len);
        assert_eq!(state.selected_client_id(&clients), Some(1));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut state = ClientsState::new(0);
        assert_eq!(state.selected_client_id(&[]), None);
        state.next(0);
        assert_eq!(state.selected_client_id(&[]), None);
    }
}
