use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Client, ClientFormData, ClientStatus};

pub enum ClientWizardAction {
    Cancel,
    Save(ClientFormData),
}

#[derive(Clone, PartialEq, Copy)]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Status,
}

pub struct ClientWizardState {
    client_id: Option<i64>,
    created_at: Option<NaiveDate>,
    pub form: ClientFormData,
    pub current_field: ClientField,
    pub editing: bool,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            client_id: None,
            created_at: None,
            form: ClientFormData {
                name: String::new(),
                email: String::new(),
                phone: String::new(),
                status: ClientStatus::New,
            },
            current_field: ClientField::Name,
            editing: false,
        }
    }

    pub fn from_existing(client: &Client) -> Self {
        Self {
            client_id: Some(client.id),
            created_at: Some(client.created_at),
            form: ClientFormData::from_client(client),
            current_field: ClientField::Name,
            editing: false,
        }
    }

    pub fn client_id(&self) -> Option<i64> {
        self.client_id
    }

    pub fn toggle_editing(&mut self) {
        // The status field is cycled with Left/Right, not typed into
        if self.current_field != ClientField::Status {
            self.editing = !self.editing;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Email,
            ClientField::Email => ClientField::Phone,
            ClientField::Phone => ClientField::Status,
            ClientField::Status => ClientField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Status,
            ClientField::Email => ClientField::Name,
            ClientField::Phone => ClientField::Email,
            ClientField::Status => ClientField::Phone,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.form.name,
            ClientField::Email => &mut self.form.email,
            ClientField::Phone => &mut self.form.phone,
            ClientField::Status => return,
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    pub fn cycle_status_forward(&mut self) {
        if self.current_field == ClientField::Status {
            self.form.status = self.form.status.next();
        }
    }

    pub fn cycle_status_backward(&mut self) {
        if self.current_field == ClientField::Status {
            self.form.status = self.form.status.previous();
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.form.name.is_empty() &&
        !self.form.email.is_empty() &&
        !self.form.phone.is_empty()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    // Title with appropriate text based on whether we're editing or creating
    let title_text = if state.client_id.is_none() {
        "New Client".to_string()
    } else if let Some(created_at) = state.created_at {
        format!("Edit Client (since {})", created_at.format("%Y-%m-%d"))
    } else {
        "Edit Client".to_string()
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Form fields
    let form_area = chunks[1];
    render_form(f, state, form_area);

    // Help text
    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else if state.current_field == ClientField::Status {
        "Left/Right - Change status | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState, area: Rect) {
    let field_names = [
        "Name",
        "Email",
        "Phone",
        "Status",
    ];

    let status_label = state.form.status.label().to_string();
    let field_values = [
        &state.form.name,
        &state.form.email,
        &state.form.phone,
        &status_label,
    ];

    let items: Vec<ListItem> = field_names
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let content = if i == state.current_field as usize && state.editing {
                Spans::from(vec![
                    Span::styled(
                        format!("{}: ", name),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if i == state.current_field as usize {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.as_str()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Client Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ClientWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Left if !state.editing => {
                state.cycle_status_backward();
            }
            KeyCode::Right if !state.editing => {
                state.cycle_status_forward();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(ClientWizardAction::Save(state.form.clone())));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
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
    fn from_existing_projects_mutable_fields() {
        let client = &seed_clients()[0];
        let state = ClientWizardState::from_existing(client);

        assert_eq!(state.client_id(), Some(client.id));
        assert_eq!(state.form.name, client.name);
        assert_eq!(state.form.status, client.status);
    }

    #[test]
    fn status_field_cycles_instead_of_editing() {
        let mut state = ClientWizardState::new();
        state.current_field = ClientField::Status;

        state.toggle_editing();
        assert!(!state.editing);

        state.cycle_status_forward();
        assert_eq!(state.form.status, ClientStatus::Active);
        state.cycle_status_backward();
        assert_eq!(state.form.status, ClientStatus::New);
    }

    #[test]
    fn save_requires_non_empty_required_fields() {
        let mut state = ClientWizardState::new();
        assert!(!state.is_valid());

        state.form.name = "A".to_string();
        state.form.email = "a@x.com".to_string();
        assert!(!state.is_valid());

        state.form.phone = "1".to_string();
        assert!(state.is_valid());
    }
}
