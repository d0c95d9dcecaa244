//! Page-level state for the ticket inbox.
//!
//! All mutation happens on the thread that owns the [`Inbox`]. Operations that
//! need the server hand out a [`Scoped`] request; the caller runs it wherever it
//! likes and feeds the completion back through [`Inbox::apply`].

use crate::api::models::{Contact, Message, MessageKind, NewMessage, Ticket};
use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadTickets,
    SendMessage(NewMessage),
    UpdateStatus { ticket_id: String, status: String },
    SaveContact { ticket_id: String, contact: Contact },
}

#[derive(Debug)]
pub enum Completion {
    Loaded(Result<Vec<Ticket>, ApiError>),
    MessageSent(Result<Message, ApiError>),
    TicketUpdated(Result<Ticket, ApiError>),
    ContactSaved { ticket_id: String, result: Result<Contact, ApiError> },
}

/// A value tagged with the inbox scope it was issued under.
#[derive(Debug)]
pub struct Scoped<T> {
    generation: u64,
    pub value: T,
}

impl Scoped<Request> {
    pub async fn send(self, client: &ApiClient) -> Scoped<Completion> {
        let value = match self.value {
            Request::LoadTickets => Completion::Loaded(client.tickets().await),
            Request::SendMessage(body) => Completion::MessageSent(client.send_message(&body).await),
            Request::UpdateStatus { ticket_id, status } => {
                Completion::TicketUpdated(client.update_status(&ticket_id, &status).await)
            }
            Request::SaveContact { ticket_id, contact } => Completion::ContactSaved {
                result: client.update_contact(&contact).await,
                ticket_id,
            },
        };
        Scoped { generation: self.generation, value }
    }
}

#[derive(Debug)]
pub struct Inbox {
    tickets: Vec<Ticket>,
    active: Option<Ticket>,
    loading: bool,
    generation: u64,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub fn new() -> Self {
        Self { tickets: Vec::new(), active: None, loading: true, generation: 0 }
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn active(&self) -> Option<&Ticket> {
        self.active.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn scoped<T>(&self, value: T) -> Scoped<T> {
        Scoped { generation: self.generation, value }
    }

    pub fn load_tickets(&self) -> Scoped<Request> {
        self.scoped(Request::LoadTickets)
    }

    /// Makes the list entry with `id` the active ticket. Returns false if no
    /// entry matches, in which case the selection is left alone.
    pub fn select(&mut self, id: &str) -> bool {
        match self.tickets.iter().find(|t| t.id == id) {
            Some(ticket) => {
                self.active = Some(ticket.clone());
                true
            }
            None => false,
        }
    }

    pub fn send_message(&self, text: &str, kind: MessageKind) -> Option<Scoped<Request>> {
        let active = self.active.as_ref()?;
        Some(self.scoped(Request::SendMessage(NewMessage {
            ticket_id: active.id.clone(),
            message: text.to_string(),
            kind,
        })))
    }

    pub fn change_status(&self, status: &str) -> Option<Scoped<Request>> {
        let active = self.active.as_ref()?;
        Some(self.scoped(Request::UpdateStatus {
            ticket_id: active.id.clone(),
            status: status.to_string(),
        }))
    }

    /// Persists an edited contact of the active ticket. The stored contact is
    /// merged through [`Inbox::update_contact`] only if that ticket is still
    /// active when the response lands.
    pub fn save_contact(&self, contact: Contact) -> Option<Scoped<Request>> {
        let active = self.active.as_ref()?;
        Some(self.scoped(Request::SaveContact { ticket_id: active.id.clone(), contact }))
    }

    /// Merges a contact that has already been persisted into the active ticket
    /// and its list entry.
    pub fn update_contact(&mut self, contact: Contact) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let id = active.id.clone();
        active.contact = contact.clone();
        for ticket in self.tickets.iter_mut().filter(|t| t.id == id) {
            ticket.contact = contact.clone();
        }
    }

    /// Ends the current scope. Completions of requests issued before this call
    /// are dropped by [`Inbox::apply`].
    pub fn close(&mut self) {
        self.generation += 1;
    }

    /// Applies a finished request. Returns false when nothing was applied
    /// because the request belonged to a closed scope.
    pub fn apply(&mut self, done: Scoped<Completion>) -> bool {
        if done.generation != self.generation {
            log::debug!("discarding completion from closed inbox scope {}", done.generation);
            return false;
        }
        match done.value {
            Completion::Loaded(result) => {
                match result {
                    Ok(tickets) => self.tickets = tickets,
                    Err(err) => log::error!("failed to load tickets: {err}"),
                }
                self.loading = false;
            }
            Completion::MessageSent(Ok(message)) => {
                if let Some(active) = self.active.as_mut() {
                    active.messages.push(message);
                }
            }
            Completion::MessageSent(Err(err)) => log::error!("failed to send message: {err}"),
            Completion::TicketUpdated(Ok(ticket)) => {
                for entry in self.tickets.iter_mut().filter(|t| t.id == ticket.id) {
                    *entry = ticket.clone();
                }
                self.active = Some(ticket);
            }
            Completion::TicketUpdated(Err(err)) => log::error!("failed to update status: {err}"),
            Completion::ContactSaved { ticket_id, result: Ok(contact) } => {
                if self.active.as_ref().is_some_and(|t| t.id == ticket_id) {
                    self.update_contact(contact);
                } else {
                    log::debug!("ticket {ticket_id} no longer active, not merging saved contact");
                }
            }
            Completion::ContactSaved { result: Err(err), .. } => log::error!("failed to update contact: {err}"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{MessageStatus, Tag};
    use chrono::{TimeZone, Utc};

    fn contact(id: &str) -> Contact {
        Contact {
            id: format!("c{id}"),
            name: Some(format!("Customer {id}")),
            phone: format!("+55 11 9000-000{id}"),
            email: None,
            address: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    fn ticket(id: &str, status: &str) -> Ticket {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Ticket {
            id: id.to_string(),
            status: status.to_string(),
            priority: "normal".to_string(),
            contact: contact(id),
            messages: Vec::new(),
            tags: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn message(id: &str, content: &str) -> Message {
        Message {
            id: id.to_string(),
            content: content.to_string(),
            sender: "agent".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
            status: MessageStatus::Sent,
            kind: MessageKind::Text,
        }
    }

    fn loaded(tickets: Vec<Ticket>) -> Inbox {
        let mut inbox = Inbox::new();
        let req = inbox.load_tickets();
        inbox.apply(Scoped { generation: req.generation, value: Completion::Loaded(Ok(tickets)) });
        inbox
    }

    fn complete<T>(req: Scoped<T>, value: Completion) -> Scoped<Completion> {
        Scoped { generation: req.generation, value }
    }

    #[test]
    fn starts_loading_with_nothing_selected() {
        let inbox = Inbox::new();
        assert!(inbox.is_loading());
        assert!(inbox.tickets().is_empty());
        assert!(inbox.active().is_none());
    }

    #[test]
    fn load_replaces_collection_without_selecting() {
        let inbox = loaded(vec![ticket("1", "open"), ticket("2", "pending")]);
        assert!(!inbox.is_loading());
        assert_eq!(inbox.tickets(), &[ticket("1", "open"), ticket("2", "pending")]);
        assert!(inbox.active().is_none());
    }

    #[test]
    fn failed_load_clears_loading_and_keeps_empty_list() {
        let mut inbox = Inbox::new();
        let req = inbox.load_tickets();
        let err = ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(inbox.apply(complete(req, Completion::Loaded(Err(err)))));
        assert!(!inbox.is_loading());
        assert!(inbox.tickets().is_empty());
    }

    #[test]
    fn select_unknown_id_keeps_selection() {
        let mut inbox = loaded(vec![ticket("1", "open")]);
        assert!(!inbox.select("9"));
        assert!(inbox.active().is_none());
        assert!(inbox.select("1"));
        assert!(!inbox.select("9"));
        assert_eq!(inbox.active().map(|t| t.id.as_str()), Some("1"));
    }

    #[test]
    fn operations_without_active_ticket_are_noops() {
        let mut inbox = loaded(vec![ticket("1", "open")]);
        assert!(inbox.send_message("hi", MessageKind::Text).is_none());
        assert!(inbox.change_status("closed").is_none());
        inbox.update_contact(contact("x"));
        assert_eq!(inbox.tickets(), &[ticket("1", "open")]);
        assert!(inbox.active().is_none());
    }

    #[test]
    fn sent_message_appends_to_active_only() {
        let mut inbox = loaded(vec![ticket("1", "open")]);
        inbox.select("1");
        inbox.apply(Scoped { generation: 0, value: Completion::MessageSent(Ok(message("m0", "earlier"))) });

        let req = inbox.send_message("hello", MessageKind::Text).unwrap();
        assert_eq!(
            req.value,
            Request::SendMessage(NewMessage {
                ticket_id: "1".into(),
                message: "hello".into(),
                kind: MessageKind::Text,
            })
        );
        inbox.apply(complete(req, Completion::MessageSent(Ok(message("m1", "hello")))));

        let active = inbox.active().unwrap();
        assert_eq!(active.messages, vec![message("m0", "earlier"), message("m1", "hello")]);
        assert!(inbox.tickets()[0].messages.is_empty());
    }

    #[test]
    fn failed_send_leaves_state_unchanged() {
        let mut inbox = loaded(vec![ticket("1", "open")]);
        inbox.select("1");
        let req = inbox.send_message("hello", MessageKind::Image).unwrap();
        let err = ApiError::Status(reqwest::StatusCode::BAD_GATEWAY);
        inbox.apply(complete(req, Completion::MessageSent(Err(err))));
        assert_eq!(inbox.active(), Some(&ticket("1", "open")));
    }

    #[test]
    fn status_update_replaces_active_and_matching_entry() {
        let mut inbox = loaded(vec![ticket("1", "open"), ticket("2", "open")]);
        inbox.select("1");
        let req = inbox.change_status("closed").unwrap();
        assert_eq!(req.value, Request::UpdateStatus { ticket_id: "1".into(), status: "closed".into() });

        let mut updated = ticket("1", "closed");
        updated.tags.push(Tag { id: "t1".into(), name: "resolved".into() });
        inbox.apply(complete(req, Completion::TicketUpdated(Ok(updated.clone()))));

        assert_eq!(inbox.active(), Some(&updated));
        assert_eq!(inbox.tickets()[0], updated);
        assert_eq!(inbox.tickets()[1], ticket("2", "open"));
    }

    #[test]
    fn failed_status_update_leaves_state_unchanged() {
        let mut inbox = loaded(vec![ticket("1", "open")]);
        inbox.select("1");
        let req = inbox.change_status("closed").unwrap();
        let err = ApiError::Status(reqwest::StatusCode::NOT_FOUND);
        inbox.apply(complete(req, Completion::TicketUpdated(Err(err))));
        assert_eq!(inbox.active().unwrap().status, "open");
        assert_eq!(inbox.tickets()[0].status, "open");
    }

    #[test]
    fn contact_update_touches_only_contact() {
        let mut inbox = loaded(vec![ticket("1", "open"), ticket("2", "open")]);
        inbox.select("2");
        inbox.apply(Scoped { generation: 0, value: Completion::MessageSent(Ok(message("m1", "hi"))) });

        let mut edited = contact("2");
        edited.email = Some("ana@example.com".into());
        edited.tags.push(Tag { id: "t9".into(), name: "vip".into() });
        inbox.update_contact(edited.clone());

        let active = inbox.active().unwrap();
        assert_eq!(active.contact, edited);
        assert_eq!(active.messages.len(), 1);
        assert_eq!(active.status, "open");
        assert_eq!(inbox.tickets()[1].contact, edited);
        assert_eq!(inbox.tickets()[0], ticket("1", "open"));
    }

    #[test]
    fn saved_contact_merges_into_ticket_it_was_saved_for() {
        let mut inbox = loaded(vec![ticket("1", "open"), ticket("2", "open")]);
        inbox.select("1");
        let mut edited = contact("1");
        edited.notes = Some("call after 6pm".into());
        let req = inbox.save_contact(edited.clone()).unwrap();
        assert_eq!(req.value, Request::SaveContact { ticket_id: "1".into(), contact: edited.clone() });

        inbox.apply(complete(req, Completion::ContactSaved { ticket_id: "1".into(), result: Ok(edited.clone()) }));
        assert_eq!(inbox.active().unwrap().contact, edited);
        assert_eq!(inbox.tickets()[0].contact, edited);
    }

    #[test]
    fn saved_contact_is_dropped_after_selection_moves() {
        let mut inbox = loaded(vec![ticket("1", "open"), ticket("2", "open")]);
        inbox.select("1");
        let mut edited = contact("1");
        edited.name = Some("Renamed".into());
        let req = inbox.save_contact(edited.clone()).unwrap();
        inbox.select("2");

        inbox.apply(complete(req, Completion::ContactSaved { ticket_id: "1".into(), result: Ok(edited) }));
        assert_eq!(inbox.active(), Some(&ticket("2", "open")));
        assert_eq!(inbox.tickets(), &[ticket("1", "open"), ticket("2", "open")]);
    }

    #[test]
    fn save_contact_without_active_ticket_is_noop() {
        let inbox = loaded(vec![ticket("1", "open")]);
        assert!(inbox.save_contact(contact("1")).is_none());
    }

    #[test]
    fn reselecting_after_send_shows_list_copy() {
        let mut inbox = loaded(vec![ticket("1", "open"), ticket("2", "open")]);
        inbox.select("1");
        let req = inbox.send_message("hello", MessageKind::Text).unwrap();
        inbox.apply(complete(req, Completion::MessageSent(Ok(message("m1", "hello")))));
        assert_eq!(inbox.active().unwrap().messages.len(), 1);

        inbox.select("2");
        inbox.select("1");
        assert!(inbox.active().unwrap().messages.is_empty());
    }

    #[test]
    fn completions_from_closed_scope_are_discarded() {
        let mut inbox = Inbox::new();
        let req = inbox.load_tickets();
        inbox.close();
        assert!(!inbox.apply(complete(req, Completion::Loaded(Ok(vec![ticket("1", "open")])))));
        assert!(inbox.is_loading());
        assert!(inbox.tickets().is_empty());
    }
}
