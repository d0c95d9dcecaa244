use gtk4::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use crate::api::models::{Message, MessageKind, MessageStatus, Ticket};

pub const STATUSES: [&str; 3] = ["open", "pending", "closed"];

pub struct ChatView {
    root: gtk::Box,
    title: gtk::Label,
    subtitle: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    kind: gtk::DropDown,
    send_btn: gtk::Button,
    status: gtk::DropDown,
    status_btn: gtk::Button,
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_hexpand(true);

        // Header: contact and ticket status
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let titles = gtk::Box::new(gtk::Orientation::Vertical, 2);
        titles.set_hexpand(true);
        let title = gtk::Label::new(Some("No ticket selected"));
        title.add_css_class("title-4");
        title.set_halign(gtk::Align::Start);
        let subtitle = gtk::Label::new(None);
        subtitle.add_css_class("dim-label");
        subtitle.set_halign(gtk::Align::Start);
        titles.append(&title);
        titles.append(&subtitle);
        header.append(&titles);

        let status = gtk::DropDown::from_strings(&STATUSES);
        let status_btn = gtk::Button::with_label("Apply");
        header.append(&status);
        header.append(&status_btn);
        root.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type a message…"));
        let kinds: Vec<&str> = MessageKind::ALL.iter().map(|k| k.as_str()).collect();
        let kind = gtk::DropDown::from_strings(&kinds);
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&kind);
        input_row.append(&send_btn);
        root.append(&input_row);

        let view = Self {
            root,
            title,
            subtitle,
            scroller,
            messages_box,
            entry,
            kind,
            send_btn,
            status,
            status_btn,
        };
        view.set_ticket(None);
        view
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_ticket(&self, ticket: Option<&Ticket>) {
        let selected = ticket.is_some();
        self.entry.set_sensitive(selected);
        self.kind.set_sensitive(selected);
        self.send_btn.set_sensitive(selected);
        self.status.set_sensitive(selected);
        self.status_btn.set_sensitive(selected);

        match ticket {
            Some(ticket) => {
                self.title.set_label(ticket.contact.display_name());
                self.subtitle.set_label(&format!("{} · {} priority", ticket.status, ticket.priority));
                self.status.set_selected(status_position(&ticket.status));
            }
            None => {
                self.status.set_selected(gtk::INVALID_LIST_POSITION);
                self.title.set_label("No ticket selected");
                self.subtitle.set_label("");
            }
        }
        self.set_messages(ticket.map(|t| t.messages.as_slice()).unwrap_or_default());
    }

    fn set_messages(&self, messages: &[Message]) {
        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        for message in messages {
            let lbl = gtk::Label::new(Some(&message_line(message)));
            lbl.set_wrap(true);
            lbl.set_selectable(true);
            lbl.set_halign(if message.status == MessageStatus::Received {
                gtk::Align::Start
            } else {
                gtk::Align::End
            });
            self.messages_box.append(&lbl);
        }
        let adj = self.scroller.vadjustment();
        adj.set_value(adj.upper());
    }

    /// `f` receives non-empty text and the selected content kind.
    pub fn connect_send<F: Fn(String, MessageKind) + 'static>(&self, f: F) {
        let entry_for_send = self.entry.clone();
        let kind = self.kind.clone();
        let send: Rc<dyn Fn()> = Rc::new(move || {
            let text = entry_for_send.text().to_string();
            if text.trim().is_empty() {
                return;
            }
            let kind = MessageKind::ALL
                .get(kind.selected() as usize)
                .copied()
                .unwrap_or_default();
            entry_for_send.set_text("");
            f(text, kind);
        });
        {
            let send = send.clone();
            self.send_btn.connect_clicked(move |_| (send)());
        }
        self.entry.connect_activate(move |_| (send)());
    }

    pub fn connect_status_change<F: Fn(String) + 'static>(&self, f: F) {
        let status = self.status.clone();
        self.status_btn.connect_clicked(move |_| {
            if let Some(value) = selected_status(status.selected()) {
                f(value.to_string());
            }
        });
    }
}

/// Dropdown position for `status`; statuses outside [`STATUSES`] leave the
/// dropdown without a selection.
fn status_position(status: &str) -> u32 {
    STATUSES
        .iter()
        .position(|s| *s == status)
        .map_or(gtk::INVALID_LIST_POSITION, |pos| pos as u32)
}

fn selected_status(position: u32) -> Option<&'static str> {
    if position == gtk::INVALID_LIST_POSITION {
        return None;
    }
    STATUSES.get(position as usize).copied()
}

fn message_line(message: &Message) -> String {
    let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
    match message.kind {
        MessageKind::Text => format!("{} {}: {}", time, message.sender, message.content),
        kind => format!("{} {}: [{}] {}", time, message.sender, kind.as_str(), message.content),
    }
}
