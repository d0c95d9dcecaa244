use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::models::Contact;

pub struct ContactPanel {
    root: gtk::Box,
    name: gtk::Entry,
    phone: gtk::Entry,
    email: gtk::Entry,
    address: gtk::Entry,
    notes: gtk::Entry,
    tags: gtk::Label,
    save_btn: gtk::Button,
    current: Rc<RefCell<Option<Contact>>>,
}

/// Raw field values as typed in the panel.
#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Applies edited fields to `contact`; blank optional fields become `None`.
/// A blank phone keeps the previous one since the server requires it.
pub fn edited_contact(contact: &Contact, fields: &ContactFields) -> Contact {
    Contact {
        name: optional(&fields.name),
        phone: optional(&fields.phone).unwrap_or_else(|| contact.phone.clone()),
        email: optional(&fields.email),
        address: optional(&fields.address),
        notes: optional(&fields.notes),
        ..contact.clone()
    }
}

impl ContactPanel {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(280);

        let title = gtk::Label::new(Some("Contact"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let field = |placeholder: &str| {
            let entry = gtk::Entry::new();
            entry.set_placeholder_text(Some(placeholder));
            entry.set_hexpand(true);
            root.append(&entry);
            entry
        };
        let name = field("Name");
        let phone = field("Phone");
        let email = field("Email");
        let address = field("Address");
        let notes = field("Notes");

        let tags = gtk::Label::new(None);
        tags.add_css_class("dim-label");
        tags.set_halign(gtk::Align::Start);
        tags.set_wrap(true);
        root.append(&tags);

        let save_btn = gtk::Button::with_label("Save");
        save_btn.add_css_class("suggested-action");
        save_btn.set_halign(gtk::Align::End);
        root.append(&save_btn);

        let panel = Self {
            root,
            name,
            phone,
            email,
            address,
            notes,
            tags,
            save_btn,
            current: Rc::new(RefCell::new(None)),
        };
        panel.set_contact(None);
        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Refills the form only when the contact changed, so re-renders do not
    /// wipe edits in progress.
    pub fn set_contact(&self, contact: Option<&Contact>) {
        if self.current.borrow().as_ref() == contact && contact.is_some() {
            return;
        }
        let empty = String::new();
        let text = |value: Option<&String>| value.unwrap_or(&empty).clone();
        self.name.set_text(&text(contact.and_then(|c| c.name.as_ref())));
        self.phone.set_text(&text(contact.map(|c| &c.phone)));
        self.email.set_text(&text(contact.and_then(|c| c.email.as_ref())));
        self.address.set_text(&text(contact.and_then(|c| c.address.as_ref())));
        self.notes.set_text(&text(contact.and_then(|c| c.notes.as_ref())));
        let tags: Vec<&str> = contact
            .map(|c| c.tags.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default();
        self.tags.set_label(&if tags.is_empty() { String::new() } else { format!("Tags: {}", tags.join(", ")) });

        for entry in [&self.name, &self.phone, &self.email, &self.address, &self.notes] {
            entry.set_sensitive(contact.is_some());
        }
        self.save_btn.set_sensitive(contact.is_some());
        *self.current.borrow_mut() = contact.cloned();
    }

    fn fields(&self) -> ContactFields {
        ContactFields {
            name: self.name.text().to_string(),
            phone: self.phone.text().to_string(),
            email: self.email.text().to_string(),
            address: self.address.text().to_string(),
            notes: self.notes.text().to_string(),
        }
    }

    /// `on_save` gets the edited contact when Save is pressed.
    pub fn connect_save<F: Fn(Contact) + 'static>(self: &Rc<Self>, on_save: F) {
        let panel = Rc::downgrade(self);
        self.save_btn.connect_clicked(move |_| {
            let Some(panel) = panel.upgrade() else { return };
            let edited = panel.current.borrow().as_ref().map(|c| edited_contact(c, &panel.fields()));
            if let Some(contact) = edited {
                on_save(contact);
            }
        });
    }
}
