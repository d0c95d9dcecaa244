use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::models::Ticket;

pub struct TicketList {
    root: gtk::Box,
    list: gtk::ListBox,
    spinner: gtk::Spinner,
    ids: Rc<RefCell<Vec<String>>>,
    // Set while rows are rebuilt so programmatic selection is not reported.
    rendering: Rc<Cell<bool>>,
}

impl TicketList {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(280);

        let heading = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let title = gtk::Label::new(Some("Tickets"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        title.set_hexpand(true);
        let spinner = gtk::Spinner::new();
        heading.append(&title);
        heading.append(&spinner);
        root.append(&heading);

        let list = gtk::ListBox::new();
        list.set_selection_mode(gtk::SelectionMode::Single);
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&list)
            .build();
        root.append(&scroller);

        Self {
            root,
            list,
            spinner,
            ids: Rc::new(RefCell::new(Vec::new())),
            rendering: Rc::new(Cell::new(false)),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_loading(&self, loading: bool) {
        self.spinner.set_spinning(loading);
        self.spinner.set_visible(loading);
    }

    pub fn set_items(&self, tickets: &[Ticket], active: Option<&str>) {
        self.rendering.set(true);
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        let mut ids = self.ids.borrow_mut();
        ids.clear();
        for ticket in tickets {
            let row = gtk::ListBoxRow::new();
            row.set_child(Some(&Self::row_content(ticket)));
            self.list.append(&row);
            if active == Some(ticket.id.as_str()) {
                self.list.select_row(Some(&row));
            }
            ids.push(ticket.id.clone());
        }
        self.rendering.set(false);
    }

    fn row_content(ticket: &Ticket) -> gtk::Box {
        let content = gtk::Box::new(gtk::Orientation::Vertical, 2);
        content.set_margin_top(8);
        content.set_margin_bottom(8);
        content.set_margin_start(8);
        content.set_margin_end(8);

        let name = gtk::Label::new(Some(ticket.contact.display_name()));
        name.set_halign(gtk::Align::Start);
        name.set_ellipsize(gtk::pango::EllipsizeMode::End);
        content.append(&name);

        let meta = gtk::Label::new(Some(&format!("{} · {}", ticket.status, ticket.priority)));
        meta.add_css_class("dim-label");
        meta.add_css_class("caption");
        meta.set_halign(gtk::Align::Start);
        content.append(&meta);
        content
    }

    /// `f` receives the id of the ticket the user picked.
    pub fn connect_selected<F: Fn(&str) + 'static>(&self, f: F) {
        let ids = self.ids.clone();
        let rendering = self.rendering.clone();
        self.list.connect_row_selected(move |_, row| {
            if rendering.get() {
                return;
            }
            let Some(row) = row else { return };
            let id = usize::try_from(row.index())
                .ok()
                .and_then(|idx| ids.borrow().get(idx).cloned());
            if let Some(id) = id {
                f(&id);
            }
        });
    }
}
