use adw::prelude::*;
use adw::Application;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::inbox::{Inbox, Request, Scoped};
use crate::ui::chat_view::ChatView;
use crate::ui::contact_panel::ContactPanel;
use crate::ui::ticket_list::TicketList;

/// Owns the inbox state and the three panes that display it.
struct Page {
    inbox: RefCell<Inbox>,
    client: ApiClient,
    tickets: TicketList,
    chat: ChatView,
    contact: Rc<ContactPanel>,
}

impl Page {
    fn render(&self) {
        let inbox = self.inbox.borrow();
        let active = inbox.active();
        self.tickets.set_loading(inbox.is_loading());
        self.tickets.set_items(inbox.tickets(), active.map(|t| t.id.as_str()));
        self.chat.set_ticket(active);
        self.contact.set_contact(active.map(|t| &t.contact));
    }

    fn dispatch(self: &Rc<Self>, request: Scoped<Request>) {
        let client = self.client.clone();
        let page = self.clone();
        crate::utils::run_async_to_main(async move { request.send(&client).await }, move |done| {
            let applied = page.inbox.borrow_mut().apply(done);
            if applied {
                page.render();
            }
        });
    }
}

fn with_page(page: &Weak<Page>, f: impl FnOnce(&Rc<Page>)) {
    if let Some(page) = page.upgrade() {
        f(&page);
    }
}

pub fn show_main_window(app: &Application, settings: &Settings) {
    let client = match ApiClient::new(&settings.base_url) {
        Ok(client) => client,
        Err(err) => {
            log::error!("cannot use server {:?}: {err}", settings.base_url);
            crate::ui::setup::show_setup_window(app);
            return;
        }
    };

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Support Inbox")
        .default_width(1280)
        .default_height(760)
        .build();

    let page = Rc::new(Page {
        inbox: RefCell::new(Inbox::new()),
        client,
        tickets: TicketList::new(),
        chat: ChatView::new(),
        contact: Rc::new(ContactPanel::new()),
    });

    let columns = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    columns.set_vexpand(true);
    columns.append(&page.tickets.widget());
    columns.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    columns.append(&page.chat.widget());
    columns.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    columns.append(&page.contact.widget());

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some("Support Inbox"));
    header.set_title_widget(Some(&title));
    container.append(&header);
    container.append(&columns);
    window.set_content(Some(&container));

    let weak = Rc::downgrade(&page);
    page.tickets.connect_selected({
        let weak = weak.clone();
        move |id| {
            with_page(&weak, |page| {
                if page.inbox.borrow_mut().select(id) {
                    page.render();
                }
            })
        }
    });
    page.chat.connect_send({
        let weak = weak.clone();
        move |text, kind| {
            with_page(&weak, |page| {
                let request = page.inbox.borrow().send_message(&text, kind);
                if let Some(request) = request {
                    page.dispatch(request);
                }
            })
        }
    });
    page.chat.connect_status_change({
        let weak = weak.clone();
        move |status| {
            with_page(&weak, |page| {
                let request = page.inbox.borrow().change_status(&status);
                if let Some(request) = request {
                    page.dispatch(request);
                }
            })
        }
    });
    page.contact.connect_save({
        let weak = weak.clone();
        move |contact| {
            with_page(&weak, |page| {
                let request = page.inbox.borrow().save_contact(contact);
                if let Some(request) = request {
                    page.dispatch(request);
                }
            })
        }
    });

    // Results of requests still in flight when the window goes away are dropped.
    {
        let page = page.clone();
        window.connect_destroy(move |_| page.inbox.borrow_mut().close());
    }

    page.render();
    let request = page.inbox.borrow().load_tickets();
    page.dispatch(request);

    window.present();
}
