use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;
use std::rc::Rc;

use crate::api::ApiClient;
use crate::config::Settings;

pub fn show_setup_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Support Inbox Setup")
        .default_width(420)
        .default_height(220)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    // Root container
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Connect to your helpdesk server"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let server_entry = gtk::Entry::new();
    server_entry.set_placeholder_text(Some("Server URL (e.g. https://desk.example.com)"));
    server_entry.set_hexpand(true);
    server_entry.set_text(&Settings::load().base_url);
    root.append(&server_entry);

    let connect_btn = gtk::Button::with_label("Connect");
    connect_btn.add_css_class("suggested-action");
    connect_btn.set_halign(gtk::Align::End);
    root.append(&connect_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let header_title = gtk::Label::new(Some("Support Inbox"));
    header.set_title_widget(Some(&header_title));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let on_connect = {
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let server_entry = server_entry.clone();
        move || {
            let url = crate::utils::normalize_url(&server_entry.text());
            if url.is_empty() {
                overlay.add_toast(adw::Toast::new("Please enter the server URL."));
                return;
            }
            if let Err(err) = ApiClient::new(&url) {
                overlay.add_toast(adw::Toast::new(&format!("Invalid server URL: {}", err)));
                return;
            }

            let mut settings = Settings::load();
            settings.base_url = url;
            if let Err(err) = settings.save() {
                log::error!("failed to save settings: {err}");
                overlay.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", err)));
                return;
            }
            log::info!("using server {}", settings.base_url);
            crate::ui::main_window::show_main_window(&app, &settings);
            window.close();
        }
    };

    let on_connect: Rc<dyn Fn()> = Rc::new(on_connect);
    {
        let on_connect = on_connect.clone();
        connect_btn.connect_clicked(move |_| (on_connect)());
    }
    server_entry.connect_activate(move |_| (on_connect)());

    window.present();
}
