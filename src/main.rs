use adw::prelude::*;
use adw::Application;

use helpdesk_gtk::app::{build_ui, APP_ID};
use helpdesk_gtk::config::Settings;

static GLIB_LOGGER: glib::GlibLogger =
    glib::GlibLogger::new(glib::GlibLoggerFormat::Plain, glib::GlibLoggerDomain::CrateTarget);

fn main() -> glib::ExitCode {
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        log::set_max_level(Settings::load().level_filter());
    }

    let app = Application::builder()
        .application_id(APP_ID)
        .build();
    app.connect_activate(build_ui);
    app.run()
}
