use adw::Application;

use crate::config::Settings;

pub const APP_ID: &str = "com.example.HelpdeskGtk";

/// Opens the inbox when a server is configured, the setup window otherwise.
pub fn build_ui(app: &Application) {
    let settings = Settings::load();
    if settings.is_configured() {
        crate::ui::main_window::show_main_window(app, &settings);
    } else {
        crate::ui::setup::show_setup_window(app);
    }
}
