pub mod chat_view;
pub mod contact_panel;
pub mod main_window;
pub mod setup;
pub mod ticket_list;
