pub mod buffer;
pub mod event_handler;
pub mod events;
pub mod input_interface;
pub mod permissions;
