pub mod code_handlers;
