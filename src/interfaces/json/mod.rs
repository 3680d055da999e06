pub mod event_writer;
pub mod request_reader;
