pub mod instrument_reader;
