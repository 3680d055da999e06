use crate::domain::event::MerchantEvent;
use crate::error::Result;
use std::io::Write;

/// Writes merchant events as JSON lines.
pub struct EventWriter<W: Write> {
    writer: W,
}

impl<W: Write> EventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_event(&mut self, event: &MerchantEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_events<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = MerchantEvent>,
    {
        for event in events {
            self.write_event(&event)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
