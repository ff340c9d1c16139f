//! Curated RSS 2.0 output of the relevant advisories seen in a run.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::config::FeedConfig;
use crate::models::advisory::Advisory;
use crate::persistence::write_atomic;
use crate::Result;

/// Relevant advisories collected for the curated feed, in input order.
pub struct CuratedFeed<'a> {
    config: &'a FeedConfig,
    items: Vec<&'a Advisory>,
}

impl<'a> CuratedFeed<'a> {
    /// Start an empty feed described by `config`.
    #[must_use]
    pub fn new(config: &'a FeedConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
        }
    }

    /// Append an advisory as an `<item>`.
    pub fn push(&mut self, advisory: &'a Advisory) {
        self.items.push(advisory);
    }

    /// Number of collected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize the feed as a UTF-8 RSS 2.0 document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if serialization fails.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("rss")
            .with_attribute(("version", "2.0"))
            .write_inner_content(|w| {
                w.create_element("channel").write_inner_content(|w| {
                    text_element(w, "title", &self.config.curated_title)?;
                    text_element(w, "link", &self.config.source_url)?;
                    text_element(w, "description", &self.config.curated_description)?;
                    for advisory in &self.items {
                        w.create_element("item").write_inner_content(|w| {
                            text_element(w, "title", &advisory.title)?;
                            text_element(w, "link", &advisory.link)?;
                            text_element(w, "description", &advisory.description)?;
                            text_element(w, "pubDate", &advisory.published)
                        })?;
                    }
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(writer.into_inner())
    }

    /// Replace the file at `curated_feed_path` with the serialized feed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if serialization or the write fails.
    pub fn write(&self) -> Result<()> {
        let body = self.to_xml()?;
        write_atomic(&self.config.curated_feed_path, &body)?;
        info!(
            path = %self.config.curated_feed_path.display(),
            items = self.items.len(),
            "curated feed written"
        );
        Ok(())
    }
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> std::io::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}
