//! Resolution context
//!
//! Bundles the read-only policy and the collaborators every entry point
//! needs. Build one per process (or per request); it holds only shared
//! references, so it can be used from several threads at once.

use webplay_common::TranscodePolicy;

use crate::capability::{DeliveryCapabilities, TranscodeSettingsProvider, TranscodeTable};
use crate::lookup::MediaStore;
use crate::url::{StreamUrlParser, UrlParser};

#[derive(Clone, Copy)]
pub struct PlaybackContext<'a> {
    pub policy: &'a TranscodePolicy,
    pub parser: &'a dyn UrlParser,
    pub store: &'a dyn MediaStore,
    pub capabilities: &'a dyn DeliveryCapabilities,
    pub transcoder: &'a dyn TranscodeSettingsProvider,
}

impl<'a> PlaybackContext<'a> {
    /// Context using the stream URL parser and a config-backed transcode table
    pub fn new(
        policy: &'a TranscodePolicy,
        store: &'a dyn MediaStore,
        table: &'a TranscodeTable,
    ) -> Self {
        Self {
            policy,
            parser: &StreamUrlParser,
            store,
            capabilities: table,
            transcoder: table,
        }
    }

    pub fn with_parser(mut self, parser: &'a dyn UrlParser) -> Self {
        self.parser = parser;
        self
    }
}
