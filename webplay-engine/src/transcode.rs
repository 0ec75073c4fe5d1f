//! Transcode policy evaluation
//!
//! Decides whether one media object must be transcoded for the web player
//! and, if so, to what. The decision runs in two ordered stages:
//!
//! 1. Check triggers, first match wins. Without a trigger the native
//!    format is delivered unchanged.
//! 2. Settings requests, first granted request wins. A forced (client
//!    requested) format is tried before the server default.
//!
//! A settings request can only be made when the mode permits transcoding
//! at all: `always`, or not `never` with `transcode` among the delivery
//! types. When no request is granted the real format is left as it was.

use tracing::debug;
use webplay_common::media::MediaReference;
use webplay_common::{TranscodeMode, TranscodePolicy};

use crate::capability::{DeliveryTypes, WEBPLAYER_CONTEXT};
use crate::context::PlaybackContext;
use crate::format::FormatPair;
use crate::url::UrlDescriptor;

/// Outcome of a transcode evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeDecision {
    pub will_transcode: bool,
    /// Format on the wire after the decision
    pub real: String,
}

/// Why a transcode check was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// Server transcodes everything
    AlwaysMode,
    /// Client asked for a specific format
    ForcedFormat,
    /// Native delivery is not allowed for this format
    NativeUnsupported,
    /// Real format already differs from native and flash cannot play it
    FormatMismatch,
}

/// Which settings the provider is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsRequest {
    Forced,
    Default,
}

/// Everything the rules look at
struct RuleInputs<'a> {
    policy: &'a TranscodePolicy,
    valid: DeliveryTypes,
    native_format: &'a str,
    current_real: &'a str,
    entity_type: &'a str,
    forced_format: &'a str,
}

type Rule = fn(&RuleInputs<'_>) -> bool;

const CHECK_RULES: &[(CheckTrigger, Rule)] = &[
    (CheckTrigger::AlwaysMode, |i| {
        i.policy.transcode_mode == TranscodeMode::Always
    }),
    (CheckTrigger::ForcedFormat, |i| !i.forced_format.is_empty()),
    (CheckTrigger::NativeUnsupported, |i| !i.valid.native),
    (CheckTrigger::FormatMismatch, |i| {
        i.current_real != i.native_format
            && (!i.policy.webplayer_flash_enabled || i.entity_type != "song")
    }),
];

const SETTINGS_RULES: &[(SettingsRequest, Rule)] = &[
    (SettingsRequest::Forced, |i| {
        !i.forced_format.is_empty() && i.policy.transcode_player_customize
    }),
    (SettingsRequest::Default, |i| {
        i.policy.transcode_mode == TranscodeMode::Always || !i.valid.native
    }),
];

/// First check trigger that applies, if any
fn check_trigger(inputs: &RuleInputs) -> Option<CheckTrigger> {
    CHECK_RULES
        .iter()
        .find(|(_, rule)| rule(inputs))
        .map(|(trigger, _)| *trigger)
}

/// The mode gate in front of all settings requests
fn transcoding_permitted(inputs: &RuleInputs) -> bool {
    match inputs.policy.transcode_mode {
        TranscodeMode::Always => true,
        TranscodeMode::Never => false,
        TranscodeMode::Default => inputs.valid.transcode,
    }
}

/// Evaluate the transcode policy for one media object
pub fn decide(
    ctx: &PlaybackContext,
    media: &MediaReference,
    native_format: &str,
    current: &FormatPair,
    descriptor: &UrlDescriptor,
    forced_format: &str,
) -> TranscodeDecision {
    let inputs = RuleInputs {
        policy: ctx.policy,
        valid: ctx
            .capabilities
            .supported_delivery_types(native_format, WEBPLAYER_CONTEXT),
        native_format,
        current_real: &current.real,
        entity_type: &descriptor.entity_type,
        forced_format,
    };
    let unchanged = TranscodeDecision {
        will_transcode: false,
        real: current.real.clone(),
    };

    let Some(trigger) = check_trigger(&inputs) else {
        return unchanged;
    };

    if !transcoding_permitted(&inputs) {
        debug!(
            "Transcode check for {} {} ({:?}) not permitted in {} mode",
            media.kind, media.id, trigger, inputs.policy.transcode_mode
        );
        return unchanged;
    }

    for (request, rule) in SETTINGS_RULES {
        if !rule(&inputs) {
            continue;
        }

        let requested = match request {
            SettingsRequest::Forced => {
                debug!("Forcing type to {{{}}}", forced_format);
                Some(forced_format)
            }
            SettingsRequest::Default => None,
        };

        if let Some(settings) = ctx
            .transcoder
            .transcode_settings(media, requested, WEBPLAYER_CONTEXT)
        {
            debug!(
                "Transcoding {} {} from {} to {} ({:?})",
                media.kind, media.id, native_format, settings.format, trigger
            );
            return TranscodeDecision {
                will_transcode: true,
                real: settings.format,
            };
        }
    }

    unchanged
}
