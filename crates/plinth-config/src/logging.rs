//! Output formats for the `plinth::compose` and `plinth::server` events.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `plinth::telemetry` renders events on stderr.
///
/// Parsed from `--log-format` or `PLINTH_LOG_FORMAT`, ignoring ASCII case.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with event fields flattened to the top
    /// level.
    #[default]
    Json,
    /// Single-line text with target and level, for reading at a terminal.
    Compact,
}
