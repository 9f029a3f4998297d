//! Presets: named, ordered pipelines of transform actions.
//!
//! Actions are written the way site settings have always spelled them:
//!
//! ```toml
//! [[presets]]
//! name = "thumb_greyscale"
//! actions = [
//!     { type = "fit", width = 100, height = 100, from = [0.5, 0.5] },
//!     { type = "greyscale" },
//! ]
//! ```
//!
//! Any other `type` parses to [`Action::Unknown`] so the
//! [`UnknownActionPolicy`] decides its fate instead of the parser.
//!
//! Stored presets are never modified. Defaults such as the centered fit
//! anchor are resolved into fresh [`Step`] values by [`Action::resolve`].

use crate::imaging::{Anchor, Step};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named pipeline of actions, applied in listed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    /// Output subfolder and key into each photo's result set.
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// One transform step as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub enum Action {
    /// Crop-and-scale to exactly `width × height`. `anchor` defaults to center.
    Fit {
        width: u32,
        height: u32,
        anchor: Option<Anchor>,
    },
    /// Shrink to fit within `width × height`, preserving aspect ratio.
    Resize { width: u32, height: u32 },
    /// Convert to single-channel luminance.
    Greyscale,
    /// An action type this crate does not implement.
    Unknown(String),
}

/// Flat wire form shared by every action type.
#[derive(Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(default, rename = "from", skip_serializing_if = "Option::is_none")]
    anchor: Option<Anchor>,
}

impl TryFrom<RawAction> for Action {
    type Error = String;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let dims = |raw: &RawAction| match (raw.width, raw.height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(format!(
                "action `{}` requires both `width` and `height`",
                raw.kind
            )),
        };

        match raw.kind.as_str() {
            "fit" => {
                let (width, height) = dims(&raw)?;
                Ok(Action::Fit {
                    width,
                    height,
                    anchor: raw.anchor,
                })
            }
            // `from` has no meaning for a resize; tolerated and dropped
            "resize" => {
                let (width, height) = dims(&raw)?;
                Ok(Action::Resize { width, height })
            }
            "greyscale" | "grayscale" => Ok(Action::Greyscale),
            _ => Ok(Action::Unknown(raw.kind)),
        }
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        let raw = |kind: &str| RawAction {
            kind: kind.to_string(),
            width: None,
            height: None,
            anchor: None,
        };
        match action {
            Action::Fit {
                width,
                height,
                anchor,
            } => RawAction {
                width: Some(width),
                height: Some(height),
                anchor,
                ..raw("fit")
            },
            Action::Resize { width, height } => RawAction {
                width: Some(width),
                height: Some(height),
                ..raw("resize")
            },
            Action::Greyscale => raw("greyscale"),
            Action::Unknown(kind) => raw(&kind),
        }
    }
}

impl Action {
    pub fn fit(width: u32, height: u32) -> Self {
        Action::Fit {
            width,
            height,
            anchor: None,
        }
    }

    /// The action's `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Action::Fit { .. } => "fit",
            Action::Resize { .. } => "resize",
            Action::Greyscale => "greyscale",
            Action::Unknown(kind) => kind,
        }
    }

    /// Resolve defaults into an executable step. `None` for unknown actions.
    pub fn resolve(&self) -> Option<Step> {
        match *self {
            Action::Fit {
                width,
                height,
                anchor,
            } => Some(Step::Fit {
                width,
                height,
                anchor: anchor.unwrap_or_default(),
            }),
            Action::Resize { width, height } => Some(Step::Resize { width, height }),
            Action::Greyscale => Some(Step::Greyscale),
            Action::Unknown(_) => None,
        }
    }
}

/// What to do with an action type this crate does not implement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownActionPolicy {
    /// Fail the (file, preset) unit with [`UnknownAction`].
    #[default]
    Reject,
    /// Skip the action with a warning, as older site setups expect.
    Ignore,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action `{kind}`")]
pub struct UnknownAction {
    pub kind: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// Resolve every action into steps, preserving order.
    pub fn plan(&self, policy: UnknownActionPolicy) -> Result<Vec<Step>, UnknownAction> {
        let mut steps = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            match action.resolve() {
                Some(step) => steps.push(step),
                None if policy == UnknownActionPolicy::Ignore => {
                    tracing::warn!(
                        preset = %self.name,
                        action = action.kind(),
                        "ignoring unknown action"
                    );
                }
                None => {
                    return Err(UnknownAction {
                        kind: action.kind().to_string(),
                    });
                }
            }
        }
        Ok(steps)
    }

    /// Kinds of any actions this crate cannot execute.
    pub fn unknown_kinds(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Unknown(_)))
            .map(Action::kind)
            .collect()
    }
}
