use std::fmt;
use std::str::FromStr;

use crate::errors::{ReplyError, UsageProblem};
use crate::platform::PlatformVariant;

/// Reply voice requested from the generation service.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Tone {
    Value,
    Funny,
}

impl Tone {
    /// Tone used when the store holds no preference.
    pub fn default_for(platform: PlatformVariant) -> Self {
        match platform {
            PlatformVariant::Microblog => Tone::Funny,
            PlatformVariant::ProfessionalFeed | PlatformVariant::Unknown => Tone::Value,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Value => "value",
            Tone::Funny => "funny",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "value" => Ok(Tone::Value),
            "funny" => Ok(Tone::Funny),
            other => Err(format!("unknown tone '{other}'")),
        }
    }
}

/// Lifecycle of a single control. `Idle` is both the initial state and the
/// end of every cycle.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ControlState {
    Idle,
    Generating,
    Success,
    Error,
}

impl ControlState {
    /// Legal edges of the per-control state machine.
    pub fn can_transition_to(self, next: ControlState) -> bool {
        matches!(
            (self, next),
            (ControlState::Idle, ControlState::Generating)
                | (ControlState::Generating, ControlState::Success)
                | (ControlState::Generating, ControlState::Error)
                | (ControlState::Success, ControlState::Idle)
                | (ControlState::Error, ControlState::Idle)
        )
    }

    /// Whether the control accepts a new activation in this state.
    pub fn accepts_activation(self) -> bool {
        matches!(self, ControlState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Generating => "generating",
            ControlState::Success => "success",
            ControlState::Error => "error",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated input for one generation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub tone: Tone,
    pub include_emojis: bool,
    pub platform: PlatformVariant,
}

impl GenerationRequest {
    /// Builds a request, trimming the text. Blank text is a usage error.
    pub fn new(
        text: &str,
        tone: Tone,
        include_emojis: bool,
        platform: PlatformVariant,
    ) -> Result<Self, ReplyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReplyError::Usage(UsageProblem::NoText));
        }
        Ok(Self {
            text: text.to_string(),
            tone,
            include_emojis,
            platform,
        })
    }
}

/// Quota counters reported alongside a reply.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    #[cfg_attr(feature = "serde-full", serde(default, alias = "dailyUsed"))]
    pub daily_used: Option<u32>,
    #[cfg_attr(feature = "serde-full", serde(default, alias = "dailyGoal"))]
    pub daily_goal: Option<u32>,
    #[cfg_attr(feature = "serde-full", serde(default, alias = "weeklyUsed"))]
    pub weekly_used: Option<u32>,
    #[cfg_attr(feature = "serde-full", serde(default, alias = "weeklyGoal"))]
    pub weekly_goal: Option<u32>,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(used: Option<u32>, goal: Option<u32>) -> String {
            match (used, goal) {
                (Some(used), Some(goal)) => format!("{used}/{goal}"),
                (Some(used), None) => used.to_string(),
                _ => "-".to_string(),
            }
        }
        write!(
            f,
            "daily {} weekly {}",
            part(self.daily_used, self.daily_goal),
            part(self.weekly_used, self.weekly_goal)
        )
    }
}

/// Successful generation payload.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
    pub reply: String,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub usage: Option<Usage>,
}
