use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiEndpoint {
    pub endpoint: String,
    pub credential: String,
    pub model: String,
}

/// AI availability, decided once when the configuration is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AiSettings {
    #[default]
    Unconfigured,
    Configured(AiEndpoint),
}

impl AiSettings {
    /// Every part must be present and non-blank, otherwise the result is
    /// `Unconfigured`.
    pub fn from_parts(
        endpoint: Option<&str>,
        credential: Option<&str>,
        model: Option<&str>,
    ) -> Self {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match (present(endpoint), present(credential), present(model)) {
            (Some(endpoint), Some(credential), Some(model)) => {
                AiSettings::Configured(AiEndpoint {
                    endpoint,
                    credential,
                    model,
                })
            }
            _ => AiSettings::Unconfigured,
        }
    }

    pub fn endpoint(&self) -> Option<&AiEndpoint> {
        match self {
            AiSettings::Configured(endpoint) => Some(endpoint),
            AiSettings::Unconfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint().is_some()
    }
}
