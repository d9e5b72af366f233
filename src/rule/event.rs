//! Rule change notifications delivered by the surrounding system.

use serde::{Deserialize, Serialize};

/// Runtime change to apply to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuleChangedEvent {
    /// A physical data source was disabled (unhealthy) or re-enabled
    DataSourceDisabled {
        data_source_name: String,
        disabled: bool,
    },
}

impl RuleChangedEvent {
    /// Data source disabled event
    pub fn disabled(data_source_name: impl Into<String>) -> Self {
        RuleChangedEvent::DataSourceDisabled {
            data_source_name: data_source_name.into(),
            disabled: true,
        }
    }

    /// Data source re-enabled event
    pub fn enabled(data_source_name: impl Into<String>) -> Self {
        RuleChangedEvent::DataSourceDisabled {
            data_source_name: data_source_name.into(),
            disabled: false,
        }
    }
}
