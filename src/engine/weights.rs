use serde::{Deserialize, Serialize};

use crate::registry::ImpactType;

/// Multiplier applied to a permission's base points according to the kind
/// of risk it carries. Fields missing from config keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeWeights {
    pub data_access: f64,
    pub code_injection: f64,
    pub network_control: f64,
    pub system_interaction: f64,
    pub account_access: f64,
    pub privacy_sensitive: f64,
    pub browser_control: f64,
    pub ui_interaction: f64,
    pub data_transfer: f64,
    pub development_tools: f64,
    pub security_feature: f64,
    pub unknown: f64,
    pub functionality: f64,
}

impl TypeWeights {
    pub fn get(&self, impact: ImpactType) -> f64 {
        match impact {
            ImpactType::DataAccess => self.data_access,
            ImpactType::CodeInjection => self.code_injection,
            ImpactType::NetworkControl => self.network_control,
            ImpactType::SystemInteraction => self.system_interaction,
            ImpactType::AccountAccess => self.account_access,
            ImpactType::PrivacySensitive => self.privacy_sensitive,
            ImpactType::BrowserControl => self.browser_control,
            ImpactType::UiInteraction => self.ui_interaction,
            ImpactType::DataTransfer => self.data_transfer,
            ImpactType::DevelopmentTools => self.development_tools,
            ImpactType::SecurityFeature => self.security_feature,
            ImpactType::Unknown => self.unknown,
            ImpactType::Functionality => self.functionality,
        }
    }
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            data_access: 1.2,
            code_injection: 1.5,
            network_control: 1.4,
            system_interaction: 1.6,
            account_access: 1.3,
            privacy_sensitive: 1.3,
            browser_control: 1.1,
            ui_interaction: 0.7,
            data_transfer: 1.0,
            development_tools: 1.5,
            security_feature: 0.8,
            unknown: 1.0,
            functionality: 0.5,
        }
    }
}
