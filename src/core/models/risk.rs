use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::models::common::{AuditStamp, Entity, EntityKind, Level, new_id};
use crate::core::models::project_data::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum RiskStatus {
    Open,
    Mitigated,
    Closed,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Exposure score at or above which a risk counts as high exposure.
pub const HIGH_EXPOSURE_SCORE: u8 = 6;

/// A project risk rated by probability and impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub description: String,
    pub probability: Level,
    pub impact: Level,
    pub status: RiskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl Risk {
    pub fn new(description: impl Into<String>, probability: Level, impact: Level) -> Self {
        Self {
            id: new_id(),
            description: description.into(),
            probability,
            impact,
            status: RiskStatus::Open,
            mitigation: None,
            stamp: AuditStamp::default(),
        }
    }

    /// Probability weight times impact weight, in `1..=9`.
    pub fn score(&self) -> u8 {
        self.probability.weight() * self.impact.weight()
    }

    pub fn is_high_exposure(&self) -> bool {
        self.score() >= HIGH_EXPOSURE_SCORE
    }
}

impl Entity for Risk {
    const KIND: EntityKind = EntityKind::Risk;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.description
    }

    fn stamp(&self) -> &AuditStamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut AuditStamp {
        &mut self.stamp
    }

    fn collection(project: &ProjectData) -> &Vec<Self> {
        &project.risks
    }

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.risks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_multiplies_weights() {
        let risk = Risk::new("outage", Level::High, Level::Medium);
        assert_eq!(risk.score(), 6);
        assert!(risk.is_high_exposure());

        let minor = Risk::new("typo", Level::Low, Level::Medium);
        assert_eq!(minor.score(), 2);
        assert!(!minor.is_high_exposure());
    }
}
