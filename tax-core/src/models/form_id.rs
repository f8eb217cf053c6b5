use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a form unit.
///
/// Declaration order is the registration order of the standard registry, which
/// the solver uses to break ties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FormId {
    #[serde(rename = "form_8949")]
    Form8949,
    #[serde(rename = "schedule_b")]
    ScheduleB,
    #[serde(rename = "schedule_d")]
    ScheduleD,
    #[serde(rename = "schedule_1")]
    Schedule1,
    #[serde(rename = "agi_worksheet")]
    AgiWorksheet,
    #[serde(rename = "schedule_a")]
    ScheduleA,
    #[serde(rename = "schedule_2")]
    Schedule2,
    #[serde(rename = "tax_computation")]
    TaxComputation,
    #[serde(rename = "form_8863")]
    Form8863,
    #[serde(rename = "form_8880")]
    Form8880,
    #[serde(rename = "schedule_3")]
    Schedule3,
    #[serde(rename = "schedule_8812")]
    Schedule8812,
    #[serde(rename = "form_1040")]
    Form1040,
}

impl FormId {
    pub const ALL: [FormId; 13] = [
        Self::Form8949,
        Self::ScheduleB,
        Self::ScheduleD,
        Self::Schedule1,
        Self::AgiWorksheet,
        Self::ScheduleA,
        Self::Schedule2,
        Self::TaxComputation,
        Self::Form8863,
        Self::Form8880,
        Self::Schedule3,
        Self::Schedule8812,
        Self::Form1040,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form8949 => "form_8949",
            Self::ScheduleB => "schedule_b",
            Self::ScheduleD => "schedule_d",
            Self::Schedule1 => "schedule_1",
            Self::AgiWorksheet => "agi_worksheet",
            Self::ScheduleA => "schedule_a",
            Self::Schedule2 => "schedule_2",
            Self::TaxComputation => "tax_computation",
            Self::Form8863 => "form_8863",
            Self::Form8880 => "form_8880",
            Self::Schedule3 => "schedule_3",
            Self::Schedule8812 => "schedule_8812",
            Self::Form1040 => "form_1040",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl fmt::Display for FormId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a unit is a filed form or an internal worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Form,
    Worksheet,
}
