use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatusCode {
    #[default]
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatusCode {
    pub const ALL: [FilingStatusCode; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingSurvivingSpouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            "QSS" => Some(Self::QualifyingSurvivingSpouse),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingSurvivingSpouse => "Qualifying Surviving Spouse",
        }
    }

    /// Whether the return reports a spouse's items alongside the taxpayer's.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }
}

/// One value per filing status.
///
/// Year-scoped parameters are keyed by filing status; holding them in a struct
/// rather than a map makes every lookup total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
    pub qualifying_surviving_spouse: T,
}

impl<T> ByFilingStatus<T> {
    /// Values in form order: S, MFJ, MFS, HOH, QSS.
    pub const fn new(
        single: T,
        married_filing_jointly: T,
        married_filing_separately: T,
        head_of_household: T,
        qualifying_surviving_spouse: T,
    ) -> Self {
        Self {
            single,
            married_filing_jointly,
            married_filing_separately,
            head_of_household,
            qualifying_surviving_spouse,
        }
    }

    pub fn get(
        &self,
        status: FilingStatusCode,
    ) -> &T {
        match status {
            FilingStatusCode::Single => &self.single,
            FilingStatusCode::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatusCode::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatusCode::HeadOfHousehold => &self.head_of_household,
            FilingStatusCode::QualifyingSurvivingSpouse => &self.qualifying_surviving_spouse,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatusCode, &T)> {
        FilingStatusCode::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}

impl<T: Clone> ByFilingStatus<T> {
    /// Same value for every status.
    pub fn uniform(value: T) -> Self {
        Self {
            single: value.clone(),
            married_filing_jointly: value.clone(),
            married_filing_separately: value.clone(),
            head_of_household: value.clone(),
            qualifying_surviving_spouse: value,
        }
    }
}
