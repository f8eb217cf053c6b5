use super::{ValidationIssue, ValidationSection};
use crate::models::{FormId, ReturnSnapshot};

const SECTION: ValidationSection = ValidationSection::RequiredFields;

pub(super) fn check(
    snapshot: &ReturnSnapshot,
    issues: &mut Vec<ValidationIssue>,
) {
    if snapshot.filing_status.is_joint() && snapshot.spouse.is_none() {
        issues.push(
            ValidationIssue::warning(
                SECTION,
                "MISSING_SPOUSE_INFO",
                FormId::Form1040,
                "a joint return has no spouse profile; the spouse is treated as under 65 \
                 and not blind",
            )
            .on("spouse"),
        );
    }

    if snapshot.income.is_empty() && snapshot.other_income.is_zero() {
        issues.push(ValidationIssue::warning(
            SECTION,
            "NO_INCOME_SOURCES",
            FormId::Form1040,
            "no income has been entered",
        ));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{FilingStatusCode, Person};

    fn codes(snapshot: &ReturnSnapshot) -> Vec<&'static str> {
        let mut issues = Vec::new();
        check(snapshot, &mut issues);
        issues.iter().map(|issue| issue.code).collect()
    }

    #[test]
    fn empty_return_has_no_income() {
        let snapshot = ReturnSnapshot::new(FilingStatusCode::Single);

        assert_eq!(codes(&snapshot), vec!["NO_INCOME_SOURCES"]);
    }

    #[test]
    fn other_income_alone_counts_as_income() {
        let mut snapshot = ReturnSnapshot::new(FilingStatusCode::Single);
        snapshot.other_income = dec!(1200);

        assert!(codes(&snapshot).is_empty());
    }

    #[test]
    fn joint_return_needs_spouse_profile() {
        let mut snapshot = ReturnSnapshot::new(FilingStatusCode::MarriedFilingJointly);
        snapshot.other_income = dec!(1200);

        assert_eq!(codes(&snapshot), vec!["MISSING_SPOUSE_INFO"]);

        snapshot.spouse = Some(Person::default());
        assert!(codes(&snapshot).is_empty());
    }
}
