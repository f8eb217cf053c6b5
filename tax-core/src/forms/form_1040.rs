//! Form 1040, U.S. Individual Income Tax Return.
//!
//! Lines 1a through 18 are carried from the income and tax worksheets; this
//! unit adds credits, other taxes, payments and the refund or amount owed.
//!
//! # Line Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 19   | Child tax credit and credit for other dependents (Schedule 8812) |
//! | 20   | Schedule 3 line 8 |
//! | 21   | Total nonrefundable credits |
//! | 22   | Tax less credits, not below zero |
//! | 23   | Other taxes (Schedule 2 line 21) |
//! | 24   | Total tax |
//! | 25a-d| Federal income tax withheld: W-2, 1099, other, total |
//! | 26   | Estimated tax payments |
//! | 27   | Earned income credit (not modelled) |
//! | 28   | Additional child tax credit |
//! | 29   | American opportunity credit, refundable part |
//! | 31   | Schedule 3 line 15 |
//! | 32   | Total other payments and refundable credits |
//! | 33   | Total payments |
//! | 34   | Overpaid |
//! | 35a  | Refunded |
//! | 37   | Amount you owe |

use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::engine::{Dependency, EvaluationError, FormContext, Parameters, SnapshotField, TaxForm};
use crate::models::{FormId, LineItems, ReturnSnapshot};

/// Lines copied unchanged from the income worksheet.
const INCOME_LINES: &[&str] = &[
    "line_1a", "line_1z", "line_2a", "line_2b", "line_3a", "line_3b", "line_4a", "line_4b",
    "line_5a", "line_5b", "line_6a", "line_6b", "line_7", "line_8", "line_9", "line_10",
    "line_11",
];

/// Lines copied unchanged from the tax worksheet.
const TAX_LINES: &[&str] = &[
    "line_12", "line_13", "line_14", "line_15", "line_16", "line_17", "line_18",
];

pub struct Form1040;

impl TaxForm for Form1040 {
    fn id(&self) -> FormId {
        FormId::Form1040
    }

    fn title(&self) -> &'static str {
        "Form 1040: U.S. Individual Income Tax Return"
    }

    fn activates(
        &self,
        _snapshot: &ReturnSnapshot,
        _params: &Parameters,
    ) -> bool {
        true
    }

    fn inputs(&self) -> &'static [SnapshotField] {
        &[
            SnapshotField::FilingStatus,
            SnapshotField::Wages,
            SnapshotField::Interest,
            SnapshotField::Dividends,
            SnapshotField::RetirementDistributions,
            SnapshotField::Unemployment,
            SnapshotField::SocialSecurity,
            SnapshotField::EstimatedTaxPayments,
        ]
    }

    fn dependencies(&self) -> &'static [Dependency] {
        const DEPENDENCIES: &[Dependency] = &[
            Dependency::required(FormId::AgiWorksheet, "line_1a"),
            Dependency::required(FormId::AgiWorksheet, "line_1z"),
            Dependency::required(FormId::AgiWorksheet, "line_2a"),
            Dependency::required(FormId::AgiWorksheet, "line_2b"),
            Dependency::required(FormId::AgiWorksheet, "line_3a"),
            Dependency::required(FormId::AgiWorksheet, "line_3b"),
            Dependency::required(FormId::AgiWorksheet, "line_4a"),
            Dependency::required(FormId::AgiWorksheet, "line_4b"),
            Dependency::required(FormId::AgiWorksheet, "line_5a"),
            Dependency::required(FormId::AgiWorksheet, "line_5b"),
            Dependency::required(FormId::AgiWorksheet, "line_6a"),
            Dependency::required(FormId::AgiWorksheet, "line_6b"),
            Dependency::required(FormId::AgiWorksheet, "line_7"),
            Dependency::required(FormId::AgiWorksheet, "line_8"),
            Dependency::required(FormId::AgiWorksheet, "line_9"),
            Dependency::required(FormId::AgiWorksheet, "line_10"),
            Dependency::required(FormId::AgiWorksheet, "line_11"),
            Dependency::required(FormId::TaxComputation, "line_12"),
            Dependency::required(FormId::TaxComputation, "line_13"),
            Dependency::required(FormId::TaxComputation, "line_14"),
            Dependency::required(FormId::TaxComputation, "line_15"),
            Dependency::required(FormId::TaxComputation, "line_16"),
            Dependency::required(FormId::TaxComputation, "line_17"),
            Dependency::required(FormId::TaxComputation, "line_18"),
            Dependency::required(FormId::TaxComputation, "marginal_rate"),
            Dependency::required(FormId::TaxComputation, "itemized_deduction_used"),
            Dependency::conditional(FormId::Schedule2, "line_21"),
            Dependency::conditional(FormId::Schedule2, "additional_medicare_withheld"),
            Dependency::optional(FormId::Schedule3, "line_8"),
            Dependency::optional(FormId::Schedule3, "line_15"),
            Dependency::optional(FormId::Schedule8812, "line_14"),
            Dependency::optional(FormId::Schedule8812, "line_27"),
            Dependency::optional(FormId::Form8863, "line_8"),
        ];
        DEPENDENCIES
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "line_1a", "line_1z", "line_2a", "line_2b", "line_3a", "line_3b", "line_4a",
            "line_4b", "line_5a", "line_5b", "line_6a", "line_6b", "line_7", "line_8", "line_9",
            "line_10", "line_11", "line_12", "line_13", "line_14", "line_15", "line_16",
            "line_17", "line_18", "line_19", "line_20", "line_21", "line_22", "line_23",
            "line_24", "line_25a", "line_25b", "line_25c", "line_25d", "line_26", "line_27",
            "line_28", "line_29", "line_31", "line_32", "line_33", "line_34", "line_35a",
            "line_37", "effective_rate", "marginal_rate", "itemized_deduction_used",
        ]
    }

    fn evaluate(
        &self,
        ctx: &mut FormContext<'_>,
    ) -> Result<LineItems, EvaluationError> {
        let snapshot = ctx.snapshot();
        let mut lines = LineItems::new();

        for line in INCOME_LINES {
            lines.set_amount(line, ctx.amount(FormId::AgiWorksheet, line)?);
        }
        for line in TAX_LINES {
            lines.set_amount(line, ctx.amount(FormId::TaxComputation, line)?);
        }
        lines.set_rate("marginal_rate", ctx.amount(FormId::TaxComputation, "marginal_rate")?);
        lines.set_flag(
            "itemized_deduction_used",
            ctx.flag(FormId::TaxComputation, "itemized_deduction_used")?,
        );
        let agi = lines.amount("line_11");
        let line_18 = lines.amount("line_18");

        // Credits and other taxes
        let line_19 = lines.set_amount("line_19", ctx.amount(FormId::Schedule8812, "line_14")?);
        let line_20 = lines.set_amount("line_20", ctx.amount(FormId::Schedule3, "line_8")?);
        let line_21 = lines.set_amount("line_21", line_19 + line_20);
        let line_22 = lines.set_amount("line_22", max(line_18 - line_21, Decimal::ZERO));
        let line_23 = lines.set_amount("line_23", ctx.amount(FormId::Schedule2, "line_21")?);
        let line_24 = lines.set_amount("line_24", line_22 + line_23);

        // Payments
        let line_25a = lines.set_amount(
            "line_25a",
            snapshot.wages().map(|w2| w2.box_2_fed_tax_withheld).sum(),
        );
        let line_25b = lines.set_amount("line_25b", form_1099_withholding(snapshot));
        let line_25c = lines.set_amount(
            "line_25c",
            ctx.amount(FormId::Schedule2, "additional_medicare_withheld")?,
        );
        let line_25d = lines.set_amount("line_25d", line_25a + line_25b + line_25c);
        let line_26 = lines.set_amount("line_26", snapshot.estimated_tax_payments);
        let line_27 = lines.set_amount("line_27", Decimal::ZERO);
        let line_28 = lines.set_amount("line_28", ctx.amount(FormId::Schedule8812, "line_27")?);
        let line_29 = lines.set_amount("line_29", ctx.amount(FormId::Form8863, "line_8")?);
        let line_31 = lines.set_amount("line_31", ctx.amount(FormId::Schedule3, "line_15")?);
        let line_32 = lines.set_amount("line_32", line_27 + line_28 + line_29 + line_31);
        let line_33 = lines.set_amount("line_33", line_25d + line_26 + line_32);

        // Refund or amount you owe
        let line_34 = lines.set_amount("line_34", max(line_33 - line_24, Decimal::ZERO));
        lines.set_amount("line_35a", line_34);
        lines.set_amount("line_37", max(line_24 - line_33, Decimal::ZERO));

        let effective_rate = if agi > Decimal::ZERO {
            line_24 / agi
        } else {
            Decimal::ZERO
        };
        lines.set_rate("effective_rate", effective_rate);

        Ok(lines)
    }
}

/// Federal tax withheld on Forms 1099 and SSA-1099.
fn form_1099_withholding(snapshot: &ReturnSnapshot) -> Decimal {
    let interest: Decimal = snapshot
        .interest_statements()
        .map(|statement| statement.box_4_fed_tax_withheld)
        .sum();
    let dividends: Decimal = snapshot
        .dividend_statements()
        .map(|statement| statement.box_4_fed_tax_withheld)
        .sum();
    let retirement: Decimal = snapshot
        .retirement_distributions()
        .map(|distribution| distribution.box_4_fed_tax_withheld)
        .sum();
    let unemployment: Decimal = snapshot
        .unemployment()
        .map(|statement| statement.box_4_fed_tax_withheld)
        .sum();
    let social_security: Decimal = snapshot
        .social_security()
        .map(|statement| statement.box_6_voluntary_withholding)
        .sum();
    interest + dividends + retirement + unemployment + social_security
}
