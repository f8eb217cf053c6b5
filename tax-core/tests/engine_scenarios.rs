//! End-to-end returns through the standard engine.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::{
    CapitalSale, DeductionMethod, Dependent, EngineError, FilingStatusCode, FormId, HoldingPeriod,
    IncomeItem, InterestStatement, ItemizedDeductions, ReturnSnapshot, SocialSecurityStatement,
    TaxEngine, WageStatement,
};
use tracing_subscriber::fmt::format::FmtSpan;

fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_span_events(FmtSpan::NONE)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

fn w2(
    wages: Decimal,
    withheld: Decimal,
) -> IncomeItem {
    IncomeItem::Wage(WageStatement {
        box_1_wages: wages,
        box_2_fed_tax_withheld: withheld,
        ..Default::default()
    })
}

fn child(year: i32) -> Dependent {
    Dependent {
        first_name: "Child".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(year, 5, 20),
        ..Default::default()
    }
}

#[test]
fn single_wage_earner_gets_refund() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot =
        ReturnSnapshot::new(FilingStatusCode::Single).with_income(w2(dec!(60000), dec!(6000)));

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.agi, dec!(60000));
    assert_eq!(result.taxable_income, dec!(44250));
    assert_eq!(result.total_tax, dec!(5071.50));
    assert_eq!(result.total_payments, dec!(6000));
    assert_eq!(result.refund_amount, dec!(928.50));
    assert_eq!(result.amount_owed, dec!(0));
    assert_eq!(result.marginal_tax_rate, dec!(0.12));
    assert_eq!(result.deduction_method, DeductionMethod::Standard);
    assert_eq!(result.standard_deduction_amount, dec!(15750));
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn married_couple_with_two_children() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let mut snapshot = ReturnSnapshot::new(FilingStatusCode::MarriedFilingJointly)
        .with_income(w2(dec!(120000), dec!(10000)));
    snapshot.dependents = vec![child(2015), child(2018)];

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.taxable_income, dec!(88500));
    assert_eq!(result.line(FormId::Form1040, "line_16"), dec!(10143));
    assert_eq!(result.total_credits, dec!(4400));
    assert_eq!(result.total_tax, dec!(5743));
    assert_eq!(result.refund_amount, dec!(4257));
    assert_eq!(
        result.required_forms,
        vec![FormId::Schedule8812, FormId::Form1040]
    );
}

#[test]
fn low_income_family_receives_additional_child_tax_credit() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let mut snapshot = ReturnSnapshot::new(FilingStatusCode::HeadOfHousehold)
        .with_income(w2(dec!(25000), dec!(500)));
    snapshot.dependents = vec![child(2019), child(2021)];

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.taxable_income, dec!(1375));
    assert_eq!(result.line(FormId::Form1040, "line_19"), dec!(137.50));
    assert_eq!(result.total_tax, dec!(0));
    assert_eq!(result.line(FormId::Form1040, "line_28"), dec!(3375));
    assert_eq!(result.refund_amount, dec!(3875));
}

#[test]
fn itemizer_above_standard_deduction() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let mut snapshot =
        ReturnSnapshot::new(FilingStatusCode::Single).with_income(w2(dec!(150000), dec!(20000)));
    snapshot.itemized_deductions = Some(ItemizedDeductions {
        state_local_income_tax: dec!(12000),
        real_estate_tax: dec!(8000),
        mortgage_interest: dec!(15000),
        charitable_cash: dec!(5000),
        ..Default::default()
    });

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.deduction_method, DeductionMethod::Itemized);
    assert_eq!(result.itemized_deduction_amount, dec!(40000));
    assert_eq!(result.taxable_income, dec!(110000));
    assert_eq!(result.total_tax, dec!(19247));
    assert_eq!(result.refund_amount, dec!(753));
    assert_eq!(
        result.required_forms,
        vec![FormId::ScheduleA, FormId::Form1040]
    );
}

#[test]
fn long_term_gain_taxed_at_zero_rate() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
        .with_income(w2(dec!(50000), dec!(4000)))
        .with_income(IncomeItem::CapitalSale(CapitalSale {
            description: "100 sh XYZ".to_string(),
            proceeds: dec!(20000),
            cost_basis: Some(dec!(10000)),
            holding_period: Some(HoldingPeriod::LongTerm),
            ..Default::default()
        }));

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.line(FormId::ScheduleD, "net_capital_gain"), dec!(10000));
    assert_eq!(result.agi, dec!(60000));
    assert_eq!(result.taxable_income, dec!(44250));
    assert_eq!(result.total_tax, dec!(3871.50));
    assert_eq!(
        result.required_forms,
        vec![FormId::Form8949, FormId::ScheduleD, FormId::Form1040]
    );
}

#[test]
fn capital_loss_limited_and_carried_forward() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
        .with_income(w2(dec!(50000), dec!(4000)))
        .with_income(IncomeItem::CapitalSale(CapitalSale {
            proceeds: dec!(2000),
            cost_basis: Some(dec!(10000)),
            holding_period: Some(HoldingPeriod::ShortTerm),
            ..Default::default()
        }));

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.line(FormId::ScheduleD, "line_21"), dec!(-3000));
    assert_eq!(result.line(FormId::ScheduleD, "carryforward_loss"), dec!(5000));
    assert_eq!(result.agi, dec!(47000));
}

#[test]
fn sale_without_basis_fails_the_return() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
        .with_income(w2(dec!(50000), dec!(4000)))
        .with_income(IncomeItem::CapitalSale(CapitalSale {
            proceeds: dec!(2000),
            holding_period: Some(HoldingPeriod::ShortTerm),
            ..Default::default()
        }));

    let result = engine.calculate(&snapshot, 2025);

    // Schedule D reads Form 8949 conditionally and the income worksheet reads
    // Schedule D conditionally, so the failure reaches Form 1040.
    let Err(EngineError::CalculationFailed { errors }) = result else {
        panic!("expected CalculationFailed, got {result:?}");
    };
    assert_eq!(errors[0].form, FormId::Form8949);
    assert_eq!(errors.last().map(|failure| failure.form), Some(FormId::Form1040));
}

#[test]
fn results_serialize_with_form_keys() {
    let engine = TaxEngine::standard().unwrap();
    let snapshot =
        ReturnSnapshot::new(FilingStatusCode::Single).with_income(w2(dec!(60000), dec!(6000)));

    let result = engine.calculate(&snapshot, 2025).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["deduction_method"], "standard");
    assert!(json["form_results"]["form_1040"]["line_34"].is_object());
}

#[test]
fn investment_income_with_benefits_owes_niit() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot = ReturnSnapshot::new(FilingStatusCode::Single)
        .with_income(IncomeItem::Interest(InterestStatement {
            box_1_interest: dec!(190000),
            ..Default::default()
        }))
        .with_income(IncomeItem::SocialSecurity(SocialSecurityStatement {
            box_5_net_benefits: dec!(40000),
            ..Default::default()
        }));

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.line(FormId::Form1040, "line_6b"), dec!(34000));
    assert_eq!(result.agi, dec!(224000));
    assert_eq!(result.line(FormId::Schedule2, "line_12"), dec!(912));
    assert_eq!(result.line(FormId::Form1040, "line_23"), dec!(912));
    assert!(result.required_forms.contains(&FormId::Schedule2));
}

#[test]
fn excess_medicare_withholding_is_credited_on_line_25c() {
    let _guard = init_test_tracing();
    let engine = TaxEngine::standard().unwrap();
    let snapshot = ReturnSnapshot::new(FilingStatusCode::MarriedFilingJointly).with_income(
        IncomeItem::Wage(WageStatement {
            box_1_wages: dec!(220000),
            box_2_fed_tax_withheld: dec!(30000),
            box_5_medicare_wages: dec!(220000),
            box_6_medicare_tax: dec!(3370),
            ..Default::default()
        }),
    );

    let result = engine.calculate(&snapshot, 2025).unwrap();

    assert_eq!(result.line(FormId::Schedule2, "line_11"), dec!(0));
    assert_eq!(result.line(FormId::Form1040, "line_25c"), dec!(180));
    assert_eq!(result.line(FormId::Form1040, "line_25d"), dec!(30180));
    assert!(result.errors.is_empty());
}

#[test]
fn negative_wages_are_rejected_before_calculation() {
    let engine = TaxEngine::standard().unwrap();
    let snapshot =
        ReturnSnapshot::new(FilingStatusCode::Single).with_income(w2(dec!(-1000), dec!(0)));

    let result = engine.calculate(&snapshot, 2025);

    let Err(EngineError::InvalidReturn { issues }) = result else {
        panic!("expected InvalidReturn, got {result:?}");
    };
    assert_eq!(issues[0].code, "W2_NEGATIVE_WAGES");
    assert_eq!(issues[0].field.as_deref(), Some("income[0].box_1_wages"));
}
