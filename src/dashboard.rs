//! Terminal presentation of a churn assessment.
//!
//! Mirrors the web dashboards: a form with bounded controls, a customer
//! snapshot, the engineered features and the colour-coded prediction.

use anyhow::{bail, Context};
use std::fmt::Write;
use std::ops::RangeInclusive;

use crate::features::engineer_features;
use crate::models::{CustomerProfile, Gender, Geography, PredictionResult};

pub const CREDIT_SCORE_SLIDER: RangeInclusive<i64> = 300..=900;
pub const AGE_SLIDER: RangeInclusive<i64> = 18..=92;
pub const TENURE_SLIDER: RangeInclusive<i64> = 0..=10;
pub const BALANCE_SLIDER: RangeInclusive<f64> = 0.0..=250_000.0;
pub const NUM_OF_PRODUCTS_SLIDER: RangeInclusive<i64> = 1..=4;
pub const SALARY_SLIDER: RangeInclusive<f64> = 0.0..=200_000.0;

/// The form as it appears before the user touches any control.
pub fn default_profile() -> CustomerProfile {
    CustomerProfile {
        credit_score: 650,
        geography: Geography::France,
        gender: Gender::Male,
        age: 40,
        tenure: 3,
        balance: 60_000.0,
        num_of_products: 2,
        has_cr_card: true,
        is_active_member: true,
        estimated_salary: 50_000.0,
    }
}

/// Build a profile from `--flag value` pairs on top of the form defaults.
pub fn parse_form<I, S>(args: I) -> anyhow::Result<CustomerProfile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut profile = default_profile();
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        let flag = flag.as_ref().to_string();
        let value = args
            .next()
            .with_context(|| format!("{} needs a value", flag))?;
        let value = value.as_ref();

        match flag.as_str() {
            "--credit-score" => profile.credit_score = parse_int(&flag, value)?,
            "--age" => profile.age = parse_int(&flag, value)?,
            "--tenure" => profile.tenure = parse_int(&flag, value)?,
            "--balance" => profile.balance = parse_float(&flag, value)?,
            "--products" => profile.num_of_products = parse_int(&flag, value)?,
            "--salary" => profile.estimated_salary = parse_float(&flag, value)?,
            "--geography" => {
                profile.geography = value.parse().map_err(|_| {
                    anyhow::anyhow!("--geography must be one of France, Spain, Germany")
                })?
            }
            "--gender" => {
                profile.gender = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("--gender must be Male or Female"))?
            }
            "--has-cr-card" => profile.has_cr_card = parse_yes_no(&flag, value)?,
            "--active" => profile.is_active_member = parse_yes_no(&flag, value)?,
            other => bail!("unknown option {}", other),
        }
    }

    check_form_ranges(&profile)?;
    Ok(profile)
}

fn parse_int(flag: &str, value: &str) -> anyhow::Result<i64> {
    value
        .parse()
        .with_context(|| format!("{} expects a whole number, got '{}'", flag, value))
}

fn parse_float(flag: &str, value: &str) -> anyhow::Result<f64> {
    value
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, value))
}

fn parse_yes_no(flag: &str, value: &str) -> anyhow::Result<bool> {
    match value {
        "Yes" | "yes" | "1" => Ok(true),
        "No" | "no" | "0" => Ok(false),
        _ => bail!("{} expects Yes or No, got '{}'", flag, value),
    }
}

/// Enforce the ranges of the dashboard controls.
pub fn check_form_ranges(profile: &CustomerProfile) -> anyhow::Result<()> {
    let ints = [
        ("Credit Score", profile.credit_score, CREDIT_SCORE_SLIDER),
        ("Age", profile.age, AGE_SLIDER),
        ("Tenure", profile.tenure, TENURE_SLIDER),
        ("Number of Products", profile.num_of_products, NUM_OF_PRODUCTS_SLIDER),
    ];
    for (label, value, range) in ints {
        if !range.contains(&value) {
            bail!(
                "{} must be between {} and {}",
                label,
                range.start(),
                range.end()
            );
        }
    }

    let amounts = [
        ("Account Balance", profile.balance, BALANCE_SLIDER),
        ("Estimated Salary", profile.estimated_salary, SALARY_SLIDER),
    ];
    for (label, value, range) in amounts {
        if !range.contains(&value) {
            bail!(
                "{} must be between {} and {}",
                label,
                range.start(),
                range.end()
            );
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Format a currency amount with thousands separators and no decimals.
pub fn format_currency(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Customer snapshot plus the engineered features, computed with the same
/// function the pipeline uses.
pub fn render_snapshot(profile: &CustomerProfile) -> anyhow::Result<String> {
    let features = engineer_features(profile)?;
    let mut out = String::new();

    writeln!(out, "Customer Snapshot")?;
    writeln!(out, "  Age:      {}", profile.age)?;
    writeln!(out, "  Country:  {}", profile.geography)?;
    writeln!(out, "  Gender:   {}", profile.gender)?;
    writeln!(out, "  Balance:  {}", format_currency(profile.balance))?;
    writeln!(out, "  Products: {}", profile.num_of_products)?;
    writeln!(out, "  Tenure:   {} years", profile.tenure)?;
    writeln!(out, "  Card:     {}", yes_no(profile.has_cr_card))?;
    writeln!(out)?;
    writeln!(out, "Engineered Features")?;
    writeln!(
        out,
        "  Balance / Products:  {}",
        format_currency(features.balance_per_product)
    )?;
    writeln!(out, "  Senior Flag:         {}", features.is_senior)?;
    writeln!(out, "  Credit Risk Bucket:  {}", features.credit_risk)?;
    writeln!(
        out,
        "  Active Member:       {}",
        u8::from(profile.is_active_member)
    )?;

    Ok(out)
}

pub fn render_prediction(result: &PredictionResult) -> String {
    let indicator = result.risk_level.color().emoji();
    format!(
        "Prediction Result\n  Churn Probability:  {}%\n  Risk Level:         {} {}\n  Recommended Action: {}\n",
        result.churn_percentage, indicator, result.risk_level, result.recommended_action
    )
}
