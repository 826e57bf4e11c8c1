use chrono::{Months, NaiveDate};

use super::types::{
    CONTRACT_SIZE, ForecastInputs, IncomeStatus, ProjectionPoint, Thresholds,
};

pub fn run_projection(inputs: &ForecastInputs) -> Vec<ProjectionPoint> {
    let contract_value = inputs.share_price * CONTRACT_SIZE;
    let rate = inputs.strategy.monthly_rate();
    let leverage = inputs.strategy.leverage();

    let mut points = Vec::with_capacity(inputs.months as usize + 1);
    let mut capital = inputs.starting_capital;

    for month in 0..=inputs.months {
        let contracts = purchasable_contracts(capital, leverage, contract_value);
        let income = contracts as f64 * contract_value * rate;
        capital += income;

        points.push(ProjectionPoint {
            month,
            income,
            capital,
            contracts,
            date: add_months(inputs.anchor_date, month),
        });
    }

    points
}

pub fn classify_income(income: f64, thresholds: Thresholds) -> IncomeStatus {
    IncomeStatus {
        surviving: income >= thresholds.survival,
        thriving: income >= thresholds.thriving,
    }
}

/// Vertical chart scale: the thriving threshold must stay visible even when
/// every projected income sits below it.
pub fn income_axis_max(points: &[ProjectionPoint], thresholds: Thresholds) -> f64 {
    points
        .iter()
        .map(|p| p.income)
        .fold(thresholds.thriving, f64::max)
}

fn purchasable_contracts(capital: f64, leverage: f64, contract_value: f64) -> u64 {
    if !contract_value.is_finite() || contract_value <= 0.0 {
        return 0;
    }

    let possible = (capital * leverage) / contract_value;
    if !possible.is_finite() || possible < 1.0 {
        return 0;
    }
    possible.floor() as u64
}

fn add_months(anchor: NaiveDate, months: u32) -> NaiveDate {
    anchor
        .checked_add_months(Months::new(months))
        .unwrap_or(anchor)
}
