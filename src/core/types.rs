use chrono::NaiveDate;
use serde::Serialize;

/// Notional multiplier applied to a share price to value one option contract.
pub const CONTRACT_SIZE: f64 = 100.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    Tortoise,
    Hare,
}

impl Strategy {
    pub fn monthly_rate(self) -> f64 {
        match self {
            Strategy::Tortoise => 0.045,
            Strategy::Hare => 0.040,
        }
    }

    pub fn leverage(self) -> f64 {
        match self {
            Strategy::Tortoise => 1.0,
            Strategy::Hare => 1.5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JobType {
    WhiteCollar,
    BlueCollar,
}

#[derive(Copy, Clone, Debug)]
pub struct Thresholds {
    pub survival: f64,
    pub thriving: f64,
}

impl JobType {
    pub fn thresholds(self) -> Thresholds {
        match self {
            JobType::WhiteCollar => Thresholds {
                survival: 12_000.0,
                thriving: 20_000.0,
            },
            JobType::BlueCollar => Thresholds {
                survival: 10_000.0,
                thriving: 16_000.0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastInputs {
    pub starting_capital: f64,
    pub share_price: f64,
    pub strategy: Strategy,
    pub months: u32,
    pub anchor_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: u32,
    pub income: f64,
    pub capital: f64,
    pub contracts: u64,
    pub date: NaiveDate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatus {
    pub surviving: bool,
    pub thriving: bool,
}
