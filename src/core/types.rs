use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKey {
    HomePrice,
    Rent,
    Income,
    DownPaymentPct,
    InterestRate,
    AppreciationRate,
    InvestmentReturn,
    MaintenanceRate,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 8] = [
        ParameterKey::HomePrice,
        ParameterKey::Rent,
        ParameterKey::Income,
        ParameterKey::DownPaymentPct,
        ParameterKey::InterestRate,
        ParameterKey::AppreciationRate,
        ParameterKey::InvestmentReturn,
        ParameterKey::MaintenanceRate,
    ];

    /// Wire name used by the query string, JSON payloads and the page.
    pub fn api_name(self) -> &'static str {
        match self {
            ParameterKey::HomePrice => "homePrice",
            ParameterKey::Rent => "rent",
            ParameterKey::Income => "income",
            ParameterKey::DownPaymentPct => "downPaymentPct",
            ParameterKey::InterestRate => "interestRate",
            ParameterKey::AppreciationRate => "appreciationRate",
            ParameterKey::InvestmentReturn => "investmentReturn",
            ParameterKey::MaintenanceRate => "maintenanceRate",
        }
    }
}

/// Bounds and step of the slider that feeds one parameter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSpec {
    pub key: ParameterKey,
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl ControlSpec {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn for_key(key: ParameterKey) -> &'static ControlSpec {
        // CONTROLS is ordered like ParameterKey::ALL.
        &CONTROLS[key as usize]
    }
}

pub static CONTROLS: [ControlSpec; 8] = [
    ControlSpec {
        key: ParameterKey::HomePrice,
        title: "Home Price (thousands)",
        min: 200.0,
        max: 1000.0,
        default: 450.0,
        step: 10.0,
    },
    ControlSpec {
        key: ParameterKey::Rent,
        title: "Monthly Rent",
        min: 500.0,
        max: 10_000.0,
        default: 2_500.0,
        step: 50.0,
    },
    ControlSpec {
        key: ParameterKey::Income,
        title: "Monthly Surplus (income minus expenses)",
        min: 0.0,
        max: 20_000.0,
        default: 4_000.0,
        step: 100.0,
    },
    ControlSpec {
        key: ParameterKey::DownPaymentPct,
        title: "Down Payment (%)",
        min: 0.0,
        max: 100.0,
        default: 15.0,
        step: 1.0,
    },
    ControlSpec {
        key: ParameterKey::InterestRate,
        title: "Mortgage Rate (%/yr)",
        min: 0.0,
        max: 15.0,
        default: 7.5,
        step: 0.125,
    },
    ControlSpec {
        key: ParameterKey::AppreciationRate,
        title: "Home Appreciation (%/yr)",
        min: -5.0,
        max: 15.0,
        default: 4.0,
        step: 0.5,
    },
    ControlSpec {
        key: ParameterKey::InvestmentReturn,
        title: "Investment Return (%/yr)",
        min: -5.0,
        max: 20.0,
        default: 10.0,
        step: 0.5,
    },
    ControlSpec {
        key: ParameterKey::MaintenanceRate,
        title: "Maintenance, Tax & Insurance (%/yr)",
        min: 0.0,
        max: 10.0,
        default: 3.0,
        step: 0.25,
    },
];

/// A complete parameter snapshot. Rates are annual percentages and the home
/// price is in thousands, exactly as the sliders present them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub home_price: f64,
    pub rent: f64,
    pub income: f64,
    pub down_payment_pct: f64,
    pub interest_rate: f64,
    pub appreciation_rate: f64,
    pub investment_return: f64,
    pub maintenance_rate: f64,
}

impl Default for Params {
    fn default() -> Self {
        let mut params = Params {
            home_price: 0.0,
            rent: 0.0,
            income: 0.0,
            down_payment_pct: 0.0,
            interest_rate: 0.0,
            appreciation_rate: 0.0,
            investment_return: 0.0,
            maintenance_rate: 0.0,
        };
        for control in &CONTROLS {
            params.set(control.key, control.default);
        }
        params
    }
}

impl Params {
    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::HomePrice => self.home_price,
            ParameterKey::Rent => self.rent,
            ParameterKey::Income => self.income,
            ParameterKey::DownPaymentPct => self.down_payment_pct,
            ParameterKey::InterestRate => self.interest_rate,
            ParameterKey::AppreciationRate => self.appreciation_rate,
            ParameterKey::InvestmentReturn => self.investment_return,
            ParameterKey::MaintenanceRate => self.maintenance_rate,
        }
    }

    pub fn set(&mut self, key: ParameterKey, value: f64) {
        let slot = match key {
            ParameterKey::HomePrice => &mut self.home_price,
            ParameterKey::Rent => &mut self.rent,
            ParameterKey::Income => &mut self.income,
            ParameterKey::DownPaymentPct => &mut self.down_payment_pct,
            ParameterKey::InterestRate => &mut self.interest_rate,
            ParameterKey::AppreciationRate => &mut self.appreciation_rate,
            ParameterKey::InvestmentReturn => &mut self.investment_return,
            ParameterKey::MaintenanceRate => &mut self.maintenance_rate,
        };
        *slot = value;
    }

    pub fn with(mut self, key: ParameterKey, value: f64) -> Self {
        self.set(key, value);
        self
    }
}

/// Monthly quantities derived from a snapshot, in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRates {
    pub price: f64,
    pub down_payment: f64,
    pub financed_amount: f64,
    pub monthly_interest: f64,
    pub monthly_mortgage_payment: f64,
    pub monthly_principal_paydown: f64,
    pub monthly_maintenance: f64,
    pub monthly_appreciation: f64,
    pub monthly_investment_return: f64,
}

/// One month of every series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPoint {
    pub month: u32,
    pub home_value: f64,
    pub home_equity: f64,
    pub renter_savings: f64,
    pub renter_net_worth: f64,
    pub buyer_investment_equity: f64,
    pub buyer_net_worth: f64,
}

/// Aligned series over the horizon; index `i` is month `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub home_value: Vec<f64>,
    pub home_equity: Vec<f64>,
    pub renter_savings: Vec<f64>,
    pub renter_net_worth: Vec<f64>,
    pub buyer_investment_equity: Vec<f64>,
    pub buyer_net_worth: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_home_equity: f64,
    pub final_renter_net_worth: f64,
    pub final_buyer_net_worth: f64,
    pub buyer_advantage: f64,
    pub first_buyer_lead_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("horizon must be at least one month, got {horizon_months}")]
    InvalidHorizon { horizon_months: u32 },
    #[error("parameter {name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
}
