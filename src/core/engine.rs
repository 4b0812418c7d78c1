use super::types::{
    DerivedRates, MonthPoint, ParameterKey, Params, Projection, ProjectionError, ProjectionSummary,
};

pub const MORTGAGE_TERM_MONTHS: u32 = 360;
pub const DEFAULT_HORIZON_MONTHS: u32 = 120;

/// Purchase price plus round-trip transaction costs, as a multiple of price.
/// Equity is what would be left after selling, so month 0 starts below the
/// down payment by this overhead.
const PURCHASE_COST_MULTIPLE: f64 = 1.07;

/// Rates at or below this magnitude amortize straight-line.
const ZERO_RATE_EPS: f64 = 1e-12;

impl DerivedRates {
    pub fn from_params(params: &Params) -> Self {
        let price = params.home_price * 1000.0;
        let down_payment = params.down_payment_pct / 100.0 * price;
        let financed_amount = price - down_payment;
        let monthly_interest = params.interest_rate / 1200.0;
        let monthly_mortgage_payment =
            monthly_mortgage_payment(financed_amount, monthly_interest, MORTGAGE_TERM_MONTHS);

        Self {
            price,
            down_payment,
            financed_amount,
            monthly_interest,
            monthly_mortgage_payment,
            monthly_principal_paydown: monthly_mortgage_payment
                - financed_amount * monthly_interest,
            monthly_maintenance: price * params.maintenance_rate / 1200.0,
            monthly_appreciation: params.appreciation_rate / 1200.0,
            monthly_investment_return: params.investment_return / 1200.0,
        }
    }
}

/// Level payment that repays `principal` over `term_months` at a fixed
/// monthly rate. A zero rate repays the principal in equal slices.
pub fn monthly_mortgage_payment(principal: f64, monthly_rate: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal;
    }
    if monthly_rate.abs() <= ZERO_RATE_EPS {
        return principal / term_months as f64;
    }
    let growth = (1.0 + monthly_rate).powf(term_months as f64);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Lazily walks the projection one month at a time. Each step reads only the
/// previous month's balances, so any prefix equals a shorter projection.
#[derive(Debug, Clone)]
pub struct ProjectionSteps {
    derived: DerivedRates,
    income: f64,
    rent: f64,
    month: u32,
    horizon_months: u32,
    balances: Option<(f64, f64)>,
}

impl ProjectionSteps {
    pub fn derived(&self) -> &DerivedRates {
        &self.derived
    }
}

impl Iterator for ProjectionSteps {
    type Item = MonthPoint;

    fn next(&mut self) -> Option<MonthPoint> {
        if self.month >= self.horizon_months {
            return None;
        }
        let d = &self.derived;
        let month = self.month;
        let appreciation = (1.0 + d.monthly_appreciation).powf(month as f64);

        let home_value = d.price * appreciation;
        let home_equity = d.price * (appreciation - PURCHASE_COST_MULTIPLE)
            + d.down_payment
            + d.monthly_principal_paydown * month as f64;
        let renter_savings = self.income - self.rent * appreciation;

        let (renter_net_worth, buyer_investment_equity) = match self.balances {
            None => (
                renter_savings + d.down_payment,
                self.income - d.monthly_mortgage_payment - d.monthly_maintenance,
            ),
            Some((renter_prev, buyer_prev)) => {
                let growth = 1.0 + d.monthly_investment_return;
                (
                    renter_prev * growth + renter_savings,
                    buyer_prev * growth + (self.income - d.monthly_mortgage_payment),
                )
            }
        };

        self.balances = Some((renter_net_worth, buyer_investment_equity));
        self.month += 1;

        Some(MonthPoint {
            month,
            home_value,
            home_equity,
            renter_savings,
            renter_net_worth,
            buyer_investment_equity,
            buyer_net_worth: home_equity + buyer_investment_equity,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.horizon_months.saturating_sub(self.month) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProjectionSteps {}

pub fn steps(params: &Params, horizon_months: u32) -> Result<ProjectionSteps, ProjectionError> {
    if horizon_months == 0 {
        return Err(ProjectionError::InvalidHorizon { horizon_months });
    }
    for key in ParameterKey::ALL {
        let value = params.get(key);
        if !value.is_finite() {
            return Err(ProjectionError::NonFiniteParameter {
                name: key.api_name(),
                value,
            });
        }
    }

    Ok(ProjectionSteps {
        derived: DerivedRates::from_params(params),
        income: params.income,
        rent: params.rent,
        month: 0,
        horizon_months,
        balances: None,
    })
}

pub fn project(params: &Params, horizon_months: u32) -> Result<Projection, ProjectionError> {
    Ok(steps(params, horizon_months)?.collect())
}

impl FromIterator<MonthPoint> for Projection {
    fn from_iter<I: IntoIterator<Item = MonthPoint>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let capacity = iter.size_hint().0;
        let mut projection = Projection {
            home_value: Vec::with_capacity(capacity),
            home_equity: Vec::with_capacity(capacity),
            renter_savings: Vec::with_capacity(capacity),
            renter_net_worth: Vec::with_capacity(capacity),
            buyer_investment_equity: Vec::with_capacity(capacity),
            buyer_net_worth: Vec::with_capacity(capacity),
        };
        for point in iter {
            projection.home_value.push(point.home_value);
            projection.home_equity.push(point.home_equity);
            projection.renter_savings.push(point.renter_savings);
            projection.renter_net_worth.push(point.renter_net_worth);
            projection
                .buyer_investment_equity
                .push(point.buyer_investment_equity);
            projection.buyer_net_worth.push(point.buyer_net_worth);
        }
        projection
    }
}

impl Projection {
    pub fn len(&self) -> usize {
        self.home_equity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.home_equity.is_empty()
    }

    pub fn point(&self, month: usize) -> Option<MonthPoint> {
        if month >= self.len() {
            return None;
        }
        Some(MonthPoint {
            month: month as u32,
            home_value: self.home_value[month],
            home_equity: self.home_equity[month],
            renter_savings: self.renter_savings[month],
            renter_net_worth: self.renter_net_worth[month],
            buyer_investment_equity: self.buyer_investment_equity[month],
            buyer_net_worth: self.buyer_net_worth[month],
        })
    }

    /// Final-month outcome. `None` only for an empty projection.
    pub fn summary(&self) -> Option<ProjectionSummary> {
        let last = self.point(self.len().checked_sub(1)?)?;
        let first_buyer_lead_month = self
            .buyer_net_worth
            .iter()
            .zip(&self.renter_net_worth)
            .position(|(buyer, renter)| buyer >= renter)
            .map(|idx| idx as u32);

        Some(ProjectionSummary {
            final_home_equity: last.home_equity,
            final_renter_net_worth: last.renter_net_worth,
            final_buyer_net_worth: last.buyer_net_worth,
            buyer_advantage: last.buyer_net_worth - last.renter_net_worth,
            first_buyer_lead_month,
        })
    }
}
