//! Dashboard figures computed over sales.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentType, Sale};

/// Totals for a set of sales (usually one day).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub total: Money,
    pub cash_received: Money,
    pub transfer_received: Money,
    /// Sum of credit sale totals still on customer accounts.
    pub credit_total: Money,
}

impl SalesSummary {
    pub fn from_sales(sales: &[Sale]) -> Self {
        sales.iter().fold(SalesSummary::default(), |mut acc, sale| {
            acc.sale_count += 1;
            acc.total += sale.total();
            if sale.payment_type == PaymentType::Credit {
                acc.credit_total += sale.total();
            } else {
                // change comes out of cash first, any remainder out of transfer
                let change = sale.change_due();
                let cash = Money::from_cents(sale.cash_cents);
                let cash_kept = cash.saturating_sub_to_zero(change);
                let change_left = change - (cash - cash_kept);
                acc.cash_received += cash_kept;
                acc.transfer_received +=
                    Money::from_cents(sale.transfer_cents).saturating_sub_to_zero(change_left);
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sale(payment_type: PaymentType, total: i64, cash: i64, transfer: i64) -> Sale {
        Sale {
            id: format!("s-{}", total),
            customer_id: None,
            created_at: Utc::now(),
            total_cents: total,
            cash_cents: cash,
            transfer_cents: transfer,
            payment_type,
        }
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(SalesSummary::from_sales(&[]), SalesSummary::default());
    }

    #[test]
    fn test_summary_totals() {
        let sales = vec![
            sale(PaymentType::Cash, 250_000, 300_000, 0),
            sale(PaymentType::Mixed, 250_000, 150_000, 100_000),
            sale(PaymentType::Transfer, 100_000, 0, 100_000),
            sale(PaymentType::Credit, 400_000, 0, 0),
        ];

        let summary = SalesSummary::from_sales(&sales);
        assert_eq!(summary.sale_count, 4);
        assert_eq!(summary.total, Money::from_cents(1_000_000));
        assert_eq!(summary.cash_received, Money::from_cents(400_000));
        assert_eq!(summary.transfer_received, Money::from_cents(200_000));
        assert_eq!(summary.credit_total, Money::from_cents(400_000));
    }

    #[test]
    fn test_overpaid_transfer_counts_only_the_total() {
        let summary = SalesSummary::from_sales(&[sale(PaymentType::Transfer, 250_000, 0, 300_000)]);

        assert_eq!(summary.cash_received, Money::zero());
        assert_eq!(summary.transfer_received, Money::from_cents(250_000));
    }

    #[test]
    fn test_overpaid_mixed_takes_change_from_cash_then_transfer() {
        let sales = vec![
            // change 20,000 fits in the cash part
            sale(PaymentType::Mixed, 250_000, 50_000, 220_000),
            // change 80,000 exceeds cash 50,000, the other 30,000 comes off transfer
            sale(PaymentType::Mixed, 250_000, 50_000, 280_000),
        ];

        for s in &sales {
            let one = SalesSummary::from_sales(std::slice::from_ref(s));
            assert_eq!(one.cash_received + one.transfer_received, one.total);
        }

        let summary = SalesSummary::from_sales(&sales);
        assert_eq!(summary.cash_received, Money::from_cents(30_000));
        assert_eq!(summary.transfer_received, Money::from_cents(470_000));
        assert_eq!(summary.total, Money::from_cents(500_000));
    }
}
