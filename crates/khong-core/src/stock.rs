//! # Stock Guard (pure half)
//!
//! The single authority for "requested quantity must not exceed stock".
//! The cart calls [`ensure_available`] at every mutation; the database
//! layer runs the same rule as an atomic read-check-decrement at commit,
//! using the per-product totals from [`requested_quantities`].
//!
//! Stock is only checked while drafting, never reserved.

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::types::Product;

/// Fails with `InsufficientStock` if `requested` exceeds the product's stock.
pub fn ensure_available(product: &Product, requested: i64) -> CoreResult<()> {
    check_against(&product.id, product.stock_qty, requested)
}

/// Same rule against an already-read stock level.
pub fn check_against(product_id: &str, available: i64, requested: i64) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested,
        });
    }

    Ok(())
}

/// Total quantity wanted for one product in a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Sums line quantities per product, in first-seen order.
///
/// A cart built through [`crate::cart::Cart`] already holds one line per
/// product; this also covers drafts assembled from arbitrary lines.
pub fn requested_quantities(lines: &[CartLine]) -> Vec<StockRequest> {
    let mut requests: Vec<StockRequest> = Vec::new();

    for line in lines {
        match requests.iter_mut().find(|r| r.product_id == line.product_id) {
            Some(request) => request.quantity += line.quantity,
            None => requests.push(StockRequest {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            }),
        }
    }

    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;

    #[test]
    fn test_ensure_available() {
        let beer = product("beer", 50, 12_000_000);
        assert!(ensure_available(&beer, 50).is_ok());
        assert_eq!(
            ensure_available(&beer, 51),
            Err(CoreError::InsufficientStock {
                product_id: "beer".to_string(),
                available: 50,
                requested: 51,
            })
        );
    }

    #[test]
    fn test_requested_quantities_merges_per_product() {
        let beer = product("beer", 50, 100);
        let water = product("water", 100, 10);
        let lines = vec![
            CartLine::snapshot(&beer, 2),
            CartLine::snapshot(&water, 1),
            CartLine::snapshot(&beer, 3),
        ];

        let requests = requested_quantities(&lines);
        assert_eq!(
            requests,
            vec![
                StockRequest {
                    product_id: "beer".to_string(),
                    quantity: 5
                },
                StockRequest {
                    product_id: "water".to_string(),
                    quantity: 1
                },
            ]
        );
    }
}
