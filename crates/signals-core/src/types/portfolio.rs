//! Portfolio snapshot and its public, redacted view.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw dashboard snapshot as written by the trading monitor.
///
/// Unknown fields (wallet addresses, gas balances, ...) are ignored on load
/// and can never reach the public view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub last_update: Value,
    #[serde(default)]
    pub portfolio_value: f64,
    #[serde(default)]
    pub portfolio_pnl_pct: f64,
    #[serde(default)]
    pub cash_pct: f64,
    #[serde(default)]
    pub positions: Vec<PortfolioPosition>,
}

/// One open position in the raw snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPosition {
    #[serde(default)]
    pub symbol: Value,
    #[serde(default)]
    pub strategy: Value,
    #[serde(default)]
    pub pnl_pct: f64,
    #[serde(default)]
    pub size_pct: f64,
    #[serde(default)]
    pub hold_hours: Value,
}

/// Public portfolio view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub last_update: Value,
    pub portfolio_value: Decimal,
    pub portfolio_pnl_pct: Decimal,
    pub cash_pct: Decimal,
    pub positions: Vec<PositionView>,
    pub position_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub symbol: Value,
    pub strategy: Value,
    pub pnl_pct: Decimal,
    pub size_pct: Decimal,
    pub hold_hours: Value,
}

impl PortfolioSnapshot {
    /// Redact and round the snapshot for public consumption.
    pub fn sanitize(&self) -> PortfolioView {
        let positions: Vec<PositionView> = self
            .positions
            .iter()
            .map(|p| PositionView {
                symbol: p.symbol.clone(),
                strategy: p.strategy.clone(),
                pnl_pct: round2(p.pnl_pct),
                size_pct: round2(p.size_pct),
                hold_hours: p.hold_hours.clone(),
            })
            .collect();

        PortfolioView {
            last_update: self.last_update.clone(),
            portfolio_value: round2(self.portfolio_value),
            portfolio_pnl_pct: round2(self.portfolio_pnl_pct),
            cash_pct: round2(self.cash_pct),
            position_count: positions.len(),
            positions,
        }
    }
}

/// Round to cents. Non-finite input becomes zero.
fn round2(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_sanitize_drops_private_fields() {
        let snapshot: PortfolioSnapshot = serde_json::from_value(json!({
            "lastUpdate": "2026-01-31T12:00:00Z",
            "portfolioValue": 1234.5678,
            "portfolioPnlPct": -3.14159,
            "cashPct": 40.0,
            "walletAddress": "0xdeadbeef",
            "gasBalance": 0.12,
            "positions": [
                {"symbol": "ELSA", "strategy": "momentum", "pnlPct": 12.346, "sizePct": 5.5,
                 "holdHours": 6, "tokenAddress": "0xabc"}
            ]
        }))
        .unwrap();

        let view = snapshot.sanitize();
        assert_eq!(view.portfolio_value, dec!(1234.57));
        assert_eq!(view.portfolio_pnl_pct, dec!(-3.14));
        assert_eq!(view.position_count, 1);
        assert_eq!(view.positions[0].pnl_pct, dec!(12.35));

        let out = serde_json::to_value(&view).unwrap();
        assert!(out.get("walletAddress").is_none());
        assert!(out["positions"][0].get("tokenAddress").is_none());
        assert_eq!(out["positions"][0]["holdHours"], json!(6));
        assert_eq!(out["positionCount"], json!(1));
    }

    #[test]
    fn test_non_finite_rounds_to_zero() {
        assert_eq!(round2(f64::NAN), Decimal::ZERO);
    }
}
