use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which way a currency exchange converts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeDirection {
    /// Premium-cash into gems, 1 cash buys 100 gems
    Gem,
    /// Gems into premium-cash, 100 gems buy 1 cash
    Mcash,
}

impl ExchangeDirection {
    /// Parse the wire direction string; anything else is outcome code 4
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gem" => Some(Self::Gem),
            "mcash" => Some(Self::Mcash),
            _ => None,
        }
    }
}

/// Small-integer result codes of the currency exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeOutcome {
    Success,
    AuthFailed,
    InvalidAmount,
    InsufficientFunds,
    UnknownDirection,
}

impl ExchangeOutcome {
    /// Wire code for this outcome
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::AuthFailed => 1,
            Self::InvalidAmount => 2,
            Self::InsufficientFunds => 3,
            Self::UnknownDirection => 4,
        }
    }
}

/// Gem and premium-cash balances for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub player_id: i32,
    pub gem: i64,
    pub mcash: i64,
}

impl Wallet {
    /// Apply an exchange to this wallet, returning the updated balances
    ///
    /// Pure arithmetic; persistence and authentication live in the service.
    /// The gem direction requires the amount be a positive multiple of 100
    /// (code 2) backed by `amount / 100` premium-cash (code 3); the mcash
    /// direction requires `amount * 100` gems. Neither balance can go
    /// negative for any input.
    pub fn apply_exchange(
        &self,
        amount: i64,
        direction: ExchangeDirection,
    ) -> Result<Wallet, ExchangeOutcome> {
        if amount <= 0 {
            return Err(ExchangeOutcome::InvalidAmount);
        }

        let mut updated = *self;

        match direction {
            ExchangeDirection::Gem => {
                if amount % 100 != 0 {
                    return Err(ExchangeOutcome::InvalidAmount);
                }
                if self.mcash < amount / 100 {
                    return Err(ExchangeOutcome::InsufficientFunds);
                }
                updated.gem += amount;
                updated.mcash -= amount / 100;
            }
            ExchangeDirection::Mcash => {
                let gem_cost = amount
                    .checked_mul(100)
                    .ok_or(ExchangeOutcome::InvalidAmount)?;
                if self.gem < gem_cost {
                    return Err(ExchangeOutcome::InsufficientFunds);
                }
                updated.mcash += amount;
                updated.gem -= gem_cost;
            }
        }

        Ok(updated)
    }
}

/// Account row as seen by the recovery flows
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: i32,
    pub userid: String,
    pub email: Option<String>,
    pub reset_blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn wallet(gem: i64, mcash: i64) -> Wallet {
        Wallet {
            player_id: 1,
            gem,
            mcash,
        }
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(ExchangeDirection::parse("gem"), Some(ExchangeDirection::Gem));
        assert_eq!(
            ExchangeDirection::parse("mcash"),
            Some(ExchangeDirection::Mcash)
        );
        assert_eq!(ExchangeDirection::parse("GEM"), None);
        assert_eq!(ExchangeDirection::parse(""), None);
    }

    #[test]
    fn test_gem_exchange_success() {
        let updated = wallet(50, 10)
            .apply_exchange(300, ExchangeDirection::Gem)
            .unwrap();
        assert_eq!(updated.gem, 350);
        assert_eq!(updated.mcash, 7);
    }

    #[test]
    fn test_gem_exchange_requires_multiple_of_100() {
        assert_eq!(
            wallet(0, 100).apply_exchange(150, ExchangeDirection::Gem),
            Err(ExchangeOutcome::InvalidAmount)
        );
    }

    #[test]
    fn test_gem_exchange_requires_funds() {
        assert_eq!(
            wallet(0, 2).apply_exchange(300, ExchangeDirection::Gem),
            Err(ExchangeOutcome::InsufficientFunds)
        );
    }

    #[test]
    fn test_mcash_exchange_success() {
        let updated = wallet(1000, 0)
            .apply_exchange(7, ExchangeDirection::Mcash)
            .unwrap();
        assert_eq!(updated.gem, 300);
        assert_eq!(updated.mcash, 7);
    }

    #[test]
    fn test_mcash_exchange_requires_funds() {
        assert_eq!(
            wallet(199, 0).apply_exchange(2, ExchangeDirection::Mcash),
            Err(ExchangeOutcome::InsufficientFunds)
        );
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        for direction in [ExchangeDirection::Gem, ExchangeDirection::Mcash] {
            assert_eq!(
                wallet(1000, 1000).apply_exchange(0, direction),
                Err(ExchangeOutcome::InvalidAmount)
            );
            assert_eq!(
                wallet(1000, 1000).apply_exchange(-100, direction),
                Err(ExchangeOutcome::InvalidAmount)
            );
        }
    }

    #[test]
    fn test_exchange_never_goes_negative() {
        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let start = wallet(rng.gen_range(0..10_000), rng.gen_range(0..10_000));
            let amount = rng.gen_range(-10_000..10_000);
            let direction = if rng.gen_bool(0.5) {
                ExchangeDirection::Gem
            } else {
                ExchangeDirection::Mcash
            };

            if let Ok(updated) = start.apply_exchange(amount, direction) {
                assert!(updated.gem >= 0, "gem went negative: {updated:?}");
                assert!(updated.mcash >= 0, "mcash went negative: {updated:?}");
            }
        }
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(ExchangeOutcome::Success.code(), 0);
        assert_eq!(ExchangeOutcome::AuthFailed.code(), 1);
        assert_eq!(ExchangeOutcome::InvalidAmount.code(), 2);
        assert_eq!(ExchangeOutcome::InsufficientFunds.code(), 3);
        assert_eq!(ExchangeOutcome::UnknownDirection.code(), 4);
    }
}
