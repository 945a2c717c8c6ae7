//! Player and house money
//!
//! Every operation is a transfer between the two sides: the bet moves to the
//! house when placed, and a house bust moves the payout back to the player.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("insufficient funds: balance {balance}, bet {amount}")]
    InsufficientFunds { balance: u32, amount: u32 },
}

/// Winnings on top of the returned bet: `round(bet × multiplier)`, ties to even
pub fn winnings(bet: u32, multiplier: f32) -> u32 {
    let raw = (bet as f64 * multiplier.max(0.0) as f64).round_ties_even();
    raw.min(u32::MAX as f64) as u32
}

/// Full amount owed to the player when the house busts
pub fn payout_owed(bet: u32, multiplier: f32) -> u32 {
    bet.saturating_add(winnings(bet, multiplier))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerWallet {
    balance: u32,
    starting: u32,
    /// Bet placed this round
    bet: u32,
}

impl PlayerWallet {
    pub fn new(starting: u32) -> Self {
        Self {
            balance: starting,
            starting,
            bet: 0,
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn bet(&self) -> u32 {
        self.bet
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Deduct a bet; the caller credits the house with the same amount
    pub fn place_bet(&mut self, amount: u32) -> Result<u32, EconomyError> {
        if !self.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                balance: self.balance,
                amount,
            });
        }
        self.balance -= amount;
        self.bet = amount;
        log::info!("Player placed bet of {}. Remaining money: {}", amount, self.balance);
        Ok(amount)
    }

    pub fn add_money(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
        log::info!("Player received {}. Total money: {}", amount, self.balance);
    }

    pub fn reset(&mut self) {
        self.balance = self.starting;
        self.bet = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseBank {
    balance: u32,
    starting: u32,
    win_multiplier: f32,
}

impl HouseBank {
    pub fn new(starting: u32, win_multiplier: f32) -> Self {
        Self {
            balance: starting,
            starting,
            win_multiplier,
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn win_multiplier(&self) -> f32 {
        self.win_multiplier
    }

    pub fn receive_bet(&mut self, amount: u32) -> u32 {
        self.balance = self.balance.saturating_add(amount);
        log::info!("House received bet of {}. Total money: {}", amount, self.balance);
        self.balance
    }

    /// Pay out a player win. An insolvent house pays what it has and hits zero.
    pub fn pay_winnings(&mut self, bet: u32) -> u32 {
        let owed = payout_owed(bet, self.win_multiplier);
        if self.balance < owed {
            let paid = self.balance;
            self.balance = 0;
            log::info!("House paying all remaining money: {} (owed {})", paid, owed);
            paid
        } else {
            self.balance -= owed;
            log::info!(
                "House paying {} (bet {} + winnings {}). Remaining: {}",
                owed,
                bet,
                owed - bet,
                self.balance
            );
            owed
        }
    }

    pub fn is_broke(&self) -> bool {
        self.balance == 0
    }

    pub fn reset(&mut self) {
        self.balance = self.starting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bet_transfer() {
        let mut player = PlayerWallet::new(1000);
        let mut house = HouseBank::new(1000, 1.5);
        let bet = player.place_bet(50).unwrap();
        house.receive_bet(bet);
        assert_eq!(player.balance(), 950);
        assert_eq!(player.bet(), 50);
        assert_eq!(house.balance(), 1050);
    }

    #[test]
    fn test_insufficient_funds() {
        let mut player = PlayerWallet::new(40);
        assert_eq!(
            player.place_bet(50),
            Err(EconomyError::InsufficientFunds {
                balance: 40,
                amount: 50
            })
        );
        assert_eq!(player.balance(), 40);
        assert_eq!(player.bet(), 0);
    }

    #[test]
    fn test_payout_with_multiplier() {
        assert_eq!(payout_owed(50, 1.5), 125);
        assert_eq!(payout_owed(200, 1.5), 500);
        let mut house = HouseBank::new(1050, 1.5);
        assert_eq!(house.pay_winnings(50), 125);
        assert_eq!(house.balance(), 925);
    }

    #[test]
    fn test_rounding_ties_to_even() {
        // 35 × 1.5 = 52.5 → 52, 25 × 1.5 = 37.5 → 38
        assert_eq!(winnings(35, 1.5), 52);
        assert_eq!(winnings(25, 1.5), 38);
    }

    #[test]
    fn test_insolvent_house_pays_everything() {
        let mut house = HouseBank::new(100, 1.5);
        assert_eq!(house.pay_winnings(200), 100);
        assert_eq!(house.balance(), 0);
        assert!(house.is_broke());
    }

    #[test]
    fn test_reset_restores_starting_money() {
        let mut player = PlayerWallet::new(1000);
        player.place_bet(200).unwrap();
        player.reset();
        assert_eq!(player.balance(), 1000);
        assert_eq!(player.bet(), 0);

        let mut house = HouseBank::new(1000, 1.5);
        house.pay_winnings(200);
        house.reset();
        assert_eq!(house.balance(), 1000);
    }

    proptest! {
        #[test]
        fn prop_house_bust_conserves_money(
            bet in 1u32..500,
            player_start in 0u32..5000,
            house_start in 0u32..5000,
            multiplier in 0.0f32..4.0,
        ) {
            let mut player = PlayerWallet::new(player_start);
            let mut house = HouseBank::new(house_start, multiplier);
            let before = house.balance();
            let total = player.balance() as u64 + house.balance() as u64;

            let paid = house.pay_winnings(bet);
            player.add_money(paid);

            prop_assert_eq!(paid, payout_owed(bet, multiplier).min(before));
            prop_assert_eq!(house.balance(), before - paid);
            prop_assert_eq!(player.balance(), player_start + paid);
            prop_assert_eq!(player.balance() as u64 + house.balance() as u64, total);
        }
    }
}
