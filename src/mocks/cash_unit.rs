//! Mock cash unit.

use crate::providers::{CashUnit, CashUnitError};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Drawer {
    capacity: u64,
    holding: u64,
    failing_accepts: usize,
    failing_dispenses: usize,
}

/// Cash unit with a fixed bill capacity.
#[derive(Debug, Clone)]
pub struct InMemoryCashUnit {
    drawer: Arc<Mutex<Drawer>>,
}

impl InMemoryCashUnit {
    /// Create a unit holding `holding` of at most `capacity` bills.
    #[must_use]
    pub fn new(capacity: u64, holding: u64) -> Self {
        Self {
            drawer: Arc::new(Mutex::new(Drawer {
                capacity,
                holding: holding.min(capacity),
                failing_accepts: 0,
                failing_dispenses: 0,
            })),
        }
    }

    /// Bills currently in the unit.
    pub fn holding(&self) -> u64 {
        self.drawer.lock().map(|d| d.holding).unwrap_or_default()
    }

    /// Make the next `count` `accept` calls fail mechanically.
    pub fn fail_next_accepts(&self, count: usize) {
        if let Ok(mut drawer) = self.drawer.lock() {
            drawer.failing_accepts = count;
        }
    }

    /// Make the next `count` `dispense` calls fail mechanically.
    pub fn fail_next_dispenses(&self, count: usize) {
        if let Ok(mut drawer) = self.drawer.lock() {
            drawer.failing_dispenses = count;
        }
    }
}

fn poisoned<T>(_: T) -> CashUnitError {
    CashUnitError::Mechanical("drawer lock poisoned".to_string())
}

impl CashUnit for InMemoryCashUnit {
    fn can_deposit(&self, amount: u64) -> bool {
        self.drawer
            .lock()
            .map(|d| d.holding.saturating_add(amount) <= d.capacity)
            .unwrap_or(false)
    }

    fn can_withdraw(&self, amount: u64) -> bool {
        self.drawer
            .lock()
            .map(|d| amount <= d.holding)
            .unwrap_or(false)
    }

    fn accept(&self, amount: u64) -> Result<(), CashUnitError> {
        let mut drawer = self.drawer.lock().map_err(poisoned)?;
        if drawer.failing_accepts > 0 {
            drawer.failing_accepts -= 1;
            return Err(CashUnitError::Mechanical("acceptor jammed".to_string()));
        }
        let available = drawer.capacity - drawer.holding;
        if amount > available {
            return Err(CashUnitError::CapacityExceeded {
                requested: amount,
                available,
            });
        }
        drawer.holding += amount;
        Ok(())
    }

    fn dispense(&self, amount: u64) -> Result<(), CashUnitError> {
        let mut drawer = self.drawer.lock().map_err(poisoned)?;
        if drawer.failing_dispenses > 0 {
            drawer.failing_dispenses -= 1;
            return Err(CashUnitError::Mechanical("dispenser jammed".to_string()));
        }
        if amount > drawer.holding {
            return Err(CashUnitError::InsufficientBills {
                requested: amount,
                held: drawer.holding,
            });
        }
        drawer.holding -= amount;
        Ok(())
    }
}
