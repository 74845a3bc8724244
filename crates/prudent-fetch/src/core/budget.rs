/// Caps how many fetches one resolver may attempt.
///
/// Not shareable between threads on purpose: one budget belongs to one
/// document resolution session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBudget {
    Unlimited,
    Limited(u32),
}

/// The budget had no requests left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

impl RequestBudget {
    pub fn new(limit: Option<u32>) -> Self {
        match limit {
            Some(n) => RequestBudget::Limited(n),
            None => RequestBudget::Unlimited,
        }
    }

    /// Takes one request from the budget, or fails if none are left.
    pub fn check_and_consume(&mut self) -> Result<(), Exhausted> {
        match self {
            RequestBudget::Unlimited => Ok(()),
            RequestBudget::Limited(0) => Err(Exhausted),
            RequestBudget::Limited(left) => {
                *left -= 1;
                Ok(())
            }
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            RequestBudget::Unlimited => None,
            RequestBudget::Limited(left) => Some(*left),
        }
    }
}
