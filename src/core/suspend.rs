//! Cooperative suspension
//!
//! Anything with autonomous per-frame behaviour implements `Suspendable` so
//! a pause (or an airdrop) can freeze it without losing state. Suspended
//! components keep everything they had and continue exactly where they were
//! on resume.

pub trait Suspendable {
    fn suspend(&mut self);
    fn resume(&mut self);
    fn is_suspended(&self) -> bool;
}
