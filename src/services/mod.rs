pub mod admin;
pub mod ai;
pub mod announcement;
pub mod backend;
pub mod billing;
pub mod catalog;
pub mod lookup;
pub mod payment;
pub mod sequence;
pub mod session;
pub mod slots;
pub mod workflow;

#[cfg(test)]
pub mod testing;
