//! Records of values computed during training.
//!
//! A [`Record`] collects named scalars, such as the loss terms of an
//! optimization step, so that the caller can log or aggregate them.
//!
//! ```rust
//! use asym_rlpo_core::record::Record;
//!
//! let record = Record::from_slice(&[("loss_actor", 0.5), ("loss_critic", 1.2)]);
//! assert_eq!(record.get_scalar("loss_critic").unwrap(), 1.2);
//! ```
mod base;

pub use base::Record;
