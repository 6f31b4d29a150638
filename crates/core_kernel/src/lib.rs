//! Core Kernel - Foundational types and utilities for the accounting system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers and value objects

pub mod identifiers;
pub mod money;

pub use identifiers::{AccountId, CompanyId, EntryId, LineId, PeriodId};
pub use money::{Currency, Money, MoneyError};
