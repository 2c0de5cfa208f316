//! IQC SPC Toolkit
//!
//! Recovers dimensional measurements from OCR'd incoming-quality-control
//! inspection forms and computes control limits and process capability
//! (Cp/Cpk, Pp/Ppk) per dimension.

pub mod cli;
pub mod core;
pub mod entities;
pub mod extract;
pub mod yaml;
