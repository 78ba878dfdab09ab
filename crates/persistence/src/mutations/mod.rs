// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side Diesel mutations.
//!
//! State-changing functions expect to run inside a transaction opened by the
//! caller, so the compare-and-set check, the update and the audit insert
//! commit together.

pub mod audit;
pub mod contracts;
pub mod inquiries;
pub mod offers;
pub mod payback;
pub mod records;
