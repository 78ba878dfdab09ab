// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side Diesel queries, one module per aggregate.

pub mod audit;
pub mod contracts;
pub mod inquiries;
pub mod offers;
pub mod opportunities;
pub mod payback;
pub mod records;
