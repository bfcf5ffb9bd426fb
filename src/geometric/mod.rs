// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

mod planners;

pub use self::planners::trrt_star::TRRTStar;
