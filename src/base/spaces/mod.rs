// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

pub mod real_vector_state_space;
pub mod so2_state_space;
