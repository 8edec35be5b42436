// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod fragments;
pub mod inspect;

pub use fragments::fragments_command;
pub use inspect::inspect_command;
