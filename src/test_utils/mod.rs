//! Shared builders and fakes for the unit tests.
mod fake_dispatcher;
mod fake_group;
mod input_builder;

pub(crate) use fake_dispatcher::*;
pub(crate) use fake_group::*;
pub(crate) use input_builder::*;
