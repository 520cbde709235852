//! Resume records: CRUD over generated artifacts, derived preferences and
//! usage counters. The generation flows themselves live in `pipeline`.

pub mod handlers;
pub mod repo;
