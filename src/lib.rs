//! Two-stage SQL text processing: split a multi-statement script
//! (SQL*Plus style, PL/SQL blocks included) into individual statements,
//! then rewrite a statement's named bind markers (`&name`, `:name`) into
//! positional `?` placeholders.
//!
//! Both stages are purely lexical; no SQL validation or execution happens
//! here.

pub mod bind;
pub mod error;
mod lex;
pub mod split;

pub use bind::{parameterize, ParameterizedSql};
pub use error::{Position, Result, ScriptError};
pub use split::{ScriptSplitter, SplitOptions};
