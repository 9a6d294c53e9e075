//! Language adapters and the comment machinery they share.

pub mod comments;
pub mod grammar;
pub mod header;
pub mod insert;
pub mod interface;
pub mod router;

pub mod go;
pub mod java;
pub mod javascript;
pub mod markup;
pub mod python;
pub mod stylesheet;
