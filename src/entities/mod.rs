//! `SeaORM` entities of the catalog tables.

pub mod games;
pub mod genres;
pub mod studios;
