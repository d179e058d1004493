#[path = "helpers/mod.rs"]
mod helpers;

#[path = "hir/mod.rs"]
mod hir;

#[path = "project/mod.rs"]
mod project;

#[path = "syntax/mod.rs"]
mod syntax;
