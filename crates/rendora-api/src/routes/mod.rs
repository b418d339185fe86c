//! One module per listener, the way the teacher's `routes/` tree has one
//! module per mounted feature area.

pub mod admin;
pub mod public;
